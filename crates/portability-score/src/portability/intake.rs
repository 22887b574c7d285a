//! Boundary validation for raw form/API payloads.
//!
//! Factors may arrive as JSON numbers or numeric strings. Missing fields are rejected,
//! fractional values are rounded, and out-of-range values are clamped with a
//! [`FieldAdjustment`] recorded for each change.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{Factor, FactorGrades, FieldAdjustment, QuickEstimateInput, ScoringInput};
use super::registry::MarketRegistry;

/// A factor value as submitted by a form: number or numeric string.
///
/// Any other JSON shape lands in `Other` so it is rejected by field, not by the
/// body extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<u8> for RawValue {
    fn from(value: u8) -> Self {
        RawValue::Number(f64::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Wire shape of `POST /api/portability/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub market_id: Option<String>,
    /// `null` and an absent list are both treated as no selection.
    #[serde(default)]
    pub booking_centres: Option<Vec<String>>,
    #[serde(default)]
    pub aum_mix: Option<RawValue>,
    #[serde(default)]
    pub cross_border_licenses: Option<RawValue>,
    #[serde(default)]
    pub product_scope: Option<RawValue>,
    #[serde(default)]
    pub client_concentration: Option<RawValue>,
    #[serde(default)]
    pub kyc_portability: Option<RawValue>,
}

/// Wire shape of `POST /api/portability/quick-estimate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimateRequest {
    #[serde(default)]
    pub market_id: Option<String>,
    #[serde(default)]
    pub aum_mix: Option<RawValue>,
    #[serde(default)]
    pub cross_border_licenses: Option<RawValue>,
    #[serde(default)]
    pub product_scope: Option<RawValue>,
    #[serde(default)]
    pub client_concentration: Option<RawValue>,
    #[serde(default)]
    pub kyc_portability: Option<RawValue>,
}

struct RawGrades<'a> {
    aum_mix: Option<&'a RawValue>,
    cross_border_licenses: Option<&'a RawValue>,
    product_scope: Option<&'a RawValue>,
    client_concentration: Option<&'a RawValue>,
    kyc_portability: Option<&'a RawValue>,
}

impl<'a> RawGrades<'a> {
    fn get(&self, factor: Factor) -> Option<&'a RawValue> {
        match factor {
            Factor::AumMix => self.aum_mix,
            Factor::BookingCentres => None,
            Factor::CrossBorderLicenses => self.cross_border_licenses,
            Factor::ProductScope => self.product_scope,
            Factor::ClientConcentration => self.client_concentration,
            Factor::KycPortability => self.kyc_portability,
        }
    }
}

impl<'a> From<&'a AnalyzeRequest> for RawGrades<'a> {
    fn from(request: &'a AnalyzeRequest) -> Self {
        Self {
            aum_mix: request.aum_mix.as_ref(),
            cross_border_licenses: request.cross_border_licenses.as_ref(),
            product_scope: request.product_scope.as_ref(),
            client_concentration: request.client_concentration.as_ref(),
            kyc_portability: request.kyc_portability.as_ref(),
        }
    }
}

impl<'a> From<&'a QuickEstimateRequest> for RawGrades<'a> {
    fn from(request: &'a QuickEstimateRequest) -> Self {
        Self {
            aum_mix: request.aum_mix.as_ref(),
            cross_border_licenses: request.cross_border_licenses.as_ref(),
            product_scope: request.product_scope.as_ref(),
            client_concentration: request.client_concentration.as_ref(),
            kyc_portability: request.kyc_portability.as_ref(),
        }
    }
}

/// Validated input plus the clamping that was applied to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub input: T,
    pub adjustments: Vec<FieldAdjustment>,
}

/// Rejections raised before the engine is invoked. Messages are user-facing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("Select at least one booking centre.")]
    EmptyBookingCentres,
    #[error("Unknown market '{market_id}'.")]
    UnknownMarket { market_id: String },
    #[error("Missing required field '{field}'.")]
    MissingField { field: &'static str },
    #[error("Field '{field}' must be a number, got '{value}'.")]
    InvalidValue { field: &'static str, value: String },
}

impl IntakeError {
    /// Wire name of the offending field, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            IntakeError::EmptyBookingCentres => Some(Factor::BookingCentres.field_name()),
            IntakeError::UnknownMarket { .. } => Some("marketId"),
            IntakeError::MissingField { field } | IntakeError::InvalidValue { field, .. } => {
                Some(*field)
            }
        }
    }
}

/// Validates an analyze payload against the registry.
pub fn parse_scoring_input(
    request: &AnalyzeRequest,
    registry: &MarketRegistry,
) -> Result<Parsed<ScoringInput>, IntakeError> {
    let market_id = parse_market(request.market_id.as_deref(), registry)?;
    let centres = request.booking_centres.as_deref().unwrap_or_default();
    // Centres are checked before grades so an empty selection wins over other errors.
    if centres.iter().all(|centre| centre.trim().is_empty()) {
        return Err(IntakeError::EmptyBookingCentres);
    }
    let (grades, adjustments) = parse_grades(&RawGrades::from(request))?;
    log_adjustments(&market_id, &adjustments);

    let input = ScoringInput::from_parts(market_id, centres, grades)?;
    Ok(Parsed { input, adjustments })
}

/// Validates a quick-estimate payload against the registry.
pub fn parse_quick_estimate_input(
    request: &QuickEstimateRequest,
    registry: &MarketRegistry,
) -> Result<Parsed<QuickEstimateInput>, IntakeError> {
    let market_id = parse_market(request.market_id.as_deref(), registry)?;
    let (grades, adjustments) = parse_grades(&RawGrades::from(request))?;
    log_adjustments(&market_id, &adjustments);

    Ok(Parsed {
        input: QuickEstimateInput::from_parts(market_id, grades),
        adjustments,
    })
}

fn parse_market(raw: Option<&str>, registry: &MarketRegistry) -> Result<String, IntakeError> {
    let market_id = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(IntakeError::MissingField { field: "marketId" })?;
    match registry.market(market_id) {
        Some(market) => Ok(market.id.clone()),
        None => Err(IntakeError::UnknownMarket {
            market_id: market_id.to_string(),
        }),
    }
}

fn parse_grades(raw: &RawGrades<'_>) -> Result<(FactorGrades, Vec<FieldAdjustment>), IntakeError> {
    let mut values = [0u8; 5];
    let mut adjustments = Vec::new();

    for (slot, factor) in values.iter_mut().zip(Factor::GRADED) {
        let field = factor.field_name();
        let Some((min, max)) = factor.bounds() else {
            continue;
        };
        let received = match raw.get(factor) {
            None => return Err(IntakeError::MissingField { field }),
            Some(value) => numeric(field, value)?,
        };
        let applied = received.round().clamp(f64::from(min), f64::from(max)) as u8;
        if f64::from(applied) != received {
            adjustments.push(FieldAdjustment {
                field: field.to_string(),
                received,
                applied,
            });
        }
        *slot = applied;
    }

    let [aum_mix, cross_border_licenses, product_scope, client_concentration, kyc_portability] =
        values;
    let grades = FactorGrades {
        aum_mix,
        cross_border_licenses,
        product_scope,
        client_concentration,
        kyc_portability,
    };
    Ok((grades, adjustments))
}

fn numeric(field: &'static str, value: &RawValue) -> Result<f64, IntakeError> {
    let invalid = |shown: String| IntakeError::InvalidValue {
        field,
        value: shown,
    };
    let number = match value {
        RawValue::Number(number) => *number,
        RawValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(IntakeError::MissingField { field });
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| invalid(text.clone()))?
        }
        RawValue::Other(other) => return Err(invalid(other.to_string())),
    };
    if number.is_finite() {
        Ok(number)
    } else {
        Err(invalid(number.to_string()))
    }
}

fn log_adjustments(market_id: &str, adjustments: &[FieldAdjustment]) {
    for adjustment in adjustments {
        warn!(
            market_id,
            field = %adjustment.field,
            received = adjustment.received,
            applied = adjustment.applied,
            "clamped out-of-range factor"
        );
    }
}
