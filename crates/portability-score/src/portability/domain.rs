use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::intake::IntakeError;
use super::registry::centre_key;

/// Scored dimensions of a banker's book.
///
/// `BookingCentres` is derived from the registry multipliers; the other five are graded on
/// their own closed integer scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    AumMix,
    BookingCentres,
    CrossBorderLicenses,
    ProductScope,
    ClientConcentration,
    KycPortability,
}

impl Factor {
    /// Graded factors in wire order.
    pub const GRADED: [Factor; 5] = [
        Factor::AumMix,
        Factor::CrossBorderLicenses,
        Factor::ProductScope,
        Factor::ClientConcentration,
        Factor::KycPortability,
    ];

    /// Field name used on the wire and in validation messages.
    pub fn field_name(self) -> &'static str {
        match self {
            Factor::AumMix => "aumMix",
            Factor::BookingCentres => "bookingCentres",
            Factor::CrossBorderLicenses => "crossBorderLicenses",
            Factor::ProductScope => "productScope",
            Factor::ClientConcentration => "clientConcentration",
            Factor::KycPortability => "kycPortability",
        }
    }

    /// Closed input range for graded factors; `None` for the booking-centre factor.
    pub fn bounds(self) -> Option<(u8, u8)> {
        match self {
            Factor::AumMix => Some((1, 5)),
            Factor::BookingCentres => None,
            Factor::CrossBorderLicenses => Some((0, 3)),
            Factor::ProductScope => Some((1, 4)),
            Factor::ClientConcentration => Some((1, 5)),
            Factor::KycPortability => Some((0, 3)),
        }
    }
}

/// Record of a raw value that was pulled back into its documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAdjustment {
    pub field: String,
    pub received: f64,
    pub applied: u8,
}

/// The five graded factors of a readiness profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorGrades {
    /// 1 = concentrated, 5 = well diversified.
    pub aum_mix: u8,
    /// 0–3.
    pub cross_border_licenses: u8,
    /// 1–4, breadth of advisory/DPM/lending/alts offering.
    pub product_scope: u8,
    /// 1 = diversified, 5 = top-heavy. Inverted relative to the other factors.
    pub client_concentration: u8,
    /// 0–3, ease of reusing KYC/CRS/FATCA documentation.
    pub kyc_portability: u8,
}

impl FactorGrades {
    pub fn get(&self, factor: Factor) -> Option<u8> {
        match factor {
            Factor::AumMix => Some(self.aum_mix),
            Factor::BookingCentres => None,
            Factor::CrossBorderLicenses => Some(self.cross_border_licenses),
            Factor::ProductScope => Some(self.product_scope),
            Factor::ClientConcentration => Some(self.client_concentration),
            Factor::KycPortability => Some(self.kyc_portability),
        }
    }

    fn slot(&mut self, factor: Factor) -> Option<&mut u8> {
        match factor {
            Factor::AumMix => Some(&mut self.aum_mix),
            Factor::BookingCentres => None,
            Factor::CrossBorderLicenses => Some(&mut self.cross_border_licenses),
            Factor::ProductScope => Some(&mut self.product_scope),
            Factor::ClientConcentration => Some(&mut self.client_concentration),
            Factor::KycPortability => Some(&mut self.kyc_portability),
        }
    }

    /// Clamps every grade into its documented range, reporting each change.
    pub fn clamped(mut self) -> (Self, Vec<FieldAdjustment>) {
        let mut adjustments = Vec::new();
        for factor in Factor::GRADED {
            let (Some((min, max)), Some(slot)) = (factor.bounds(), self.slot(factor)) else {
                continue;
            };
            let received = *slot;
            let applied = received.clamp(min, max);
            if applied != received {
                *slot = applied;
                adjustments.push(FieldAdjustment {
                    field: factor.field_name().to_string(),
                    received: f64::from(received),
                    applied,
                });
            }
        }
        (self, adjustments)
    }
}

/// Validated readiness profile, one per evaluation.
///
/// Grades are always within range and the booking-centre list is non-empty and
/// free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringInput {
    market_id: String,
    booking_centres: Vec<String>,
    #[serde(flatten)]
    grades: FactorGrades,
}

impl ScoringInput {
    /// Builds an input for programmatic callers. Out-of-range grades are clamped and
    /// logged; an empty centre list is rejected.
    pub fn new<I, S>(
        market_id: impl Into<String>,
        booking_centres: I,
        grades: FactorGrades,
    ) -> Result<Self, IntakeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let market_id = market_id.into();
        let (grades, adjustments) = grades.clamped();
        for adjustment in &adjustments {
            warn!(
                market_id = %market_id,
                field = %adjustment.field,
                received = adjustment.received,
                applied = adjustment.applied,
                "clamped out-of-range factor"
            );
        }
        Self::from_parts(market_id, booking_centres, grades)
    }

    pub(crate) fn from_parts<I, S>(
        market_id: String,
        booking_centres: I,
        grades: FactorGrades,
    ) -> Result<Self, IntakeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let booking_centres = dedupe_centres(booking_centres);
        if booking_centres.is_empty() {
            return Err(IntakeError::EmptyBookingCentres);
        }
        Ok(Self {
            market_id,
            booking_centres,
            grades,
        })
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn booking_centres(&self) -> &[String] {
        &self.booking_centres
    }

    pub fn grades(&self) -> &FactorGrades {
        &self.grades
    }

    pub fn aum_mix(&self) -> u8 {
        self.grades.aum_mix
    }

    pub fn cross_border_licenses(&self) -> u8 {
        self.grades.cross_border_licenses
    }

    pub fn product_scope(&self) -> u8 {
        self.grades.product_scope
    }

    pub fn client_concentration(&self) -> u8 {
        self.grades.client_concentration
    }

    pub fn kyc_portability(&self) -> u8 {
        self.grades.kyc_portability
    }
}

/// Input for the quick-estimate mode: no booking-centre names, the market's flat
/// factor stands in for the centre average.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimateInput {
    market_id: String,
    #[serde(flatten)]
    grades: FactorGrades,
}

impl QuickEstimateInput {
    pub fn new(market_id: impl Into<String>, grades: FactorGrades) -> Self {
        let market_id = market_id.into();
        let (grades, adjustments) = grades.clamped();
        for adjustment in &adjustments {
            warn!(
                market_id = %market_id,
                field = %adjustment.field,
                received = adjustment.received,
                applied = adjustment.applied,
                "clamped out-of-range factor"
            );
        }
        Self { market_id, grades }
    }

    pub(crate) fn from_parts(market_id: String, grades: FactorGrades) -> Self {
        Self { market_id, grades }
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn grades(&self) -> &FactorGrades {
        &self.grades
    }
}

/// Trims names, drops blanks and removes duplicates keeping first-seen order. Duplicates
/// are judged by the registry's centre key.
fn dedupe_centres<I, S>(centres: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = Vec::new();
    for centre in centres {
        let name = centre.as_ref().trim();
        if name.is_empty() || !seen.insert(centre_key(name)) {
            continue;
        }
        unique.push(name.to_string());
    }
    unique
}
