use serde::{Deserialize, Serialize};

use super::super::domain::Factor;
use super::band::BandThresholds;

pub const AUM_MIX_WEIGHT: f64 = 0.20;
pub const BOOKING_CENTRES_WEIGHT: f64 = 0.20;
pub const CROSS_BORDER_LICENSES_WEIGHT: f64 = 0.15;
pub const PRODUCT_SCOPE_WEIGHT: f64 = 0.15;
pub const CLIENT_CONCENTRATION_WEIGHT: f64 = 0.15;
pub const KYC_PORTABILITY_WEIGHT: f64 = 0.15;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Per-factor weights; must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub aum_mix: f64,
    pub booking_centres: f64,
    pub cross_border_licenses: f64,
    pub product_scope: f64,
    pub client_concentration: f64,
    pub kyc_portability: f64,
}

impl ScoringWeights {
    pub const CANONICAL: ScoringWeights = ScoringWeights {
        aum_mix: AUM_MIX_WEIGHT,
        booking_centres: BOOKING_CENTRES_WEIGHT,
        cross_border_licenses: CROSS_BORDER_LICENSES_WEIGHT,
        product_scope: PRODUCT_SCOPE_WEIGHT,
        client_concentration: CLIENT_CONCENTRATION_WEIGHT,
        kyc_portability: KYC_PORTABILITY_WEIGHT,
    };

    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::AumMix => self.aum_mix,
            Factor::BookingCentres => self.booking_centres,
            Factor::CrossBorderLicenses => self.cross_border_licenses,
            Factor::ProductScope => self.product_scope,
            Factor::ClientConcentration => self.client_concentration,
            Factor::KycPortability => self.kyc_portability,
        }
    }

    pub fn sum(&self) -> f64 {
        self.aum_mix
            + self.booking_centres
            + self.cross_border_licenses
            + self.product_scope
            + self.client_concentration
            + self.kyc_portability
    }

    fn all_non_negative(&self) -> bool {
        [
            self.aum_mix,
            self.booking_centres,
            self.cross_border_licenses,
            self.product_scope,
            self.client_concentration,
            self.kyc_portability,
        ]
        .iter()
        .all(|weight| weight.is_finite() && *weight >= 0.0)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Rubric configuration: factor weights and band cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub bands: BandThresholds,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("scoring weights must be non-negative and sum to 1.0 (got {sum})")]
    Weights { sum: f64 },
    #[error("band thresholds must satisfy moderate ({moderate_min}) < high ({high_min}) <= 100")]
    Bands { high_min: u8, moderate_min: u8 },
}

impl ScoringConfig {
    pub const CANONICAL: ScoringConfig = ScoringConfig {
        weights: ScoringWeights::CANONICAL,
        bands: BandThresholds::CANONICAL,
    };

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let sum = self.weights.sum();
        if !self.weights.all_non_negative() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ScoringConfigError::Weights { sum });
        }
        if !self.bands.is_ordered() {
            return Err(ScoringConfigError::Bands {
                high_min: self.bands.high_min,
                moderate_min: self.bands.moderate_min,
            });
        }
        Ok(())
    }
}
