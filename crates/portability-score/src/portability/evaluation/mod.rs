mod band;
mod config;
pub mod normalize;
mod recommendations;
mod rules;

pub use band::{classify, Band, BandThresholds, TrafficLight, HIGH_BAND_MIN, MODERATE_BAND_MIN};
pub use config::{
    ScoringConfig, ScoringConfigError, ScoringWeights, AUM_MIX_WEIGHT, BOOKING_CENTRES_WEIGHT,
    CLIENT_CONCENTRATION_WEIGHT, CROSS_BORDER_LICENSES_WEIGHT, KYC_PORTABILITY_WEIGHT,
    PRODUCT_SCOPE_WEIGHT,
};
pub use recommendations::{
    recommend, ADD_CROSS_BORDER_COVERAGE, ADD_SECOND_CENTRE, ADD_TIER1_HUB, BROADEN_AUM_MIX,
    DERISK_TOP_CLIENTS, ENABLE_LENDING_ALTERNATIVES, LIMITED_OUTBOUND_PERMISSIONS,
    LOWER_CONCENTRATION, NO_OUTBOUND_PERMISSIONS, STANDARDIZE_KYC,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Factor, QuickEstimateInput, ScoringInput};
use super::registry::{Market, MarketRegistry};

/// Stateless scorer over an immutable registry snapshot.
///
/// Every call is independent; the engine can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PortabilityEngine {
    registry: Arc<MarketRegistry>,
    config: ScoringConfig,
}

impl PortabilityEngine {
    pub fn new(
        registry: Arc<MarketRegistry>,
        config: ScoringConfig,
    ) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    /// Engine with the canonical weights and 80/60 band cutoffs.
    pub fn canonical(registry: Arc<MarketRegistry>) -> Self {
        Self {
            registry,
            config: ScoringConfig::CANONICAL,
        }
    }

    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Mean multiplier over the selected centres; unknown names use the fallback.
    pub fn centre_factor(&self, booking_centres: &[String]) -> Result<f64, EngineError> {
        if booking_centres.is_empty() {
            return Err(EngineError::EmptyBookingCentres);
        }
        let total: f64 = booking_centres
            .iter()
            .map(|centre| self.registry.booking_centre_multiplier(centre))
            .sum();
        Ok(total / booking_centres.len() as f64)
    }

    pub fn compute_score(&self, input: &ScoringInput) -> Result<u8, EngineError> {
        self.evaluate(input).map(|evaluation| evaluation.score)
    }

    pub fn classify(&self, score: u8) -> Band {
        self.config.bands.classify(score)
    }

    pub fn recommend(&self, input: &ScoringInput) -> Vec<String> {
        recommend(input, &self.registry)
    }

    /// Full scoring pass with a per-factor breakdown.
    pub fn evaluate(&self, input: &ScoringInput) -> Result<Evaluation, EngineError> {
        self.market(input.market_id())?;
        let centre_factor = self.centre_factor(input.booking_centres())?;

        let (components, raw) =
            rules::score_components(input.grades(), centre_factor, &self.config.weights);
        let score = rules::to_score(raw);
        let band = self.classify(score);

        debug!(
            market_id = input.market_id(),
            centres = input.booking_centres().len(),
            centre_factor,
            raw,
            score,
            band = band.label(),
            "portability score computed"
        );

        Ok(Evaluation {
            market_id: input.market_id().to_string(),
            score,
            band,
            raw,
            centre_factor,
            components,
        })
    }

    /// Approximation that substitutes the market's flat factor for the centre average.
    pub fn quick_estimate(&self, input: &QuickEstimateInput) -> Result<QuickEstimate, EngineError> {
        let market = self.market(input.market_id())?;
        let market_factor = market.market_factor;

        let (components, raw) =
            rules::score_components(input.grades(), market_factor, &self.config.weights);
        let score = rules::to_score(raw);
        let band = self.classify(score);

        debug!(
            market_id = input.market_id(),
            market_factor,
            raw,
            score,
            "quick portability estimate computed"
        );

        Ok(QuickEstimate {
            market_id: market.id.clone(),
            score,
            band,
            market_factor,
            components,
        })
    }

    fn market(&self, market_id: &str) -> Result<&Market, EngineError> {
        self.registry
            .market(market_id)
            .ok_or_else(|| EngineError::UnknownMarket {
                market_id: market_id.to_string(),
            })
    }
}

/// Discrete contribution of one factor, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub factor: Factor,
    pub raw: f64,
    pub normalized: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Result of a full scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub market_id: String,
    pub score: u8,
    pub band: Band,
    pub raw: f64,
    pub centre_factor: f64,
    pub components: Vec<ScoreComponent>,
}

impl Evaluation {
    pub fn component(&self, factor: Factor) -> Option<&ScoreComponent> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
    }
}

/// Result of the quick-estimate mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimate {
    pub market_id: String,
    pub score: u8,
    pub band: Band,
    pub market_factor: f64,
    pub components: Vec<ScoreComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Select at least one booking centre.")]
    EmptyBookingCentres,
    #[error("Unknown market '{market_id}'.")]
    UnknownMarket { market_id: String },
}
