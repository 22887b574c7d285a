use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::benchmark::{Benchmark, BenchmarkPosition, BenchmarkSource};
use super::domain::{FieldAdjustment, ScoringInput};
use super::evaluation::{Band, EngineError, PortabilityEngine, ScoreComponent};
use super::intake::{
    parse_quick_estimate_input, parse_scoring_input, AnalyzeRequest, IntakeError,
    QuickEstimateRequest,
};
use super::registry::Market;

/// Service composing intake validation, the engine and a benchmark source.
pub struct PortabilityService<B> {
    engine: Arc<PortabilityEngine>,
    benchmarks: Arc<B>,
}

impl<B> PortabilityService<B>
where
    B: BenchmarkSource + 'static,
{
    pub fn new(engine: Arc<PortabilityEngine>, benchmarks: Arc<B>) -> Self {
        Self { engine, benchmarks }
    }

    pub fn engine(&self) -> &PortabilityEngine {
        &self.engine
    }

    /// Validate a raw payload, score it, and attach benchmark and recommendations.
    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, AnalysisError> {
        let parsed = parse_scoring_input(request, self.engine.registry())?;
        let mut report = self.analyze_input(&parsed.input)?;
        report.adjustments = parsed.adjustments;
        Ok(report)
    }

    /// Score an already validated input.
    pub fn analyze_input(&self, input: &ScoringInput) -> Result<AnalysisReport, AnalysisError> {
        let evaluation = self.engine.evaluate(input)?;
        let recommendations = self.engine.recommend(input);
        let benchmark = self.benchmarks.benchmark(input.market_id());
        let position = benchmark
            .as_ref()
            .map(|benchmark| benchmark.position(evaluation.score));
        let market = self
            .engine
            .registry()
            .market(input.market_id())
            .map(MarketSummary::from)
            .ok_or_else(|| EngineError::UnknownMarket {
                market_id: input.market_id().to_string(),
            })?;

        info!(
            market_id = input.market_id(),
            score = evaluation.score,
            band = evaluation.band.label(),
            benchmark = benchmark.is_some(),
            recommendations = recommendations.len(),
            "portability analysis completed"
        );

        Ok(AnalysisReport {
            market,
            score: evaluation.score,
            band: evaluation.band,
            headline: evaluation.band.headline().to_string(),
            next_step: evaluation.band.next_step().to_string(),
            recommendations,
            benchmark,
            position,
            adjustments: Vec::new(),
            components: evaluation.components,
        })
    }

    pub fn quick_estimate(
        &self,
        request: &QuickEstimateRequest,
    ) -> Result<QuickEstimateReport, AnalysisError> {
        let parsed = parse_quick_estimate_input(request, self.engine.registry())?;
        let estimate = self.engine.quick_estimate(&parsed.input)?;

        Ok(QuickEstimateReport {
            market_id: estimate.market_id,
            score: estimate.score,
            band: estimate.band,
            headline: estimate.band.headline().to_string(),
            market_factor: estimate.market_factor,
            adjustments: parsed.adjustments,
        })
    }
}

/// Market context shown next to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub id: String,
    pub label: String,
    pub regulator: String,
    pub notes: Vec<String>,
}

impl From<&Market> for MarketSummary {
    fn from(market: &Market) -> Self {
        Self {
            id: market.id.clone(),
            label: market.label.clone(),
            regulator: market.regulator.clone(),
            notes: market.notes.clone(),
        }
    }
}

/// Response body of the analyze endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub market: MarketSummary,
    pub score: u8,
    pub band: Band,
    pub headline: String,
    pub next_step: String,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<Benchmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BenchmarkPosition>,
    pub adjustments: Vec<FieldAdjustment>,
    pub components: Vec<ScoreComponent>,
}

/// Response body of the quick-estimate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimateReport {
    pub market_id: String,
    pub score: u8,
    pub band: Band,
    pub headline: String,
    pub market_factor: f64,
    pub adjustments: Vec<FieldAdjustment>,
}

/// Error raised by the portability service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AnalysisError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AnalysisError::Intake(error) => error.field(),
            AnalysisError::Engine(EngineError::EmptyBookingCentres) => Some("bookingCentres"),
            AnalysisError::Engine(EngineError::UnknownMarket { .. }) => Some("marketId"),
        }
    }
}
