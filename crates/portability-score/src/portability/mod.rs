//! Portability & readiness scoring.
//!
//! A caller collects raw form values, [`intake`] validates them into a [`ScoringInput`],
//! the [`PortabilityEngine`] scores and bands the profile, and the recommender inspects
//! the same raw grades independently. Benchmarks come from an external
//! [`BenchmarkSource`] and never block a result.

pub mod benchmark;
pub mod domain;
pub mod evaluation;
pub mod intake;
pub mod registry;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use benchmark::{
    Benchmark, BenchmarkPosition, BenchmarkSource, NoBenchmarks, StaticBenchmarks,
    BENCHMARKS_FILE,
};
pub use domain::{Factor, FactorGrades, FieldAdjustment, QuickEstimateInput, ScoringInput};
pub use evaluation::{
    classify, normalize::normalize, recommend, Band, BandThresholds, EngineError, Evaluation,
    PortabilityEngine, QuickEstimate, ScoreComponent, ScoringConfig, ScoringConfigError,
    ScoringWeights, TrafficLight,
};
pub use intake::{
    parse_quick_estimate_input, parse_scoring_input, AnalyzeRequest, IntakeError, Parsed,
    QuickEstimateRequest, RawValue,
};
pub use registry::{
    BookingCentre, Market, MarketKind, MarketRegistry, Region, RegionGroup, RegistryError,
    BOOKING_CENTRES_FILE, DEFAULT_UNKNOWN_CENTRE_MULTIPLIER, MARKETS_FILE,
};
pub use router::portability_router;
pub use service::{
    AnalysisError, AnalysisReport, MarketSummary, PortabilityService, QuickEstimateReport,
};
