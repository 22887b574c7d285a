use metrics_exporter_prometheus::PrometheusHandle;
use portability_score::config::RegistryConfig;
use portability_score::portability::{
    MarketRegistry, PortabilityEngine, PortabilityService, RegistryError, StaticBenchmarks,
    BENCHMARKS_FILE,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ScoringService = PortabilityService<StaticBenchmarks>;

/// Registry from `PORTABILITY_DATA_DIR` when set, otherwise the compiled-in tables.
pub(crate) fn load_registry(config: &RegistryConfig) -> Result<MarketRegistry, RegistryError> {
    let registry = match &config.data_dir {
        Some(dir) => MarketRegistry::from_dir(dir)?,
        None => MarketRegistry::embedded()?,
    };
    registry.with_fallback_multiplier(config.unknown_centre_multiplier)
}

/// Benchmarks are advisory: a data directory without a benchmark table serves none.
pub(crate) fn load_benchmarks(config: &RegistryConfig) -> Result<StaticBenchmarks, RegistryError> {
    match &config.data_dir {
        Some(dir) if dir.join(BENCHMARKS_FILE).is_file() => StaticBenchmarks::from_dir(dir),
        Some(dir) => {
            warn!(
                dir = %dir.display(),
                file = BENCHMARKS_FILE,
                "benchmark table missing; analyses will omit benchmarks"
            );
            Ok(StaticBenchmarks::default())
        }
        None => StaticBenchmarks::embedded(),
    }
}

pub(crate) fn build_service(config: &RegistryConfig) -> Result<ScoringService, RegistryError> {
    let registry = Arc::new(load_registry(config)?);
    let benchmarks = Arc::new(load_benchmarks(config)?);
    let engine = Arc::new(PortabilityEngine::canonical(registry));
    Ok(PortabilityService::new(engine, benchmarks))
}
