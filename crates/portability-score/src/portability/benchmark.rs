use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::registry::RegistryError;

pub const BENCHMARKS_FILE: &str = "benchmarks.csv";

const EMBEDDED_BENCHMARKS: &str = include_str!("../../data/benchmarks.csv");

/// Median and top-quartile portability scores observed for a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmark {
    pub median: u8,
    pub top_quartile: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Where a score sits against its market benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkPosition {
    BelowMedian,
    AtOrAboveMedian,
    TopQuartile,
}

impl Benchmark {
    pub fn position(&self, score: u8) -> BenchmarkPosition {
        if score >= self.top_quartile {
            BenchmarkPosition::TopQuartile
        } else if score >= self.median {
            BenchmarkPosition::AtOrAboveMedian
        } else {
            BenchmarkPosition::BelowMedian
        }
    }
}

/// Supplier of per-market benchmarks. `None` means unavailable, which callers render
/// without a benchmark block rather than failing.
pub trait BenchmarkSource: Send + Sync {
    fn benchmark(&self, market_id: &str) -> Option<Benchmark>;
}

/// Source that never has data.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBenchmarks;

impl BenchmarkSource for NoBenchmarks {
    fn benchmark(&self, _market_id: &str) -> Option<Benchmark> {
        None
    }
}

/// Benchmarks read from a `market_id,median,top_quartile,notes` table.
#[derive(Debug, Default, Clone)]
pub struct StaticBenchmarks {
    entries: HashMap<String, Benchmark>,
}

#[derive(Debug, Deserialize)]
struct BenchmarkRow {
    market_id: String,
    median: u8,
    top_quartile: u8,
    #[serde(default)]
    notes: String,
}

impl StaticBenchmarks {
    pub fn embedded() -> Result<Self, RegistryError> {
        let benchmarks = Self::from_reader(EMBEDDED_BENCHMARKS.as_bytes())?;
        info!(markets = benchmarks.len(), "loaded embedded benchmarks");
        Ok(benchmarks)
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = dir.as_ref().join(BENCHMARKS_FILE);
        let benchmarks = Self::from_reader(super::registry::open_data_file(&path)?)?;
        info!(markets = benchmarks.len(), path = %path.display(), "loaded benchmarks");
        Ok(benchmarks)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = HashMap::new();

        for record in csv_reader.deserialize::<BenchmarkRow>() {
            let row = record?;
            if row.median > row.top_quartile || row.top_quartile > 100 {
                return Err(RegistryError::InvalidBenchmark {
                    reason: format!(
                        "median {} / top quartile {} must satisfy median <= top quartile <= 100",
                        row.median, row.top_quartile
                    ),
                    market: row.market_id,
                });
            }
            let notes = row
                .notes
                .split('|')
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .map(str::to_string)
                .collect();
            entries.insert(
                row.market_id,
                Benchmark {
                    median: row.median,
                    top_quartile: row.top_quartile,
                    notes,
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn insert(&mut self, market_id: impl Into<String>, benchmark: Benchmark) {
        self.entries.insert(market_id.into(), benchmark);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BenchmarkSource for StaticBenchmarks {
    fn benchmark(&self, market_id: &str) -> Option<Benchmark> {
        self.entries.get(market_id.trim()).cloned()
    }
}
