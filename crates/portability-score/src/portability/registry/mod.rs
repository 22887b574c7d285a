//! Market and booking-centre reference data.
//!
//! Loaded once at startup (from the compiled-in tables or a data directory) and shared
//! read-only behind an `Arc`. Lookups never mutate; a reload builds a new registry.

mod loader;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub(crate) use loader::open as open_data_file;
pub use loader::{BOOKING_CENTRES_FILE, MARKETS_FILE};

/// Multiplier applied to booking centres that are not registered.
pub const DEFAULT_UNKNOWN_CENTRE_MULTIPLIER: f64 = 0.8;

/// Recruiting regions, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Ch,
    Uk,
    Eu,
    Nordics,
    Mea,
    Latam,
    Asia,
    Cee,
    Us,
}

impl Region {
    pub const ORDER: [Region; 9] = [
        Region::Ch,
        Region::Uk,
        Region::Eu,
        Region::Nordics,
        Region::Mea,
        Region::Latam,
        Region::Asia,
        Region::Cee,
        Region::Us,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::Ch => "CH",
            Region::Uk => "UK",
            Region::Eu => "EU",
            Region::Nordics => "NORDICS",
            Region::Mea => "MEA",
            Region::Latam => "LATAM",
            Region::Asia => "ASIA",
            Region::Cee => "CEE",
            Region::Us => "US",
        }
    }

    /// Market factor used when a market does not carry its own.
    pub fn default_market_factor(self) -> f64 {
        match self {
            Region::Ch => 1.0,
            Region::Uk => 0.98,
            Region::Eu | Region::Nordics => 0.95,
            Region::Us => 0.93,
            Region::Asia => 0.92,
            Region::Mea | Region::Cee => 0.90,
            Region::Latam => 0.88,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Country,
    City,
}

/// A recruiting region / booking jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    pub label: String,
    pub region: Region,
    #[serde(rename = "type")]
    pub kind: MarketKind,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub regulator: String,
    pub notes: Vec<String>,
    pub default_centres: Vec<String>,
    pub market_factor: f64,
}

/// A custody/operational jurisdiction clients can be served from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCentre {
    pub name: String,
    pub multiplier: f64,
    #[serde(default)]
    pub tier1: bool,
}

/// Markets of one region, as listed by [`MarketRegistry::markets_by_region`].
#[derive(Debug, Clone, Serialize)]
pub struct RegionGroup<'a> {
    pub region: Region,
    pub markets: Vec<&'a Market>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid market data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV reference data: {0}")]
    Csv(#[from] csv::Error),
    #[error("market '{0}' is defined more than once")]
    DuplicateMarket(String),
    #[error("booking centre '{0}' is defined more than once")]
    DuplicateCentre(String),
    #[error("booking centre '{centre}' multiplier {value} is outside (0, 1]")]
    InvalidMultiplier { centre: String, value: f64 },
    #[error("market '{market}' factor {value} is outside (0, 1]")]
    InvalidMarketFactor { market: String, value: f64 },
    #[error("fallback multiplier {0} is outside (0, 1]")]
    InvalidFallback(f64),
    #[error("market '{market}' lists unregistered default centre '{centre}'")]
    UnknownDefaultCentre { market: String, centre: String },
    #[error("benchmark for '{market}' is inconsistent: {reason}")]
    InvalidBenchmark { market: String, reason: String },
}

fn within_unit(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

pub(crate) fn centre_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Immutable lookup tables for markets and booking centres.
#[derive(Debug, Clone)]
pub struct MarketRegistry {
    markets: Vec<Market>,
    market_index: HashMap<String, usize>,
    centres: Vec<BookingCentre>,
    centre_index: HashMap<String, usize>,
    fallback_multiplier: f64,
}

impl MarketRegistry {
    /// Builds a registry, enforcing uniqueness, multiplier bounds and that every
    /// default centre is registered. Market ids are stored trimmed.
    pub fn new(
        mut markets: Vec<Market>,
        centres: Vec<BookingCentre>,
    ) -> Result<Self, RegistryError> {
        let mut centre_index = HashMap::with_capacity(centres.len());
        for (position, centre) in centres.iter().enumerate() {
            if !within_unit(centre.multiplier) {
                return Err(RegistryError::InvalidMultiplier {
                    centre: centre.name.clone(),
                    value: centre.multiplier,
                });
            }
            if centre_index
                .insert(centre_key(&centre.name), position)
                .is_some()
            {
                return Err(RegistryError::DuplicateCentre(centre.name.clone()));
            }
        }

        let mut market_index = HashMap::with_capacity(markets.len());
        for (position, market) in markets.iter_mut().enumerate() {
            // Lookups trim their key, so stored ids must be trimmed too.
            market.id = market.id.trim().to_string();
            if !within_unit(market.market_factor) {
                return Err(RegistryError::InvalidMarketFactor {
                    market: market.id.clone(),
                    value: market.market_factor,
                });
            }
            if let Some(missing) = market
                .default_centres
                .iter()
                .find(|centre| !centre_index.contains_key(&centre_key(centre)))
            {
                return Err(RegistryError::UnknownDefaultCentre {
                    market: market.id.clone(),
                    centre: missing.clone(),
                });
            }
            if market_index.insert(market.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateMarket(market.id.clone()));
            }
        }

        Ok(Self {
            markets,
            market_index,
            centres,
            centre_index,
            fallback_multiplier: DEFAULT_UNKNOWN_CENTRE_MULTIPLIER,
        })
    }

    /// Registry built from the tables compiled into the crate.
    pub fn embedded() -> Result<Self, RegistryError> {
        let markets = loader::parse_markets(loader::EMBEDDED_MARKETS.as_bytes())?;
        let centres = loader::parse_centres(loader::EMBEDDED_CENTRES.as_bytes())?;
        let registry = Self::new(markets, centres)?;
        info!(
            markets = registry.markets.len(),
            centres = registry.centres.len(),
            "loaded embedded market registry"
        );
        Ok(registry)
    }

    /// Registry built from `markets.json` and `booking_centres.csv` in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let dir = dir.as_ref();
        let markets = loader::parse_markets(open_data_file(&dir.join(MARKETS_FILE))?)?;
        let centres = loader::parse_centres(open_data_file(&dir.join(BOOKING_CENTRES_FILE))?)?;
        let registry = Self::new(markets, centres)?;
        info!(
            markets = registry.markets.len(),
            centres = registry.centres.len(),
            dir = %dir.display(),
            "loaded market registry"
        );
        Ok(registry)
    }

    /// Replaces the multiplier used for unregistered centres.
    pub fn with_fallback_multiplier(mut self, multiplier: f64) -> Result<Self, RegistryError> {
        if !within_unit(multiplier) {
            return Err(RegistryError::InvalidFallback(multiplier));
        }
        self.fallback_multiplier = multiplier;
        Ok(self)
    }

    pub fn market(&self, id: &str) -> Option<&Market> {
        self.market_index
            .get(id.trim())
            .map(|&position| &self.markets[position])
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// Markets grouped by region in display order; empty regions are omitted.
    pub fn markets_by_region(&self) -> Vec<RegionGroup<'_>> {
        Region::ORDER
            .iter()
            .map(|&region| RegionGroup {
                region,
                markets: self
                    .markets
                    .iter()
                    .filter(|market| market.region == region)
                    .collect(),
            })
            .filter(|group| !group.markets.is_empty())
            .collect()
    }

    pub fn booking_centres(&self) -> &[BookingCentre] {
        &self.centres
    }

    /// Case- and whitespace-insensitive lookup.
    pub fn booking_centre(&self, name: &str) -> Option<&BookingCentre> {
        self.centre_index
            .get(&centre_key(name))
            .map(|&position| &self.centres[position])
    }

    /// Registered multiplier, or the fallback for unknown names. Never fails.
    pub fn booking_centre_multiplier(&self, name: &str) -> f64 {
        match self.booking_centre(name) {
            Some(centre) => centre.multiplier,
            None => {
                debug!(
                    centre = name,
                    fallback = self.fallback_multiplier,
                    "unregistered booking centre"
                );
                self.fallback_multiplier
            }
        }
    }

    pub fn is_tier1(&self, name: &str) -> bool {
        self.booking_centre(name)
            .map(|centre| centre.tier1)
            .unwrap_or(false)
    }

    pub fn fallback_multiplier(&self) -> f64 {
        self.fallback_multiplier
    }
}
