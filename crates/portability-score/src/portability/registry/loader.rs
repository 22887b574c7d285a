use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::{BookingCentre, Market, MarketKind, Region, RegistryError};

pub const MARKETS_FILE: &str = "markets.json";
pub const BOOKING_CENTRES_FILE: &str = "booking_centres.csv";

pub(super) const EMBEDDED_MARKETS: &str = include_str!("../../../data/markets.json");
pub(super) const EMBEDDED_CENTRES: &str = include_str!("../../../data/booking_centres.csv");

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, RegistryError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Market entry as written in `markets.json`; `marketFactor` is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketRecord {
    id: String,
    label: String,
    region: Region,
    #[serde(rename = "type")]
    kind: MarketKind,
    country: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    regulator: Option<String>,
    #[serde(default)]
    notes: Vec<String>,
    #[serde(default)]
    default_centres: Vec<String>,
    #[serde(default)]
    market_factor: Option<f64>,
}

impl From<MarketRecord> for Market {
    fn from(record: MarketRecord) -> Self {
        Market {
            market_factor: record
                .market_factor
                .unwrap_or_else(|| record.region.default_market_factor()),
            id: record.id.trim().to_string(),
            label: record.label,
            region: record.region,
            kind: record.kind,
            country: record.country,
            city: record.city,
            regulator: record.regulator.unwrap_or_default(),
            notes: record.notes,
            default_centres: record.default_centres,
        }
    }
}

pub(super) fn parse_markets<R: Read>(reader: R) -> Result<Vec<Market>, RegistryError> {
    let records: Vec<MarketRecord> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(Market::from).collect())
}

pub(super) fn parse_centres<R: Read>(reader: R) -> Result<Vec<BookingCentre>, RegistryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut centres = Vec::new();

    for record in csv_reader.deserialize::<BookingCentre>() {
        centres.push(record?);
    }

    Ok(centres)
}
