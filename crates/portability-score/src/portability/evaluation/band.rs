use serde::{Deserialize, Serialize};

/// Lowest score classified as [`Band::High`].
pub const HIGH_BAND_MIN: u8 = 80;
/// Lowest score classified as [`Band::Moderate`].
pub const MODERATE_BAND_MIN: u8 = 60;

/// Qualitative portability tier, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Moderate,
    High,
}

/// Red/amber/green rendering of a [`Band`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Red,
    Amber,
    Green,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::High => "high",
            Band::Moderate => "moderate",
            Band::Low => "low",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Band::High => "High portability potential - Your book has strong transferability",
            Band::Moderate => "Moderate portability potential - Several factors support a move",
            Band::Low => "Lower portability potential - We can help you plan mitigation steps",
        }
    }

    /// What to do next, given where the book stands.
    pub fn next_step(self) -> &'static str {
        match self {
            Band::High => {
                "You're closer to committee-ready. Next step is to stress-test the business plan assumptions (NNM, ROA, comp)."
            }
            Band::Moderate => {
                "You're in a workable zone. Tighten booking centre / KYC transferability and sanity-check the business plan before outreach."
            }
            Band::Low => {
                "You likely need a mitigation plan (client segmentation, timing, booking centre strategy) before moving."
            }
        }
    }

    pub fn traffic_light(self) -> TrafficLight {
        match self {
            Band::High => TrafficLight::Green,
            Band::Moderate => TrafficLight::Amber,
            Band::Low => TrafficLight::Red,
        }
    }
}

/// Cutoffs separating the three bands. Both bounds are inclusive lower limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandThresholds {
    pub high_min: u8,
    pub moderate_min: u8,
}

impl BandThresholds {
    pub const CANONICAL: BandThresholds = BandThresholds {
        high_min: HIGH_BAND_MIN,
        moderate_min: MODERATE_BAND_MIN,
    };

    pub fn classify(&self, score: u8) -> Band {
        if score >= self.high_min {
            Band::High
        } else if score >= self.moderate_min {
            Band::Moderate
        } else {
            Band::Low
        }
    }

    pub(crate) fn is_ordered(&self) -> bool {
        self.moderate_min < self.high_min && self.high_min <= 100
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Classifies with the canonical 80/60 cutoffs.
pub fn classify(score: u8) -> Band {
    BandThresholds::CANONICAL.classify(score)
}
