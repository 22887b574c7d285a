use super::super::domain::{Factor, FactorGrades};
use super::config::ScoringWeights;
use super::normalize::{clamp01, normalize_grade};
use super::ScoreComponent;

/// Weighted contribution of every factor plus the raw sum in `[0, 1]`.
///
/// `centre_factor` is the booking-centre average (or the market factor in quick mode);
/// it is only clamped, never range-normalized.
pub(crate) fn score_components(
    grades: &FactorGrades,
    centre_factor: f64,
    weights: &ScoringWeights,
) -> (Vec<ScoreComponent>, f64) {
    let mut components = Vec::with_capacity(6);

    let centre = clamp01(centre_factor);
    components.push(component(Factor::BookingCentres, centre_factor, centre, weights));

    for factor in Factor::GRADED {
        let Some(raw) = grades.get(factor) else {
            continue;
        };
        let normalized = normalize_grade(factor, raw);
        components.push(component(factor, f64::from(raw), normalized, weights));
    }

    components.sort_by_key(|component| component.factor);
    let raw = components.iter().map(|component| component.contribution).sum();
    (components, clamp01(raw))
}

fn component(factor: Factor, raw: f64, normalized: f64, weights: &ScoringWeights) -> ScoreComponent {
    let weight = weights.weight(factor);
    ScoreComponent {
        factor,
        raw,
        normalized,
        weight,
        contribution: weight * normalized,
    }
}

/// Converts a raw sum to the 0–100 integer score.
pub(crate) fn to_score(raw: f64) -> u8 {
    (clamp01(raw) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_follow_factor_order() {
        let grades = FactorGrades {
            aum_mix: 3,
            cross_border_licenses: 1,
            product_scope: 2,
            client_concentration: 3,
            kyc_portability: 1,
        };
        let (components, raw) = score_components(&grades, 0.965, &ScoringWeights::CANONICAL);

        let factors: Vec<_> = components.iter().map(|c| c.factor).collect();
        assert_eq!(
            factors,
            [
                Factor::AumMix,
                Factor::BookingCentres,
                Factor::CrossBorderLicenses,
                Factor::ProductScope,
                Factor::ClientConcentration,
                Factor::KycPortability,
            ]
        );
        assert!((raw - 0.518).abs() < 1e-9);
        assert_eq!(to_score(raw), 52);
    }

    #[test]
    fn score_rounds_half_up_and_stays_bounded() {
        assert_eq!(to_score(0.525), 53);
        assert_eq!(to_score(1.0000000000000002), 100);
        assert_eq!(to_score(-0.1), 0);
    }
}
