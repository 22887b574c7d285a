use tracing::trace;

use super::super::domain::ScoringInput;
use super::super::registry::MarketRegistry;

pub const ADD_SECOND_CENTRE: &str =
    "Add a second booking centre to improve portability across jurisdictions.";
pub const LOWER_CONCENTRATION: &str =
    "Lower client concentration reduces transition risk and improves the score.";
pub const ADD_CROSS_BORDER_COVERAGE: &str =
    "Additional cross-border coverage typically unlocks more AUM portability.";
pub const ENABLE_LENDING_ALTERNATIVES: &str =
    "Consider enabling Lending and Alternatives for a more competitive platform.";
pub const NO_OUTBOUND_PERMISSIONS: &str =
    "No outbound permissions - portability limited outside domestic market.";
pub const LIMITED_OUTBOUND_PERMISSIONS: &str =
    "Limited outbound permissions - verify key target jurisdictions.";
pub const STANDARDIZE_KYC: &str =
    "Standardize CRS/FATCA + MiFID/LSFin packs for reuse across custodians.";
pub const DERISK_TOP_CLIENTS: &str =
    "Lower top-3 client concentration below 45% to de-risk portability.";
pub const BROADEN_AUM_MIX: &str = "Broaden AUM mix to reduce perceived platform risk.";
pub const ADD_TIER1_HUB: &str =
    "Add a Tier-1 hub (e.g., London, Luxembourg, Singapore) to widen custodian matches.";

struct RecommendationRule {
    id: &'static str,
    message: &'static str,
    applies: fn(&ScoringInput, &MarketRegistry) -> bool,
}

/// Evaluated in order; every matching rule contributes its message.
const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        id: "second_booking_centre",
        message: ADD_SECOND_CENTRE,
        applies: single_centre,
    },
    RecommendationRule {
        id: "client_concentration",
        message: LOWER_CONCENTRATION,
        applies: concentration_above_minimum,
    },
    RecommendationRule {
        id: "cross_border_coverage",
        message: ADD_CROSS_BORDER_COVERAGE,
        applies: limited_cross_border,
    },
    RecommendationRule {
        id: "product_scope",
        message: ENABLE_LENDING_ALTERNATIVES,
        applies: narrow_product_shelf,
    },
    RecommendationRule {
        id: "no_outbound_permissions",
        message: NO_OUTBOUND_PERMISSIONS,
        applies: no_licences,
    },
    RecommendationRule {
        id: "limited_outbound_permissions",
        message: LIMITED_OUTBOUND_PERMISSIONS,
        applies: single_licence,
    },
    RecommendationRule {
        id: "kyc_packs",
        message: STANDARDIZE_KYC,
        applies: limited_kyc_reuse,
    },
    RecommendationRule {
        id: "top_client_share",
        message: DERISK_TOP_CLIENTS,
        applies: top_heavy_book,
    },
    RecommendationRule {
        id: "aum_mix",
        message: BROADEN_AUM_MIX,
        applies: narrow_aum_mix,
    },
    RecommendationRule {
        id: "tier1_hub",
        message: ADD_TIER1_HUB,
        applies: no_tier1_hub,
    },
];

fn single_centre(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.booking_centres().len() < 2
}

fn concentration_above_minimum(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.client_concentration() > 1
}

fn limited_cross_border(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.cross_border_licenses() < 2
}

fn narrow_product_shelf(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.product_scope() <= 2
}

fn no_licences(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.cross_border_licenses() == 0
}

fn single_licence(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.cross_border_licenses() == 1
}

fn limited_kyc_reuse(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.kyc_portability() < 2
}

fn top_heavy_book(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.client_concentration() > 3
}

fn narrow_aum_mix(input: &ScoringInput, _: &MarketRegistry) -> bool {
    input.aum_mix() <= 2
}

fn no_tier1_hub(input: &ScoringInput, registry: &MarketRegistry) -> bool {
    !input
        .booking_centres()
        .iter()
        .any(|centre| registry.is_tier1(centre))
}

/// Improvement suggestions derived from the raw profile, independent of the score.
pub fn recommend(input: &ScoringInput, registry: &MarketRegistry) -> Vec<String> {
    RULES
        .iter()
        .filter(|rule| (rule.applies)(input, registry))
        .map(|rule| {
            trace!(rule = rule.id, market_id = input.market_id(), "recommendation triggered");
            rule.message.to_string()
        })
        .collect()
}
