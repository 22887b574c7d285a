use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::portability::benchmark::{NoBenchmarks, StaticBenchmarks};
use crate::portability::domain::{FactorGrades, ScoringInput};
use crate::portability::evaluation::PortabilityEngine;
use crate::portability::intake::{AnalyzeRequest, QuickEstimateRequest, RawValue};
use crate::portability::registry::{BookingCentre, Market, MarketKind, MarketRegistry, Region};
use crate::portability::service::PortabilityService;

pub(super) fn registry() -> Arc<MarketRegistry> {
    Arc::new(MarketRegistry::embedded().expect("embedded registry is valid"))
}

pub(super) fn engine() -> PortabilityEngine {
    PortabilityEngine::canonical(registry())
}

pub(super) fn centre(name: &str, multiplier: f64, tier1: bool) -> BookingCentre {
    BookingCentre {
        name: name.to_string(),
        multiplier,
        tier1,
    }
}

pub(super) fn market(id: &str, region: Region, default_centres: &[&str]) -> Market {
    Market {
        id: id.to_string(),
        label: id.to_uppercase(),
        region,
        kind: MarketKind::Country,
        country: "Testland".to_string(),
        city: None,
        regulator: "TFSA".to_string(),
        notes: vec!["Fixture market".to_string()],
        default_centres: default_centres.iter().map(|name| name.to_string()).collect(),
        market_factor: region.default_market_factor(),
    }
}

/// Two-market registry whose centre averages are easy to reason about.
pub(super) fn fixture_registry() -> MarketRegistry {
    MarketRegistry::new(
        vec![
            market("alpha", Region::Eu, &["Alpha Hub", "Beta Hub"]),
            market("omega", Region::Ch, &["Alpha Hub"]),
        ],
        vec![
            centre("Alpha Hub", 1.0, true),
            centre("Beta Hub", 0.9, false),
        ],
    )
    .expect("fixture registry is valid")
}

pub(super) fn fixture_engine() -> PortabilityEngine {
    PortabilityEngine::canonical(Arc::new(fixture_registry()))
}

pub(super) fn grades(
    aum_mix: u8,
    cross_border_licenses: u8,
    product_scope: u8,
    client_concentration: u8,
    kyc_portability: u8,
) -> FactorGrades {
    FactorGrades {
        aum_mix,
        cross_border_licenses,
        product_scope,
        client_concentration,
        kyc_portability,
    }
}

pub(super) fn dubai_centres() -> Vec<&'static str> {
    vec!["Dubai (DIFC)", "Geneva"]
}

/// Mid-range Dubai banker: three graded factors sit near the bottom of their scale.
pub(super) fn baseline_input() -> ScoringInput {
    ScoringInput::new("uae_dubai", dubai_centres(), grades(3, 1, 2, 3, 1)).expect("valid input")
}

/// Same banker after broadening licences, products and KYC reuse.
pub(super) fn improved_input() -> ScoringInput {
    ScoringInput::new("uae_dubai", dubai_centres(), grades(3, 3, 4, 1, 3)).expect("valid input")
}

pub(super) fn analyze_request() -> AnalyzeRequest {
    AnalyzeRequest {
        market_id: Some("uae_dubai".to_string()),
        booking_centres: Some(dubai_centres().into_iter().map(String::from).collect()),
        aum_mix: Some(RawValue::from(3)),
        cross_border_licenses: Some(RawValue::from(1)),
        product_scope: Some(RawValue::from(2)),
        client_concentration: Some(RawValue::from(3)),
        kyc_portability: Some(RawValue::from(1)),
    }
}

pub(super) fn quick_estimate_request() -> QuickEstimateRequest {
    QuickEstimateRequest {
        market_id: Some("uae_dubai".to_string()),
        aum_mix: Some(RawValue::from(3)),
        cross_border_licenses: Some(RawValue::from(3)),
        product_scope: Some(RawValue::from(4)),
        client_concentration: Some(RawValue::from(1)),
        kyc_portability: Some(RawValue::from(3)),
    }
}

pub(super) fn build_service() -> PortabilityService<StaticBenchmarks> {
    PortabilityService::new(
        Arc::new(engine()),
        Arc::new(StaticBenchmarks::embedded().expect("embedded benchmarks are valid")),
    )
}

pub(super) fn service_without_benchmarks() -> PortabilityService<NoBenchmarks> {
    PortabilityService::new(Arc::new(engine()), Arc::new(NoBenchmarks))
}

pub(super) fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serializable")))
        .expect("valid request")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
