use super::common::*;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::portability::benchmark::StaticBenchmarks;
use crate::portability::evaluation::Band;
use crate::portability::intake::AnalyzeRequest;
use crate::portability::portability_router;

#[tokio::test]
async fn analyze_route_returns_score_and_benchmark() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(post_json(
            "/api/portability/analyze",
            &json!({
                "marketId": "uae_dubai",
                "bookingCentres": ["Dubai (DIFC)", "Geneva"],
                "aumMix": 3,
                "crossBorderLicenses": 1,
                "productScope": 2,
                "clientConcentration": 3,
                "kycPortability": 1
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"], 52);
    assert_eq!(payload["band"], "low");
    assert_eq!(payload["benchmark"]["median"], 73);
    assert_eq!(payload["benchmark"]["topQuartile"], 86);
    assert_eq!(payload["position"], "below_median");
    assert_eq!(
        payload["recommendations"].as_array().map(Vec::len),
        Some(5)
    );
    assert_eq!(payload["nextStep"], Band::Low.next_step());
}

#[tokio::test]
async fn analyze_route_rejects_empty_centres_with_unprocessable() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(post_json(
            "/api/portability/analyze",
            &json!({
                "marketId": "uae_dubai",
                "bookingCentres": [],
                "aumMix": 3,
                "crossBorderLicenses": 1,
                "productScope": 2,
                "clientConcentration": 3,
                "kycPortability": 1
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Select at least one booking centre.");
    assert_eq!(payload["field"], "bookingCentres");
}

#[tokio::test]
async fn null_centre_list_gets_the_selection_message() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(post_json(
            "/api/portability/analyze",
            &json!({
                "marketId": "uae_dubai",
                "bookingCentres": null,
                "aumMix": 3,
                "crossBorderLicenses": 1,
                "productScope": 2,
                "clientConcentration": 3,
                "kycPortability": 1
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Select at least one booking centre.");
    assert_eq!(payload["field"], "bookingCentres");
}

#[tokio::test]
async fn wrongly_typed_factor_is_rejected_by_field() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(post_json(
            "/api/portability/analyze",
            &json!({
                "marketId": "uae_dubai",
                "bookingCentres": ["Dubai (DIFC)"],
                "aumMix": true,
                "crossBorderLicenses": 1,
                "productScope": 2,
                "clientConcentration": 3,
                "kycPortability": 1
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Field 'aumMix' must be a number, got 'true'.");
    assert_eq!(payload["field"], "aumMix");
}

#[tokio::test]
async fn undecodable_body_still_answers_in_json() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(
            Request::post("/api/portability/quick-estimate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{\"marketId\": "))
                .expect("valid request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().is_some_and(|error| !error.is_empty()));
    assert!(payload["field"].is_null());
}

#[tokio::test]
async fn analyze_handler_reports_unknown_market() {
    let service = Arc::new(build_service());
    let request = AnalyzeRequest {
        market_id: Some("atlantis".to_string()),
        ..analyze_request()
    };

    let response = crate::portability::router::analyze_handler::<StaticBenchmarks>(
        State(service),
        Ok(axum::Json(request)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Unknown market 'atlantis'.");
    assert_eq!(payload["field"], "marketId");
}

#[tokio::test]
async fn quick_estimate_route_returns_market_factor() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(post_json(
            "/api/portability/quick-estimate",
            &serde_json::to_value(quick_estimate_request()).expect("serializable"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"], 88);
    assert_eq!(payload["marketFactor"], 0.9);
}

#[tokio::test]
async fn markets_route_groups_by_region() {
    let router = portability_router(Arc::new(service_without_benchmarks()));

    let response = router
        .oneshot(get("/api/portability/markets"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let groups = payload.as_array().expect("array of regions");
    assert_eq!(groups[0]["region"], "CH");
    assert_eq!(groups[0]["markets"][0]["id"], "ch_geneva");
    let total: usize = groups
        .iter()
        .filter_map(|group| group["markets"].as_array())
        .map(Vec::len)
        .sum();
    assert_eq!(total, 40);
}

#[tokio::test]
async fn market_handler_returns_not_found_for_unknown_ids() {
    let service = Arc::new(build_service());

    let found = crate::portability::router::market_handler::<StaticBenchmarks>(
        State(service.clone()),
        Path("uk_london".to_string()),
    )
    .await
    .into_response();
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["regulator"], "FCA");
    assert_eq!(payload["type"], "city");

    let missing = crate::portability::router::market_handler::<StaticBenchmarks>(
        State(service),
        Path("atlantis".to_string()),
    )
    .await
    .into_response();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(missing).await;
    assert_eq!(payload["error"], "Unknown market 'atlantis'.");
}

#[tokio::test]
async fn booking_centres_route_lists_multipliers() {
    let router = portability_router(Arc::new(build_service()));

    let response = router
        .oneshot(get("/api/portability/booking-centres"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let centres = payload.as_array().expect("array of centres");
    assert_eq!(centres.len(), 16);
    assert_eq!(centres[0]["name"], "Geneva");
    assert_eq!(centres[0]["multiplier"], 1.0);
    assert_eq!(centres[0]["tier1"], true);
}
