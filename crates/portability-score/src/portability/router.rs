use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::benchmark::BenchmarkSource;
use super::intake::{AnalyzeRequest, QuickEstimateRequest};
use super::registry::Market;
use super::service::{AnalysisError, PortabilityService};
use crate::error::AppError;

/// Router builder exposing the scoring and reference-data endpoints.
pub fn portability_router<B>(service: Arc<PortabilityService<B>>) -> Router
where
    B: BenchmarkSource + 'static,
{
    Router::new()
        .route("/api/portability/analyze", post(analyze_handler::<B>))
        .route(
            "/api/portability/quick-estimate",
            post(quick_estimate_handler::<B>),
        )
        .route("/api/portability/markets", get(markets_handler::<B>))
        .route(
            "/api/portability/markets/:market_id",
            get(market_handler::<B>),
        )
        .route(
            "/api/portability/booking-centres",
            get(booking_centres_handler::<B>),
        )
        .with_state(service)
}

fn rejection(error: AnalysisError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "field": error.field(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

/// Bodies the extractor could not decode keep the `{error, field}` shape.
fn malformed_body(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
        "field": null,
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

pub(crate) async fn analyze_handler<B>(
    State(service): State<Arc<PortabilityService<B>>>,
    body: Result<axum::Json<AnalyzeRequest>, JsonRejection>,
) -> Response
where
    B: BenchmarkSource + 'static,
{
    let request = match body {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return malformed_body(rejection),
    };
    match service.analyze(&request) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => rejection(error),
    }
}

pub(crate) async fn quick_estimate_handler<B>(
    State(service): State<Arc<PortabilityService<B>>>,
    body: Result<axum::Json<QuickEstimateRequest>, JsonRejection>,
) -> Response
where
    B: BenchmarkSource + 'static,
{
    let request = match body {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return malformed_body(rejection),
    };
    match service.quick_estimate(&request) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => rejection(error),
    }
}

pub(crate) async fn markets_handler<B>(
    State(service): State<Arc<PortabilityService<B>>>,
) -> Response
where
    B: BenchmarkSource + 'static,
{
    let groups = service.engine().registry().markets_by_region();
    (StatusCode::OK, axum::Json(groups)).into_response()
}

pub(crate) async fn market_handler<B>(
    State(service): State<Arc<PortabilityService<B>>>,
    Path(market_id): Path<String>,
) -> Result<axum::Json<Market>, AppError>
where
    B: BenchmarkSource + 'static,
{
    service
        .engine()
        .registry()
        .market(&market_id)
        .cloned()
        .map(axum::Json)
        .ok_or_else(|| AppError::NotFound(format!("Unknown market '{market_id}'.")))
}

pub(crate) async fn booking_centres_handler<B>(
    State(service): State<Arc<PortabilityService<B>>>,
) -> Response
where
    B: BenchmarkSource + 'static,
{
    let registry = service.engine().registry();
    (StatusCode::OK, axum::Json(registry.booking_centres())).into_response()
}
