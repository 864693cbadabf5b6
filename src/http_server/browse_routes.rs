//! Browse HTTP Routes
//!
//! Page fetches, counts, cursor sessions and the ad-hoc query box.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use super::extract::BrowseJson;

use crate::browse::{
    BrowseResult, BrowseService, CountRequest, ExecuteRequest, FetchPageRequest, NavigateRequest,
    SessionCreated,
};
use crate::count::CountEstimate;
use crate::envelope::ResultEnvelope;

/// Create browse routes (`/browse/*`)
pub fn browse_routes(service: Arc<BrowseService>) -> Router {
    Router::new()
        .route("/page", post(fetch_page_handler))
        .route("/count", post(count_handler))
        .route("/sessions", post(create_session_handler))
        .route("/sessions/:session_id/navigate", post(navigate_handler))
        .route("/sessions/:session_id", delete(close_session_handler))
        .with_state(service)
}

/// Create query routes (`/query/*`)
pub fn query_routes(service: Arc<BrowseService>) -> Router {
    Router::new()
        .route("/execute", post(execute_handler))
        .with_state(service)
}

async fn fetch_page_handler(
    State(service): State<Arc<BrowseService>>,
    BrowseJson(request): BrowseJson<FetchPageRequest>,
) -> BrowseResult<Json<ResultEnvelope>> {
    service.fetch_page(request).await.map(Json)
}

async fn count_handler(
    State(service): State<Arc<BrowseService>>,
    BrowseJson(request): BrowseJson<CountRequest>,
) -> BrowseResult<Json<CountEstimate>> {
    service.estimate_count(request).await.map(Json)
}

async fn create_session_handler(
    State(service): State<Arc<BrowseService>>,
) -> (StatusCode, Json<SessionCreated>) {
    (StatusCode::CREATED, Json(service.create_session()))
}

async fn navigate_handler(
    State(service): State<Arc<BrowseService>>,
    Path(session_id): Path<String>,
    BrowseJson(request): BrowseJson<NavigateRequest>,
) -> BrowseResult<Json<ResultEnvelope>> {
    service.navigate(&session_id, request).await.map(Json)
}

async fn close_session_handler(
    State(service): State<Arc<BrowseService>>,
    Path(session_id): Path<String>,
) -> BrowseResult<StatusCode> {
    service.close_session(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn execute_handler(
    State(service): State<Arc<BrowseService>>,
    BrowseJson(request): BrowseJson<ExecuteRequest>,
) -> BrowseResult<Json<ResultEnvelope>> {
    service.execute_raw(request).await.map(Json)
}
