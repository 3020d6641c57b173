//! HTTP routes for the names search service
//!
//! `GET /v1/<prefix>` answers with a JSON array of up to 11 names and a
//! `Cache-Control` header. The prefix is everything after `/v1/`, slashes
//! included, so scoped names like `@babel/co` work as-is. `/v1/` itself is
//! an empty prefix, which like any unknown prefix answers `[]`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::query::PrefixQueryService;
use crate::refresh::{BuildReport, IndexStatus};
use crate::server::error::ApiError;

// Application state
#[derive(Clone)]
pub struct AppState {
    pub query: Arc<PrefixQueryService>,
    pub status: IndexStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub last_build: Option<BuildReport>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/", get(suggest_empty))
        .route("/v1/*prefix", get(suggest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        last_build: state.status.last_build().await,
    })
}

async fn suggest(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Response, ApiError> {
    suggestions_response(&state, &prefix).await
}

// The wildcard never matches an empty tail
async fn suggest_empty(State(state): State<AppState>) -> Result<Response, ApiError> {
    suggestions_response(&state, "").await
}

async fn suggestions_response(state: &AppState, prefix: &str) -> Result<Response, ApiError> {
    let suggestions = state.query.query(prefix).await?;
    let body = serde_json::to_vec(&suggestions.names)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CACHE_CONTROL, suggestions.cache_control()),
        ],
        body,
    )
        .into_response())
}
