//! HTTP server for suggestion queries

mod error;
mod http;

pub use error::ApiError;
pub use http::{build_router, AppState, HealthResponse};
