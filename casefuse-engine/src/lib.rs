//! casefuse-engine library interface
//!
//! Multi-source legal-matter pipeline: sources are normalized, scored and
//! tagged, fused into insights, restated by 12 advisor personas and turned
//! into prioritized recommendations. The HTTP surface lives in `api`.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod fusion;
pub mod normalizer;
pub mod personas;
pub mod recommendations;
pub mod scoring;
pub mod types;

pub use crate::engine::MultiSourceDataEngine;
pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Base path of the pipeline routes
pub const API_BASE_PATH: &str = "/api/v1/multi-source";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pipeline, shared read-only by all requests
    pub engine: Arc<MultiSourceDataEngine>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last pipeline failure for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(engine: Arc<MultiSourceDataEngine>) -> Self {
        Self {
            engine,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest(API_BASE_PATH, api::multi_source_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
