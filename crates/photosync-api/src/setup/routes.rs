//! Route configuration and setup

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::constants::{API_PREFIX, MAX_CONCURRENT_REQUESTS, MAX_WEBHOOK_BODY_BYTES};
use crate::handlers;
use crate::state::AppState;

pub fn setup_routes(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/webhook", post(handlers::webhook::receive_update))
        .route("/health", get(handlers::health::health_check))
        .route("/stats", get(handlers::stats::storage_stats));

    Router::new()
        .route("/", get(handlers::root::index))
        .nest(API_PREFIX, api)
        .layer(RequestBodyLimitLayer::new(MAX_WEBHOOK_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
