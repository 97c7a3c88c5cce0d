use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, borrow, history, logout, return_item};

/// Creates the API router with all loan endpoints
///
/// Command endpoints (Write operations):
/// - POST /api/loan/borrow - Borrow an item
/// - POST /api/loan/return - Return a loan
/// - POST /api/auth/logout - Revoke the caller's token
///
/// Query endpoints (Read operations):
/// - GET /api/loan/history/:user_id - Loan history of a user
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints (Write operations)
        .route("/api/loan/borrow", post(borrow))
        .route("/api/loan/return", post(return_item))
        .route("/api/auth/logout", post(logout))
        // Query endpoints (Read operations)
        .route("/api/loan/history/:user_id", get(history))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
