pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::layout::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout", post(handlers::handle_layout))
        .route(
            "/api/v1/layout/geometry",
            get(handlers::handle_get_geometry),
        )
        .fallback(not_found)
        .with_state(state)
}
