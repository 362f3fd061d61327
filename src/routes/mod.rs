//! Route modules for PDF Shelf Server

pub mod health;
pub mod pdfs;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let max_file_size = state.config().upload.max_file_size;

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/health", health::router())
        .nest("/api/v1/health", health::router())
        .nest("/api/v1/pdfs", pdfs::router(max_file_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
