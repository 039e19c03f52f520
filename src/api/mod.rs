mod error;
mod handlers;
mod models;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub use error::ApiError;
pub use handlers::{analyze, not_found, upload};
pub use models::{AnalyzeRequest, ErrorResponse, UploadResponse};

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(upload))
        .route("/analyze", post(analyze))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
