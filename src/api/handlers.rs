use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::analysis::{self, AnalysisResult};
use crate::extract;
use crate::AppState;

use super::error::ApiError;
use super::models::{AnalyzeRequest, ErrorResponse, UploadResponse};

pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            file = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = file.ok_or(ApiError::MissingFile)?;
    info!(bytes = bytes.len(), "received upload");

    let upload_dir = state.upload_dir.clone();
    let content =
        tokio::task::spawn_blocking(move || extract::extract_pdf_text(&bytes, &upload_dir))
            .await
            .map_err(|e| ApiError::Internal(format!("extraction task failed: {e}")))??;

    Ok(Json(UploadResponse { content }))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result =
        analysis::analyze_document(&state.model, &payload.text, &payload.user_prompt).await?;
    Ok(Json(result))
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "route not found".to_string(),
        }),
    )
        .into_response()
}
