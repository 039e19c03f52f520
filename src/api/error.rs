use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::extract::ExtractError;
use crate::gemini::GeminiError;

use super::models::ErrorResponse;

/// Request failures. Callers only see the generic message for each variant;
/// the underlying detail is logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("upload has no \"file\" field")]
    MissingFile,
    #[error("invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Model(#[from] GeminiError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingFile => (
                StatusCode::BAD_REQUEST,
                "expected a multipart field named \"file\"",
            ),
            Self::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                (StatusCode::PAYLOAD_TOO_LARGE, "uploaded file is too large")
            }
            Self::Multipart(e) => (e.status(), "malformed multipart upload"),
            Self::Extract(ExtractError::InvalidPdf(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "uploaded file is not a readable PDF",
            ),
            Self::Extract(ExtractError::Io(_)) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            Self::Model(_) => (StatusCode::BAD_GATEWAY, "analysis service request failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        error!(status = %status, error = %self, "request failed");

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
