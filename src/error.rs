use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::compress::CompressionError;
use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::extract::ExtractionError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Storage is not configured: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Upload failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Image {index}: {source}")]
    BadImage { index: usize, source: DecodeError },
    #[error(transparent)]
    Compression(#[from] CompressionError),
    #[error("Image processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Config(_) | ApiError::Compression(_) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Extraction(ExtractionError::InvalidUrl(_)) | ApiError::BadImage { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Extraction(ExtractionError::Request(_)) | ApiError::Storage(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Extraction(ExtractionError::Request(msg)) => {
                format!("Upstream request failed: {}", msg)
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %detail, "request failed");
        } else {
            tracing::warn!(status = %status, error = %detail, "request rejected");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
