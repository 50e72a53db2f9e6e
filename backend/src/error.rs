use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use shared::ErrorResponse;
use thiserror::Error;

use crate::upload::MAX_UPLOAD_BYTES;

/// Every way the inference pipeline and its delivery surfaces can fail.
///
/// The API surface maps these onto HTTP statuses through [`ResponseError`];
/// the GUI and CLI render the display strings directly.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    NotFound(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("upload exceeds the {} byte limit", MAX_UPLOAD_BYTES)]
    UploadTooLarge,

    #[error("model is not loaded")]
    ModelUnavailable,

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("label catalog lists {labels} classes but the model emits {outputs}")]
    ConfigurationMismatch { labels: usize, outputs: usize },
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::NotFound(_)
            | PipelineError::UnsupportedFormat(_)
            | PipelineError::UploadTooLarge => StatusCode::BAD_REQUEST,
            PipelineError::ModelUnavailable
            | PipelineError::Inference(_)
            | PipelineError::ConfigurationMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
