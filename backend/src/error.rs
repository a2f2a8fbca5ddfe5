use std::path::PathBuf;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ErrorDetail, FieldError};

/// Reasons a model artifact could not be turned into a usable model.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot access model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not valid: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown artifact format `{0}`")]
    UnknownFormat(String),
    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("inconsistent model shape: {0}")]
    Shape(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("expected {expected} features, got {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("model produced no prediction")]
    Empty,
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Not Found")]
    NotFound,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            ApiError::Validation(errors) => response.json(ErrorDetail { detail: errors }),
            other => response.json(ErrorDetail {
                detail: other.to_string(),
            }),
        }
    }
}

/// Maps body decoding and content-type failures to 422 so they read like
/// field validation failures. Size problems keep actix-web's own status.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(e) => {
            ApiError::Validation(vec![FieldError::invalid_body(e.to_string())]).into()
        }
        JsonPayloadError::ContentType => ApiError::Validation(vec![FieldError::invalid_body(
            "Content-Type must be application/json",
        )])
        .into(),
        other => other.into(),
    }
}
