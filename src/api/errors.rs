// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vision::{ImageError, InferenceError, RegionError, UnknownLabelError};

/// Body of every failed `/predict` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every way a prediction request can fail
///
/// The `Display` text is the exact message returned to the caller.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No image provided")]
    MissingImage,

    #[error("Image decoding failed: {0}")]
    Decode(#[from] ImageError),

    #[error("Image decoding failed: {0}")]
    InvalidImageField(String),

    #[error("Model inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Model inference failed: {0}")]
    UnknownLabel(#[from] UnknownLabelError),

    #[error("Model inference failed: {0}")]
    Region(#[from] RegionError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PredictError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingImage
            | PredictError::Decode(_)
            | PredictError::InvalidImageField(_) => StatusCode::BAD_REQUEST,
            PredictError::Inference(_)
            | PredictError::UnknownLabel(_)
            | PredictError::Region(_)
            | PredictError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable category, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::MissingImage => "validation_error",
            PredictError::Decode(_) | PredictError::InvalidImageField(_) => "decode_error",
            PredictError::Inference(_) | PredictError::Region(_) => "inference_error",
            PredictError::UnknownLabel(_) => "unknown_label_error",
            PredictError::Unexpected(_) => "unexpected_error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
