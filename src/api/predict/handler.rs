// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handler

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::builder::build_response;
use super::request::PredictRequest;
use super::response::PredictResponse;
use crate::api::errors::PredictError;
use crate::api::server::AppState;
use crate::vision::detection::panic_message;
use crate::vision::{decode_base64_image, DetectionAdapter, LabelCatalog};

/// Runs the decode → detect → build pipeline for one request at a time
///
/// Holds only read-only shared state, so one instance serves every
/// concurrent request.
#[derive(Debug, Clone)]
pub struct PredictionService {
    adapter: DetectionAdapter,
    catalog: Arc<LabelCatalog>,
}

impl PredictionService {
    pub fn new(adapter: DetectionAdapter, catalog: Arc<LabelCatalog>) -> Self {
        Self { adapter, catalog }
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    /// Handle one JSON request body, mapping every outcome to a status and body
    pub async fn handle(&self, body: Value) -> (StatusCode, Value) {
        let request_id = Uuid::new_v4();
        let span = info_span!("predict", %request_id);

        async move {
            let started = Instant::now();

            let outcome = match PredictRequest::from_body(body) {
                Ok(request) => match request.image_payload() {
                    Ok(payload) => self.predict(payload).await,
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };

            let elapsed_ms = started.elapsed().as_millis();
            match outcome {
                Ok(response) => {
                    info!("Prediction complete: {} symbols, {}ms", response.result.len(), elapsed_ms);
                    match serde_json::to_value(&response) {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => failure(PredictError::Unexpected(e.to_string()), elapsed_ms),
                    }
                }
                Err(e) => failure(e, elapsed_ms),
            }
        }
        .instrument(span)
        .await
    }

    /// Decode `payload`, detect care symbols and build the envelope
    pub async fn predict(&self, payload: &str) -> Result<PredictResponse, PredictError> {
        let payload = payload.to_owned();
        let (image, info) = run_blocking(move || decode_base64_image(&payload)).await??;

        debug!(
            "Decoded image: {}x{} {:?}, {} bytes",
            info.width, info.height, info.format, info.size_bytes
        );

        let image = Arc::new(image);
        let detections = self.adapter.infer(Arc::clone(&image)).await?;

        let catalog = Arc::clone(&self.catalog);
        run_blocking(move || build_response(&image, &detections, &catalog)).await?
    }
}

fn failure(err: PredictError, elapsed_ms: u128) -> (StatusCode, Value) {
    warn!("Prediction failed ({}) after {}ms: {}", err.kind(), elapsed_ms, err);
    let body = serde_json::json!({ "error": err.to_string() });
    (err.status_code(), body)
}

/// Run CPU-bound work off the async reactor; a panic becomes an unexpected error
async fn run_blocking<T, F>(work: F) -> Result<T, PredictError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        let detail = if e.is_panic() {
            panic_message(e.into_panic())
        } else {
            e.to_string()
        };
        PredictError::Unexpected(detail)
    })
}

/// POST /predict - Locate and describe care symbols on a label image
///
/// # Request
/// - `image`: Base64-encoded image, with or without a `data:` URI prefix
///
/// # Response
/// - `image`: The submitted image as a JPEG data URI
/// - `result`: `{desc, img}` per detected symbol, in detection order
///
/// # Errors
/// - 400 Bad Request: missing image or image that cannot be decoded
/// - 500 Internal Server Error: inference failure, unknown class id, or any
///   unexpected fault (including a body that is not JSON)
pub async fn predict_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(body)) => {
            let (status, body) = state.service.handle(body).await;
            (status, Json(body)).into_response()
        }
        Err(rejection) => {
            let err = PredictError::Unexpected(rejection.body_text());
            warn!("Rejected prediction request: {}", err);
            err.into_response()
        }
    }
}
