// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for API tests

use anyhow::anyhow;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use care_label_node::{
    api::{create_app, AppState, PredictionService},
    vision::{
        encode_jpeg_data_uri, CatalogLanguage, DetectionAdapter, DetectionModel, LabelCatalog,
        RawDetection,
    },
};
use image::{Rgb, RgbImage};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub const TEST_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Model double with a scripted outcome and a call counter
pub struct ScriptedModel {
    outcome: Result<Vec<RawDetection>, String>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn returning(detections: Vec<RawDetection>) -> Self {
        Self {
            outcome: Ok(detections),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl DetectionModel for ScriptedModel {
    fn predict(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.outcome.clone().map_err(|e| anyhow!(e))
    }
}

pub fn service_for(model: Arc<ScriptedModel>, timeout: Option<Duration>) -> PredictionService {
    PredictionService::new(
        DetectionAdapter::new(model).with_timeout(timeout),
        Arc::new(LabelCatalog::new(CatalogLanguage::English)),
    )
}

pub fn app_for(model: Arc<ScriptedModel>) -> Router {
    create_app(AppState::new(service_for(model, None)), TEST_BODY_LIMIT)
}

pub fn app_returning(detections: Vec<RawDetection>) -> Router {
    app_for(Arc::new(ScriptedModel::returning(detections)))
}

/// A 200x120 label with a gradient background
pub fn label_image() -> RgbImage {
    RgbImage::from_fn(200, 120, |x, y| Rgb([x as u8, (y * 2) as u8, 128]))
}

pub fn label_payload() -> String {
    encode_jpeg_data_uri(&label_image()).expect("encode test image")
}

pub fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("build request")
}

/// Send `request` through `app` and return status plus JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, body)
}
