// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Care-symbol detection
//!
//! `DetectionModel` is the seam to the pretrained detector. `DetectionAdapter`
//! calls it once per image and turns whatever it reports into validated
//! `Detection`s, keeping the model's count and order untouched.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Axis-aligned box in pixel coordinates of the decoded image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// All coordinates finite and `x1 < x2`, `y1 < y2`
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 < self.x2
            && self.y1 < self.y2
    }
}

/// One finding as reported by a model backend, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetection {
    /// `[x1, y1, x2, y2]`
    pub bbox: Option<[f32; 4]>,
    /// Class index; detection heads emit it as a float
    pub class: Option<f32>,
    pub confidence: Option<f32>,
}

impl RawDetection {
    pub fn new(class: f32, bbox: [f32; 4], confidence: f32) -> Self {
        Self {
            bbox: Some(bbox),
            class: Some(class),
            confidence: Some(confidence),
        }
    }
}

/// A validated detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub class_id: u32,
    pub bbox: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Errors raised while running the detector
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{0:#}")]
    Model(anyhow::Error),

    #[error("detection {index} is malformed: {reason}")]
    MalformedDetection { index: usize, reason: String },

    #[error("inference did not finish within {0:?}")]
    Timeout(Duration),

    #[error("model panicked: {0}")]
    Panicked(String),
}

/// A pretrained care-symbol detector
///
/// Implementations must be safe to share between concurrent requests.
#[cfg_attr(test, automock)]
pub trait DetectionModel: Send + Sync {
    /// Run the detector on one RGB image
    fn predict(&self, image: &RgbImage) -> anyhow::Result<Vec<RawDetection>>;
}

/// Invokes a `DetectionModel` and normalizes its output
#[derive(Clone)]
pub struct DetectionAdapter {
    model: Arc<dyn DetectionModel>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for DetectionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionAdapter")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DetectionAdapter {
    pub fn new(model: Arc<dyn DetectionModel>) -> Self {
        Self { model, timeout: None }
    }

    /// Abort a request's inference once `timeout` elapses
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the model once on `image` and return its detections in model order
    pub async fn infer(&self, image: Arc<RgbImage>) -> Result<Vec<Detection>, InferenceError> {
        let model = Arc::clone(&self.model);
        let task = tokio::task::spawn_blocking(move || model.predict(&image));

        // On timeout the blocking call is detached, not interrupted; only this
        // request gives up on it.
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                warn!("Inference exceeded {:?}", limit);
                InferenceError::Timeout(limit)
            })?,
            None => task.await,
        };

        let raw = joined
            .map_err(|e| InferenceError::Panicked(join_error_message(e)))?
            .map_err(InferenceError::Model)?;

        debug!("Model reported {} raw detections", raw.len());
        normalize_detections(raw)
    }
}

/// Validate raw detections, preserving count and order
pub fn normalize_detections(raw: Vec<RawDetection>) -> Result<Vec<Detection>, InferenceError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, det)| normalize_one(index, det))
        .collect()
}

fn normalize_one(index: usize, raw: RawDetection) -> Result<Detection, InferenceError> {
    let malformed = |reason: String| InferenceError::MalformedDetection { index, reason };

    let [x1, y1, x2, y2] = raw.bbox.ok_or_else(|| malformed("missing bounding box".to_string()))?;
    if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
        return Err(malformed(format!(
            "non-finite bounding box [{}, {}, {}, {}]",
            x1, y1, x2, y2
        )));
    }

    let class = raw.class.ok_or_else(|| malformed("missing class id".to_string()))?;
    if !class.is_finite() || class < 0.0 || class.fract() != 0.0 || class > u32::MAX as f32 {
        return Err(malformed(format!("invalid class id {}", class)));
    }

    Ok(Detection {
        class_id: class as u32,
        bbox: BoundingBox { x1, y1, x2, y2 },
        confidence: raw.confidence,
    })
}

fn join_error_message(err: tokio::task::JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
