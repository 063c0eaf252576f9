// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO care-symbol detector running on ONNX Runtime
//!
//! Loads a YOLO ONNX export and implements `DetectionModel` for it: letterbox
//! preprocessing, a single session run, and decoding of the output head.

use anyhow::{Context, Result};
use image::RgbImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::postprocessing::{decode_output, PostprocessParams};
use super::preprocessing::{preprocess_for_detection, YOLO_INPUT_SIZE};
use crate::vision::detection::{DetectionModel, RawDetection};

/// Settings for loading a YOLO detector
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX export
    pub model_path: PathBuf,
    /// Square input size the model was exported with
    pub input_size: u32,
    /// Output decoding thresholds
    pub params: PostprocessParams,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/care-label-yolo.onnx"),
            input_size: YOLO_INPUT_SIZE,
            params: PostprocessParams::default(),
            intra_threads: 4,
        }
    }
}

/// YOLO detector backed by an ONNX Runtime session (CPU)
#[derive(Clone)]
pub struct YoloOnnxModel {
    /// ONNX Runtime session; `run` needs exclusive access
    session: Arc<Mutex<Session>>,
    input_name: String,
    input_size: u32,
    params: PostprocessParams,
}

impl std::fmt::Debug for YoloOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxModel")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloOnnxModel {
    /// Load the detector described by `config`
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new(config: &YoloConfig) -> Result<Self> {
        let model_path: &Path = config.model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading care-label detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(output) = session.outputs.first() {
            debug!("Detection model output {}: {:?}", output.name, output.output_type);
        }

        info!(
            "✅ Detection model loaded (input: {}, {}px, conf {:.2}, iou {:.2})",
            input_name, config.input_size, config.params.confidence_threshold, config.params.iou_threshold
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size: config.input_size,
            params: config.params,
        })
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn params(&self) -> &PostprocessParams {
        &self.params
    }
}

impl DetectionModel for YoloOnnxModel {
    fn predict(&self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        let started = Instant::now();
        let (input, letterbox) = preprocess_for_detection(image, self.input_size);

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        // The session lock is released before decoding
        let output_tensor = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

            let outputs = session
                .run(ort::inputs![self.input_name.as_str() => input_value])
                .context("Detection inference failed")?;

            outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?
                .to_owned()
        };

        debug!("Detection output shape: {:?}", output_tensor.shape());

        let detections = decode_output(output_tensor.view(), &letterbox, &self.params)?;

        debug!(
            "Detected {} care symbols in {}ms",
            detections.len(),
            started.elapsed().as_millis()
        );

        Ok(detections)
    }
}
