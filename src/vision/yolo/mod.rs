// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO detector backend for care-label symbols
//!
//! Components:
//! - `preprocessing` - Letterbox resize and tensor conversion
//! - `postprocessing` - Output head decoding and NMS
//! - `model` - ONNX Runtime session wrapper implementing `DetectionModel`

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::{YoloConfig, YoloOnnxModel};
pub use postprocessing::{OutputLayout, PostprocessParams};
pub use preprocessing::{LetterboxInfo, YOLO_INPUT_SIZE};
