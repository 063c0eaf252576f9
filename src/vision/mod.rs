// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for care-label images
//!
//! This module provides:
//! - Image decoding and JPEG data-URI encoding
//! - The care-instruction catalog
//! - Symbol detection (model seam, adapter, YOLO backend)
//! - Region cropping

pub mod catalog;
pub mod detection;
pub mod image_utils;
pub mod region;
pub mod yolo;

pub use catalog::{CatalogLanguage, LabelCatalog, UnknownLabelError, CATALOG_SIZE};
pub use detection::{
    normalize_detections, BoundingBox, Detection, DetectionAdapter, DetectionModel,
    InferenceError, RawDetection,
};
pub use image_utils::{
    decode_base64_image, decode_image_bytes, encode_jpeg_data_uri, ImageError, ImageInfo,
};
pub use region::{crop, RegionError};
pub use yolo::{YoloConfig, YoloOnnxModel};
