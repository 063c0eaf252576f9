// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{ApiConfig, ApiServer, AppState, PredictError, PredictResponse, PredictionService};
pub use config::ServiceConfig;
pub use vision::{
    CatalogLanguage, Detection, DetectionAdapter, DetectionModel, LabelCatalog, RawDetection,
    YoloConfig, YoloOnnxModel,
};
