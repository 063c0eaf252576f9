// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod predict;
pub mod server;

pub use errors::{ErrorResponse, PredictError};
pub use predict::{predict_handler, PredictRequest, PredictResponse, PredictionService, ResultItem};
pub use server::{create_app, ApiConfig, ApiServer, AppState};
