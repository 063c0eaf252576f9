// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Care-label prediction endpoint module
//!
//! Provides POST /predict for locating and describing care symbols.

pub mod builder;
pub mod handler;
pub mod request;
pub mod response;

pub use builder::build_response;
pub use handler::{predict_handler, PredictionService};
pub use request::PredictRequest;
pub use response::{PredictResponse, ResultItem};
