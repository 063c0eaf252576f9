// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};

/// One detected care symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultItem {
    /// Care instruction for the symbol
    pub desc: String,
    /// Cropped symbol as a JPEG data URI
    pub img: String,
}

/// Response from care-label prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    /// The submitted image, re-encoded as a JPEG data URI
    pub image: String,
    /// One item per detection, in detection order
    pub result: Vec<ResultItem>,
}
