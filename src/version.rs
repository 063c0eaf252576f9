// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the care-label node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-care-label-yolo-2025-10-13";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-13";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "care-label-detection",
    "yolo-onnx",
    "symbol-cropping",
    "korean-catalog",
    "english-catalog",
    "jpeg-data-uri",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Care Label Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
