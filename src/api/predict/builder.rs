// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Assembling the prediction envelope from detections

use image::RgbImage;
use tracing::debug;

use super::response::{PredictResponse, ResultItem};
use crate::api::errors::PredictError;
use crate::vision::{crop, encode_jpeg_data_uri, Detection, LabelCatalog};

/// Build the response for `detections` found in `image`
///
/// Produces exactly one `ResultItem` per detection, in the same order. The
/// first failure aborts the whole build; no partial envelope is returned.
pub fn build_response(
    image: &RgbImage,
    detections: &[Detection],
    catalog: &LabelCatalog,
) -> Result<PredictResponse, PredictError> {
    let mut result = Vec::with_capacity(detections.len());

    for detection in detections {
        let desc = catalog.describe(detection.class_id)?;
        let region = crop(image, &detection.bbox)?;
        let img = encode_jpeg_data_uri(&region).map_err(|e| PredictError::Unexpected(e.to_string()))?;

        debug!(
            "class {} -> {}x{} crop: {}",
            detection.class_id,
            region.width(),
            region.height(),
            desc
        );

        result.push(ResultItem {
            desc: desc.to_string(),
            img,
        });
    }

    let original = encode_jpeg_data_uri(image).map_err(|e| PredictError::Unexpected(e.to_string()))?;

    Ok(PredictResponse {
        image: original,
        result,
    })
}
