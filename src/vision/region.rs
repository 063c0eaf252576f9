// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cropping detected symbol regions out of a decoded label image

use image::{imageops, RgbImage};
use thiserror::Error;

use super::detection::BoundingBox;

/// A detection box that leaves nothing to crop
#[derive(Debug, Clone, PartialEq, Error)]
#[error("bounding box ({x1:.1}, {y1:.1}, {x2:.1}, {y2:.1}) has no area inside the {width}x{height} image")]
pub struct RegionError {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub width: u32,
    pub height: u32,
}

/// Pixel rectangle after rounding and clamping to the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Round `bbox` to whole pixels and clamp it to a `width` x `height` image
///
/// Each coordinate is rounded to the nearest pixel edge before clamping, so an
/// in-bounds box `(x1, y1, x2, y2)` yields `round(x2) - round(x1)` columns.
pub fn clamp_to_image(bbox: &BoundingBox, width: u32, height: u32) -> Result<PixelRect, RegionError> {
    let snap = |v: f32, max: u32| -> u32 {
        if v.is_nan() {
            0
        } else {
            v.round().clamp(0.0, max as f32) as u32
        }
    };

    let left = snap(bbox.x1, width);
    let top = snap(bbox.y1, height);
    let right = snap(bbox.x2, width);
    let bottom = snap(bbox.y2, height);

    if right <= left || bottom <= top {
        return Err(RegionError {
            x1: bbox.x1,
            y1: bbox.y1,
            x2: bbox.x2,
            y2: bbox.y2,
            width,
            height,
        });
    }

    Ok(PixelRect {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

/// Copy the region described by `bbox` out of `image`
pub fn crop(image: &RgbImage, bbox: &BoundingBox) -> Result<RgbImage, RegionError> {
    let rect = clamp_to_image(bbox, image.width(), image.height())?;
    Ok(imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}
