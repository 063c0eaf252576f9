// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLO detection models

use image::{imageops, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size of YOLO exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Padding color used by the training pipeline's letterbox
pub const LETTERBOX_FILL: u8 = 114;

/// Scale and padding applied by `letterbox`
///
/// Needed to map detector boxes back to original image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Scale factor applied to the original image
    pub scale: f32,
    /// Left padding in model input pixels
    pub pad_x: f32,
    /// Top padding in model input pixels
    pub pad_y: f32,
    pub original_width: u32,
    pub original_height: u32,
}

impl LetterboxInfo {
    /// Compute the letterbox geometry for a `width` x `height` image
    pub fn new(width: u32, height: u32, target_size: u32) -> Self {
        if width == 0 || height == 0 {
            return Self {
                scale: 1.0,
                pad_x: 0.0,
                pad_y: 0.0,
                original_width: width,
                original_height: height,
            };
        }

        let scale = (target_size as f32 / width as f32).min(target_size as f32 / height as f32);
        let (new_w, new_h) = scaled_size(width, height, scale);

        Self {
            scale,
            pad_x: ((target_size - new_w) / 2) as f32,
            pad_y: ((target_size - new_h) / 2) as f32,
            original_width: width,
            original_height: height,
        }
    }

    /// Map a point from model input space back to the original image
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }

    /// Map an `[x1, y1, x2, y2]` box back and clip it to the original image
    pub fn map_box_to_original(&self, bbox: [f32; 4]) -> [f32; 4] {
        let (x1, y1) = self.map_to_original(bbox[0], bbox[1]);
        let (x2, y2) = self.map_to_original(bbox[2], bbox[3]);
        let w = self.original_width as f32;
        let h = self.original_height as f32;
        [x1.clamp(0.0, w), y1.clamp(0.0, h), x2.clamp(0.0, w), y2.clamp(0.0, h)]
    }
}

fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let new_w = ((width as f32 * scale).round() as u32).max(1);
    let new_h = ((height as f32 * scale).round() as u32).max(1);
    (new_w, new_h)
}

/// Resize preserving aspect ratio and pad to a `target_size` square
pub fn letterbox(image: &RgbImage, target_size: u32) -> (RgbImage, LetterboxInfo) {
    let info = LetterboxInfo::new(image.width(), image.height(), target_size);
    let mut output = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([LETTERBOX_FILL, LETTERBOX_FILL, LETTERBOX_FILL]),
    );

    if image.width() == 0 || image.height() == 0 {
        return (output, info);
    }

    let (new_w, new_h) = scaled_size(image.width(), image.height(), info.scale);
    let resized = imageops::resize(image, new_w, new_h, imageops::FilterType::Triangle);
    imageops::replace(&mut output, &resized, info.pad_x as i64, info.pad_y as i64);

    (output, info)
}

/// Letterbox `image` and convert it to a `[1, 3, S, S]` tensor scaled to [0, 1]
pub fn preprocess_for_detection(image: &RgbImage, target_size: u32) -> (Array4<f32>, LetterboxInfo) {
    let (boxed, info) = letterbox(image, target_size);
    let size = target_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in boxed.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}
