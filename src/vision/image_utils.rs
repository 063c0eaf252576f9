// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding and JPEG data-URI encoding for care-label payloads

use std::io::Cursor;

use base64::{
    alphabet,
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use image::{codecs::jpeg::JpegEncoder, ImageFormat, RgbImage};
use thiserror::Error;

/// Maximum decoded image size (20MB)
pub const MAX_IMAGE_SIZE: usize = 20 * 1024 * 1024;

/// JPEG quality used for every encoded image
pub const JPEG_QUALITY: u8 = 75;

/// Prefix of every encoded image returned to callers
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Standard alphabet, accepts payloads with or without trailing padding
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while decoding or encoding images
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected container format
    pub format: ImageFormat,
    /// Size of the decoded byte stream
    pub size_bytes: usize,
}

/// Decode a base64-encoded image into an RGB pixel buffer
///
/// Accepts bare base64 as well as `data:<mime>;base64,` URIs. Line breaks and
/// other ASCII whitespace inside the payload are ignored.
///
/// # Example
/// ```ignore
/// let (image, info) = decode_base64_image("iVBORw0KGgo...")?;
/// println!("Image size: {}x{}", info.width, info.height);
/// ```
pub fn decode_base64_image(payload: &str) -> Result<(RgbImage, ImageInfo), ImageError> {
    let body = strip_data_uri_prefix(payload.trim());
    if body.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT.decode(compact.as_bytes())?;

    decode_image_bytes(&bytes)
}

/// Decode raw image bytes
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(RgbImage, ImageInfo), ImageError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    // Palette, grayscale and alpha images are normalized to plain RGB
    let rgb = img.into_rgb8();

    let info = ImageInfo {
        width: rgb.width(),
        height: rgb.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((rgb, info))
}

/// Encode an RGB image as a `data:image/jpeg;base64,` URI
pub fn encode_jpeg_data_uri(image: &RgbImage) -> Result<String, ImageError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::EncodeFailed(format!(
            "cannot encode a {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(image)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;

    let mut uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + buffer.get_ref().len() * 4 / 3 + 4);
    uri.push_str(JPEG_DATA_URI_PREFIX);
    STANDARD.encode_string(buffer.get_ref(), &mut uri);
    Ok(uri)
}

/// Strip a `data:<mime>;base64,` prefix, leaving bare payloads untouched
fn strip_data_uri_prefix(payload: &str) -> &str {
    if !payload.starts_with("data:") {
        return payload;
    }

    match payload.split_once(',') {
        Some((header, body)) if header.ends_with(";base64") => body,
        _ => payload,
    }
}
