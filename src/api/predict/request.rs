// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction request parsing and validation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::PredictError;

/// Request for care-label prediction
///
/// `image` is kept as raw JSON so that a missing field, an empty string and a
/// non-string value can be told apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Base64-encoded image, optionally as a data URI
    #[serde(default)]
    pub image: Option<Value>,
}

impl PredictRequest {
    /// Parse a JSON request body
    pub fn from_body(body: Value) -> Result<Self, PredictError> {
        if !body.is_object() {
            return Err(PredictError::Unexpected(
                "request body must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(body).map_err(|e| PredictError::Unexpected(e.to_string()))
    }

    /// The base64 payload, or the reason there is none
    pub fn image_payload(&self) -> Result<&str, PredictError> {
        match self.image.as_ref() {
            None => Err(PredictError::MissingImage),
            Some(value) if is_blank(value) => Err(PredictError::MissingImage),
            Some(Value::String(payload)) => Ok(payload),
            Some(other) => Err(PredictError::InvalidImageField(format!(
                "expected a base64 string, got {}",
                json_type_name(other)
            ))),
        }
    }
}

/// Values that count as "no image": null, false, 0, "", [] and {}
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
