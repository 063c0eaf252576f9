// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from environment variables

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::api::server::{ApiConfig, DEFAULT_MAX_BODY_BYTES};
use crate::vision::yolo::{PostprocessParams, YoloConfig, YOLO_INPUT_SIZE};
use crate::vision::CatalogLanguage;

/// Default port, kept from the first deployment of the label scanner
pub const DEFAULT_API_PORT: u16 = 10000;

pub const DEFAULT_MODEL_PATH: &str = "./models/care-label-yolo.onnx";

/// Everything needed to start the service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api: ApiConfig,
    pub detector: YoloConfig,
    pub catalog_language: CatalogLanguage,
    /// Per-request inference deadline; `None` waits indefinitely
    pub inference_timeout: Option<Duration>,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host: IpAddr = parse_or(&lookup, "API_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port: u16 = parse_or(&lookup, "API_PORT", DEFAULT_API_PORT);

        let params = PostprocessParams {
            confidence_threshold: parse_or(
                &lookup,
                "CONFIDENCE_THRESHOLD",
                defaults.detector.params.confidence_threshold,
            ),
            iou_threshold: parse_or(&lookup, "IOU_THRESHOLD", defaults.detector.params.iou_threshold),
            max_detections: parse_or(&lookup, "MAX_DETECTIONS", defaults.detector.params.max_detections),
        };

        Self {
            api: ApiConfig {
                listen_addr: SocketAddr::new(host, port),
                max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            },
            detector: YoloConfig {
                model_path: lookup("MODEL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.detector.model_path),
                input_size: parse_or(&lookup, "MODEL_INPUT_SIZE", YOLO_INPUT_SIZE),
                params,
                intra_threads: parse_or(&lookup, "ONNX_INTRA_THREADS", defaults.detector.intra_threads),
            },
            catalog_language: parse_or(&lookup, "CATALOG_LANGUAGE", CatalogLanguage::default()),
            inference_timeout: lookup("INFERENCE_TIMEOUT_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let params = &self.detector.params;
        if !(0.0..=1.0).contains(&params.confidence_threshold) {
            return Err("Confidence threshold must be between 0 and 1".to_string());
        }
        if !(0.0..=1.0).contains(&params.iou_threshold) {
            return Err("IoU threshold must be between 0 and 1".to_string());
        }
        if params.max_detections == 0 {
            return Err("Max detections must be greater than 0".to_string());
        }
        if self.detector.input_size == 0 || self.detector.input_size % 32 != 0 {
            return Err("Model input size must be a positive multiple of 32".to_string());
        }
        if self.detector.intra_threads == 0 {
            return Err("ONNX intra threads must be greater than 0".to_string());
        }
        if self.api.max_body_bytes == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_API_PORT),
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            detector: YoloConfig {
                model_path: PathBuf::from(DEFAULT_MODEL_PATH),
                ..YoloConfig::default()
            },
            catalog_language: CatalogLanguage::default(),
            inference_timeout: None,
        }
    }
}

/// Parse `key` if set, falling back to `default` (with a warning) when invalid
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {}={:?}, using default {:?}", key, raw, default);
                default
            }
        },
    }
}
