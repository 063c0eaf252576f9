// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::api::{PredictResponse, PredictionService};
use crate::config::ServiceConfig;
use crate::vision::{CatalogLanguage, DetectionAdapter, LabelCatalog, YoloOnnxModel};

/// Arguments for the predict command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Label image to analyse (any format the service accepts)
    #[arg(long)]
    pub image: PathBuf,

    /// ONNX detector weights (defaults to MODEL_PATH or the bundled path)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Catalog language (ko/en)
    #[arg(long)]
    pub language: Option<CatalogLanguage>,

    /// Write the JSON envelope here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run_predict(args: PredictArgs) -> Result<()> {
    let config = resolve_config(ServiceConfig::from_env(), &args)?;

    info!("Loading detector from {}", config.detector.model_path.display());
    let model = YoloOnnxModel::new(&config.detector)
        .await
        .context("Failed to load detection model")?;

    let service = PredictionService::new(
        DetectionAdapter::new(Arc::new(model)).with_timeout(config.inference_timeout),
        Arc::new(LabelCatalog::new(config.catalog_language)),
    );

    let response = predict_file(&service, &args.image).await?;
    let json = serde_json::to_string_pretty(&response)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ {} symbols written to {}", response.result.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Apply command-line overrides to `base` and validate the result
pub fn resolve_config(mut base: ServiceConfig, args: &PredictArgs) -> Result<ServiceConfig> {
    if let Some(model) = &args.model {
        base.detector.model_path = model.clone();
    }
    if let Some(language) = args.language {
        base.catalog_language = language;
    }
    base.validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(base)
}

/// Run the prediction pipeline on an image file
pub async fn predict_file(service: &PredictionService, path: &Path) -> Result<PredictResponse> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let payload = STANDARD.encode(bytes);
    let response = service.predict(&payload).await?;
    Ok(response)
}
