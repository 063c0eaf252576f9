// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use care_label_node::{
    api::{ApiServer, AppState, PredictionService},
    config::ServiceConfig,
    version,
    vision::{DetectionAdapter, LabelCatalog, YoloOnnxModel},
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting {}...\n", version::get_version_string());
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!("🧩 Features: {}", version::FEATURES.join(", "));
    println!();

    let config = ServiceConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    println!("🧠 Loading detection model...");
    println!("   Model: {}", config.detector.model_path.display());
    println!("   Input size: {}", config.detector.input_size);
    println!(
        "   Confidence: {}, IoU: {}, max detections: {}",
        config.detector.params.confidence_threshold,
        config.detector.params.iou_threshold,
        config.detector.params.max_detections
    );
    let model = YoloOnnxModel::new(&config.detector)
        .await
        .context("Failed to load detection model")?;
    println!("✅ Detection model loaded");

    let adapter = DetectionAdapter::new(Arc::new(model)).with_timeout(config.inference_timeout);
    match config.inference_timeout {
        Some(timeout) => println!("⏱️  Inference timeout: {:?}", timeout),
        None => println!("⏱️  Inference timeout: none"),
    }

    let catalog = Arc::new(LabelCatalog::new(config.catalog_language));
    println!(
        "📖 Care catalog: {} entries ({})",
        catalog.len(),
        config.catalog_language
    );

    let service = PredictionService::new(adapter, catalog);
    let server = ApiServer::new(config.api.clone(), AppState::new(service));

    println!("\n🌐 Serving POST /predict on http://{}", config.api.listen_addr);
    server.run().await?;

    println!("👋 Care-label node stopped");
    Ok(())
}
