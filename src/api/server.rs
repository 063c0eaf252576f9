// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::predict::{predict_handler, PredictionService};

/// Default request body limit; base64 inflates images by a third
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen_addr: SocketAddr,
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 10000)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the router: `POST /predict` only, CORS open to every origin
pub fn create_app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        create_app(self.state.clone(), self.config.max_body_bytes)
    }

    /// Bind the configured address and serve until Ctrl+C / SIGTERM
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.listen_addr))?;
        self.run_with_listener(listener).await
    }

    /// Serve on an already bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        info!("🌐 Care-label API listening on http://{}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
