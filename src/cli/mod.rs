// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod catalog;
pub mod predict;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Care-label symbol detection CLI
#[derive(Parser, Debug)]
#[command(name = "care-label-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Offline tools for the care-label detection service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect care symbols in a local image file
    Predict(predict::PredictArgs),

    /// Print the care-instruction catalog
    Catalog(catalog::CatalogArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Predict(args) => predict::run_predict(args).await,
        Commands::Catalog(args) => catalog::print_catalog(args),
    }
}
