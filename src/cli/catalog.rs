// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;

use crate::vision::{CatalogLanguage, LabelCatalog};

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog language (ko/en)
    #[arg(long, env = "CATALOG_LANGUAGE", default_value_t = CatalogLanguage::Korean)]
    pub language: CatalogLanguage,
}

pub fn print_catalog(args: CatalogArgs) -> Result<()> {
    print!("{}", render_catalog(&LabelCatalog::new(args.language)));
    Ok(())
}

/// One `id<TAB>description` line per class
pub fn render_catalog(catalog: &LabelCatalog) -> String {
    catalog
        .iter()
        .map(|(id, desc)| format!("{:>2}\t{}\n", id, desc))
        .collect()
}
