// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the telusuri binary.
//!
//! One command, two modes. Every option can come from a flag or from the
//! environment (flags win), so a deployment can configure the indexer
//! entirely through env vars while a developer overrides from the shell:
//!
//! ```bash
//! # Rebuild the index from the corpus store
//! telusuri --status reindex --database corpus.db
//!
//! # Serve one interactive query, suffix-tree assisted
//! INDEXER_STATUS=search INDEXER_USE_GST=true DB_NAME=corpus.db telusuri
//! ```

pub mod display;

use std::path::PathBuf;

use clap::Parser;

use telusuri::{BarrelMode, Config, Error, Mode, Result};

#[derive(Parser)]
#[command(
    name = "telusuri",
    about = "Barrel-sharded full-text search: build the index or query it",
    version
)]
pub struct Cli {
    /// What to do: "reindex" rebuilds the persistent index from the corpus
    /// store, "search" loads it and prompts for a query
    #[arg(long, env = "INDEXER_STATUS")]
    pub status: String,

    /// Use the generalized suffix tree over titles as a candidate filter
    /// ("true" or "false")
    #[arg(
        long,
        env = "INDEXER_USE_GST",
        default_value_t = false,
        action = clap::ArgAction::Set,
        num_args = 1
    )]
    pub use_gst: bool,

    /// Barrel store flavor: "local" files (the only implemented one)
    #[arg(long, env = "INDEXER_BARREL_STORE", default_value = "local")]
    pub barrel_store: String,

    /// Path to the corpus store the crawler populated
    #[arg(long, env = "DB_NAME")]
    pub database: PathBuf,

    /// Directory for the persisted index files
    #[arg(long, env = "INDEXER_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Maximum number of results to print
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Emit results as a JSON array instead of formatted blocks
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Fold the parsed arguments into an engine configuration.
    pub fn to_config(&self) -> Result<Config> {
        let mode: Mode = self.status.parse().map_err(Error::Config)?;
        let barrel_mode: BarrelMode = self.barrel_store.parse().map_err(Error::Config)?;

        Ok(Config {
            mode,
            use_gst: self.use_gst,
            barrel_mode,
            database: self.database.clone(),
            data_dir: self.data_dir.clone(),
        })
    }
}
