// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration.
//!
//! Everything the engine needs to know — mode, suffix-tree toggle, barrel
//! store flavor, corpus path, data directory — travels in one value. The
//! persisted file paths derive from `data_dir`; nothing reads them from
//! globals.

use std::path::PathBuf;
use std::str::FromStr;

/// What this invocation does: rebuild the index or serve queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Reindex,
    Search,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reindex" => Ok(Mode::Reindex),
            "search" => Ok(Mode::Search),
            other => Err(format!("expected \"reindex\" or \"search\", got \"{other}\"")),
        }
    }
}

/// Where the barrels live. `Remote` names a socket protocol that was never
/// finished; selecting it is a configuration error until it is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrelMode {
    Local,
    Remote,
}

impl FromStr for BarrelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(BarrelMode::Local),
            "remote" => Ok(BarrelMode::Remote),
            other => Err(format!("expected \"local\" or \"remote\", got \"{other}\"")),
        }
    }
}

/// Engine configuration, assembled by the CLI from flags and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub use_gst: bool,
    pub barrel_mode: BarrelMode,
    /// Path to the corpus store the crawler populated.
    pub database: PathBuf,
    /// Directory holding the persisted index files.
    pub data_dir: PathBuf,
}
