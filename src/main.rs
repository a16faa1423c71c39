// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Telusuri CLI: rebuild the index or answer an interactive query.
//!
//! ```bash
//! # Build the persistent index from the corpus store
//! telusuri --status reindex --database corpus.db --data-dir ./index
//!
//! # Load the index and prompt for a query
//! telusuri --status search --database corpus.db --data-dir ./index
//! ```
//!
//! Both modes end with one query prompt: a fresh reindex answers queries
//! from the in-memory index it just built, search mode restores it from
//! the barrel store first. Build failures exit non-zero; query failures
//! are contained by the engine and print an empty result.

use std::io::{BufRead, Write};

use clap::Parser;

use telusuri::{Engine, Mode, PageRepo, Result};

mod cli;
use cli::display::print_results;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.to_config()?;
    let mode = config.mode;
    let use_gst = config.use_gst;

    // The corpus store is required to build; in search mode results merely
    // lose their titles without it.
    let repo = match PageRepo::open(&config.database) {
        Ok(repo) => Some(repo),
        Err(e) if mode == Mode::Search => {
            eprintln!("corpus store unavailable, results will be undecorated: {e}");
            None
        }
        Err(e) => return Err(e),
    };

    let mut engine = Engine::new(config, repo)?;

    match mode {
        Mode::Reindex => {
            engine.reindex()?;
            eprintln!("✅ Reindex complete{}", if use_gst { " (suffix tree enabled)" } else { "" });
        }
        Mode::Search => engine.prepare_search()?,
    }

    let input = prompt_query()?;
    let results = engine.search(&input);

    if cli.json {
        let rendered = serde_json::to_string_pretty(&results[..results.len().min(cli.limit)])
            .map_err(|e| telusuri::Error::Rank(format!("could not serialize results: {e}")))?;
        println!("{rendered}");
    } else {
        print_results(&results, cli.limit);
    }

    engine.close()?;
    Ok(())
}

fn prompt_query() -> Result<String> {
    print!("Input query: ");
    std::io::stdout().flush().map_err(telusuri::Error::Store)?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input).map_err(telusuri::Error::Store)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
