// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Barrel-sharded full-text search with positional ranking.
//!
//! Telusuri turns a crawled corpus (paragraphs and titles in a relational
//! store) into a persistent inverted index and answers free-text queries
//! with ranked document ids. Hits pack `(docId, position, capital)` into a
//! single `u32`; the lexicon is sharded into 64 on-disk barrels; ranking
//! distinguishes exact positional phrase matches from partial ones.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌───────────┐    ┌───────────┐
//! │ repo.rs  │───▶│tokenize.rs│───▶│ index.rs  │───▶│ store/    │
//! │ (corpus) │    │ (tokens)  │    │ (lexicon) │    │ (barrels) │
//! └──────────┘    └───────────┘    └───────────┘    └───────────┘
//!       │                                                 │
//!       │         ┌───────────┐    ┌───────────┐          │
//!       └────────▶│  gst.rs   │    │ query.rs  │◀─────────┘
//!                 │ (titles)  │    │ (parse)   │
//!                 └───────────┘    └───────────┘
//!                        │               │
//!                        ▼               ▼
//!                 ┌─────────────────────────────┐
//!                 │          rank.rs            │
//!                 │ (exact / partial positional)│
//!                 └─────────────────────────────┘
//! ```
//!
//! The engine (`engine.rs`) orchestrates: build mode streams the corpus
//! through the tokenizer into the lexicon and persists it; search mode
//! loads the barrels back, parses the query (with a Jaccard fallback for
//! unknown terms), and sweeps merged hitlists — optionally pre-filtered by
//! a generalized suffix tree over titles.
//!
//! # Usage
//!
//! ```ignore
//! use telusuri::{Config, Engine, Mode, PageRepo};
//!
//! let repo = PageRepo::open(&config.database)?;
//! let mut engine = Engine::new(config, Some(repo))?;
//! engine.reindex()?;
//! let results = engine.search("quick brown fox");
//! ```

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod gst;
pub mod hit;
pub mod index;
pub mod query;
pub mod rank;
pub mod repo;
pub mod similarity;
pub mod store;
pub mod tokenize;

// Re-exports for the public API
pub use config::{BarrelMode, Config, Mode};
pub use engine::{Engine, SearchResult};
pub use error::{Error, Result};
pub use gst::Gst;
pub use hit::{Hit, MAX_DOC_ID, MAX_POSITION};
pub use index::{InvertedIndex, Lexicon};
pub use query::{QueryTerm, UserQuery};
pub use rank::{rank_gst, rank_plain};
pub use repo::PageRepo;
pub use store::{shard_lexicon, Barrel, BarrelStore};
pub use tokenize::{Token, Tokenizer};
