// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Build and search orchestration.
//!
//! The engine wires the pieces together: the corpus adapter feeds the
//! builder, the builder feeds the barrel store, the store feeds the
//! query-time lexicon, and queries flow parse → rank → decorate.
//!
//! Error containment happens here. Build failures are fatal — a broken
//! index must not be persisted. Query failures are not: whatever goes
//! wrong past parsing is logged and turned into an empty result so an
//! interactive shell stays alive. Missing page metadata degrades to empty
//! titles rather than failing the query.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{BarrelMode, Config, Mode};
use crate::error::{Error, Result};
use crate::gst::Gst;
use crate::hit::Hit;
use crate::index::InvertedIndex;
use crate::query::UserQuery;
use crate::rank::{rank_gst, rank_plain};
use crate::repo::PageRepo;
use crate::store::BarrelStore;

/// One ranked, decorated result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub doc_id: u32,
    pub score: f64,
    pub title: String,
    pub url: String,
}

/// The assembled search engine, in either mode.
pub struct Engine {
    config: Config,
    store: BarrelStore,
    repo: Option<PageRepo>,
    index: InvertedIndex,
    gst: Option<Gst>,
}

impl Engine {
    /// Wire up an engine. The corpus adapter is optional in search mode
    /// (results lose their titles without it) and required for reindexing.
    pub fn new(config: Config, repo: Option<PageRepo>) -> Result<Self> {
        if config.barrel_mode == BarrelMode::Remote {
            return Err(Error::Config(
                "the remote barrel store is not specified yet; use \"local\"".to_string(),
            ));
        }

        let store = BarrelStore::new(&config.data_dir);
        Ok(Engine { config, store, repo, index: InvertedIndex::default(), gst: None })
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// The in-memory index, for inspection.
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Rebuild the index from the corpus and persist it. Fatal on any
    /// failure; existing stores are removed before the first write.
    pub fn reindex(&mut self) -> Result<()> {
        let repo = self
            .repo
            .as_ref()
            .ok_or_else(|| Error::Config("reindexing requires the corpus store".to_string()))?;

        self.store.prepare_reindex()?;

        let spinner = stage_spinner("Reading corpus...");
        let start = Instant::now();
        let docs = repo.read_paragraphs()?;
        spinner.finish_with_message(format!(
            "Read {} documents in {:.2?}",
            docs.len(),
            start.elapsed()
        ));

        let gst = if self.config.use_gst {
            let spinner = stage_spinner("Generating suffix tree...");
            let start = Instant::now();
            let gst = Gst::build(&repo.read_titles()?);
            spinner.finish_with_message(format!(
                "Suffix tree: {} nodes in {:.2?}",
                gst.len(),
                start.elapsed()
            ));
            Some(gst)
        } else {
            None
        };

        let spinner = stage_spinner("Generating hitlists...");
        let start = Instant::now();
        let mut index = InvertedIndex::build(&docs, self.config.use_gst)?;
        index.sort_hitlists();
        spinner.finish_with_message(format!(
            "Indexed {} terms in {:.2?}",
            index.lexicon.len(),
            start.elapsed()
        ));

        let spinner = stage_spinner("Storing indexes...");
        let start = Instant::now();
        self.store.store_lexicon(&index.lexicon)?;
        self.store.store_word_counts(&index.doc_word_count)?;
        if let Some(gst) = &gst {
            self.store.store_doc_pairs(&index.doc_pairs)?;
            self.store.store_suffix_tree(gst)?;
        }
        spinner.finish_with_message(format!("Stored indexes in {:.2?}", start.elapsed()));

        self.index = index;
        self.gst = gst;
        Ok(())
    }

    /// Load the persisted stores and re-derive the common-word set and
    /// blacklist. Missing or corrupt stores are fatal here.
    pub fn prepare_search(&mut self) -> Result<()> {
        self.store.require_search_files(self.config.use_gst)?;

        let start = Instant::now();
        self.index.lexicon = self.store.load_lexicon()?;
        self.index.doc_word_count = self.store.load_word_counts()?;
        if self.config.use_gst {
            self.index.doc_pairs = self.store.load_doc_pairs()?;
            self.gst = Some(self.store.load_suffix_tree()?);
        }

        // Derivation is deterministic (ties break on term / doc id), so a
        // reload always reproduces the sets the build saw.
        self.index.derive_blacklist();
        self.index.derive_common_words();

        eprintln!(
            "Restored {} terms across {} documents in {:.2?}",
            self.index.lexicon.len(),
            self.index.doc_word_count.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// Answer one query. Never fails: ranking errors are logged and yield
    /// an empty result.
    pub fn search(&mut self, input: &str) -> Vec<SearchResult> {
        let start = Instant::now();
        let results = match self.try_search(input) {
            Ok(results) => results,
            Err(e) => {
                eprintln!("query failed, returning no results: {e}");
                Vec::new()
            }
        };
        eprintln!("Answered in {:.2?} ({} results)", start.elapsed(), results.len());

        // The lexicon is in memory now; release the store early. Cleanup
        // closes again, which is a no-op.
        let _ = self.store.close();
        results
    }

    fn try_search(&self, input: &str) -> Result<Vec<SearchResult>> {
        let query = UserQuery::parse(input, &self.index);
        if query.word_pairs.is_empty() {
            return Ok(Vec::new());
        }

        let ranks = if self.config.use_gst {
            let gst = self
                .gst
                .as_ref()
                .ok_or_else(|| Error::Rank("suffix tree not loaded".to_string()))?;
            let candidates = self.gst_candidates(gst, &query);
            rank_gst(&query, &candidates)
        } else {
            rank_plain(&query, &self.index.doc_blacklist)
        };

        Ok(self.decorate(ranks))
    }

    /// Candidate documents for the suffix-tree ranker: the union of
    /// per-term title matches, blacklist-filtered, each paired with its
    /// document hitlist.
    fn gst_candidates(&self, gst: &Gst, query: &UserQuery) -> HashMap<u32, Vec<Hit>> {
        let mut docs: HashSet<u32> = HashSet::new();
        for term in query.word_pairs.keys() {
            for (doc, _count) in gst.find_tree(term) {
                docs.insert(doc);
            }
        }

        docs.into_iter()
            .filter(|doc| !self.index.doc_blacklist.contains(doc))
            .filter_map(|doc| self.index.doc_pairs.get(&doc).map(|hits| (doc, hits.clone())))
            .collect()
    }

    /// Order by score and attach page metadata. A missing or failing
    /// corpus store downgrades to empty titles; it never fails a query.
    fn decorate(&self, ranks: HashMap<u32, f64>) -> Vec<SearchResult> {
        if ranks.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<(u32, f64)> = ranks.into_iter().collect();
        ordered.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });

        let ids: Vec<u32> = ordered.iter().map(|(doc, _)| *doc).collect();
        let meta = match &self.repo {
            Some(repo) => repo.read_page_meta(&ids).unwrap_or_else(|e| {
                eprintln!("page metadata unavailable: {e}");
                HashMap::new()
            }),
            None => HashMap::new(),
        };

        ordered
            .into_iter()
            .map(|(doc_id, score)| {
                let (title, url) = meta.get(&doc_id).cloned().unwrap_or_default();
                SearchResult { doc_id, score, title, url }
            })
            .collect()
    }

    /// Release the persisted stores. Idempotent; also safe after a search
    /// already closed them.
    pub fn close(&mut self) -> Result<()> {
        self.store.close()
    }
}

fn stage_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
