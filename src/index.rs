// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Inverted index construction.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **HIT_WELLFORMED**: every hit decodes to the term it was stored under
//! 2. **POSITION_RANGE**: `1 <= pos <= 4095` for every hit
//! 3. **NO_DUPLICATES**: no hitlist holds two hits with the same (doc, pos)
//! 4. **CANONICAL_DESC**: after [`InvertedIndex::sort_hitlists`], every
//!    lexicon hitlist is sorted descending (the persisted form)
//!
//! Hits are appended in document-major, position-ascending order, so each
//! hitlist is naturally ascending during the build. The descending sort is a
//! separate final pass; rankers re-sort ascending where they need to.
//!
//! The derived sets come last, once the whole index exists: the common-word
//! set (top 0.1% of terms by hitlist length) and the document blacklist
//! (top 5% of documents by word count). Both quotas truncate, so small
//! corpora derive empty sets, and ties break lexicographically / by doc id
//! so a rebuild from the same corpus derives the same sets.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::hit::{Hit, MAX_DOC_ID};
use crate::tokenize::Tokenizer;

/// Mapping from term to its hitlist.
pub type Lexicon = HashMap<String, Vec<Hit>>;

/// Share of the lexicon considered "common" (too frequent to merge).
pub const COMMON_WORD_RATIO: f64 = 0.001;

/// Share of documents eliminated for having the most words.
pub const UPPER_ELIMINATION_RATIO: f64 = 0.05;

/// Share of documents that a lower-bound elimination would drop. The
/// elimination itself is intentionally disabled: only the upper bound is
/// applied, matching the observed behavior of the production index.
#[allow(dead_code)]
pub const LOWER_ELIMINATION_RATIO: f64 = 0.05;

/// The in-memory index: the lexicon plus everything derived from it.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    /// term → hitlist.
    pub lexicon: Lexicon,
    /// docId → hitlist, grouped by document instead of term. Populated only
    /// when the suffix-tree path is enabled; empty otherwise.
    pub doc_pairs: HashMap<u32, Vec<Hit>>,
    /// docId → number of hits emitted for that document.
    pub doc_word_count: HashMap<u32, u32>,
    /// Terms whose hits are ignored at query time.
    pub common_words: HashSet<String>,
    /// Documents filtered out of every result.
    pub doc_blacklist: HashSet<u32>,
}

impl InvertedIndex {
    /// Build the index from documents grouped as `(docId, paragraphs)`.
    ///
    /// Documents are processed in the given order; paragraphs of one
    /// document must be in their original order (the repository adapter
    /// guarantees contiguity). When `with_doc_pairs` is set, every hit is
    /// also recorded under its document for the suffix-tree ranker.
    ///
    /// Fails with [`Error::DocIdOverflow`] for any document id above the
    /// 19-bit limit.
    pub fn build(docs: &[(u32, Vec<String>)], with_doc_pairs: bool) -> Result<Self> {
        let mut index = InvertedIndex::default();
        let mut tokenizer = Tokenizer::new();
        let mut tokens = Vec::new();

        for (doc_id, paragraphs) in docs {
            if *doc_id > MAX_DOC_ID {
                return Err(Error::DocIdOverflow(i64::from(*doc_id)));
            }

            tokenizer.reset();
            tokens.clear();
            for paragraph in paragraphs {
                tokenizer.tokenize_into(paragraph, &mut tokens);
            }

            for token in tokens.drain(..) {
                let hit = Hit::pack(*doc_id, token.position, token.is_capital);
                index.lexicon.entry(token.text).or_default().push(hit);
                if with_doc_pairs {
                    index.doc_pairs.entry(*doc_id).or_default().push(hit);
                }
                *index.doc_word_count.entry(*doc_id).or_insert(0) += 1;
            }
        }

        index.derive_common_words();
        index.derive_blacklist();
        Ok(index)
    }

    /// Sort every lexicon hitlist descending, the canonical persisted form.
    pub fn sort_hitlists(&mut self) {
        for hits in self.lexicon.values_mut() {
            hits.sort_unstable_by(|a, b| b.cmp(a));
        }
    }

    /// Recompute the common-word set: the top `⌊|lexicon| × 0.001⌋` terms
    /// by hitlist length. Ties break lexicographically so the set is the
    /// same on every derivation from the same lexicon.
    pub fn derive_common_words(&mut self) {
        let quota = (self.lexicon.len() as f64 * COMMON_WORD_RATIO) as usize;
        self.common_words.clear();
        if quota == 0 {
            return;
        }

        let mut by_len: Vec<(&String, usize)> =
            self.lexicon.iter().map(|(term, hits)| (term, hits.len())).collect();
        by_len.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        self.common_words = by_len.into_iter().take(quota).map(|(term, _)| term.clone()).collect();
    }

    /// Recompute the document blacklist: the top `⌊|docs| × 0.05⌋` docIds
    /// by word count, ties broken by doc id.
    pub fn derive_blacklist(&mut self) {
        let quota = (self.doc_word_count.len() as f64 * UPPER_ELIMINATION_RATIO) as usize;
        self.doc_blacklist.clear();
        if quota == 0 {
            return;
        }

        let mut by_count: Vec<(u32, u32)> =
            self.doc_word_count.iter().map(|(&doc, &count)| (doc, count)).collect();
        by_count.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        self.doc_blacklist = by_count.into_iter().take(quota).map(|(doc, _)| doc).collect();
    }
}
