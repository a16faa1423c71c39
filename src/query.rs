// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query parsing: from a raw input line to resolved term descriptors.
//!
//! The input is split on whitespace only — no regex normalization at this
//! stage, a query is taken at face value. Every token gets a descriptor
//! (1-based position, common flag, capital flag), and a hitlist resolved
//! against the lexicon in this order:
//!
//! 1. common word → empty hitlist (position scaffolding only)
//! 2. exact lexicon key
//! 3. for capitalized tokens, the lowercase form
//! 4. similarity fallback: the best non-common lexicon term at Jaccard
//!    similarity ≥ 0.5; below the floor the token keeps an empty hitlist
//!
//! Resolved entries are keyed by term, so a fallback landing on another
//! query term overwrites it — last writer wins, and a repeated input word
//! keeps its last position.

use std::collections::HashMap;

use crate::hit::Hit;
use crate::index::InvertedIndex;
use crate::similarity::rank_similarity;
use crate::tokenize::is_fully_capitalized;

/// A candidate below this similarity is no match at all; the token falls
/// through with an empty hitlist.
pub const SIMILARITY_FLOOR: f64 = 0.5;

/// Descriptor of one query term: where it sits in the query and how it was
/// classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTerm {
    /// 1-based position within the query.
    pub position: u32,
    pub is_common: bool,
    pub is_capital: bool,
}

/// A parsed query, ready for ranking.
#[derive(Debug, Default)]
pub struct UserQuery {
    /// Resolved term → (descriptor, hitlist).
    pub word_pairs: HashMap<String, (QueryTerm, Vec<Hit>)>,
    /// Absolute positions of the non-common terms, ascending.
    pub expected_pos: Vec<u32>,
    /// Hitlist of the first non-common term in reading order; the anchor
    /// for the positional sweep. May be empty.
    pub root_hitlist: Vec<Hit>,
    /// Concatenation of all non-common hitlists.
    pub merged_hitlist: Vec<Hit>,
    /// Query-wide score multiplier.
    pub global_modifier: f64,
}

impl UserQuery {
    /// Parse and resolve `input` against the index.
    pub fn parse(input: &str, index: &InvertedIndex) -> Self {
        let info_pairs = describe_tokens(input, index);
        let word_pairs = resolve_terms(info_pairs, index);

        let mut ordered: Vec<&(QueryTerm, Vec<Hit>)> = word_pairs.values().collect();
        ordered.sort_by_key(|(info, _)| info.position);

        let mut expected_pos = Vec::new();
        let mut merged_hitlist = Vec::new();
        let mut root_hitlist = Vec::new();
        for (info, hits) in &ordered {
            if info.is_common {
                continue;
            }
            if expected_pos.is_empty() {
                root_hitlist = hits.clone();
            }
            expected_pos.push(info.position);
            merged_hitlist.extend(hits.iter().copied());
        }
        drop(ordered);

        UserQuery { word_pairs, expected_pos, root_hitlist, merged_hitlist, global_modifier: 1.0 }
    }
}

/// Tokenize the raw input into (term, descriptor) pairs, first-seen order.
/// A repeated word keeps one entry with its last position.
fn describe_tokens(input: &str, index: &InvertedIndex) -> Vec<(String, QueryTerm)> {
    let mut ordered: Vec<(String, QueryTerm)> = Vec::new();

    for (i, word) in input.split_whitespace().enumerate() {
        let is_capital = is_fully_capitalized(word);
        let term = if is_capital { word.to_string() } else { word.to_lowercase() };
        let info = QueryTerm {
            position: i as u32 + 1,
            is_common: index.common_words.contains(&term),
            is_capital,
        };

        if let Some(existing) = ordered.iter_mut().find(|(t, _)| *t == term) {
            existing.1 = info;
        } else {
            ordered.push((term, info));
        }
    }

    ordered
}

fn resolve_terms(
    info_pairs: Vec<(String, QueryTerm)>,
    index: &InvertedIndex,
) -> HashMap<String, (QueryTerm, Vec<Hit>)> {
    let mut word_pairs = HashMap::new();

    for (term, info) in info_pairs {
        if info.is_common {
            word_pairs.insert(term, (info, Vec::new()));
            continue;
        }

        if let Some(hits) = index.lexicon.get(&term) {
            word_pairs.insert(term, (info, hits.clone()));
            continue;
        }

        if info.is_capital {
            let lower = term.to_lowercase();
            if let Some(hits) = index.lexicon.get(&lower) {
                word_pairs.insert(lower, (info, hits.clone()));
                continue;
            }
        }

        match best_similar(&term, index) {
            Some(candidate) => {
                let resolved = QueryTerm {
                    position: info.position,
                    is_common: false,
                    is_capital: is_fully_capitalized(&candidate),
                };
                let hits = index.lexicon[&candidate].clone();
                word_pairs.insert(candidate, (resolved, hits));
            }
            None => {
                word_pairs.insert(term, (info, Vec::new()));
            }
        }
    }

    word_pairs
}

/// The best-scoring non-common lexicon term at or above the similarity
/// floor, if any.
fn best_similar(term: &str, index: &InvertedIndex) -> Option<String> {
    for (candidate, similarity) in rank_similarity(term, &index.lexicon) {
        if similarity < SIMILARITY_FLOOR {
            break;
        }
        if index.common_words.contains(candidate) {
            continue;
        }
        return Some(candidate.clone());
    }
    None
}
