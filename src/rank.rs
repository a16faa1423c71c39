// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Positional ranking: the merged-hitlist sweep and its suffix-tree-assisted
//! variant.
//!
//! Both variants score documents the same way. A sweep walks positions in
//! ascending order, buffering them per document; every hit that belongs to
//! the root hitlist (the first non-common query term) closes the current
//! buffer and opens a new one. A closed buffer whose length equals the
//! query's expected-position list is normalized — shifted so its first
//! element lines up with the first expected position — and an exact match
//! counts when the sequences coincide. Any other non-empty buffer records a
//! partial score `|buffer| / |expected|`. An empty buffer records nothing:
//! every stored rank stays strictly positive.
//!
//! Per document, exact matches win outright:
//!
//! ```text
//! rank = exactCount × modifier × EXACT_MATCH_FACTOR          (any exact)
//! rank = (s + s/15 × occurrences(s)) × modifier              (best partial s)
//! ```

use std::collections::{HashMap, HashSet};

use crate::hit::Hit;
use crate::query::UserQuery;

/// Weight applied to exact positional matches.
pub const EXACT_MATCH_FACTOR: f64 = 1.0;

/// Divisor damping the bonus for repeated partial matches at the same
/// score: ten occurrences of a 2/3 match add only 2/3 × 10/15.
pub const PARTIAL_MATCH_OCCUR_FACTOR: f64 = 15.0;

/// Per-document sweep state: exact-match tally plus partial-match
/// occurrences keyed by buffer length (the fractional score is
/// `len / |expected|`, so the max length is the max score).
#[derive(Debug, Default)]
struct DocTally {
    exact_count: u32,
    sub_match: HashMap<usize, u32>,
}

impl DocTally {
    fn reset(&mut self) {
        self.exact_count = 0;
        self.sub_match.clear();
    }

    /// Close a buffer of positions: exact when it normalizes onto the
    /// expected sequence, partial otherwise. Empty buffers score nothing,
    /// and an equal-length buffer that fails the comparison scores nothing
    /// either.
    fn close_buffer(&mut self, buffer: &mut Vec<u32>, expected: &[u32]) {
        if buffer.is_empty() {
            return;
        }
        if buffer.len() == expected.len() {
            let diff = i64::from(buffer[0]) - i64::from(expected[0]);
            let exact = buffer
                .iter()
                .zip(expected)
                .all(|(&b, &e)| i64::from(b) - diff == i64::from(e));
            if exact {
                self.exact_count += 1;
            }
        } else {
            *self.sub_match.entry(buffer.len()).or_insert(0) += 1;
        }
        buffer.clear();
    }

    /// The document's final score, if it earned one.
    fn finalize(&self, expected_len: usize, modifier: f64) -> Option<f64> {
        if self.exact_count > 0 {
            return Some(f64::from(self.exact_count) * modifier * EXACT_MATCH_FACTOR);
        }
        let (&len, &occurrences) = self.sub_match.iter().max_by_key(|(&len, _)| len)?;
        let sub_score = len as f64 / expected_len as f64;
        Some((sub_score + sub_score / PARTIAL_MATCH_OCCUR_FACTOR * f64::from(occurrences)) * modifier)
    }
}

/// Rank by sweeping the merged hitlist, then drop blacklisted documents.
///
/// Returns an empty map for an empty merged hitlist or an empty expected
/// sequence — a query nothing matched is not an error.
pub fn rank_plain(query: &UserQuery, blacklist: &HashSet<u32>) -> HashMap<u32, f64> {
    let mut ranks = HashMap::new();
    if query.merged_hitlist.is_empty() || query.expected_pos.is_empty() {
        return ranks;
    }

    let mut merged = query.merged_hitlist.clone();
    merged.sort_unstable();
    let root: HashSet<Hit> = query.root_hitlist.iter().copied().collect();

    let mut current_doc = merged[0].doc();
    let mut buffer: Vec<u32> = Vec::new();
    let mut tally = DocTally::default();

    for hit in merged {
        if root.contains(&hit) {
            tally.close_buffer(&mut buffer, &query.expected_pos);
        }

        if hit.doc() != current_doc {
            if let Some(score) = tally.finalize(query.expected_pos.len(), query.global_modifier) {
                ranks.insert(current_doc, score);
            }
            tally.reset();
            buffer.clear();
            current_doc = hit.doc();
        }
        buffer.push(hit.pos());
    }

    // The sweep ends mid-document: close and finalize the last one.
    tally.close_buffer(&mut buffer, &query.expected_pos);
    if let Some(score) = tally.finalize(query.expected_pos.len(), query.global_modifier) {
        ranks.insert(current_doc, score);
    }

    ranks.retain(|doc, _| !blacklist.contains(doc));
    ranks
}

/// Rank suffix-tree candidates.
///
/// `doc_hitlists` maps each candidate document to its document-keyed
/// hitlist; candidates are expected to be blacklist-filtered already (the
/// selection step does it). Per candidate, the positions any query term hit
/// are collected, sorted, split into chunks at root hits, and scored with
/// the same rules as the plain sweep.
pub fn rank_gst(query: &UserQuery, doc_hitlists: &HashMap<u32, Vec<Hit>>) -> HashMap<u32, f64> {
    let mut ranks = HashMap::new();
    if doc_hitlists.is_empty() || query.expected_pos.is_empty() {
        return ranks;
    }

    let term_sets: Vec<HashSet<Hit>> = query
        .word_pairs
        .values()
        .map(|(_, hits)| hits.iter().copied().collect())
        .collect();
    let root: HashSet<Hit> = query.root_hitlist.iter().copied().collect();

    for (&doc, doc_hits) in doc_hitlists {
        let doc_set: HashSet<Hit> = doc_hits.iter().copied().collect();
        let mut positions: Vec<Hit> = Vec::new();
        for term_set in &term_sets {
            positions.extend(doc_set.intersection(term_set).copied());
        }
        if positions.is_empty() {
            continue;
        }
        positions.sort_unstable();

        let mut buffer: Vec<u32> = Vec::new();
        let mut tally = DocTally::default();
        for hit in positions {
            if root.contains(&hit) {
                tally.close_buffer(&mut buffer, &query.expected_pos);
            }
            buffer.push(hit.pos());
        }
        tally.close_buffer(&mut buffer, &query.expected_pos);

        if let Some(score) = tally.finalize(query.expected_pos.len(), query.global_modifier) {
            ranks.insert(doc, score);
        }
    }

    ranks
}
