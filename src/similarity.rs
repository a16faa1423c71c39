// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Jaccard similarity over character sets, for the out-of-lexicon fallback.
//!
//! Character-set Jaccard is crude but cheap: `|A ∩ B| / |A ∪ B|` over the
//! lowercased characters of the two words. It is order-blind ("nasa" and
//! "NASA" score 1.0) which is exactly what the fallback wants, and wrong in
//! all the ways you would expect ("listen" and "silent" score 1.0 too).

use std::collections::HashSet;

use crate::index::Lexicon;

/// Similarity of the lowercased character sets of `a` and `b`, in `[0, 1]`.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<char> = a.to_lowercase().chars().collect();
    let set_b: HashSet<char> = b.to_lowercase().chars().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Score every lexicon term against `input`, best first. Ties keep the
/// underlying map order — callers must not rely on tie order.
pub fn rank_similarity<'a>(input: &str, lexicon: &'a Lexicon) -> Vec<(&'a String, f64)> {
    let mut ranked: Vec<(&String, f64)> =
        lexicon.keys().map(|term| (term, jaccard_similarity(input, term))).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}
