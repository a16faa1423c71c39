//! Index construction invariants over generated corpora.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use telusuri::index::{COMMON_WORD_RATIO, UPPER_ELIMINATION_RATIO};
use telusuri::{shard_lexicon, InvertedIndex, Lexicon, Tokenizer, MAX_POSITION};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Word-like strings: lowercase runs with the occasional acronym.
fn word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[a-z]{2,8}").unwrap(),
        1 => prop::string::string_regex("[A-Z]{2,5}").unwrap(),
    ]
}

fn paragraph_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..12).prop_map(|words| words.join(" "))
}

/// A corpus: distinct doc ids, one or two paragraphs each.
fn corpus_strategy() -> impl Strategy<Value = Vec<(u32, Vec<String>)>> {
    prop::collection::btree_map(0u32..200, prop::collection::vec(paragraph_strategy(), 1..3), 1..6)
        .prop_map(|docs| docs.into_iter().collect())
}

/// Rebuild the (doc, pos) → token map the way the index builder saw it.
fn token_map(docs: &[(u32, Vec<String>)]) -> HashMap<(u32, u32), (String, bool)> {
    let mut map = HashMap::new();
    let mut tokenizer = Tokenizer::new();
    for (doc_id, paragraphs) in docs {
        tokenizer.reset();
        for paragraph in paragraphs {
            for token in tokenizer.tokenize(paragraph) {
                // Saturated positions collide; keep the first writer, the
                // invariant below skips saturated hits.
                map.entry((*doc_id, token.position)).or_insert((token.text, token.is_capital));
            }
        }
    }
    map
}

// ============================================================================
// INVARIANTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every hit stored under a term decodes back to that term.
    #[test]
    fn prop_hits_decode_to_their_term(docs in corpus_strategy()) {
        let index = InvertedIndex::build(&docs, false).unwrap();
        let tokens = token_map(&docs);

        for (term, hits) in &index.lexicon {
            for hit in hits {
                if hit.pos() == MAX_POSITION {
                    continue;
                }
                let (text, is_capital) = tokens
                    .get(&(hit.doc(), hit.pos()))
                    .unwrap_or_else(|| panic!("no token at {}:{}", hit.doc(), hit.pos()));
                prop_assert_eq!(text, term);
                prop_assert_eq!(*is_capital, hit.is_capital());
            }
        }
    }

    /// Positions stay in the packable range.
    #[test]
    fn prop_positions_in_range(docs in corpus_strategy()) {
        let index = InvertedIndex::build(&docs, false).unwrap();
        for hits in index.lexicon.values() {
            for hit in hits {
                prop_assert!(hit.pos() >= 1);
                prop_assert!(hit.pos() <= MAX_POSITION);
            }
        }
    }

    /// No hitlist repeats a (doc, pos) pair.
    #[test]
    fn prop_no_duplicate_positions(docs in corpus_strategy()) {
        let index = InvertedIndex::build(&docs, false).unwrap();
        for (term, hits) in &index.lexicon {
            let mut seen = HashSet::new();
            for hit in hits {
                prop_assert!(
                    seen.insert((hit.doc(), hit.pos())),
                    "duplicate (doc, pos) in hitlist for '{}'", term
                );
            }
        }
    }

    /// The derived-set quotas hold exactly.
    #[test]
    fn prop_derived_set_sizes(docs in corpus_strategy()) {
        let index = InvertedIndex::build(&docs, false).unwrap();
        let common_quota = (index.lexicon.len() as f64 * COMMON_WORD_RATIO) as usize;
        let blacklist_quota =
            (index.doc_word_count.len() as f64 * UPPER_ELIMINATION_RATIO) as usize;
        prop_assert_eq!(index.common_words.len(), common_quota);
        prop_assert_eq!(index.doc_blacklist.len(), blacklist_quota);
    }

    /// Barrels partition the lexicon: every term in exactly one barrel,
    /// key ranges non-overlapping, union complete.
    #[test]
    fn prop_barrels_partition_lexicon(docs in corpus_strategy()) {
        let index = InvertedIndex::build(&docs, false).unwrap();
        let barrels = shard_lexicon(&index.lexicon);

        let mut seen: HashSet<&String> = HashSet::new();
        let mut previous_last: Option<&String> = None;
        for barrel in &barrels {
            prop_assert_eq!(&barrel.key, &barrel.pairs[0].0);
            for window in barrel.pairs.windows(2) {
                prop_assert!(window[0].0 < window[1].0);
            }
            if let Some(last) = previous_last {
                prop_assert!(*last < barrel.key);
            }
            previous_last = Some(&barrel.pairs.last().unwrap().0);

            for (term, _) in &barrel.pairs {
                prop_assert!(seen.insert(term), "term '{}' in two barrels", term);
            }
        }
        let keys: HashSet<&String> = index.lexicon.keys().collect();
        prop_assert_eq!(seen, keys);
    }
}

// A quota large enough to bite needs more terms than proptest should
// generate; pin it deterministically.
#[test]
fn common_word_quota_at_scale() {
    let text = (0..2400).map(|i| format!("w{i:04}")).collect::<Vec<_>>().join(" ");
    let index = InvertedIndex::build(&[(1, vec![text])], false).unwrap();
    assert_eq!(index.lexicon.len(), 2400);
    assert_eq!(index.common_words.len(), 2);
}

#[test]
fn sharding_an_empty_lexicon_yields_no_barrels() {
    assert!(shard_lexicon(&Lexicon::new()).is_empty());
}
