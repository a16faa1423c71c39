// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Paragraph tokenization and normalization.
//!
//! A paragraph is reduced to word tokens in three steps: every run of
//! non-word characters collapses to a single space, a small set of filter
//! strings left over from crawling is blanked out, and the result is split
//! on whitespace. Candidates are then vetted one by one:
//!
//! - empty and single-character words are dropped
//! - words longer than 30 characters are dropped (anything that long is a
//!   stripping failure upstream, not a word)
//! - a word matching `^[A-Z].*[A-Z]$` keeps its case and is flagged capital;
//!   everything else is lowercased
//!
//! The tokenizer owns the per-document position counter: it starts at 1,
//! advances once per *emitted* token (rejected candidates do not move it),
//! and saturates at 4095 so late tokens all share the final position.

use std::sync::LazyLock;

use regex::Regex;

use crate::hit::MAX_POSITION;

/// Leftovers the crawler should have stripped; blanked here as a backstop.
const FILTERED_STRINGS: [&str; 2] = ["\r\n\u{a0}", "\\"];

/// Tokens longer than this are discarded outright.
const MAX_TOKEN_CHARS: usize = 30;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("static regex"));

static CAPITAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z].*[A-Z]$").expect("static regex"));

/// Does this word keep its original case? True when it both starts and ends
/// with an ASCII uppercase letter (acronyms like `NASA`, `CPU`).
pub fn is_fully_capitalized(word: &str) -> bool {
    CAPITAL.is_match(word)
}

/// A normalized word together with where it sat in its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// 1-based ordinal of the word within the document, saturated at 4095.
    pub position: u32,
    pub is_capital: bool,
}

/// Per-document tokenizer state. Create one per document (or call
/// [`Tokenizer::reset`] between documents) so positions restart at 1.
#[derive(Debug)]
pub struct Tokenizer {
    next_pos: u32,
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer { next_pos: 1 }
    }

    /// Restart the position counter for the next document.
    pub fn reset(&mut self) {
        self.next_pos = 1;
    }

    /// Tokenize one paragraph, appending emitted tokens to `out`. The
    /// position counter carries over between paragraphs of one document.
    pub fn tokenize_into(&mut self, paragraph: &str, out: &mut Vec<Token>) {
        let mut cleaned = NON_WORD.replace_all(paragraph, " ").into_owned();
        for junk in FILTERED_STRINGS {
            if cleaned.contains(junk) {
                cleaned = cleaned.replace(junk, " ");
            }
        }

        for word in cleaned.split_whitespace() {
            let chars = word.chars().count();
            if chars <= 1 || chars > MAX_TOKEN_CHARS {
                continue;
            }

            let is_capital = is_fully_capitalized(word);
            let text = if is_capital { word.to_string() } else { word.to_lowercase() };

            out.push(Token { text, position: self.next_pos, is_capital });

            if self.next_pos < MAX_POSITION {
                self.next_pos += 1;
            }
        }
    }

    /// Convenience wrapper over [`Tokenizer::tokenize_into`].
    pub fn tokenize(&mut self, paragraph: &str) -> Vec<Token> {
        let mut out = Vec::new();
        self.tokenize_into(paragraph, &mut out);
        out
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}
