// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display for query results.
//!
//! Formatted blocks, one per result: doc id and score on the first line,
//! title and URL underneath. Colors only when stdout is a real terminal
//! and `NO_COLOR` is unset — piping the output somewhere gets plain text.

use std::sync::OnceLock;

use telusuri::SearchResult;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const CYAN: &str = "\x1b[36m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

static COLOR: OnceLock<bool> = OnceLock::new();

/// Should output be colored? TTY on stdout, and `NO_COLOR` unset.
fn use_color() -> bool {
    *COLOR.get_or_init(|| {
        atty::is(atty::Stream::Stdout) && std::env::var_os("NO_COLOR").is_none()
    })
}

/// Wrap `text` in an ANSI style when the terminal supports it.
pub fn styled(style: &str, text: &str) -> String {
    if use_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Print up to `limit` results as `DocID | Score | Title | URL` blocks.
pub fn print_results(results: &[SearchResult], limit: usize) {
    println!();
    println!("{}", styled(BOLD, "======"));
    println!("{}", styled(BOLD, "RESULT"));
    println!("{}", styled(BOLD, "======"));
    println!();

    if results.is_empty() {
        println!("{}", styled(DIM, "(no results)"));
        println!();
        return;
    }

    for result in results.iter().take(limit) {
        println!(
            "DocID: {} | Score: {}",
            styled(CYAN, &result.doc_id.to_string()),
            styled(GREEN, &format!("{:.4}", result.score)),
        );
        println!("Title: {}", styled(BOLD, &result.title));
        println!("URL: {}", styled(YELLOW, &result.url));
        println!("{}", styled(DIM, "======================="));
        println!();
    }
}
