//! Shared fixtures: a seeded corpus store and engine configs over temp dirs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use telusuri::{BarrelMode, Config, Mode};

/// Create a corpus store at `path` with the given paragraphs (in row
/// order) and page metadata.
pub fn seed_corpus(
    path: &Path,
    paragraphs: &[(i64, &str)],
    pages: &[(i64, Option<&str>, Option<&str>)],
) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE page_paragraph (page_id INTEGER, paragraph TEXT);
         CREATE TABLE page_information (id_page INTEGER, title TEXT, url TEXT);",
    )
    .unwrap();

    for (id, text) in paragraphs {
        conn.execute("INSERT INTO page_paragraph VALUES (?1, ?2)", (id, text)).unwrap();
    }
    for (id, title, url) in pages {
        conn.execute("INSERT INTO page_information VALUES (?1, ?2, ?3)", (id, title, url))
            .unwrap();
    }
}

pub fn config(mode: Mode, use_gst: bool, database: PathBuf, data_dir: PathBuf) -> Config {
    Config { mode, use_gst, barrel_mode: BarrelMode::Local, database, data_dir }
}
