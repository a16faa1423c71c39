// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Read-only adapter over the corpus store the crawler populates.
//!
//! Two tables matter: `page_paragraph` (one row per extracted paragraph,
//! in crawl order) and `page_information` (title and URL per page). The
//! adapter never writes.
//!
//! `read_paragraphs` preserves row order and groups consecutive rows of
//! the same page; the crawler inserts documents one at a time, so rows of
//! one document are contiguous and in their original intra-document order.
//! The index builder depends on that contiguity.
//!
//! Every page id is checked against the 19-bit hit limit on the way in —
//! a corpus that outgrew the id space fails loudly at build time instead
//! of silently corrupting hits.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::{Error, Result};
use crate::hit::MAX_DOC_ID;

/// Read-only handle on the corpus store.
#[derive(Debug)]
pub struct PageRepo {
    conn: Connection,
}

impl PageRepo {
    /// Open the store read-only; fails if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(PageRepo { conn })
    }

    /// All paragraphs, grouped by page in encounter order.
    pub fn read_paragraphs(&self) -> Result<Vec<(u32, Vec<String>)>> {
        let mut stmt = self.conn.prepare("SELECT page_id, paragraph FROM page_paragraph")?;
        let rows =
            stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut grouped: Vec<(u32, Vec<String>)> = Vec::new();
        for row in rows {
            let (raw_id, paragraph) = row?;
            let id = check_doc_id(raw_id)?;
            match grouped.last_mut() {
                Some((current, paragraphs)) if *current == id => paragraphs.push(paragraph),
                _ => grouped.push((id, vec![paragraph])),
            }
        }
        Ok(grouped)
    }

    /// `(id_page, title)` rows for the suffix-tree build. Titles may be
    /// NULL.
    pub fn read_titles(&self) -> Result<Vec<(u32, Option<String>)>> {
        let mut stmt = self.conn.prepare("SELECT id_page, title FROM page_information")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?)))?;

        let mut titles = Vec::new();
        for row in rows {
            let (raw_id, title) = row?;
            titles.push((check_doc_id(raw_id)?, title));
        }
        Ok(titles)
    }

    /// Title and URL for the given pages, for decorating results. Pages
    /// missing from `page_information` are simply absent from the map.
    pub fn read_page_meta(&self, ids: &[u32]) -> Result<HashMap<u32, (String, String)>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT id_page, title, url FROM page_information WHERE id_page IN ({placeholders})"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut meta = HashMap::new();
        for row in rows {
            let (raw_id, title, url) = row?;
            meta.insert(
                check_doc_id(raw_id)?,
                (title.unwrap_or_default(), url.unwrap_or_default()),
            );
        }
        Ok(meta)
    }
}

fn check_doc_id(id: i64) -> Result<u32> {
    if (0..=i64::from(MAX_DOC_ID)).contains(&id) {
        Ok(id as u32)
    } else {
        Err(Error::DocIdOverflow(id))
    }
}
