// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Barrel-sharded persistence for the index.
//!
//! Four files, written next to each other in the data directory. Their
//! names are wire format — other tooling greps for them:
//!
//! - `telusuri_wordpairs.pkl` — the lexicon, sharded into barrels
//! - `telusuri_docpairs.pkl` — document-keyed hitlists (suffix-tree path)
//! - `telusuri_gst.pkl` — the serialized suffix tree
//! - `telusuri_docwordcount.pkl` — per-document word counts
//!
//! A barrel is an ascending contiguous slice of the term → hitlist map,
//! keyed by the smallest term it holds. Sharding targets 64 barrels:
//! `barrel_size = |lexicon| / 64`, each full buffer flushed under its first
//! term. The under-sized tail buffer is flushed too — dropping it would
//! lose terms and break the partition property.
//!
//! Sharding is a serialization strategy, not a working-set reducer: query
//! mode unions every barrel back into one in-memory lexicon.
//!
//! Every file is a 16-byte header, a brotli-compressed payload, and a CRC32
//! footer (see [`header`]). Rebuilds delete all four files up front;
//! anything missing or corrupt in search mode is fatal.

pub mod encoding;
pub mod header;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::gst::Gst;
use crate::hit::Hit;
use crate::index::Lexicon;
use encoding::{decode_hits, decode_str, decode_varint, encode_hits, encode_str, encode_varint};
use header::{StoreFooter, StoreHeader, StoreKind, MAX_RAW_LEN, VERSION};

pub const WORDPAIRS_FILE: &str = "telusuri_wordpairs.pkl";
pub const DOCPAIRS_FILE: &str = "telusuri_docpairs.pkl";
pub const GST_FILE: &str = "telusuri_gst.pkl";
pub const DOC_WORD_COUNT_FILE: &str = "telusuri_docwordcount.pkl";

/// Target number of lexicon shards.
pub const BARREL_COUNT: usize = 64;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 9;
const BROTLI_LGWIN: u32 = 22;

/// One shard of the lexicon: an ascending run of (term, hitlist) pairs
/// keyed by its lexicographically smallest term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barrel {
    pub key: String,
    pub pairs: Vec<(String, Vec<Hit>)>,
}

/// Shard a lexicon into barrels, terms ascending.
pub fn shard_lexicon(lexicon: &Lexicon) -> Vec<Barrel> {
    let mut terms: Vec<&String> = lexicon.keys().collect();
    terms.sort_unstable();

    let barrel_size = lexicon.len() / BARREL_COUNT;
    let mut barrels = Vec::new();
    let mut buffer: Vec<(String, Vec<Hit>)> = Vec::new();

    for term in terms {
        buffer.push((term.clone(), lexicon[term].clone()));
        if buffer.len() == barrel_size {
            flush_barrel(&mut buffer, &mut barrels);
        }
    }
    // The tail buffer is flushed even when under-sized, so the barrels
    // partition the lexicon.
    flush_barrel(&mut buffer, &mut barrels);

    barrels
}

fn flush_barrel(buffer: &mut Vec<(String, Vec<Hit>)>, barrels: &mut Vec<Barrel>) {
    if buffer.is_empty() {
        return;
    }
    let key = buffer[0].0.clone();
    barrels.push(Barrel { key, pairs: std::mem::take(buffer) });
}

/// Owner of the four persisted stores.
///
/// File handles are scoped to each operation, so every exit path releases
/// them; `close` flushes directory metadata once and is idempotent (the
/// search path and the final cleanup may both call it).
#[derive(Debug)]
pub struct BarrelStore {
    dir: PathBuf,
    dirty: bool,
    closed: bool,
}

impl BarrelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        BarrelStore { dir: dir.into(), dirty: false, closed: false }
    }

    pub fn wordpairs_path(&self) -> PathBuf {
        self.dir.join(WORDPAIRS_FILE)
    }

    pub fn docpairs_path(&self) -> PathBuf {
        self.dir.join(DOCPAIRS_FILE)
    }

    pub fn gst_path(&self) -> PathBuf {
        self.dir.join(GST_FILE)
    }

    pub fn word_count_path(&self) -> PathBuf {
        self.dir.join(DOC_WORD_COUNT_FILE)
    }

    /// Entering reindex mode drops every existing store before writing.
    pub fn prepare_reindex(&mut self) -> Result<()> {
        for path in
            [self.wordpairs_path(), self.docpairs_path(), self.gst_path(), self.word_count_path()]
        {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::Store(e)),
            }
        }
        Ok(())
    }

    /// Require the stores a search-mode startup needs. Missing files are
    /// fatal before any decode is attempted.
    pub fn require_search_files(&self, use_gst: bool) -> Result<()> {
        let mut needed = vec![self.wordpairs_path(), self.word_count_path()];
        if use_gst {
            needed.push(self.docpairs_path());
            needed.push(self.gst_path());
        }
        for path in needed {
            if !path.exists() {
                return Err(Error::Store(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("missing store file {}", path.display()),
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lexicon barrels
    // ------------------------------------------------------------------

    /// Shard and persist the lexicon.
    pub fn store_lexicon(&mut self, lexicon: &Lexicon) -> Result<()> {
        let barrels = shard_lexicon(lexicon);

        let mut payload = Vec::new();
        encode_varint(barrels.len() as u64, &mut payload);
        for barrel in &barrels {
            encode_str(&barrel.key, &mut payload);
            encode_varint(barrel.pairs.len() as u64, &mut payload);
            for (term, hits) in &barrel.pairs {
                encode_str(term, &mut payload);
                encode_hits(hits, &mut payload);
            }
        }

        self.write_store(StoreKind::Lexicon, &self.wordpairs_path(), &payload)
    }

    /// Read the barrels back in key order.
    pub fn load_barrels(&self) -> Result<Vec<Barrel>> {
        let payload = self.read_store(StoreKind::Lexicon, &self.wordpairs_path())?;
        let bytes = payload.as_slice();

        let (count, mut pos) = decode_varint(bytes).map_err(corrupt(WORDPAIRS_FILE))?;
        let mut barrels = Vec::new();
        for _ in 0..count {
            let (key, used) = decode_str(&bytes[pos..]).map_err(corrupt(WORDPAIRS_FILE))?;
            pos += used;
            let (pair_count, used) = decode_varint(&bytes[pos..]).map_err(corrupt(WORDPAIRS_FILE))?;
            pos += used;

            let mut pairs = Vec::with_capacity(pair_count as usize);
            for _ in 0..pair_count {
                let (term, used) = decode_str(&bytes[pos..]).map_err(corrupt(WORDPAIRS_FILE))?;
                pos += used;
                let (hits, used) = decode_hits(&bytes[pos..]).map_err(corrupt(WORDPAIRS_FILE))?;
                pos += used;
                pairs.push((term, hits));
            }
            barrels.push(Barrel { key, pairs });
        }
        Ok(barrels)
    }

    /// Union every barrel into one in-memory lexicon.
    pub fn load_lexicon(&self) -> Result<Lexicon> {
        let mut lexicon = Lexicon::new();
        for barrel in self.load_barrels()? {
            lexicon.extend(barrel.pairs);
        }
        Ok(lexicon)
    }

    // ------------------------------------------------------------------
    // Blob stores
    // ------------------------------------------------------------------

    pub fn store_doc_pairs(&mut self, doc_pairs: &HashMap<u32, Vec<Hit>>) -> Result<()> {
        let mut entries: Vec<(&u32, &Vec<Hit>)> = doc_pairs.iter().collect();
        entries.sort_unstable_by_key(|(doc, _)| **doc);

        let mut payload = Vec::new();
        encode_varint(entries.len() as u64, &mut payload);
        for (doc, hits) in entries {
            encode_varint(u64::from(*doc), &mut payload);
            encode_hits(hits, &mut payload);
        }
        self.write_store(StoreKind::DocPairs, &self.docpairs_path(), &payload)
    }

    pub fn load_doc_pairs(&self) -> Result<HashMap<u32, Vec<Hit>>> {
        let payload = self.read_store(StoreKind::DocPairs, &self.docpairs_path())?;
        let bytes = payload.as_slice();

        let (count, mut pos) = decode_varint(bytes).map_err(corrupt(DOCPAIRS_FILE))?;
        let mut doc_pairs = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let (doc, used) = decode_varint(&bytes[pos..]).map_err(corrupt(DOCPAIRS_FILE))?;
            pos += used;
            let doc = u32::try_from(doc)
                .map_err(|_| Error::Corrupt(format!("{DOCPAIRS_FILE}: doc id exceeds 32 bits")))?;
            let (hits, used) = decode_hits(&bytes[pos..]).map_err(corrupt(DOCPAIRS_FILE))?;
            pos += used;
            doc_pairs.insert(doc, hits);
        }
        Ok(doc_pairs)
    }

    pub fn store_word_counts(&mut self, counts: &HashMap<u32, u32>) -> Result<()> {
        let mut entries: Vec<(u32, u32)> = counts.iter().map(|(&d, &c)| (d, c)).collect();
        entries.sort_unstable();

        let mut payload = Vec::new();
        encode_varint(entries.len() as u64, &mut payload);
        for (doc, count) in entries {
            encode_varint(u64::from(doc), &mut payload);
            encode_varint(u64::from(count), &mut payload);
        }
        self.write_store(StoreKind::WordCount, &self.word_count_path(), &payload)
    }

    pub fn load_word_counts(&self) -> Result<HashMap<u32, u32>> {
        let payload = self.read_store(StoreKind::WordCount, &self.word_count_path())?;
        let bytes = payload.as_slice();

        let (count, mut pos) = decode_varint(bytes).map_err(corrupt(DOC_WORD_COUNT_FILE))?;
        let mut counts = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let (doc, used) = decode_varint(&bytes[pos..]).map_err(corrupt(DOC_WORD_COUNT_FILE))?;
            pos += used;
            let (words, used) =
                decode_varint(&bytes[pos..]).map_err(corrupt(DOC_WORD_COUNT_FILE))?;
            pos += used;
            let doc = u32::try_from(doc).map_err(|_| {
                Error::Corrupt(format!("{DOC_WORD_COUNT_FILE}: doc id exceeds 32 bits"))
            })?;
            let words = u32::try_from(words).map_err(|_| {
                Error::Corrupt(format!("{DOC_WORD_COUNT_FILE}: count exceeds 32 bits"))
            })?;
            counts.insert(doc, words);
        }
        Ok(counts)
    }

    pub fn store_suffix_tree(&mut self, gst: &Gst) -> Result<()> {
        let payload = gst.encode_payload();
        self.write_store(StoreKind::SuffixTree, &self.gst_path(), &payload)
    }

    pub fn load_suffix_tree(&self) -> Result<Gst> {
        let payload = self.read_store(StoreKind::SuffixTree, &self.gst_path())?;
        Gst::decode_payload(&payload).map_err(|e| Error::Corrupt(format!("{GST_FILE}: {e}")))
    }

    /// Flush directory metadata after writes. Safe to call more than once;
    /// the second call is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.dirty {
            let dir = fs::File::open(&self.dir)?;
            dir.sync_all()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared file plumbing
    // ------------------------------------------------------------------

    fn write_store(&mut self, kind: StoreKind, path: &Path, payload: &[u8]) -> Result<()> {
        let mut compressed = Vec::new();
        {
            let mut encoder = brotli::CompressorWriter::new(
                &mut compressed,
                BROTLI_BUFFER,
                BROTLI_QUALITY,
                BROTLI_LGWIN,
            );
            encoder.write_all(payload)?;
        }

        let header = StoreHeader {
            version: VERSION,
            kind,
            raw_len: payload.len() as u32,
            stored_len: compressed.len() as u32,
        };

        let mut bytes = Vec::with_capacity(StoreHeader::SIZE + compressed.len() + StoreFooter::SIZE);
        header.write(&mut bytes)?;
        bytes.extend_from_slice(&compressed);
        let footer = StoreFooter { crc32: StoreFooter::compute_crc32(&bytes) };
        footer.write(&mut bytes)?;

        fs::write(path, &bytes)?;
        self.dirty = true;
        Ok(())
    }

    fn read_store(&self, kind: StoreKind, path: &Path) -> Result<Vec<u8>> {
        let bytes = fs::read(path)?;
        if bytes.len() < StoreHeader::SIZE + StoreFooter::SIZE {
            return Err(Error::Corrupt(format!("{}: file too small", path.display())));
        }

        let footer = StoreFooter::read(&bytes)
            .map_err(|e| Error::Corrupt(format!("{}: {e}", path.display())))?;
        let content = &bytes[..bytes.len() - StoreFooter::SIZE];
        if footer.crc32 != StoreFooter::compute_crc32(content) {
            return Err(Error::Corrupt(format!("{}: CRC mismatch", path.display())));
        }

        let header = StoreHeader::read(&mut &bytes[..])
            .map_err(|e| Error::Corrupt(format!("{}: {e}", path.display())))?;
        if header.kind != kind {
            return Err(Error::Corrupt(format!(
                "{}: expected store kind {:?}, found {:?}",
                path.display(),
                kind,
                header.kind
            )));
        }

        let stored = content
            .get(StoreHeader::SIZE..)
            .filter(|s| s.len() == header.stored_len as usize)
            .ok_or_else(|| Error::Corrupt(format!("{}: payload length mismatch", path.display())))?;

        let mut payload = Vec::with_capacity(header.raw_len as usize);
        let mut decoder = brotli::Decompressor::new(stored, BROTLI_BUFFER);
        decoder
            .read_to_end(&mut payload)
            .map_err(|e| Error::Corrupt(format!("{}: decompression failed: {e}", path.display())))?;

        if payload.len() != header.raw_len as usize || payload.len() > MAX_RAW_LEN as usize {
            return Err(Error::Corrupt(format!(
                "{}: decompressed to {} bytes, header declared {}",
                path.display(),
                payload.len(),
                header.raw_len
            )));
        }
        Ok(payload)
    }
}

impl Drop for BarrelStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn corrupt(file: &'static str) -> impl Fn(io::Error) -> Error {
    move |e| Error::Corrupt(format!("{file}: {e}"))
}
