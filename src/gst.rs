// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Generalized suffix tree over document titles.
//!
//! Nodes live in an arena (`Vec` slots addressed by index) with child links
//! only — insertion is top-down and never needs a parent pointer. Edge
//! labels are substrings of normalized title words; every word gets the
//! terminal `$` appended before its suffixes are inserted, so a complete
//! lookup always lands on a `$`-terminated node.
//!
//! Titles are lowercased and stripped to `[a-z0-9 ]` before insertion, so
//! labels are pure ASCII and byte indexing is safe throughout.
//!
//! Lookup results are sorted ASCENDING by occurrence count. That is the
//! long-standing behavior of this index and downstream consumers order
//! candidates themselves, so it stays.

use std::collections::HashMap;
use std::io;
use std::sync::LazyLock;

use regex::Regex;

use crate::store::encoding::{decode_str, decode_varint, encode_str, encode_varint};

static TITLE_JUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9 ]+").expect("static regex"));

const TERMINAL: char = '$';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    label: String,
    children: Vec<u32>,
    /// Documents whose title contributed a suffix ending exactly here.
    /// Set semantics: a document appears at most once.
    docs: Vec<u32>,
}

/// Arena-backed generalized suffix tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gst {
    nodes: Vec<Node>,
}

impl Gst {
    pub fn new() -> Self {
        Gst { nodes: vec![Node::default()] }
    }

    /// Build the tree from `(docId, title)` rows. Null and empty titles are
    /// skipped.
    pub fn build(titles: &[(u32, Option<String>)]) -> Self {
        let mut gst = Gst::new();
        for (doc_id, title) in titles {
            if let Some(title) = title {
                if !title.is_empty() {
                    gst.insert_title(*doc_id, title);
                }
            }
        }
        gst
    }

    /// Number of arena nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Insert every suffix of every word of one title.
    pub fn insert_title(&mut self, doc_id: u32, title: &str) {
        let normalized = TITLE_JUNK.replace_all(&title.to_lowercase(), " ").into_owned();
        for word in normalized.split_whitespace() {
            let mut terminated = String::with_capacity(word.len() + 1);
            terminated.push_str(word);
            terminated.push(TERMINAL);
            for i in 0..terminated.len() {
                self.insert_suffix(&terminated[i..], doc_id);
            }
        }
    }

    fn insert_suffix(&mut self, mut suffix: &str, doc_id: u32) {
        let mut parent = 0usize;

        loop {
            let children = self.nodes[parent].children.clone();
            let shared = children.iter().find_map(|&child| {
                let k = common_prefix_len(&self.nodes[child as usize].label, suffix);
                (k > 0).then_some((child as usize, k))
            });

            let Some((child, k)) = shared else {
                // No child shares a prefix: the whole suffix becomes a leaf.
                let leaf = self.push_node(suffix.to_string(), Vec::new(), vec![doc_id]);
                self.nodes[parent].children.push(leaf);
                return;
            };

            let label_len = self.nodes[child].label.len();
            if k == label_len && k == suffix.len() {
                // Suffix already present; record the document once.
                if !self.nodes[child].docs.contains(&doc_id) {
                    self.nodes[child].docs.push(doc_id);
                }
                return;
            }
            if k == label_len {
                // Edge fully consumed; descend with the remainder.
                parent = child;
                suffix = &suffix[k..];
                continue;
            }

            // Partial overlap: split the edge at the shared prefix.
            self.split_edge(child, k, &suffix[k..], doc_id);
            return;
        }
    }

    /// Split `child`'s edge after `k` bytes. The tail keeps the old node's
    /// children and document list; the new remainder becomes a fresh leaf.
    fn split_edge(&mut self, child: usize, k: usize, rest: &str, doc_id: u32) {
        let tail_label = self.nodes[child].label.split_off(k);
        let tail_children = std::mem::take(&mut self.nodes[child].children);
        let tail_docs = std::mem::take(&mut self.nodes[child].docs);
        let tail = self.push_node(tail_label, tail_children, tail_docs);
        self.nodes[child].children.push(tail);

        if rest.is_empty() {
            // A suffix that is a proper prefix of an existing edge. The
            // terminal `$` makes this unreachable for real input; kept total
            // anyway.
            self.nodes[child].docs.push(doc_id);
        } else {
            let leaf = self.push_node(rest.to_string(), Vec::new(), vec![doc_id]);
            self.nodes[child].children.push(leaf);
        }
    }

    fn push_node(&mut self, label: String, children: Vec<u32>, docs: Vec<u32>) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(Node { label, children, docs });
        id
    }

    /// Look up every word of `input` and report `(docId, count)` pairs:
    /// how many of the words landed on that document's title. Words absent
    /// from the tree contribute nothing. Sorted ascending by count.
    pub fn find_tree(&self, input: &str) -> Vec<(u32, u32)> {
        let mut counts: HashMap<u32, u32> = HashMap::new();

        for word in input.split_whitespace() {
            let mut terminated = word.to_lowercase();
            terminated.push(TERMINAL);
            for doc in self.descend(&terminated) {
                *counts.entry(doc).or_insert(0) += 1;
            }
        }

        let mut result: Vec<(u32, u32)> = counts.into_iter().collect();
        result.sort_unstable_by_key(|&(doc, count)| (count, doc));
        result
    }

    /// Greedy descent: at each position pick the child whose label starts
    /// with the current byte and jump the cursor by the whole label.
    fn descend(&self, word: &str) -> Vec<u32> {
        let bytes = word.as_bytes();
        let mut node = 0usize;
        let mut pos = 0usize;

        while pos < bytes.len() {
            let target = bytes[pos];
            let mut next = None;
            for &child in &self.nodes[node].children {
                let label = self.nodes[child as usize].label.as_bytes();
                if label.first() == Some(&target) {
                    next = Some((child as usize, label.len()));
                    break;
                }
            }
            match next {
                Some((child, advance)) => {
                    node = child;
                    pos += advance;
                }
                None => return Vec::new(),
            }
        }

        self.nodes[node].docs.clone()
    }

    // ------------------------------------------------------------------
    // Serialization (store payload; framing and integrity live in `store`)
    // ------------------------------------------------------------------

    pub fn encode_payload(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint(self.nodes.len() as u64, &mut buf);
        for node in &self.nodes {
            encode_str(&node.label, &mut buf);
            encode_varint(node.children.len() as u64, &mut buf);
            for &child in &node.children {
                encode_varint(u64::from(child), &mut buf);
            }
            encode_varint(node.docs.len() as u64, &mut buf);
            for &doc in &node.docs {
                encode_varint(u64::from(doc), &mut buf);
            }
        }
        buf
    }

    pub fn decode_payload(bytes: &[u8]) -> io::Result<Self> {
        let (count, mut pos) = decode_varint(bytes)?;
        let count = count as usize;
        if count == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "suffix tree has no root"));
        }

        let mut nodes = Vec::with_capacity(count.min(1 << 20));
        for _ in 0..count {
            let (label, used) = decode_str(&bytes[pos..])?;
            pos += used;

            let (child_count, used) = decode_varint(&bytes[pos..])?;
            pos += used;
            let mut children = Vec::with_capacity((child_count as usize).min(1 << 16));
            for _ in 0..child_count {
                let (child, used) = decode_varint(&bytes[pos..])?;
                pos += used;
                if child >= count as u64 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("child id {child} out of range"),
                    ));
                }
                children.push(child as u32);
            }

            let (doc_count, used) = decode_varint(&bytes[pos..])?;
            pos += used;
            let mut docs = Vec::with_capacity((doc_count as usize).min(1 << 16));
            for _ in 0..doc_count {
                let (doc, used) = decode_varint(&bytes[pos..])?;
                pos += used;
                let doc = u32::try_from(doc).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidData, "doc id exceeds 32 bits")
                })?;
                docs.push(doc);
            }

            nodes.push(Node { label, children, docs });
        }

        Ok(Gst { nodes })
    }
}

impl Default for Gst {
    fn default() -> Self {
        Self::new()
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}
