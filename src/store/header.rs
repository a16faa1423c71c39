// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Store file header and footer.
//!
//! Every persisted store starts with a 16-byte fixed header — magic,
//! format version, store kind, raw and stored payload lengths — and ends
//! with an 8-byte footer: a CRC32 over everything before it plus the
//! header magic reversed. A wrong footer means truncation or corruption;
//! don't trust the data.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

/// Header magic: "TLSR" in ASCII.
pub const MAGIC: [u8; 4] = *b"TLSR";

/// Footer magic: "RSLT" (reversed, marks a complete file).
pub const FOOTER_MAGIC: [u8; 4] = *b"RSLT";

/// Current store format version.
pub const VERSION: u8 = 1;

/// Maximum decompressed payload: 1 GiB. Prevents a corrupt length field
/// from driving a huge allocation.
pub const MAX_RAW_LEN: u32 = 1 << 30;

/// Which of the four stores a file holds. The kind is checked on read so a
/// file renamed into the wrong slot fails loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StoreKind {
    /// The barrel-sharded lexicon.
    Lexicon = 0,
    /// Document-keyed hitlists.
    DocPairs = 1,
    /// The generalized suffix tree over titles.
    SuffixTree = 2,
    /// Per-document word counts.
    WordCount = 3,
}

impl StoreKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StoreKind::Lexicon),
            1 => Some(StoreKind::DocPairs),
            2 => Some(StoreKind::SuffixTree),
            3 => Some(StoreKind::WordCount),
            _ => None,
        }
    }
}

/// Fixed-size store header (16 bytes).
#[derive(Debug, Clone)]
pub struct StoreHeader {
    pub version: u8,
    pub kind: StoreKind,
    /// Payload length before compression.
    pub raw_len: u32,
    /// Payload length as stored (after compression).
    pub stored_len: u32,
}

impl StoreHeader {
    // 4 (magic) + 1 (version) + 1 (kind) + 2 (reserved) + 4 + 4 = 16
    pub const SIZE: usize = 16;

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version])?;
        w.write_all(&[self.kind as u8])?;
        w.write_all(&[0u8; 2])?; // reserved
        w.write_all(&self.raw_len.to_le_bytes())?;
        w.write_all(&self.stored_len.to_le_bytes())?;
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid magic: expected TLSR, got {magic:?}"),
            ));
        }

        let mut buf = [0u8; 12];
        r.read_exact(&mut buf)?;

        let version = buf[0];
        if version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported store version {version}"),
            ));
        }

        let kind = StoreKind::from_u8(buf[1]).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, format!("unknown store kind {}", buf[1]))
        })?;
        // buf[2..4] is reserved

        let raw_len = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let stored_len = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);

        if raw_len > MAX_RAW_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("declared payload of {raw_len} bytes exceeds the limit"),
            ));
        }

        Ok(Self { version, kind, raw_len, stored_len })
    }
}

/// Footer with CRC32 checksum and magic number (8 bytes).
#[derive(Debug, Clone)]
pub struct StoreFooter {
    /// CRC32 of header + stored payload (everything before the footer).
    pub crc32: u32,
}

impl StoreFooter {
    pub const SIZE: usize = 8;

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "file too short for footer"));
        }

        let start = bytes.len() - Self::SIZE;
        if bytes[start + 4..] != FOOTER_MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid footer magic"));
        }

        let crc32 =
            u32::from_le_bytes([bytes[start], bytes[start + 1], bytes[start + 2], bytes[start + 3]]);
        Ok(Self { crc32 })
    }

    /// CRC32 over the given bytes.
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}
