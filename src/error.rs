// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Crate-wide error type.
//!
//! One enum, hand-rolled `Display`, and `From` impls for the two external
//! error sources (the corpus store and the filesystem). Build-stage errors
//! are fatal; the query path contains ranking failures at the engine
//! boundary instead of propagating them to the shell.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Bad or unsupported configuration, fatal at startup.
    Config(String),
    /// The corpus store failed (connection, query, schema).
    Corpus(rusqlite::Error),
    /// A persisted store could not be read or written.
    Store(io::Error),
    /// A persisted store decoded to garbage (bad magic, CRC mismatch,
    /// truncated payload).
    Corrupt(String),
    /// A document id above the 19-bit hit limit (524287).
    DocIdOverflow(i64),
    /// Ranking failed mid-query; contained at the engine boundary.
    Rank(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Corpus(e) => write!(f, "corpus store error: {e}"),
            Error::Store(e) => write!(f, "persistence error: {e}"),
            Error::Corrupt(msg) => write!(f, "corrupt store: {msg}"),
            Error::DocIdOverflow(id) => {
                write!(f, "document id {id} exceeds the representable limit (524287)")
            }
            Error::Rank(msg) => write!(f, "ranking error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Corpus(e) => Some(e),
            Error::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Store(e)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Corpus(e)
    }
}
