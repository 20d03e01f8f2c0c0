// Tue Oct 13 2026 - Alex

use crate::reader::ReaderError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Strings,
    Types,
    Protos,
    Fields,
    Methods,
    Classes,
}

impl PoolKind {
    pub fn entry_size(&self) -> usize {
        match self {
            PoolKind::Strings | PoolKind::Types => 4,
            PoolKind::Protos => 12,
            PoolKind::Fields | PoolKind::Methods => 8,
            PoolKind::Classes => 32,
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolKind::Strings => "string",
            PoolKind::Types => "type",
            PoolKind::Protos => "proto",
            PoolKind::Fields => "field",
            PoolKind::Methods => "method",
            PoolKind::Classes => "class",
        };
        f.write_str(name)
    }
}

/// Whole-file failures. Anything raised here aborts the parse.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("bad DEX magic: {0:02x?}")]
    BadMagic(Vec<u8>),
    #[error("unsupported DEX version {0:03}")]
    UnsupportedVersion(u16),
    #[error("header declares file size {declared}, buffer holds {actual} bytes")]
    HeaderSizeMismatch { declared: u32, actual: usize },
    #[error("invalid header size {0:#x}")]
    InvalidHeaderSize(u32),
    #[error("unsupported endian tag {0:#010x}")]
    UnsupportedEndian(u32),
    #[error("{pool} table at {offset:#x} with {count} entries lies outside the file")]
    PoolOutOfBounds { pool: PoolKind, offset: u32, count: u32 },
    #[error("truncated header: {0}")]
    Truncated(#[from] ReaderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Entry-scoped problems. The parser records them and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    #[error("truncated data in {context}: {source}")]
    Truncated {
        context: String,
        #[source]
        source: ReaderError,
    },
    #[error("dangling {pool} index {index} (pool size {size}) in {context}")]
    DanglingReference {
        pool: PoolKind,
        index: u32,
        size: u32,
        context: String,
    },
    #[error("malformed string #{index}: {reason}")]
    MalformedString { index: u32, reason: String },
    #[error("checksum mismatch: header says {declared:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { declared: u32, computed: u32 },
    #[error("malformed code item for {method}: {source}")]
    MalformedCodeItem {
        method: String,
        #[source]
        source: ReaderError,
    },
    #[error("malformed static values for {class}: {reason}")]
    MalformedStaticValues { class: String, reason: String },
}

impl ParseIssue {
    pub fn is_dangling_reference(&self) -> bool {
        matches!(self, ParseIssue::DanglingReference { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodedValueError {
    #[error(transparent)]
    Reader(#[from] ReaderError),
    #[error("unknown encoded value type {value_type:#04x} at offset {offset:#x}")]
    UnknownType { value_type: u8, offset: usize },
    #[error("invalid size {size} for encoded value type {value_type:#04x}")]
    InvalidSize { value_type: u8, size: usize },
    #[error("encoded values nested deeper than {0} levels")]
    TooDeep(usize),
}
