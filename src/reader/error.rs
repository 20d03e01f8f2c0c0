// Mon Oct 12 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error("truncated data: {len} bytes at offset {offset:#x} exceed buffer of {size} bytes")]
    TruncatedData { offset: usize, len: usize, size: usize },
    #[error("malformed LEB128 value at offset {offset:#x}")]
    MalformedLeb128 { offset: usize },
    #[error("malformed string at offset {offset:#x}: {reason}")]
    MalformedString { offset: usize, reason: String },
}

impl ReaderError {
    pub fn is_truncation(&self) -> bool {
        matches!(self, ReaderError::TruncatedData { .. })
    }
}
