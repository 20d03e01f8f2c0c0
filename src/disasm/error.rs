// Thu Oct 15 2026 - Alex

use crate::reader::ReaderError;
use thiserror::Error;

/// Instruction-scoped problems. Decoding continues past them; they are kept
/// on the resulting `DisassembledMethod`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeIssue {
    #[error("unknown opcode {opcode:#04x} at {offset:#x}")]
    UnknownOpcode { offset: u32, opcode: u8 },
    #[error("instruction at {offset:#x} needs {needed} code units, {available} left")]
    TruncatedInstruction {
        offset: u32,
        needed: u32,
        available: u32,
    },
    #[error("malformed payload at {offset:#x}: {reason}")]
    MalformedPayload { offset: u32, reason: String },
    #[error("payload at {offset:#x} is not referenced by any instruction")]
    OrphanPayload { offset: u32 },
    #[error("invalid register count {count} at {offset:#x}")]
    InvalidRegisterCount { offset: u32, count: u8 },
}

impl DecodeIssue {
    pub fn offset(&self) -> u32 {
        match self {
            DecodeIssue::UnknownOpcode { offset, .. }
            | DecodeIssue::TruncatedInstruction { offset, .. }
            | DecodeIssue::MalformedPayload { offset, .. }
            | DecodeIssue::OrphanPayload { offset }
            | DecodeIssue::InvalidRegisterCount { offset, .. } => *offset,
        }
    }
}

/// Method-scoped failures. The rest of the file stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisassembleError {
    #[error("code of {method} lies outside the file: {source}")]
    Truncated {
        method: String,
        #[source]
        source: ReaderError,
    },
    #[error("malformed try block in {method}: {reason}")]
    MalformedTryBlock { method: String, reason: String },
    #[error("malformed catch handlers in {method}: {source}")]
    MalformedHandlers {
        method: String,
        #[source]
        source: ReaderError,
    },
}
