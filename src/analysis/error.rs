// Sat Oct 17 2026 - Alex

use crate::disasm::DisassembleError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("analysis has not been created; call create_analysis first")]
    NotCreated,
    #[error(transparent)]
    Disassemble(#[from] DisassembleError),
}
