// Sat Oct 17 2026 - Alex

pub mod analysis;
pub mod config;
pub mod context;
pub mod dex;
pub mod disasm;
pub mod reader;
pub mod utils;

pub use analysis::{Analysis, AnalysisError, ClassAnalysis, FieldAnalysis, MethodAnalysis, StringAnalysis};
pub use config::Config;
pub use context::Context;
pub use dex::{Class, ClassId, DexFile, Field, Method, ParseError, ParseIssue};
pub use disasm::{DisassembleError, DisassembledMethod, Disassembler, Instruction};
