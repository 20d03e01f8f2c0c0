// Tue Oct 13 2026 - Alex

pub mod access;
pub mod encoded;
pub mod error;
pub mod header;
pub mod model;
pub mod parser;
pub mod pools;
pub mod types;

pub use access::{AccessFlags, FlagTarget};
pub use encoded::{EncodedAnnotation, EncodedValue};
pub use error::{EncodedValueError, ParseError, ParseIssue, PoolKind};
pub use header::{DexHeader, Section};
pub use model::{Class, ClassId, CodeInfo, Field, Method};
pub use parser::DexFile;
pub use pools::{FieldRef, IdPool, MethodRef, Pools, Prototype, StringPool};
pub use types::Fundamental;
