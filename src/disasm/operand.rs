// Thu Oct 15 2026 - Alex

use crate::disasm::ReferenceKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(u16),
    RegisterRange { first: u16, count: u16 },
    Literal(i64),
    /// Relative branch distance in code units.
    Branch(i32),
    Index { kind: ReferenceKind, index: u32 },
}

impl Operand {
    pub fn as_register(&self) -> Option<u16> {
        match self {
            Operand::Register(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Operand::Literal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<i32> {
        match self {
            Operand::Branch(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<(ReferenceKind, u32)> {
        match self {
            Operand::Index { kind, index } => Some((*kind, *index)),
            _ => None,
        }
    }

    /// Registers named by this operand, expanding ranges.
    pub fn registers(&self) -> Vec<u16> {
        match self {
            Operand::Register(r) => vec![*r],
            Operand::RegisterRange { first, count } => {
                (0..*count).map(|i| first.wrapping_add(i)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Raw numeric payload used by the encoder.
    pub(crate) fn scalar(&self) -> Option<i64> {
        match self {
            Operand::Literal(v) => Some(*v),
            Operand::Branch(b) => Some(*b as i64),
            Operand::Index { index, .. } => Some(*index as i64),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "v{}", r),
            Operand::RegisterRange { first, count } if *count == 0 => write!(f, "{{}} @v{}", first),
            Operand::RegisterRange { first, count } => {
                write!(f, "{{v{} .. v{}}}", first, *first as u32 + *count as u32 - 1)
            }
            Operand::Literal(v) if *v < 0 => write!(f, "#-{:#x}", v.unsigned_abs()),
            Operand::Literal(v) => write!(f, "#{:#x}", v),
            Operand::Branch(b) if *b < 0 => write!(f, "-{}", b.unsigned_abs()),
            Operand::Branch(b) => write!(f, "+{}", b),
            Operand::Index { kind, index } => write!(f, "{:?}@{}", kind, index),
        }
    }
}
