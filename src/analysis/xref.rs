// Sat Oct 17 2026 - Alex

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// One end of a cross reference: the entity on the other side and the byte
/// offset of the referencing instruction inside the source method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Site {
    pub entity: String,
    pub offset: u32,
}

impl Site {
    pub fn new(entity: impl Into<String>, offset: u32) -> Self {
        Self {
            entity: entity.into(),
            offset,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ 0x{:x}", self.entity, self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RefKind {
    Call,
    FieldRead,
    FieldWrite,
    NewInstance,
    ConstClass,
}

impl RefKind {
    pub fn name(&self) -> &'static str {
        match self {
            RefKind::Call => "call",
            RefKind::FieldRead => "read",
            RefKind::FieldWrite => "write",
            RefKind::NewInstance => "new-instance",
            RefKind::ConstClass => "const-class",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Class-level edge. On `xref_to` the class is the target and `method` the
/// referencing method of the owning class; on `xref_from` the class is the
/// source and `method` the source method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassXref {
    pub class: String,
    pub kind: RefKind,
    pub method: String,
    pub offset: u32,
}

/// Insert-only edge set shared between analysis workers.
#[derive(Debug)]
pub struct XrefSet<T: Ord> {
    inner: RwLock<BTreeSet<T>>,
}

impl<T: Ord + Clone> XrefSet<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeSet::new()),
        }
    }

    /// Returns false when the edge was already present.
    pub fn insert(&self, value: T) -> bool {
        self.inner.write().insert(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.inner.read().contains(value)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Sorted copy of the current edges.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.read().iter().cloned().collect()
    }
}

impl<T: Ord + Clone> Default for XrefSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl XrefSet<Site> {
    /// Distinct entities, dropping offsets.
    pub fn entities(&self) -> BTreeSet<String> {
        self.inner.read().iter().map(|s| s.entity.clone()).collect()
    }
}
