// Fri Oct 16 2026 - Alex

use crate::disasm::{DisassembleError, DisassembledMethod};
use ahash::AHashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type DisassemblyResult = Result<Arc<DisassembledMethod>, DisassembleError>;

type Slot = Arc<OnceCell<DisassemblyResult>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes disassembly by method signature. Each key is computed at most
/// once; concurrent callers for the same key block on the first one.
#[derive(Default)]
pub struct DisassemblyCache {
    slots: RwLock<AHashMap<String, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DisassemblyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> DisassemblyResult
    where
        F: FnOnce() -> Result<DisassembledMethod, DisassembleError>,
    {
        let slot = self.slot(key);
        let mut computed = false;
        let result = slot.get_or_init(|| {
            computed = true;
            compute().map(Arc::new)
        });
        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        result.clone()
    }

    fn slot(&self, key: &str) -> Slot {
        if let Some(slot) = self.slots.read().get(key) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Finished result for `key`, if any.
    pub fn get(&self, key: &str) -> Option<DisassemblyResult> {
        self.slots.read().get(key).and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of published results.
    pub fn len(&self) -> usize {
        self.slots.read().values().filter(|s| s.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
