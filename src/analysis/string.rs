// Sat Oct 17 2026 - Alex

use crate::analysis::xref::{Site, XrefSet};

/// A string-pool entry loaded by at least one const-string.
#[derive(Debug)]
pub struct StringAnalysis {
    string_idx: u32,
    value: String,
    pub(crate) xref_from: XrefSet<Site>,
}

impl StringAnalysis {
    pub(crate) fn new(string_idx: u32, value: &str) -> Self {
        Self {
            string_idx,
            value: value.to_string(),
            xref_from: XrefSet::new(),
        }
    }

    pub fn string_idx(&self) -> u32 {
        self.string_idx
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn xref_from(&self) -> Vec<Site> {
        self.xref_from.snapshot()
    }
}
