// Sat Oct 17 2026 - Alex

use crate::analysis::xref::{Site, XrefSet};
use crate::dex::AccessFlags;

#[derive(Debug)]
pub struct FieldAnalysis {
    field_idx: u32,
    full_name: String,
    class_name: String,
    name: String,
    type_descriptor: String,
    access_flags: AccessFlags,
    external: bool,
    pub(crate) xref_read: XrefSet<Site>,
    pub(crate) xref_write: XrefSet<Site>,
}

impl FieldAnalysis {
    pub(crate) fn new(
        field_idx: u32,
        class_name: &str,
        name: &str,
        type_descriptor: &str,
        access_flags: AccessFlags,
        external: bool,
    ) -> Self {
        Self {
            field_idx,
            full_name: format!("{}->{}:{}", class_name, name, type_descriptor),
            class_name: class_name.to_string(),
            name: name.to_string(),
            type_descriptor: type_descriptor.to_string(),
            access_flags,
            external,
            xref_read: XrefSet::new(),
            xref_write: XrefSet::new(),
        }
    }

    pub fn field_idx(&self) -> u32 {
        self.field_idx
    }

    /// `Lpkg/Class;->name:Type`
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_descriptor(&self) -> &str {
        &self.type_descriptor
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Methods reading the field, with the offset of each access.
    pub fn xref_read(&self) -> Vec<Site> {
        self.xref_read.snapshot()
    }

    pub fn xref_write(&self) -> Vec<Site> {
        self.xref_write.snapshot()
    }
}
