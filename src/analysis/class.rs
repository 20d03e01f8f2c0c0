// Sat Oct 17 2026 - Alex

use crate::analysis::xref::{ClassXref, Site, XrefSet};
use crate::dex::{AccessFlags, ClassId};
use crate::dex::types::pretty_type;

/// Per-class view of the analysis. External classes appear in the type pool
/// but are not defined in the file.
#[derive(Debug)]
pub struct ClassAnalysis {
    name: String,
    class_id: Option<ClassId>,
    superclass: Option<String>,
    interfaces: Vec<String>,
    access_flags: AccessFlags,
    pub(crate) methods: Vec<String>,
    pub(crate) fields: Vec<String>,
    pub(crate) xref_to: XrefSet<ClassXref>,
    pub(crate) xref_from: XrefSet<ClassXref>,
    pub(crate) xref_new_instance: XrefSet<Site>,
    pub(crate) xref_const_class: XrefSet<Site>,
}

impl ClassAnalysis {
    pub(crate) fn defined(
        id: ClassId,
        name: &str,
        superclass: Option<&str>,
        interfaces: &[String],
        access_flags: AccessFlags,
    ) -> Self {
        Self {
            class_id: Some(id),
            superclass: superclass.map(str::to_string),
            interfaces: interfaces.to_vec(),
            access_flags,
            ..Self::external(name)
        }
    }

    pub(crate) fn external(name: &str) -> Self {
        Self {
            name: name.to_string(),
            class_id: None,
            superclass: None,
            interfaces: Vec::new(),
            access_flags: AccessFlags::empty(),
            methods: Vec::new(),
            fields: Vec::new(),
            xref_to: XrefSet::new(),
            xref_from: XrefSet::new(),
            xref_new_instance: XrefSet::new(),
            xref_const_class: XrefSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn java_name(&self) -> String {
        pretty_type(&self.name)
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    pub fn is_external(&self) -> bool {
        self.class_id.is_none()
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Direct superclass or directly implemented interface.
    pub fn extends(&self, name: &str) -> bool {
        self.superclass.as_deref() == Some(name) || self.interfaces.iter().any(|i| i == name)
    }

    /// Signatures of the method analyses owned by this class.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn xref_to(&self) -> Vec<ClassXref> {
        self.xref_to.snapshot()
    }

    pub fn xref_from(&self) -> Vec<ClassXref> {
        self.xref_from.snapshot()
    }

    /// Methods instantiating this class, with the offset of the new-instance.
    pub fn xref_new_instance(&self) -> Vec<Site> {
        self.xref_new_instance.snapshot()
    }

    pub fn xref_const_class(&self) -> Vec<Site> {
        self.xref_const_class.snapshot()
    }
}
