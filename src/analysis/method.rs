// Sat Oct 17 2026 - Alex

use crate::analysis::block::BasicBlock;
use crate::analysis::error::AnalysisError;
use crate::analysis::xref::{Site, XrefSet};
use crate::dex::AccessFlags;
use crate::disasm::{DisassembledMethod, DisassemblyResult};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Analysis wrapper around one method-pool entry. External methods are
/// referenced by the file but have no definition in it.
#[derive(Debug)]
pub struct MethodAnalysis {
    method_idx: u32,
    signature: String,
    class_name: String,
    name: String,
    descriptor: String,
    access_flags: AccessFlags,
    external: bool,
    disassembly: OnceCell<DisassemblyResult>,
    blocks: OnceCell<Vec<BasicBlock>>,
    pub(crate) xref_to: XrefSet<Site>,
    pub(crate) xref_from: XrefSet<Site>,
    pub(crate) xref_read: XrefSet<Site>,
    pub(crate) xref_write: XrefSet<Site>,
    pub(crate) xref_new_instance: XrefSet<Site>,
    pub(crate) xref_const_class: XrefSet<Site>,
    pub(crate) xref_strings: XrefSet<Site>,
}

impl MethodAnalysis {
    pub(crate) fn new(
        method_idx: u32,
        class_name: &str,
        name: &str,
        descriptor: &str,
        access_flags: AccessFlags,
        external: bool,
    ) -> Self {
        Self {
            method_idx,
            signature: format!("{}->{}{}", class_name, name, descriptor),
            class_name: class_name.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags,
            external,
            disassembly: OnceCell::new(),
            blocks: OnceCell::new(),
            xref_to: XrefSet::new(),
            xref_from: XrefSet::new(),
            xref_read: XrefSet::new(),
            xref_write: XrefSet::new(),
            xref_new_instance: XrefSet::new(),
            xref_const_class: XrefSet::new(),
            xref_strings: XrefSet::new(),
        }
    }

    pub fn method_idx(&self) -> u32 {
        self.method_idx
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    pub(crate) fn attach(&self, result: DisassemblyResult, blocks: Vec<BasicBlock>) {
        let _ = self.disassembly.set(result);
        let _ = self.blocks.set(blocks);
    }

    /// `Ok(None)` before analysis and for external methods.
    pub fn disassembly(&self) -> Result<Option<Arc<DisassembledMethod>>, AnalysisError> {
        match self.disassembly.get() {
            None => Ok(None),
            Some(Ok(method)) => Ok(Some(Arc::clone(method))),
            Some(Err(err)) => Err(AnalysisError::Disassemble(err.clone())),
        }
    }

    pub fn basic_blocks(&self) -> &[BasicBlock] {
        self.blocks.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn block_at(&self, offset: u32) -> Option<&BasicBlock> {
        self.basic_blocks().iter().find(|b| b.contains(offset))
    }

    /// Callees with the offset of each call site in this method.
    pub fn xref_to(&self) -> Vec<Site> {
        self.xref_to.snapshot()
    }

    /// Callers with the offset of the call site in the caller.
    pub fn xref_from(&self) -> Vec<Site> {
        self.xref_from.snapshot()
    }

    pub fn xref_read(&self) -> Vec<Site> {
        self.xref_read.snapshot()
    }

    pub fn xref_write(&self) -> Vec<Site> {
        self.xref_write.snapshot()
    }

    pub fn xref_new_instance(&self) -> Vec<Site> {
        self.xref_new_instance.snapshot()
    }

    pub fn xref_const_class(&self) -> Vec<Site> {
        self.xref_const_class.snapshot()
    }

    /// String values loaded by this method.
    pub fn xref_strings(&self) -> Vec<Site> {
        self.xref_strings.snapshot()
    }

    pub fn callers(&self) -> BTreeSet<String> {
        self.xref_from.entities()
    }

    pub fn callees(&self) -> BTreeSet<String> {
        self.xref_to.entities()
    }
}
