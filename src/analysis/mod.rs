// Sat Oct 17 2026 - Alex

pub mod block;
pub mod class;
pub mod error;
pub mod field;
pub mod method;
pub mod string;
pub mod xref;

mod builder;

pub use block::{build_basic_blocks, BasicBlock};
pub use class::ClassAnalysis;
pub use error::AnalysisError;
pub use field::FieldAnalysis;
pub use method::MethodAnalysis;
pub use string::StringAnalysis;
pub use xref::{ClassXref, RefKind, Site, XrefSet};

use crate::dex::types::is_class_descriptor;
use crate::dex::{AccessFlags, ClassId, DexFile};
use crate::disasm::Disassembler;
use crate::utils::parallel::BatchExecutor;
use ahash::AHashMap;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything an analysis pass reads from its owning context.
#[derive(Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub data: &'a [u8],
    pub dex: &'a DexFile,
    pub disassembler: &'a Disassembler,
    pub executor: &'a BatchExecutor,
}

/// Whole-file analysis: class, method, field and string wrappers plus the
/// cross references between them. Wrappers are created eagerly; blocks and
/// xrefs are filled in by the build passes, each of which runs once.
pub struct Analysis {
    with_xrefs: bool,
    classes: IndexMap<String, Arc<ClassAnalysis>>,
    class_positions: AHashMap<ClassId, usize>,
    methods: IndexMap<String, Arc<MethodAnalysis>>,
    method_positions: AHashMap<u32, usize>,
    fields: IndexMap<String, Arc<FieldAnalysis>>,
    field_positions: AHashMap<u32, usize>,
    strings: RwLock<BTreeMap<u32, Arc<StringAnalysis>>>,
    classes_built: OnceCell<()>,
    xrefs_built: OnceCell<()>,
}

impl Analysis {
    pub fn new(dex: &DexFile, with_xrefs: bool) -> Self {
        let mut classes: IndexMap<String, ClassAnalysis> = IndexMap::new();
        let mut class_positions = AHashMap::new();
        for class in &dex.classes {
            if classes.contains_key(&class.name) {
                log::warn!("duplicate definition of {} ignored", class.name);
                continue;
            }
            let analysis = ClassAnalysis::defined(
                class.id,
                &class.name,
                class.superclass.as_deref(),
                &class.interfaces,
                class.access_flags,
            );
            let (pos, _) = classes.insert_full(class.name.clone(), analysis);
            class_positions.insert(class.id, pos);
        }
        for (_, descriptor) in dex.pools.types.iter() {
            if is_class_descriptor(descriptor) && !classes.contains_key(descriptor) {
                classes.insert(descriptor.clone(), ClassAnalysis::external(descriptor));
            }
        }

        let mut methods = IndexMap::new();
        let mut method_positions = AHashMap::new();
        let mut defined_methods = AHashMap::new();
        for class in &dex.classes {
            let owned = class_positions.contains_key(&class.id);
            for method in class.methods() {
                defined_methods.insert(method.method_idx, method.access_flags);
                if let Some(owner) = classes.get_mut(&class.name).filter(|_| owned) {
                    owner.methods.push(method.dalvik_name());
                }
            }
        }
        for (idx, method) in dex.pools.methods.iter() {
            let (flags, external) = match defined_methods.get(&idx) {
                Some(&flags) => (flags, false),
                None => (AccessFlags::empty(), true),
            };
            let analysis = MethodAnalysis::new(
                idx,
                &method.class_name,
                &method.name,
                &method.prototype.to_string(),
                flags,
                external,
            );
            if methods.contains_key(analysis.signature()) {
                continue;
            }
            if external {
                classes
                    .entry(method.class_name.clone())
                    .or_insert_with(|| ClassAnalysis::external(&method.class_name))
                    .methods
                    .push(analysis.signature().to_string());
            }
            let (pos, _) = methods.insert_full(analysis.signature().to_string(), Arc::new(analysis));
            method_positions.insert(idx, pos);
        }

        let mut fields = IndexMap::new();
        let mut field_positions = AHashMap::new();
        let mut defined_fields = AHashMap::new();
        for class in &dex.classes {
            let owned = class_positions.contains_key(&class.id);
            for field in class.fields() {
                defined_fields.insert(field.field_idx, field.access_flags);
                if let Some(owner) = classes.get_mut(&class.name).filter(|_| owned) {
                    owner.fields.push(field.full_name());
                }
            }
        }
        for (idx, field) in dex.pools.fields.iter() {
            let (flags, external) = match defined_fields.get(&idx) {
                Some(&flags) => (flags, false),
                None => (AccessFlags::empty(), true),
            };
            let analysis = FieldAnalysis::new(
                idx,
                &field.class_name,
                &field.name,
                &field.type_descriptor,
                flags,
                external,
            );
            if fields.contains_key(analysis.full_name()) {
                continue;
            }
            if external {
                classes
                    .entry(field.class_name.clone())
                    .or_insert_with(|| ClassAnalysis::external(&field.class_name))
                    .fields
                    .push(analysis.full_name().to_string());
            }
            let (pos, _) = fields.insert_full(analysis.full_name().to_string(), Arc::new(analysis));
            field_positions.insert(idx, pos);
        }

        log::debug!(
            "analysis created: {} classes, {} methods, {} fields",
            classes.len(),
            methods.len(),
            fields.len()
        );

        Self {
            with_xrefs,
            classes: classes.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            class_positions,
            methods,
            method_positions,
            fields,
            field_positions,
            strings: RwLock::new(BTreeMap::new()),
            classes_built: OnceCell::new(),
            xrefs_built: OnceCell::new(),
        }
    }

    pub fn with_xrefs(&self) -> bool {
        self.with_xrefs
    }

    /// Runs the class pass and, when enabled, the xref pass. Repeated calls
    /// do nothing.
    pub fn analyze(&self, input: AnalysisInput<'_>) {
        self.build_class_analysis(input);
        if self.with_xrefs {
            self.build_xrefs(input);
        }
    }

    pub fn is_class_analysis_built(&self) -> bool {
        self.classes_built.get().is_some()
    }

    pub fn are_xrefs_built(&self) -> bool {
        self.xrefs_built.get().is_some()
    }

    pub fn number_of_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassAnalysis>> {
        self.classes.values()
    }

    pub fn external_classes(&self) -> impl Iterator<Item = &Arc<ClassAnalysis>> {
        self.classes.values().filter(|c| c.is_external())
    }

    pub fn get_class_analysis(&self, name: &str) -> Option<Arc<ClassAnalysis>> {
        self.classes.get(name).cloned()
    }

    pub fn get_class_analysis_by_id(&self, id: ClassId) -> Option<Arc<ClassAnalysis>> {
        let pos = *self.class_positions.get(&id)?;
        self.classes.get_index(pos).map(|(_, c)| Arc::clone(c))
    }

    pub fn number_of_method_analyses(&self) -> usize {
        self.methods.len()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodAnalysis>> {
        self.methods.values()
    }

    pub fn get_method_analysis(&self, signature: &str) -> Option<Arc<MethodAnalysis>> {
        self.methods.get(signature).cloned()
    }

    /// Analysis at position `i`, in method-pool order.
    pub fn get_method_analysis_by_idx(&self, i: usize) -> Option<Arc<MethodAnalysis>> {
        self.methods.get_index(i).map(|(_, m)| Arc::clone(m))
    }

    pub fn get_method_analysis_by_pool_idx(&self, method_idx: u32) -> Option<Arc<MethodAnalysis>> {
        self.method_for(method_idx).cloned()
    }

    pub fn number_of_field_analyses(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldAnalysis>> {
        self.fields.values()
    }

    pub fn get_field_analysis(&self, full_name: &str) -> Option<Arc<FieldAnalysis>> {
        self.fields.get(full_name).cloned()
    }

    pub fn get_string_analysis(&self, value: &str) -> Option<Arc<StringAnalysis>> {
        self.strings.read().values().find(|s| s.value() == value).cloned()
    }

    pub fn strings(&self) -> Vec<Arc<StringAnalysis>> {
        self.strings.read().values().cloned().collect()
    }

    pub(crate) fn method_for(&self, method_idx: u32) -> Option<&Arc<MethodAnalysis>> {
        let pos = *self.method_positions.get(&method_idx)?;
        self.methods.get_index(pos).map(|(_, m)| m)
    }

    pub(crate) fn field_for(&self, field_idx: u32) -> Option<&Arc<FieldAnalysis>> {
        let pos = *self.field_positions.get(&field_idx)?;
        self.fields.get_index(pos).map(|(_, f)| f)
    }
}
