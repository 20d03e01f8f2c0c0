// Sat Oct 17 2026 - Alex

use crate::analysis::{
    Analysis, AnalysisError, AnalysisInput, ClassAnalysis, FieldAnalysis, MethodAnalysis,
    StringAnalysis,
};
use crate::config::Config;
use crate::dex::{Class, ClassId, DexFile, DexHeader, Field, Method, ParseError, ParseIssue};
use crate::disasm::{render_method, CacheStats, DisassembleError, Disassembler, DisassemblyResult};
use crate::reader::load_file;
use crate::utils::parallel::BatchExecutor;
use ahash::AHashMap;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Position of a member inside its class: class id plus index into the
/// declaration-order member list.
type MemberLoc = (ClassId, usize);

#[derive(Default)]
struct MemberIndex {
    by_name: AHashMap<String, MemberLoc>,
    by_idx: AHashMap<u32, MemberLoc>,
}

fn method_at(class: &Class, i: usize) -> Option<&Method> {
    let direct = class.direct_methods.len();
    if i < direct {
        class.direct_methods.get(i)
    } else {
        class.virtual_methods.get(i - direct)
    }
}

fn field_at(class: &Class, i: usize) -> Option<&Field> {
    let statics = class.static_fields.len();
    if i < statics {
        class.static_fields.get(i)
    } else {
        class.instance_fields.get(i - statics)
    }
}

/// Owns one parsed DEX image and every structure derived from it. Lookups
/// return `None` for anything that does not resolve; derived indices,
/// disassemblies and analyses are built on first use and kept for the
/// lifetime of the context.
pub struct Context {
    data: Bytes,
    dex: DexFile,
    config: Config,
    disassembler: Disassembler,
    executor: BatchExecutor,
    class_index: OnceCell<AHashMap<String, ClassId>>,
    method_index: OnceCell<MemberIndex>,
    field_index: OnceCell<MemberIndex>,
    string_index: OnceCell<AHashMap<String, u32>>,
    analysis: RwLock<Option<Arc<Analysis>>>,
}

impl Context {
    pub fn parse(data: impl Into<Bytes>) -> Result<Self, ParseError> {
        Self::parse_with_config(data, Config::default())
    }

    pub fn parse_with_config(data: impl Into<Bytes>, config: Config) -> Result<Self, ParseError> {
        config.validate().map_err(ParseError::InvalidConfig)?;
        let data = data.into();
        let dex = DexFile::parse(&data, &config)?;
        let executor = BatchExecutor::new(config.max_threads, config.parallel_disassembly);
        Ok(Self {
            data,
            dex,
            config,
            disassembler: Disassembler::new(),
            executor,
            class_index: OnceCell::new(),
            method_index: OnceCell::new(),
            field_index: OnceCell::new(),
            string_index: OnceCell::new(),
            analysis: RwLock::new(None),
        })
    }

    /// Memory-maps `path` and parses it without copying the image.
    pub fn from_path<P: AsRef<Path>>(path: P, config: Config) -> Result<Self, ParseError> {
        let data = load_file(path.as_ref())?;
        log::debug!("loaded {} ({} bytes)", path.as_ref().display(), data.len());
        Self::parse_with_config(data, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn header(&self) -> &DexHeader {
        &self.dex.header
    }

    pub fn dex(&self) -> &DexFile {
        &self.dex
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Non-fatal problems found while parsing.
    pub fn diagnostics(&self) -> &[ParseIssue] {
        &self.dex.issues
    }

    // Strings

    pub fn number_of_strings(&self) -> usize {
        self.dex.pools.strings.len()
    }

    pub fn get_string_by_id(&self, id: u32) -> Option<&str> {
        self.dex.pools.string(id)
    }

    pub fn get_string_id(&self, value: &str) -> Option<u32> {
        let index = self.string_index.get_or_init(|| {
            let mut index = AHashMap::with_capacity(self.dex.pools.strings.len());
            for (i, s) in self.dex.pools.strings.iter().enumerate() {
                index.entry(s.to_string()).or_insert(i as u32);
            }
            index
        });
        index.get(value).copied()
    }

    // Classes

    pub fn number_of_classes(&self) -> usize {
        self.dex.classes.len()
    }

    pub fn classes(&self) -> &[Class] {
        &self.dex.classes
    }

    pub fn get_class_by_id(&self, id: ClassId) -> Option<&Class> {
        self.dex.class(id)
    }

    pub fn get_class_by_name(&self, name: &str) -> Option<&Class> {
        let index = self.class_index.get_or_init(|| {
            let mut index = AHashMap::with_capacity(self.dex.classes.len());
            for class in &self.dex.classes {
                index.entry(class.name.clone()).or_insert(class.id);
            }
            index
        });
        index.get(name).and_then(|&id| self.dex.class(id))
    }

    // Methods

    fn method_index(&self) -> &MemberIndex {
        self.method_index.get_or_init(|| {
            let mut index = MemberIndex::default();
            for class in &self.dex.classes {
                for (i, method) in class.methods().enumerate() {
                    index.by_name.entry(method.dalvik_name()).or_insert((class.id, i));
                    index.by_idx.entry(method.method_idx).or_insert((class.id, i));
                }
            }
            index
        })
    }

    fn method_at_loc(&self, (class, i): MemberLoc) -> Option<&Method> {
        method_at(self.dex.class(class)?, i)
    }

    pub fn number_of_methods(&self) -> usize {
        self.dex.classes.iter().map(|c| c.method_count()).sum()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.dex.methods()
    }

    /// Defined method for a method-pool index.
    pub fn get_method_by_id(&self, method_idx: u32) -> Option<&Method> {
        let loc = *self.method_index().by_idx.get(&method_idx)?;
        self.method_at_loc(loc)
    }

    /// Defined method by its `Lpkg/Class;->name(Args)Ret` signature.
    pub fn get_method_by_name(&self, signature: &str) -> Option<&Method> {
        let loc = *self.method_index().by_name.get(signature)?;
        self.method_at_loc(loc)
    }

    // Fields

    fn field_index(&self) -> &MemberIndex {
        self.field_index.get_or_init(|| {
            let mut index = MemberIndex::default();
            for class in &self.dex.classes {
                for (i, field) in class.fields().enumerate() {
                    index.by_name.entry(field.full_name()).or_insert((class.id, i));
                    index.by_idx.entry(field.field_idx).or_insert((class.id, i));
                }
            }
            index
        })
    }

    fn field_at_loc(&self, (class, i): MemberLoc) -> Option<&Field> {
        field_at(self.dex.class(class)?, i)
    }

    pub fn number_of_fields(&self) -> usize {
        self.dex.classes.iter().map(|c| c.field_count()).sum()
    }

    pub fn get_field_by_id(&self, field_idx: u32) -> Option<&Field> {
        let loc = *self.field_index().by_idx.get(&field_idx)?;
        self.field_at_loc(loc)
    }

    /// Defined field by its `Lpkg/Class;->name:Type` name.
    pub fn get_field_by_name(&self, full_name: &str) -> Option<&Field> {
        let loc = *self.field_index().by_name.get(full_name)?;
        self.field_at_loc(loc)
    }

    // Disassembly

    pub fn disassemble(&self, method: &Method) -> DisassemblyResult {
        self.disassembler.disassemble(&self.data, &self.dex.pools, method)
    }

    /// Disassembles the defined method with `signature`, or `None` when no
    /// such method exists.
    pub fn get_disassembled_method(&self, signature: &str) -> Option<DisassemblyResult> {
        if let Some(cached) = self.disassembler.cached(signature) {
            return Some(cached);
        }
        self.get_method_by_name(signature).map(|m| self.disassemble(m))
    }

    pub fn disassemble_all(&self) -> Vec<DisassemblyResult> {
        self.disassembler
            .disassemble_all(&self.data, &self.dex, &self.executor)
    }

    /// Smali-style listing of a defined method.
    pub fn render_method(&self, signature: &str) -> Option<Result<String, DisassembleError>> {
        let method = self.get_method_by_name(signature)?;
        Some(
            self.disassemble(method)
                .map(|dm| render_method(method, &dm, &self.dex.pools)),
        )
    }

    pub fn disassembly_stats(&self) -> CacheStats {
        self.disassembler.stats()
    }

    // Analysis

    /// Enables analysis. An existing analysis is kept unless this call asks
    /// for xrefs and the existing one was created without them.
    pub fn create_analysis(&self, with_xrefs: bool) {
        let mut slot = self.analysis.write();
        match slot.as_ref() {
            Some(existing) if existing.with_xrefs() || !with_xrefs => {
                log::debug!("analysis already created");
            }
            _ => *slot = Some(Arc::new(Analysis::new(&self.dex, with_xrefs))),
        }
    }

    /// `create_analysis` with the configured xref default.
    pub fn create_default_analysis(&self) {
        self.create_analysis(self.config.create_xrefs);
    }

    pub fn analysis(&self) -> Result<Arc<Analysis>, AnalysisError> {
        self.analysis.read().clone().ok_or(AnalysisError::NotCreated)
    }

    /// Runs the passes enabled by `create_analysis`.
    pub fn analyze(&self) -> Result<(), AnalysisError> {
        let analysis = self.analysis()?;
        analysis.analyze(AnalysisInput {
            data: &self.data,
            dex: &self.dex,
            disassembler: &self.disassembler,
            executor: &self.executor,
        });
        Ok(())
    }

    /// The created analysis, once its class pass has run.
    fn analyzed(&self) -> Option<Arc<Analysis>> {
        self.analysis.read().clone().filter(|a| a.is_class_analysis_built())
    }

    /// `None` until [`Context::analyze`] has run, even when the analysis was
    /// already created.
    pub fn get_analyzed_class(&self, name: &str) -> Option<Arc<ClassAnalysis>> {
        self.analyzed()?.get_class_analysis(name)
    }

    pub fn get_analyzed_class_by_id(&self, id: ClassId) -> Option<Arc<ClassAnalysis>> {
        self.analyzed()?.get_class_analysis_by_id(id)
    }

    pub fn get_analyzed_method(&self, signature: &str) -> Option<Arc<MethodAnalysis>> {
        self.analyzed()?.get_method_analysis(signature)
    }

    pub fn get_analyzed_method_for(&self, method: &Method) -> Option<Arc<MethodAnalysis>> {
        self.analyzed()?.get_method_analysis_by_pool_idx(method.method_idx)
    }

    pub fn number_of_method_analyses(&self) -> usize {
        self.analyzed().map(|a| a.number_of_method_analyses()).unwrap_or(0)
    }

    pub fn get_analyzed_method_by_idx(&self, i: usize) -> Option<Arc<MethodAnalysis>> {
        self.analyzed()?.get_method_analysis_by_idx(i)
    }

    pub fn get_analyzed_field(&self, full_name: &str) -> Option<Arc<FieldAnalysis>> {
        self.analyzed()?.get_field_analysis(full_name)
    }

    pub fn get_analyzed_string(&self, value: &str) -> Option<Arc<StringAnalysis>> {
        self.analyzed()?.get_string_analysis(value)
    }
}
