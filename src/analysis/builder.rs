// Sat Oct 17 2026 - Alex

use crate::analysis::block::build_basic_blocks;
use crate::analysis::xref::{ClassXref, RefKind, Site};
use crate::analysis::{Analysis, AnalysisInput, MethodAnalysis, StringAnalysis};
use crate::dex::{Method, Pools};
use crate::disasm::{DisassemblyResult, Instruction, OpKind, ReferenceKind};
use crate::utils::logging::ScopedTimer;
use std::sync::Arc;

impl Analysis {
    /// Disassembles every defined method and splits it into basic blocks.
    pub fn build_class_analysis(&self, input: AnalysisInput<'_>) {
        self.classes_built.get_or_init(|| {
            let _timer = ScopedTimer::new("build class analysis");
            let results = input
                .disassembler
                .disassemble_all(input.data, input.dex, input.executor);
            let pairs: Vec<(&Method, DisassemblyResult)> =
                input.dex.methods().zip(results).collect();

            input.executor.for_each(&pairs, |(method, result)| {
                let Some(analysis) = self.get_method_analysis(&method.dalvik_name()) else {
                    return;
                };
                let blocks = match result {
                    Ok(disassembled) => build_basic_blocks(disassembled),
                    Err(_) => Vec::new(),
                };
                analysis.attach(result.clone(), blocks);
            });

            let failed = pairs.iter().filter(|(_, r)| r.is_err()).count();
            log::info!(
                "class analysis built: {} methods, {} failed to disassemble",
                pairs.len(),
                failed
            );
        });
    }

    /// Records call, field, instantiation, class-constant and string edges.
    /// Builds the class pass first when it has not run yet.
    pub fn build_xrefs(&self, input: AnalysisInput<'_>) {
        self.build_class_analysis(input);
        self.xrefs_built.get_or_init(|| {
            let _timer = ScopedTimer::new("build xrefs");
            let defined: Vec<&Arc<MethodAnalysis>> =
                self.methods.values().filter(|m| !m.is_external()).collect();
            input
                .executor
                .for_each(&defined, |method| self.record_method(method, &input.dex.pools));
            log::info!("xrefs built for {} methods", defined.len());
        });
    }

    fn record_method(&self, method: &MethodAnalysis, pools: &Pools) {
        let disassembled = match method.disassembly() {
            Ok(Some(disassembled)) => disassembled,
            Ok(None) => return,
            Err(err) => {
                log::debug!("no xrefs for {}: {}", method.signature(), err);
                return;
            }
        };
        for insn in &disassembled.instructions {
            self.record_instruction(method, insn, pools);
        }
    }

    fn record_instruction(&self, method: &MethodAnalysis, insn: &Instruction, pools: &Pools) {
        let Some((kind, idx)) = insn.reference() else {
            return;
        };
        let offset = insn.offset;
        match kind {
            ReferenceKind::Method if insn.is_invoke() => {
                let Some(callee) = self.method_for(idx) else {
                    return;
                };
                method.xref_to.insert(Site::new(callee.signature(), offset));
                callee.xref_from.insert(Site::new(method.signature(), offset));
                self.link_classes(method, callee.class_name(), RefKind::Call, offset);
            }
            ReferenceKind::Field => {
                let Some(field) = self.field_for(idx) else {
                    return;
                };
                let (ref_kind, caller_side, field_side) = if insn.is_field_get() {
                    (RefKind::FieldRead, &method.xref_read, &field.xref_read)
                } else if insn.is_field_put() {
                    (RefKind::FieldWrite, &method.xref_write, &field.xref_write)
                } else {
                    return;
                };
                caller_side.insert(Site::new(field.full_name(), offset));
                field_side.insert(Site::new(method.signature(), offset));
                self.link_classes(method, field.class_name(), ref_kind, offset);
            }
            ReferenceKind::Type => {
                let Some(type_name) = pools.type_name(idx) else {
                    return;
                };
                let ref_kind = match insn.kind() {
                    OpKind::NewInstance => RefKind::NewInstance,
                    OpKind::ConstClass => RefKind::ConstClass,
                    _ => return,
                };
                let target = self.classes.get(type_name);
                if ref_kind == RefKind::NewInstance {
                    method.xref_new_instance.insert(Site::new(type_name, offset));
                    if let Some(target) = target {
                        target.xref_new_instance.insert(Site::new(method.signature(), offset));
                    }
                } else {
                    method.xref_const_class.insert(Site::new(type_name, offset));
                    if let Some(target) = target {
                        target.xref_const_class.insert(Site::new(method.signature(), offset));
                    }
                }
                self.link_classes(method, type_name, ref_kind, offset);
            }
            ReferenceKind::String if insn.kind() == OpKind::ConstString => {
                let Some(value) = pools.string(idx) else {
                    return;
                };
                let analysis = self.string_analysis(idx, value);
                analysis.xref_from.insert(Site::new(method.signature(), offset));
                method.xref_strings.insert(Site::new(value, offset));
            }
            _ => {}
        }
    }

    fn link_classes(&self, method: &MethodAnalysis, target: &str, kind: RefKind, offset: u32) {
        if let Some(source) = self.classes.get(method.class_name()) {
            source.xref_to.insert(ClassXref {
                class: target.to_string(),
                kind,
                method: method.signature().to_string(),
                offset,
            });
        }
        if let Some(dest) = self.classes.get(target) {
            dest.xref_from.insert(ClassXref {
                class: method.class_name().to_string(),
                kind,
                method: method.signature().to_string(),
                offset,
            });
        }
    }

    fn string_analysis(&self, idx: u32, value: &str) -> Arc<StringAnalysis> {
        if let Some(existing) = self.strings.read().get(&idx) {
            return Arc::clone(existing);
        }
        let mut strings = self.strings.write();
        Arc::clone(
            strings
                .entry(idx)
                .or_insert_with(|| Arc::new(StringAnalysis::new(idx, value))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dex::DexFile;
    use crate::disasm::Disassembler;
    use crate::utils::parallel::BatchExecutor;
    use crate::utils::testing::{CodeSpec, DexBuilder};

    const RUN: &str = "LA;->run()V";
    const HELPER: &str = "LA;->helper()V";
    const EXT: &str = "LB;->ext()V";
    const COUNT: &str = "LA;->count:I";

    fn sample() -> Vec<u8> {
        let mut builder = DexBuilder::new();
        let class = builder.class("LA;", Some("Ljava/lang/Object;"));
        let run = builder.method("LA;", "run", "V", &[]);
        let helper = builder.method("LA;", "helper", "V", &[]);
        let ext = builder.method("LB;", "ext", "V", &[]);
        let count = builder.field("LA;", "I", "count");
        let b = builder.type_id("LB;");
        let hello = builder.string("hello");

        let run_code = vec![
            0x0071, helper as u16, 0x0000, // 0: invoke-static {}, helper
            0x0071, helper as u16, 0x0000, // 6: invoke-static {}, helper
            0x0060, count as u16, // 12: sget v0, count
            0x0067, count as u16, // 16: sput v0, count
            0x0022, b as u16, // 20: new-instance v0, LB;
            0x001c, b as u16, // 24: const-class v0, LB;
            0x001a, hello as u16, // 28: const-string v0, "hello"
            0x0071, ext as u16, 0x0000, // 32: invoke-static {}, ext
            0x000e, // 38: return-void
        ];
        let helper_code = vec![0x0071, helper as u16, 0x0000, 0x000e];
        builder.add_direct_method(class, run, 0x0009, Some(CodeSpec::new(1, run_code)));
        builder.add_direct_method(class, helper, 0x0009, Some(CodeSpec::new(1, helper_code)));
        builder.class_mut(class).static_fields.push((count, 0x0008));
        builder.build()
    }

    fn analyzed(data: &[u8], dex: &DexFile, with_xrefs: bool, executor: &BatchExecutor) -> Analysis {
        let disassembler = Disassembler::new();
        let analysis = Analysis::new(dex, with_xrefs);
        analysis.analyze(AnalysisInput {
            data,
            dex,
            disassembler: &disassembler,
            executor,
        });
        analysis
    }

    fn sites(list: &[(&str, u32)]) -> Vec<Site> {
        list.iter().map(|(e, o)| Site::new(*e, *o)).collect()
    }

    #[test]
    fn test_call_edges_both_directions() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = analyzed(&data, &dex, true, &BatchExecutor::sequential());

        let run = analysis.get_method_analysis(RUN).unwrap();
        assert_eq!(run.xref_to(), sites(&[(HELPER, 0), (HELPER, 6), (EXT, 32)]));

        let helper = analysis.get_method_analysis(HELPER).unwrap();
        assert_eq!(helper.xref_from(), sites(&[(HELPER, 0), (RUN, 0), (RUN, 6)]));
        assert!(helper.callers().contains(HELPER));
        assert_eq!(helper.callees().len(), 1);
    }

    #[test]
    fn test_external_method_and_class() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = analyzed(&data, &dex, true, &BatchExecutor::sequential());

        let ext = analysis.get_method_analysis(EXT).unwrap();
        assert!(ext.is_external());
        assert_eq!(ext.xref_from(), sites(&[(RUN, 32)]));
        assert!(ext.disassembly().unwrap().is_none());

        let b = analysis.get_class_analysis("LB;").unwrap();
        assert!(b.is_external());
        assert_eq!(b.methods(), &[EXT.to_string()]);
        assert!(analysis.external_classes().any(|c| c.name() == "Ljava/lang/Object;"));
    }

    #[test]
    fn test_field_read_write() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = analyzed(&data, &dex, true, &BatchExecutor::sequential());

        let count = analysis.get_field_analysis(COUNT).unwrap();
        assert!(!count.is_external());
        assert_eq!(count.xref_read(), sites(&[(RUN, 12)]));
        assert_eq!(count.xref_write(), sites(&[(RUN, 16)]));

        let run = analysis.get_method_analysis(RUN).unwrap();
        assert_eq!(run.xref_read(), sites(&[(COUNT, 12)]));
        assert_eq!(run.xref_write(), sites(&[(COUNT, 16)]));

        let a = analysis.get_class_analysis("LA;").unwrap();
        assert!(a.xref_to().contains(&ClassXref {
            class: "LA;".to_string(),
            kind: RefKind::FieldWrite,
            method: RUN.to_string(),
            offset: 16,
        }));
    }

    #[test]
    fn test_instantiation_and_class_constants() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = analyzed(&data, &dex, true, &BatchExecutor::sequential());

        let b = analysis.get_class_analysis("LB;").unwrap();
        assert_eq!(b.xref_new_instance(), sites(&[(RUN, 20)]));
        assert_eq!(b.xref_const_class(), sites(&[(RUN, 24)]));
        assert!(b.xref_from().contains(&ClassXref {
            class: "LA;".to_string(),
            kind: RefKind::NewInstance,
            method: RUN.to_string(),
            offset: 20,
        }));

        let run = analysis.get_method_analysis(RUN).unwrap();
        assert_eq!(run.xref_new_instance(), sites(&[("LB;", 20)]));
        assert_eq!(run.xref_const_class(), sites(&[("LB;", 24)]));
    }

    #[test]
    fn test_string_xrefs() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = analyzed(&data, &dex, true, &BatchExecutor::sequential());

        let hello = analysis.get_string_analysis("hello").unwrap();
        assert_eq!(hello.xref_from(), sites(&[(RUN, 28)]));
        assert_eq!(analysis.strings().len(), 1);
        let run = analysis.get_method_analysis(RUN).unwrap();
        assert_eq!(run.xref_strings(), sites(&[("hello", 28)]));
    }

    #[test]
    fn test_without_xrefs_only_blocks() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = analyzed(&data, &dex, false, &BatchExecutor::sequential());

        assert!(analysis.is_class_analysis_built());
        assert!(!analysis.are_xrefs_built());
        let run = analysis.get_method_analysis(RUN).unwrap();
        assert!(run.xref_to().is_empty());
        assert_eq!(run.basic_blocks().len(), 1);
        assert_eq!(run.disassembly().unwrap().unwrap().len(), 9);
    }

    #[test]
    fn test_repeat_analysis_is_stable() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let executor = BatchExecutor::sequential();
        let disassembler = Disassembler::new();
        let analysis = Analysis::new(&dex, true);
        let input = AnalysisInput {
            data: &data,
            dex: &dex,
            disassembler: &disassembler,
            executor: &executor,
        };
        analysis.analyze(input);
        let first = analysis.get_method_analysis(HELPER).unwrap().xref_from();
        analysis.analyze(input);
        assert_eq!(analysis.get_method_analysis(HELPER).unwrap().xref_from(), first);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let sequential = analyzed(&data, &dex, true, &BatchExecutor::sequential());
        let parallel = analyzed(&data, &dex, true, &BatchExecutor::new(4, true));

        for method in sequential.methods() {
            let other = parallel.get_method_analysis(method.signature()).unwrap();
            assert_eq!(method.xref_to(), other.xref_to());
            assert_eq!(method.xref_from(), other.xref_from());
        }
        assert_eq!(
            sequential.get_class_analysis("LA;").unwrap().xref_to(),
            parallel.get_class_analysis("LA;").unwrap().xref_to()
        );
    }

    #[test]
    fn test_lookup_by_position_and_id() {
        let data = sample();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let analysis = Analysis::new(&dex, true);

        assert_eq!(analysis.number_of_method_analyses(), 3);
        assert_eq!(analysis.get_method_analysis_by_idx(0).unwrap().signature(), RUN);
        assert!(analysis.get_method_analysis_by_idx(3).is_none());
        assert_eq!(analysis.get_method_analysis_by_pool_idx(2).unwrap().signature(), EXT);

        let a = analysis.get_class_analysis_by_id(0).unwrap();
        assert_eq!(a.name(), "LA;");
        assert_eq!(a.methods(), &[RUN.to_string(), HELPER.to_string()]);
        assert_eq!(a.fields(), &[COUNT.to_string()]);
        assert!(a.extends("Ljava/lang/Object;"));
    }
}
