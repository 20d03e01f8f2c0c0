// Thu Oct 15 2026 - Alex

pub mod cache;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod instruction;
pub mod method;
pub mod opcode;
pub mod operand;
pub mod payload;
pub mod render;

pub use cache::{CacheStats, DisassemblyCache, DisassemblyResult};
pub use decoder::{decode_units, DecodedUnits};
pub use error::{DecodeIssue, DisassembleError};
pub use instruction::Instruction;
pub use method::{disassemble_method, CatchHandler, DisassembledMethod, TryBlock};
pub use opcode::{Format, OpKind, Opcode, OpcodeInfo, ReferenceKind};
pub use operand::Operand;
pub use payload::{Payload, PayloadKind};
pub use render::{render_instruction, render_method};

use crate::dex::{DexFile, Method, Pools};
use crate::utils::logging::ScopedTimer;
use crate::utils::parallel::BatchExecutor;

/// Memoizing front end over [`disassemble_method`].
#[derive(Default)]
pub struct Disassembler {
    cache: DisassemblyCache,
}

impl Disassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disassemble(&self, data: &[u8], pools: &Pools, method: &Method) -> DisassemblyResult {
        let signature = method.dalvik_name();
        self.cache
            .get_or_compute(&signature, || disassemble_method(data, pools, method))
    }

    pub fn cached(&self, signature: &str) -> Option<DisassemblyResult> {
        self.cache.get(signature)
    }

    /// Disassembles every method of every class. Results come back in class
    /// and declaration order.
    pub fn disassemble_all(
        &self,
        data: &[u8],
        dex: &DexFile,
        executor: &BatchExecutor,
    ) -> Vec<DisassemblyResult> {
        let _timer = ScopedTimer::new("disassemble all");
        let methods: Vec<&Method> = dex.methods().collect();
        let results = executor.map(&methods, |m| self.disassemble(data, &dex.pools, m));
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            log::warn!("{}", err);
        }
        log::debug!(
            "disassembled {} methods on {} thread(s)",
            methods.len(),
            executor.thread_count()
        );
        results
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
