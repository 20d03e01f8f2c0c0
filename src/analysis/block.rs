// Sat Oct 17 2026 - Alex

use crate::disasm::{DisassembledMethod, Instruction};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;

/// Straight-line run of instructions of one method. Offsets are bytes from
/// the start of the method's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    start: u32,
    end: u32,
    instructions: Range<usize>,
    predecessors: Vec<u32>,
    successors: Vec<u32>,
    exception_targets: Vec<u32>,
    is_entry: bool,
    is_try_block: bool,
    is_catch_block: bool,
    handler_types: Vec<Option<String>>,
}

impl BasicBlock {
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn size(&self) -> u32 {
        self.end - self.start
    }

    /// Index range into the owning method's instruction list.
    pub fn instruction_range(&self) -> Range<usize> {
        self.instructions.clone()
    }

    pub fn instructions<'a>(&self, method: &'a DisassembledMethod) -> &'a [Instruction] {
        &method.instructions[self.instructions.clone()]
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn predecessors(&self) -> &[u32] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[u32] {
        &self.successors
    }

    /// Handler blocks reachable when an instruction of this block throws.
    pub fn exception_targets(&self) -> &[u32] {
        &self.exception_targets
    }

    pub fn is_entry(&self) -> bool {
        self.is_entry
    }

    pub fn is_exit(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn is_try_block(&self) -> bool {
        self.is_try_block
    }

    pub fn is_catch_block(&self) -> bool {
        self.is_catch_block
    }

    /// Exception types caught by handlers starting here; `None` is catch-all.
    pub fn handler_types(&self) -> &[Option<String>] {
        &self.handler_types
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block 0x{:x}-0x{:x}", self.start, self.end)?;
        if self.is_try_block {
            write!(f, " [try]")?;
        }
        if self.is_catch_block {
            write!(f, " [catch]")?;
        }
        Ok(())
    }
}

fn leaders(method: &DisassembledMethod) -> BTreeSet<u32> {
    let mut leaders = BTreeSet::new();
    for insn in method.instructions.iter().filter(|i| !i.is_payload()) {
        if insn.is_branch() || insn.is_switch() || insn.is_terminator() {
            leaders.insert(insn.end());
            leaders.extend(method.successors(insn));
        }
    }
    for block in &method.exceptions {
        leaders.insert(block.start);
        leaders.insert(block.end);
        leaders.extend(block.handlers.iter().map(|h| h.target));
    }
    leaders
}

/// Splits a disassembled method into basic blocks. Payload pseudo
/// instructions are not part of any block.
pub fn build_basic_blocks(method: &DisassembledMethod) -> Vec<BasicBlock> {
    let leaders = leaders(method);
    let insns = &method.instructions;

    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut current: Option<usize> = None;
    for (i, insn) in insns.iter().enumerate() {
        if insn.is_payload() {
            if let Some(first) = current.take() {
                ranges.push(first..i);
            }
            continue;
        }
        if let Some(first) = current {
            let contiguous = insns[i - 1].end() == insn.offset;
            if leaders.contains(&insn.offset) || !contiguous {
                ranges.push(first..i);
                current = Some(i);
            }
        } else {
            current = Some(i);
        }
    }
    if let Some(first) = current {
        ranges.push(first..insns.len());
    }

    let starts: BTreeSet<u32> = ranges.iter().map(|r| insns[r.start].offset).collect();
    let mut blocks: Vec<BasicBlock> = ranges
        .into_iter()
        .enumerate()
        .map(|(n, range)| {
            let start = insns[range.start].offset;
            let last = &insns[range.end - 1];
            let successors = method
                .successors(last)
                .into_iter()
                .filter(|t| starts.contains(t))
                .collect();

            let mut exception_targets: Vec<u32> = method
                .try_blocks_covering(start)
                .flat_map(|t| t.handlers.iter().map(|h| h.target))
                .filter(|t| starts.contains(t))
                .collect();
            exception_targets.sort_unstable();
            exception_targets.dedup();

            let mut handler_types = Vec::new();
            for handler in method.exceptions.iter().flat_map(|t| &t.handlers) {
                if handler.target == start && !handler_types.contains(&handler.exception_type) {
                    handler_types.push(handler.exception_type.clone());
                }
            }

            BasicBlock {
                start,
                end: last.end(),
                instructions: range,
                predecessors: Vec::new(),
                successors,
                exception_targets,
                is_entry: n == 0,
                is_try_block: method.try_blocks_covering(start).next().is_some(),
                is_catch_block: !handler_types.is_empty(),
                handler_types,
            }
        })
        .collect();

    let mut predecessors: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for block in &blocks {
        for &succ in &block.successors {
            predecessors.entry(succ).or_default().push(block.start);
        }
    }
    for block in &mut blocks {
        if let Some(preds) = predecessors.remove(&block.start) {
            block.predecessors = preds;
        }
    }
    blocks
}
