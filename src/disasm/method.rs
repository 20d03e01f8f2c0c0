// Fri Oct 16 2026 - Alex

use crate::dex::{CodeInfo, Method, Pools};
use crate::disasm::decoder::decode_units;
use crate::disasm::{DecodeIssue, DisassembleError, Instruction};
use crate::reader::{BinaryReader, Cursor, ReaderError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchHandler {
    /// `None` for a catch-all handler.
    pub type_idx: Option<u32>,
    pub exception_type: Option<String>,
    /// Byte offset of the handler's first instruction.
    pub target: u32,
}

impl CatchHandler {
    pub fn is_catch_all(&self) -> bool {
        self.type_idx.is_none()
    }
}

/// Guarded byte range `[start, end)` with its handlers in match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryBlock {
    pub start: u32,
    pub end: u32,
    pub handlers: Vec<CatchHandler>,
}

impl TryBlock {
    pub fn covers(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledMethod {
    pub signature: String,
    pub registers_size: u16,
    pub ins_size: u16,
    pub instructions: Vec<Instruction>,
    pub exceptions: Vec<TryBlock>,
    pub issues: Vec<DecodeIssue>,
    pub undisassembled_from: Option<u32>,
}

impl DisassembledMethod {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// True when every code unit was decoded.
    pub fn is_complete(&self) -> bool {
        self.undisassembled_from.is_none()
    }

    pub fn index_of(&self, offset: u32) -> Option<usize> {
        self.instructions
            .binary_search_by_key(&offset, |i| i.offset)
            .ok()
    }

    pub fn instruction_at(&self, offset: u32) -> Option<&Instruction> {
        self.index_of(offset).map(|i| &self.instructions[i])
    }

    /// Resolved `(key, absolute byte target)` cases of a switch instruction.
    pub fn switch_targets(&self, insn: &Instruction) -> Vec<(i32, u32)> {
        if !insn.is_switch() {
            return Vec::new();
        }
        let Some(payload) = insn
            .branch_target()
            .and_then(|t| self.instruction_at(t))
            .and_then(|p| p.payload.as_ref())
        else {
            return Vec::new();
        };
        payload
            .switch_cases()
            .into_iter()
            .filter_map(|(key, rel)| {
                let target = insn.offset as i64 + rel as i64 * 2;
                u32::try_from(target).ok().map(|t| (key, t))
            })
            .collect()
    }

    /// Every byte offset control may transfer to from `insn`, excluding
    /// exception edges.
    pub fn successors(&self, insn: &Instruction) -> Vec<u32> {
        let mut out = Vec::new();
        if insn.is_payload() {
            return out;
        }
        if insn.is_switch() {
            out.extend(self.switch_targets(insn).into_iter().map(|(_, t)| t));
        } else if insn.is_branch() {
            out.extend(insn.branch_target());
        }
        if insn.can_fall_through() && self.instruction_at(insn.end()).is_some() {
            out.push(insn.end());
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn try_blocks_covering(&self, offset: u32) -> impl Iterator<Item = &TryBlock> {
        self.exceptions.iter().filter(move |t| t.covers(offset))
    }
}

/// Decodes `method`'s code straight from the file buffer. Methods without
/// code yield an empty instruction list.
pub fn disassemble_method(
    data: &[u8],
    pools: &Pools,
    method: &Method,
) -> Result<DisassembledMethod, DisassembleError> {
    let signature = method.dalvik_name();
    let Some(code) = method.code else {
        return Ok(DisassembledMethod {
            signature,
            registers_size: 0,
            ins_size: 0,
            instructions: Vec::new(),
            exceptions: Vec::new(),
            issues: Vec::new(),
            undisassembled_from: None,
        });
    };

    let reader = BinaryReader::new(data);
    let bytes = match reader.read_bytes(code.insns_offset(), code.insns_len_bytes()) {
        Ok(bytes) => bytes,
        Err(source) => {
            return Err(DisassembleError::Truncated {
                method: signature,
                source,
            })
        }
    };
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    let exceptions = read_try_blocks(&reader, &code, pools, &signature)?;
    let decoded = decode_units(&units);
    if !decoded.issues.is_empty() {
        log::debug!("{}: {} decode issues", signature, decoded.issues.len());
    }

    Ok(DisassembledMethod {
        signature,
        registers_size: code.registers_size,
        ins_size: code.ins_size,
        instructions: decoded.instructions,
        exceptions,
        issues: decoded.issues,
        undisassembled_from: decoded.undisassembled_from,
    })
}

fn read_try_blocks(
    reader: &BinaryReader<'_>,
    code: &CodeInfo,
    pools: &Pools,
    signature: &str,
) -> Result<Vec<TryBlock>, DisassembleError> {
    let count = code.tries_size as usize;
    if count == 0 {
        return Ok(Vec::new());
    }
    let tries_off = code.tries_offset();
    let handlers_base = tries_off + count * 8;
    let malformed = |reason: String| DisassembleError::MalformedTryBlock {
        method: signature.to_string(),
        reason,
    };

    let mut blocks = Vec::with_capacity(count);
    for i in 0..count {
        let base = tries_off + i * 8;
        let read = || -> Result<(u32, u16, u16), ReaderError> {
            Ok((
                reader.read_u32(base)?,
                reader.read_u16(base + 4)?,
                reader.read_u16(base + 6)?,
            ))
        };
        let (start_addr, insn_count, handler_off) = read().map_err(|e| malformed(e.to_string()))?;

        let end_addr = start_addr as u64 + insn_count as u64;
        if end_addr > code.insns_size as u64 {
            return Err(malformed(format!(
                "try block {:#x}..{:#x} exceeds {} code units",
                start_addr, end_addr, code.insns_size
            )));
        }

        let mut cursor = Cursor::new(*reader, handlers_base + handler_off as usize);
        let handlers = read_handlers(&mut cursor, pools).map_err(|source| {
            DisassembleError::MalformedHandlers {
                method: signature.to_string(),
                source,
            }
        })?;

        blocks.push(TryBlock {
            start: start_addr * 2,
            end: end_addr as u32 * 2,
            handlers,
        });
    }
    Ok(blocks)
}

fn read_handlers(cursor: &mut Cursor<'_>, pools: &Pools) -> Result<Vec<CatchHandler>, ReaderError> {
    let size = cursor.read_sleb128()?;
    let typed = size.unsigned_abs() as usize;
    let mut handlers = Vec::with_capacity(typed.min(64));
    for _ in 0..typed {
        let type_idx = cursor.read_uleb128()?;
        let addr = cursor.read_uleb128()?;
        handlers.push(CatchHandler {
            type_idx: Some(type_idx),
            exception_type: Some(
                pools
                    .type_name(type_idx)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("type@{}", type_idx)),
            ),
            target: addr.wrapping_mul(2),
        });
    }
    if size <= 0 {
        let addr = cursor.read_uleb128()?;
        handlers.push(CatchHandler {
            type_idx: None,
            exception_type: None,
            target: addr.wrapping_mul(2),
        });
    }
    Ok(handlers)
}
