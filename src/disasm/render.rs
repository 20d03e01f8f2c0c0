// Fri Oct 16 2026 - Alex

use crate::dex::{FlagTarget, Method, Pools};
use crate::disasm::{DisassembledMethod, Instruction, OpKind, Operand, Payload, ReferenceKind};
use itertools::Itertools;
use std::fmt::Write;

fn reference(pools: &Pools, kind: ReferenceKind, index: u32) -> String {
    let resolved = match kind {
        ReferenceKind::String => pools.string(index).map(|s| format!("{:?}", s)),
        ReferenceKind::Type => pools.type_name(index).map(str::to_string),
        ReferenceKind::Field => pools.field(index).map(|f| f.full_name()),
        ReferenceKind::Method => pools.method(index).map(|m| m.dalvik_name()),
        ReferenceKind::Proto => pools.proto(index).map(|p| p.descriptor()),
        ReferenceKind::CallSite => Some(format!("call_site@{}", index)),
        ReferenceKind::MethodHandle => Some(format!("method_handle@{}", index)),
    };
    resolved.unwrap_or_else(|| format!("{:?}@{}", kind, index).to_lowercase())
}

fn payload_text(payload: &Payload) -> String {
    match payload {
        Payload::PackedSwitch { first_key, targets } => format!(
            "first_key {} targets [{}]",
            first_key,
            targets.iter().map(|t| Operand::Branch(*t).to_string()).join(", ")
        ),
        Payload::SparseSwitch { .. } => format!(
            "[{}]",
            payload
                .switch_cases()
                .iter()
                .map(|(k, t)| format!("{} -> {}", k, Operand::Branch(*t)))
                .join(", ")
        ),
        Payload::FillArrayData {
            element_width,
            size,
            data,
        } => format!(
            "width {} size {} [{}]",
            element_width,
            size,
            data.iter().map(|b| format!("{:02x}", b)).join(" ")
        ),
    }
}

/// Smali-style text for one instruction, pool references resolved:
/// `invoke-virtual {v0, v1}, Lfoo/Bar;->baz(I)V`.
pub fn render_instruction(insn: &Instruction, pools: &Pools) -> String {
    let mut out = insn.name().to_string();
    if let Some(payload) = &insn.payload {
        let _ = write!(out, " {}", payload_text(payload));
        return out;
    }

    let regs: Vec<String> = insn
        .operands
        .iter()
        .filter(|o| matches!(o, Operand::Register(_)))
        .map(|o| o.to_string())
        .collect();
    let braced = insn.is_invoke() || insn.kind() == OpKind::FilledNewArray;

    let mut parts = Vec::new();
    if braced {
        match insn.operands.first() {
            Some(range @ Operand::RegisterRange { .. }) => parts.push(range.to_string()),
            _ => parts.push(format!("{{{}}}", regs.join(", "))),
        }
    } else {
        parts.extend(regs);
    }
    for operand in &insn.operands {
        match operand {
            Operand::Register(_) | Operand::RegisterRange { .. } => {}
            Operand::Literal(_) | Operand::Branch(_) => parts.push(operand.to_string()),
            Operand::Index { kind, index } => parts.push(reference(pools, *kind, *index)),
        }
    }

    if !parts.is_empty() {
        out.push(' ');
        out.push_str(&parts.join(", "));
    }
    out
}

/// Full method listing with offsets and try/catch directives.
pub fn render_method(method: &Method, disassembled: &DisassembledMethod, pools: &Pools) -> String {
    let mut out = String::new();
    let flags = method.access_flags.describe(FlagTarget::Method);
    let _ = writeln!(
        out,
        ".method {}{}{}{}",
        flags,
        if flags.is_empty() { "" } else { " " },
        method.name,
        method.descriptor()
    );
    let _ = writeln!(out, "    .registers {}", disassembled.registers_size);
    for insn in &disassembled.instructions {
        let _ = writeln!(out, "    {:04x}: {}", insn.offset, render_instruction(insn, pools));
    }
    if let Some(cut) = disassembled.undisassembled_from {
        let _ = writeln!(out, "    {:04x}: <undisassembled>", cut);
    }
    for block in &disassembled.exceptions {
        for handler in &block.handlers {
            let _ = writeln!(
                out,
                "    .catch{} {{{:#06x} .. {:#06x}}} {:#06x}",
                handler
                    .exception_type
                    .as_deref()
                    .map(|t| format!(" {}", t))
                    .unwrap_or_else(|| "all".to_string()),
                block.start,
                block.end,
                handler.target
            );
        }
    }
    out.push_str(".end method\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dex::DexFile;
    use crate::disasm::disassemble_method;
    use crate::utils::testing::{CodeSpec, DexBuilder};

    #[test]
    fn test_render_resolves_pool_references() {
        let mut builder = DexBuilder::new();
        let class = builder.class("Lfoo/Bar;", None);
        let hi = builder.string("hi");
        let baz = builder.method("Lfoo/Bar;", "baz", "V", &["I"]);
        let run = builder.method("Lfoo/Bar;", "run", "V", &[]);
        let insns = vec![
            0x001a, hi as u16,
            0x206e, baz as u16, 0x0010,
            0x0038, 0x0002,
            0x000e,
        ];
        builder.add_virtual_method(class, run, 0x0001, Some(CodeSpec::new(2, insns)));
        let data = builder.build();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let method = dex.methods().next().unwrap();
        let result = disassemble_method(&data, &dex.pools, method).unwrap();

        let lines: Vec<String> = result
            .instructions
            .iter()
            .map(|i| render_instruction(i, &dex.pools))
            .collect();
        assert_eq!(
            lines,
            vec![
                "const-string v0, \"hi\"",
                "invoke-virtual {v0, v1}, Lfoo/Bar;->baz(I)V",
                "if-eqz v0, +2",
                "return-void",
            ]
        );

        let listing = render_method(method, &result, &dex.pools);
        assert!(listing.starts_with(".method public run()V\n"));
        assert!(listing.contains("    0004: invoke-virtual"));
        assert!(listing.ends_with(".end method\n"));
    }

    #[test]
    fn test_render_filled_new_array_braces_registers() {
        let mut builder = DexBuilder::new();
        let class = builder.class("Lfoo/Bar;", None);
        let ints = builder.type_id("[I");
        let run = builder.method("Lfoo/Bar;", "run", "V", &[]);
        let insns = vec![
            0x2024, ints as u16, 0x0010,
            0x0225, ints as u16, 0x0000,
            0x000e,
        ];
        builder.add_virtual_method(class, run, 0x0001, Some(CodeSpec::new(2, insns)));
        let data = builder.build();
        let dex = DexFile::parse(&data, &Config::default()).unwrap();
        let method = dex.methods().next().unwrap();
        let result = disassemble_method(&data, &dex.pools, method).unwrap();

        let first = render_instruction(&result.instructions[0], &dex.pools);
        assert_eq!(first, "filled-new-array {v0, v1}, [I");
        let ranged = render_instruction(&result.instructions[1], &dex.pools);
        assert_eq!(ranged, "filled-new-array/range {v0 .. v1}, [I");
    }

    #[test]
    fn test_render_unresolved_reference() {
        let pools = Pools::default();
        assert_eq!(reference(&pools, ReferenceKind::String, 7), "string@7");
        assert_eq!(reference(&pools, ReferenceKind::CallSite, 1), "call_site@1");
    }
}
