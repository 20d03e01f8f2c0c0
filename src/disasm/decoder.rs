// Fri Oct 16 2026 - Alex

use crate::disasm::codec::decode_operands;
use crate::disasm::{DecodeIssue, Instruction, OpKind, Opcode, Payload, PayloadKind};
use std::collections::BTreeMap;

/// Output of one linear decode over a method's code units.
#[derive(Debug, Clone, Default)]
pub struct DecodedUnits {
    pub instructions: Vec<Instruction>,
    pub issues: Vec<DecodeIssue>,
    /// Byte offset from which nothing could be decoded.
    pub undisassembled_from: Option<u32>,
}

/// Decodes `units` front to back, always advancing by the declared length
/// of the instruction just read.
///
/// A unit carrying a payload signature is decoded as a payload when it is
/// the target of an earlier switch/fill-array-data instruction, or when its
/// declared size fits in the remaining code. A referenced payload whose size
/// does not fit ends decoding; an unreferenced one is read as a `nop`.
pub fn decode_units(units: &[u16]) -> DecodedUnits {
    let mut out = DecodedUnits::default();
    // payload unit position -> (expected kind, byte offset of the referrer)
    let mut referenced: BTreeMap<usize, (PayloadKind, u32)> = BTreeMap::new();
    let mut pos = 0usize;

    while pos < units.len() {
        let offset = (pos * 2) as u32;
        let unit = units[pos];

        if PayloadKind::from_unit(unit).is_some() {
            match Payload::decode(&units[pos..]) {
                Ok(payload) => {
                    let len = payload.units();
                    out.instructions.push(Instruction {
                        offset,
                        length: (len * 2) as u32,
                        opcode: Opcode::NOP,
                        operands: Vec::new(),
                        payload: Some(payload),
                    });
                    pos += len;
                    continue;
                }
                Err(reason) if referenced.contains_key(&pos) => {
                    out.issues.push(DecodeIssue::MalformedPayload { offset, reason });
                    out.undisassembled_from = Some(offset);
                    break;
                }
                Err(_) => {}
            }
        }

        let opcode = Opcode(unit as u8);
        if opcode.is_unused() {
            out.issues.push(DecodeIssue::UnknownOpcode {
                offset,
                opcode: opcode.value(),
            });
            pos += 1;
            continue;
        }

        let needed = opcode.format().units();
        if pos + needed > units.len() {
            out.issues.push(DecodeIssue::TruncatedInstruction {
                offset,
                needed: needed as u32,
                available: (units.len() - pos) as u32,
            });
            out.undisassembled_from = Some(offset);
            break;
        }

        match decode_operands(opcode, &units[pos..pos + needed]) {
            Ok(operands) => {
                let insn = Instruction {
                    offset,
                    length: (needed * 2) as u32,
                    opcode,
                    operands,
                    payload: None,
                };
                if let Some(expected) = expected_payload(opcode) {
                    match insn.branch_target() {
                        Some(target) => {
                            referenced.insert(target as usize / 2, (expected, offset));
                        }
                        None => out.issues.push(DecodeIssue::MalformedPayload {
                            offset,
                            reason: "payload offset points before the method".to_string(),
                        }),
                    }
                }
                out.instructions.push(insn);
            }
            Err(count) => out
                .issues
                .push(DecodeIssue::InvalidRegisterCount { offset, count }),
        }
        pos += needed;
    }

    check_payloads(&mut out, &referenced);
    out.issues.sort_by_key(|issue| issue.offset());
    out
}

fn expected_payload(opcode: Opcode) -> Option<PayloadKind> {
    match (opcode.kind(), opcode) {
        (OpKind::FillArrayData, _) => Some(PayloadKind::FillArrayData),
        (_, Opcode::PACKED_SWITCH) => Some(PayloadKind::PackedSwitch),
        (_, Opcode::SPARSE_SWITCH) => Some(PayloadKind::SparseSwitch),
        _ => None,
    }
}

fn check_payloads(out: &mut DecodedUnits, referenced: &BTreeMap<usize, (PayloadKind, u32)>) {
    let payloads: BTreeMap<u32, PayloadKind> = out
        .instructions
        .iter()
        .filter_map(|i| i.payload.as_ref().map(|p| (i.offset, p.kind())))
        .collect();

    for (&pos, &(expected, referrer)) in referenced {
        let target = (pos * 2) as u32;
        if out.undisassembled_from.is_some_and(|cut| target >= cut) {
            continue;
        }
        match payloads.get(&target) {
            Some(kind) if *kind == expected => {}
            Some(kind) => out.issues.push(DecodeIssue::MalformedPayload {
                offset: referrer,
                reason: format!("expected {} at {:#x}, found {}", expected.name(), target, kind.name()),
            }),
            None => out.issues.push(DecodeIssue::MalformedPayload {
                offset: referrer,
                reason: format!("no {} at {:#x}", expected.name(), target),
            }),
        }
    }

    for &offset in payloads.keys() {
        if !referenced.contains_key(&(offset as usize / 2)) {
            out.issues.push(DecodeIssue::OrphanPayload { offset });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_return_void() {
        let decoded = decode_units(&[0x000e]);
        assert_eq!(decoded.instructions.len(), 1);
        assert_eq!(decoded.instructions[0].offset, 0);
        assert_eq!(decoded.instructions[0].length, 2);
        assert!(decoded.instructions[0].is_return());
        assert!(decoded.issues.is_empty());
    }

    #[test]
    fn test_offsets_follow_lengths() {
        // const/16 v0, 1; invoke-static {v0}; return-void
        let decoded = decode_units(&[0x0013, 0x0001, 0x1071, 0x0000, 0x0000, 0x000e]);
        let offsets: Vec<u32> = decoded.instructions.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0, 4, 10]);
    }

    #[test]
    fn test_unknown_opcode_skips_one_unit() {
        let decoded = decode_units(&[0x003e, 0x000e]);
        assert_eq!(decoded.instructions.len(), 1);
        assert_eq!(decoded.instructions[0].offset, 2);
        assert_eq!(
            decoded.issues,
            vec![DecodeIssue::UnknownOpcode { offset: 0, opcode: 0x3e }]
        );
        assert!(decoded.undisassembled_from.is_none());
    }

    #[test]
    fn test_truncated_instruction_stops() {
        let decoded = decode_units(&[0x000e, 0x0014, 0x0001]);
        assert_eq!(decoded.instructions.len(), 1);
        assert_eq!(decoded.undisassembled_from, Some(2));
        assert!(matches!(
            decoded.issues[0],
            DecodeIssue::TruncatedInstruction { offset: 2, needed: 3, available: 2 }
        ));
    }

    #[test]
    fn test_packed_switch_payload_is_not_code() {
        let units = [
            0x002b, 0x0004, 0x0000, // packed-switch v0, +4
            0x000e, // return-void
            0x0100, 0x0001, 0x0000, 0x0000, 0x0003, 0x0000, // payload
        ];
        let decoded = decode_units(&units);
        assert!(decoded.issues.is_empty(), "{:?}", decoded.issues);
        assert_eq!(decoded.instructions.len(), 3);
        let payload = &decoded.instructions[2];
        assert_eq!(payload.offset, 8);
        assert_eq!(payload.name(), "packed-switch-payload");
        assert_eq!(payload.length, 12);
    }

    #[test]
    fn test_referenced_payload_with_bad_size() {
        let units = [0x002b, 0x0004, 0x0000, 0x000e, 0x0100, 0x0009, 0x0000];
        let decoded = decode_units(&units);
        assert_eq!(decoded.instructions.len(), 2);
        assert_eq!(decoded.undisassembled_from, Some(8));
        assert!(matches!(
            decoded.issues[0],
            DecodeIssue::MalformedPayload { offset: 8, .. }
        ));
    }

    #[test]
    fn test_orphan_payload_is_reported() {
        let units = [0x000e, 0x0300, 0x0001, 0x0002, 0x0000, 0x0201];
        let decoded = decode_units(&units);
        assert_eq!(decoded.instructions.len(), 2);
        assert!(decoded.instructions[1].is_payload());
        assert_eq!(decoded.issues, vec![DecodeIssue::OrphanPayload { offset: 2 }]);
    }

    #[test]
    fn test_unreferenced_signature_that_does_not_fit_is_nop() {
        let decoded = decode_units(&[0x0100, 0x0050, 0x000e]);
        let names: Vec<&str> = decoded.instructions.iter().map(|i| i.name()).collect();
        // 0x0050 is aput-char, a 23x instruction spanning two units
        assert_eq!(names[0], "nop");
        assert_eq!(decoded.instructions[0].offset, 0);
    }

    #[test]
    fn test_switch_to_wrong_payload_kind() {
        let units = [
            0x002c, 0x0004, 0x0000, // sparse-switch v0, +4
            0x000e,
            0x0100, 0x0000, 0x0000, 0x0000, // empty packed payload
        ];
        let decoded = decode_units(&units);
        assert!(decoded
            .issues
            .iter()
            .any(|i| matches!(i, DecodeIssue::MalformedPayload { offset: 0, .. })));
    }
}
