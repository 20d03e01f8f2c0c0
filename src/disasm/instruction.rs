// Thu Oct 15 2026 - Alex

use crate::disasm::codec::encode_operands;
use crate::disasm::{Format, OpKind, Opcode, Operand, Payload, ReferenceKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset from the start of the method's code.
    pub offset: u32,
    /// Length in bytes.
    pub length: u32,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub payload: Option<Payload>,
}

impl Instruction {
    pub fn name(&self) -> &'static str {
        match &self.payload {
            Some(payload) => payload.kind().name(),
            None => self.opcode.name(),
        }
    }

    pub fn format(&self) -> Format {
        self.opcode.format()
    }

    pub fn kind(&self) -> OpKind {
        self.opcode.kind()
    }

    pub fn units(&self) -> u32 {
        self.length / 2
    }

    pub fn end(&self) -> u32 {
        self.offset + self.length
    }

    pub fn is_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn is_return(&self) -> bool {
        !self.is_payload() && self.kind() == OpKind::Return
    }

    pub fn is_throw(&self) -> bool {
        !self.is_payload() && self.kind() == OpKind::Throw
    }

    pub fn is_goto(&self) -> bool {
        !self.is_payload() && self.kind() == OpKind::Goto
    }

    pub fn is_conditional_branch(&self) -> bool {
        !self.is_payload() && matches!(self.kind(), OpKind::IfTest | OpKind::IfTestZ)
    }

    pub fn is_branch(&self) -> bool {
        self.is_goto() || self.is_conditional_branch()
    }

    pub fn is_switch(&self) -> bool {
        !self.is_payload() && self.kind() == OpKind::Switch
    }

    pub fn is_invoke(&self) -> bool {
        !self.is_payload() && self.kind() == OpKind::Invoke
    }

    pub fn is_field_get(&self) -> bool {
        !self.is_payload() && matches!(self.kind(), OpKind::InstanceGet | OpKind::StaticGet)
    }

    pub fn is_field_put(&self) -> bool {
        !self.is_payload() && matches!(self.kind(), OpKind::InstancePut | OpKind::StaticPut)
    }

    /// Ends a basic block with no fall-through successor.
    pub fn is_terminator(&self) -> bool {
        self.is_return() || self.is_throw() || self.is_goto()
    }

    pub fn can_fall_through(&self) -> bool {
        !self.is_terminator() && !self.is_payload()
    }

    /// Absolute byte offset of a goto/if/switch/fill-array-data target.
    /// For switches and fill-array-data this is the payload location.
    pub fn branch_target(&self) -> Option<u32> {
        if self.is_payload() {
            return None;
        }
        let rel = self.operands.iter().find_map(|o| o.as_branch())?;
        let target = self.offset as i64 + rel as i64 * 2;
        u32::try_from(target).ok()
    }

    /// First pool reference carried by the instruction.
    pub fn reference(&self) -> Option<(ReferenceKind, u32)> {
        self.operands.iter().find_map(|o| o.as_index())
    }

    pub fn registers(&self) -> Vec<u16> {
        self.operands.iter().flat_map(|o| o.registers()).collect()
    }

    /// Re-encodes the instruction into code units.
    pub fn encode(&self) -> Option<Vec<u16>> {
        match &self.payload {
            Some(payload) => Some(payload.encode()),
            None => encode_operands(self.opcode, &self.operands),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        for (i, operand) in self.operands.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{}", operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insn(offset: u32, units: &[u16]) -> Instruction {
        let opcode = Opcode(units[0] as u8);
        Instruction {
            offset,
            length: units.len() as u32 * 2,
            opcode,
            operands: crate::disasm::codec::decode_operands(opcode, units).unwrap(),
            payload: None,
        }
    }

    #[test]
    fn test_classification() {
        let ret = insn(0, &[0x000e]);
        assert!(ret.is_return() && ret.is_terminator());
        assert!(!ret.can_fall_through());

        let ifz = insn(4, &[0x0338, 0x0004]);
        assert!(ifz.is_conditional_branch() && ifz.can_fall_through());
        assert_eq!(ifz.branch_target(), Some(12));

        let back = insn(6, &[0xfd28]);
        assert!(back.is_goto());
        assert_eq!(back.branch_target(), Some(0));

        let call = insn(0, &[0x206e, 0x0002, 0x0010]);
        assert!(call.is_invoke());
        assert_eq!(call.reference(), Some((ReferenceKind::Method, 2)));
        assert_eq!(call.registers(), vec![0, 1]);
    }

    #[test]
    fn test_display() {
        assert_eq!(insn(0, &[0x2101]).to_string(), "move v1, v2");
        assert_eq!(insn(0, &[0x0338, 0x0004]).to_string(), "if-eqz v3, +4");
    }
}
