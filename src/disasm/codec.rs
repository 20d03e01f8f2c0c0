// Thu Oct 15 2026 - Alex

use crate::disasm::{Format, Opcode, Operand, ReferenceKind};

const CONST_HIGH16: u8 = 0x15;

/// Decodes the operands of a fixed-format instruction. `units` holds exactly
/// `format.units()` code units. Fails with the offending register count when
/// a `35c`/`45cc` instruction names more than five registers.
pub fn decode_operands(op: Opcode, units: &[u16]) -> Result<Vec<Operand>, u8> {
    let info = op.info();
    let kind = info.reference.unwrap_or(ReferenceKind::Type);
    let u0 = units[0];
    let a8 = u0 >> 8;
    let a4 = (u0 >> 8) & 0xf;
    let b4 = u0 >> 12;
    let index = |i: u32| Operand::Index { kind, index: i };
    let wide32 = |lo: usize| units[lo] as u32 | (units[lo + 1] as u32) << 16;

    let operands = match info.format {
        Format::F10x => Vec::new(),
        Format::F12x => vec![Operand::Register(a4), Operand::Register(b4)],
        Format::F11n => {
            let lit = (((b4 as u8) << 4) as i8) >> 4;
            vec![Operand::Register(a4), Operand::Literal(lit as i64)]
        }
        Format::F11x => vec![Operand::Register(a8)],
        Format::F10t => vec![Operand::Branch(a8 as u8 as i8 as i32)],
        Format::F20t => vec![Operand::Branch(units[1] as i16 as i32)],
        Format::F22x => vec![Operand::Register(a8), Operand::Register(units[1])],
        Format::F21t => vec![
            Operand::Register(a8),
            Operand::Branch(units[1] as i16 as i32),
        ],
        Format::F21s => vec![
            Operand::Register(a8),
            Operand::Literal(units[1] as i16 as i64),
        ],
        Format::F21h => {
            let lit = if op.0 == CONST_HIGH16 {
                ((units[1] as u32) << 16) as i32 as i64
            } else {
                ((units[1] as u64) << 48) as i64
            };
            vec![Operand::Register(a8), Operand::Literal(lit)]
        }
        Format::F21c => vec![Operand::Register(a8), index(units[1] as u32)],
        Format::F23x => vec![
            Operand::Register(a8),
            Operand::Register(units[1] & 0xff),
            Operand::Register(units[1] >> 8),
        ],
        Format::F22b => vec![
            Operand::Register(a8),
            Operand::Register(units[1] & 0xff),
            Operand::Literal((units[1] >> 8) as u8 as i8 as i64),
        ],
        Format::F22t => vec![
            Operand::Register(a4),
            Operand::Register(b4),
            Operand::Branch(units[1] as i16 as i32),
        ],
        Format::F22s => vec![
            Operand::Register(a4),
            Operand::Register(b4),
            Operand::Literal(units[1] as i16 as i64),
        ],
        Format::F22c => vec![
            Operand::Register(a4),
            Operand::Register(b4),
            index(units[1] as u32),
        ],
        Format::F32x => vec![Operand::Register(units[1]), Operand::Register(units[2])],
        Format::F30t => vec![Operand::Branch(wide32(1) as i32)],
        Format::F31t => vec![Operand::Register(a8), Operand::Branch(wide32(1) as i32)],
        Format::F31i => vec![
            Operand::Register(a8),
            Operand::Literal(wide32(1) as i32 as i64),
        ],
        Format::F31c => vec![Operand::Register(a8), index(wide32(1))],
        Format::F35c | Format::F45cc => {
            let count = b4 as usize;
            if count > 5 {
                return Err(count as u8);
            }
            let packed = units[2];
            let regs = [
                packed & 0xf,
                (packed >> 4) & 0xf,
                (packed >> 8) & 0xf,
                packed >> 12,
                a4,
            ];
            let mut operands: Vec<Operand> =
                regs[..count].iter().map(|r| Operand::Register(*r)).collect();
            operands.push(index(units[1] as u32));
            if info.format == Format::F45cc {
                operands.push(Operand::Index {
                    kind: ReferenceKind::Proto,
                    index: units[3] as u32,
                });
            }
            operands
        }
        Format::F3rc | Format::F4rcc => {
            let mut operands = vec![
                Operand::RegisterRange {
                    first: units[2],
                    count: a8,
                },
                index(units[1] as u32),
            ];
            if info.format == Format::F4rcc {
                operands.push(Operand::Index {
                    kind: ReferenceKind::Proto,
                    index: units[3] as u32,
                });
            }
            operands
        }
        Format::F51l => {
            let lit = (0..4).fold(0u64, |acc, i| acc | (units[1 + i] as u64) << (16 * i));
            vec![Operand::Register(a8), Operand::Literal(lit as i64)]
        }
    };
    Ok(operands)
}

fn reg(operand: Option<&Operand>, max: u16) -> Option<u16> {
    operand.and_then(|o| o.as_register()).filter(|r| *r <= max)
}

fn scalar(operand: Option<&Operand>, min: i64, max: i64) -> Option<i64> {
    operand.and_then(|o| o.scalar()).filter(|v| (min..=max).contains(v))
}

fn split32(value: i64) -> [u16; 2] {
    let v = value as u32;
    [v as u16, (v >> 16) as u16]
}

/// Re-encodes operands into code units. Returns `None` when the operands do
/// not fit the opcode's format.
///
/// Output is canonical: `35c`/`45cc` register nibbles past the register count
/// are written as zero, so units carrying non-zero padding there re-encode to
/// their zero-padded form.
pub fn encode_operands(op: Opcode, operands: &[Operand]) -> Option<Vec<u16>> {
    let format = op.format();
    let code = op.0 as u16;
    let o = |i: usize| operands.get(i);
    let arity = |n: usize| if operands.len() == n { Some(()) } else { None };
    const I16: (i64, i64) = (i16::MIN as i64, i16::MAX as i64);
    const U16: (i64, i64) = (0, u16::MAX as i64);
    const I32: (i64, i64) = (i32::MIN as i64, i32::MAX as i64);
    const U32: (i64, i64) = (0, u32::MAX as i64);

    let units = match format {
        Format::F10x => {
            arity(0)?;
            vec![code]
        }
        Format::F12x => {
            arity(2)?;
            vec![code | reg(o(0), 0xf)? << 8 | reg(o(1), 0xf)? << 12]
        }
        Format::F11n => {
            arity(2)?;
            let lit = scalar(o(1), -8, 7)? as u16 & 0xf;
            vec![code | reg(o(0), 0xf)? << 8 | lit << 12]
        }
        Format::F11x => {
            arity(1)?;
            vec![code | reg(o(0), 0xff)? << 8]
        }
        Format::F10t => {
            arity(1)?;
            let target = scalar(o(0), -128, 127)? as i8 as u8 as u16;
            vec![code | target << 8]
        }
        Format::F20t => {
            arity(1)?;
            vec![code, scalar(o(0), I16.0, I16.1)? as u16]
        }
        Format::F22x => {
            arity(2)?;
            vec![code | reg(o(0), 0xff)? << 8, reg(o(1), 0xffff)?]
        }
        Format::F21t | Format::F21s => {
            arity(2)?;
            vec![code | reg(o(0), 0xff)? << 8, scalar(o(1), I16.0, I16.1)? as u16]
        }
        Format::F21h => {
            arity(2)?;
            let lit = o(1)?.as_literal()?;
            let high = if op.0 == CONST_HIGH16 {
                if lit != (lit as i32) as i64 || lit & 0xffff != 0 {
                    return None;
                }
                (lit as u32 >> 16) as u16
            } else {
                if lit & 0xffff_ffff_ffff != 0 {
                    return None;
                }
                (lit as u64 >> 48) as u16
            };
            vec![code | reg(o(0), 0xff)? << 8, high]
        }
        Format::F21c => {
            arity(2)?;
            vec![code | reg(o(0), 0xff)? << 8, scalar(o(1), U16.0, U16.1)? as u16]
        }
        Format::F23x => {
            arity(3)?;
            vec![
                code | reg(o(0), 0xff)? << 8,
                reg(o(1), 0xff)? | reg(o(2), 0xff)? << 8,
            ]
        }
        Format::F22b => {
            arity(3)?;
            let lit = scalar(o(2), -128, 127)? as i8 as u8 as u16;
            vec![code | reg(o(0), 0xff)? << 8, reg(o(1), 0xff)? | lit << 8]
        }
        Format::F22t | Format::F22s | Format::F22c => {
            arity(3)?;
            let (min, max) = if format == Format::F22c { U16 } else { I16 };
            vec![
                code | reg(o(0), 0xf)? << 8 | reg(o(1), 0xf)? << 12,
                scalar(o(2), min, max)? as u16,
            ]
        }
        Format::F32x => {
            arity(2)?;
            vec![code, reg(o(0), 0xffff)?, reg(o(1), 0xffff)?]
        }
        Format::F30t => {
            arity(1)?;
            let [lo, hi] = split32(scalar(o(0), I32.0, I32.1)?);
            vec![code, lo, hi]
        }
        Format::F31t | Format::F31i | Format::F31c => {
            arity(2)?;
            let (min, max) = if format == Format::F31c { U32 } else { I32 };
            let [lo, hi] = split32(scalar(o(1), min, max)?);
            vec![code | reg(o(0), 0xff)? << 8, lo, hi]
        }
        Format::F35c | Format::F45cc => {
            let extra = if format == Format::F45cc { 2 } else { 1 };
            let count = operands.len().checked_sub(extra)?;
            if count > 5 {
                return None;
            }
            let mut regs = [0u16; 5];
            for (i, slot) in regs.iter_mut().enumerate().take(count) {
                *slot = reg(o(i), 0xf)?;
            }
            let packed = regs[0] | regs[1] << 4 | regs[2] << 8 | regs[3] << 12;
            let mut units = vec![
                code | regs[4] << 8 | (count as u16) << 12,
                scalar(o(count), U16.0, U16.1)? as u16,
                packed,
            ];
            if format == Format::F45cc {
                units.push(scalar(o(count + 1), U16.0, U16.1)? as u16);
            }
            units
        }
        Format::F3rc | Format::F4rcc => {
            let extra = if format == Format::F4rcc { 3 } else { 2 };
            arity(extra)?;
            let Operand::RegisterRange { first, count } = *o(0)? else {
                return None;
            };
            if count > 0xff {
                return None;
            }
            let mut units = vec![
                code | count << 8,
                scalar(o(1), U16.0, U16.1)? as u16,
                first,
            ];
            if format == Format::F4rcc {
                units.push(scalar(o(2), U16.0, U16.1)? as u16);
            }
            units
        }
        Format::F51l => {
            arity(2)?;
            let lit = o(1)?.as_literal()? as u64;
            vec![
                code | reg(o(0), 0xff)? << 8,
                lit as u16,
                (lit >> 16) as u16,
                (lit >> 32) as u16,
                (lit >> 48) as u16,
            ]
        }
    };
    Some(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(units: &[u16]) {
        let op = Opcode(units[0] as u8);
        assert_eq!(op.format().units(), units.len(), "{}", op);
        let operands = decode_operands(op, units).unwrap();
        assert_eq!(encode_operands(op, &operands).unwrap(), units, "{}", op);
    }

    #[test]
    fn test_round_trip_every_format() {
        round_trip(&[0x000e]); // return-void
        round_trip(&[0x2101]); // move v1, v2
        round_trip(&[0xf012]); // const/4 v0, #-1
        round_trip(&[0x050f]); // return v5
        round_trip(&[0xfe28]); // goto -2
        round_trip(&[0x0029, 0xff00]); // goto/16
        round_trip(&[0x1002, 0x0123]); // move/from16
        round_trip(&[0x0338, 0x0004]); // if-eqz v3, +4
        round_trip(&[0x0113, 0x8000]); // const/16 v1, #-0x8000
        round_trip(&[0x0215, 0x4120]); // const/high16
        round_trip(&[0x0219, 0x4024]); // const-wide/high16
        round_trip(&[0x001a, 0x0007]); // const-string v0, string@7
        round_trip(&[0x0090, 0x0201]); // add-int v0, v1, v2
        round_trip(&[0x00d8, 0xff01]); // add-int/lit8 v0, v1, #-1
        round_trip(&[0x1032, 0xfffe]); // if-eq v0, v1, -2
        round_trip(&[0x10d0, 0x1234]); // add-int/lit16
        round_trip(&[0x1054, 0x0003]); // iget-object v0, v1, field@3
        round_trip(&[0x0003, 0x0100, 0x0200]); // move/16
        round_trip(&[0x002a, 0x0000, 0x0001]); // goto/32
        round_trip(&[0x002b, 0x0008, 0x0000]); // packed-switch v0, +8
        round_trip(&[0x0014, 0xffff, 0x7fff]); // const
        round_trip(&[0x001b, 0x0001, 0x0001]); // const-string/jumbo
        round_trip(&[0x206e, 0x0002, 0x0010]); // invoke-virtual {v0, v1}
        round_trip(&[0x5471, 0x0002, 0x3210]); // invoke-static {v0..v3, v4}
        round_trip(&[0x3071, 0x0002, 0x0210]); // invoke-static {v0, v1, v2}
        round_trip(&[0x0374, 0x0009, 0x0004]); // invoke-static/range {v4 .. v6}
        round_trip(&[0x20fa, 0x0001, 0x0010, 0x0002]); // invoke-polymorphic
        round_trip(&[0x02fb, 0x0001, 0x0003, 0x0002]); // invoke-polymorphic/range
        round_trip(&[0x0018, 0x1111, 0x2222, 0x3333, 0x8444]); // const-wide
    }

    #[test]
    fn test_decoded_values() {
        let ops = decode_operands(Opcode(0x12), &[0xf012]).unwrap();
        assert_eq!(ops, vec![Operand::Register(0), Operand::Literal(-1)]);

        let ops = decode_operands(Opcode(0x15), &[0x0215, 0x4120]).unwrap();
        assert_eq!(ops[1], Operand::Literal(0x4120_0000));

        let ops = decode_operands(Opcode(0x6e), &[0x206e, 0x0002, 0x0010]).unwrap();
        assert_eq!(
            ops,
            vec![
                Operand::Register(0),
                Operand::Register(1),
                Operand::Index {
                    kind: ReferenceKind::Method,
                    index: 2
                },
            ]
        );

        let ops = decode_operands(Opcode(0x74), &[0x0374, 0x0009, 0x0004]).unwrap();
        assert_eq!(ops[0], Operand::RegisterRange { first: 4, count: 3 });
    }

    #[test]
    fn test_invoke_padding_nibbles_are_canonicalized() {
        let op = Opcode(0x71);
        let ops = decode_operands(op, &[0x1071, 0x0002, 0x00f1]).unwrap();
        assert_eq!(ops[0], Operand::Register(1));
        assert_eq!(encode_operands(op, &ops).unwrap(), vec![0x1071, 0x0002, 0x0001]);

        let ops = decode_operands(op, &[0x1971, 0x0000, 0x0000]).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(encode_operands(op, &ops).unwrap(), vec![0x1071, 0x0000, 0x0000]);
    }

    #[test]
    fn test_too_many_invoke_registers() {
        assert_eq!(decode_operands(Opcode(0x6e), &[0x606e, 0, 0]), Err(6));
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert!(encode_operands(Opcode(0x12), &[Operand::Register(0), Operand::Literal(8)]).is_none());
        assert!(encode_operands(Opcode(0x01), &[Operand::Register(16), Operand::Register(0)]).is_none());
        assert!(encode_operands(Opcode(0x0e), &[Operand::Register(0)]).is_none());
    }
}
