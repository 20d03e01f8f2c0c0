// Thu Oct 15 2026 - Alex

use crate::disasm::opcode::{
    FILL_ARRAY_DATA_PAYLOAD, PACKED_SWITCH_PAYLOAD, SPARSE_SWITCH_PAYLOAD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    PackedSwitch,
    SparseSwitch,
    FillArrayData,
}

impl PayloadKind {
    pub fn from_unit(unit: u16) -> Option<Self> {
        match unit {
            PACKED_SWITCH_PAYLOAD => Some(PayloadKind::PackedSwitch),
            SPARSE_SWITCH_PAYLOAD => Some(PayloadKind::SparseSwitch),
            FILL_ARRAY_DATA_PAYLOAD => Some(PayloadKind::FillArrayData),
            _ => None,
        }
    }

    pub fn ident(&self) -> u16 {
        match self {
            PayloadKind::PackedSwitch => PACKED_SWITCH_PAYLOAD,
            PayloadKind::SparseSwitch => SPARSE_SWITCH_PAYLOAD,
            PayloadKind::FillArrayData => FILL_ARRAY_DATA_PAYLOAD,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PayloadKind::PackedSwitch => "packed-switch-payload",
            PayloadKind::SparseSwitch => "sparse-switch-payload",
            PayloadKind::FillArrayData => "array-payload",
        }
    }
}

/// Out-of-line data referenced by `packed-switch`, `sparse-switch` and
/// `fill-array-data`. Switch targets are relative to the referencing
/// instruction, in code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    PackedSwitch {
        first_key: i32,
        targets: Vec<i32>,
    },
    SparseSwitch {
        keys: Vec<i32>,
        targets: Vec<i32>,
    },
    FillArrayData {
        element_width: u16,
        size: u32,
        data: Vec<u8>,
    },
}

/// Length in code units that a payload header declares, or `None` if the
/// header itself is cut off.
pub fn declared_units(units: &[u16]) -> Option<u64> {
    let kind = PayloadKind::from_unit(*units.first()?)?;
    let size = *units.get(1)? as u64;
    match kind {
        PayloadKind::PackedSwitch => Some(4 + size * 2),
        PayloadKind::SparseSwitch => Some(2 + size * 4),
        PayloadKind::FillArrayData => {
            let width = size;
            let count = *units.get(2)? as u64 | (*units.get(3)? as u64) << 16;
            Some(4 + (width * count + 1) / 2)
        }
    }
}

impl Payload {
    /// Decodes the payload starting at `units[0]`. `units` may extend past
    /// the payload; the error names the mismatch when it is too short.
    pub fn decode(units: &[u16]) -> Result<Self, String> {
        let kind = units
            .first()
            .and_then(|u| PayloadKind::from_unit(*u))
            .ok_or_else(|| "missing payload signature".to_string())?;
        let declared = declared_units(units)
            .ok_or_else(|| format!("{} header is truncated", kind.name()))?;
        if declared > units.len() as u64 {
            return Err(format!(
                "{} declares {} code units, {} available",
                kind.name(),
                declared,
                units.len()
            ));
        }

        let int_at = |i: usize| (units[i] as u32 | (units[i + 1] as u32) << 16) as i32;
        let size = units[1] as usize;
        let payload = match kind {
            PayloadKind::PackedSwitch => Payload::PackedSwitch {
                first_key: int_at(2),
                targets: (0..size).map(|i| int_at(4 + i * 2)).collect(),
            },
            PayloadKind::SparseSwitch => Payload::SparseSwitch {
                keys: (0..size).map(|i| int_at(2 + i * 2)).collect(),
                targets: (0..size).map(|i| int_at(2 + size * 2 + i * 2)).collect(),
            },
            PayloadKind::FillArrayData => {
                let element_width = units[1];
                let count = int_at(2) as u32;
                let len = element_width as usize * count as usize;
                let data = units[4..declared as usize]
                    .iter()
                    .flat_map(|u| u.to_le_bytes())
                    .take(len)
                    .collect();
                Payload::FillArrayData {
                    element_width,
                    size: count,
                    data,
                }
            }
        };
        Ok(payload)
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::PackedSwitch { .. } => PayloadKind::PackedSwitch,
            Payload::SparseSwitch { .. } => PayloadKind::SparseSwitch,
            Payload::FillArrayData { .. } => PayloadKind::FillArrayData,
        }
    }

    pub fn units(&self) -> usize {
        match self {
            Payload::PackedSwitch { targets, .. } => 4 + targets.len() * 2,
            Payload::SparseSwitch { keys, .. } => 2 + keys.len() * 4,
            Payload::FillArrayData { data, .. } => 4 + (data.len() + 1) / 2,
        }
    }

    /// `(key, relative target)` pairs of a switch payload.
    pub fn switch_cases(&self) -> Vec<(i32, i32)> {
        match self {
            Payload::PackedSwitch { first_key, targets } => targets
                .iter()
                .enumerate()
                .map(|(i, t)| (first_key.wrapping_add(i as i32), *t))
                .collect(),
            Payload::SparseSwitch { keys, targets } => {
                keys.iter().copied().zip(targets.iter().copied()).collect()
            }
            Payload::FillArrayData { .. } => Vec::new(),
        }
    }

    pub fn encode(&self) -> Vec<u16> {
        let mut out = vec![self.kind().ident()];
        let push_int = |out: &mut Vec<u16>, v: i32| {
            out.push(v as u32 as u16);
            out.push((v as u32 >> 16) as u16);
        };
        match self {
            Payload::PackedSwitch { first_key, targets } => {
                out.push(targets.len() as u16);
                push_int(&mut out, *first_key);
                for t in targets {
                    push_int(&mut out, *t);
                }
            }
            Payload::SparseSwitch { keys, targets } => {
                out.push(keys.len() as u16);
                for k in keys {
                    push_int(&mut out, *k);
                }
                for t in targets {
                    push_int(&mut out, *t);
                }
            }
            Payload::FillArrayData {
                element_width,
                size,
                data,
            } => {
                out.push(*element_width);
                push_int(&mut out, *size as i32);
                for pair in data.chunks(2) {
                    let lo = pair[0] as u16;
                    let hi = pair.get(1).copied().unwrap_or(0) as u16;
                    out.push(lo | hi << 8);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_switch() {
        let units = [0x0100, 2, 10, 0, 5, 0, 0xfffe, 0xffff];
        let payload = Payload::decode(&units).unwrap();
        assert_eq!(
            payload,
            Payload::PackedSwitch {
                first_key: 10,
                targets: vec![5, -2]
            }
        );
        assert_eq!(payload.units(), units.len());
        assert_eq!(payload.switch_cases(), vec![(10, 5), (11, -2)]);
        assert_eq!(payload.encode(), units);
    }

    #[test]
    fn test_sparse_switch() {
        let units = [0x0200, 2, 1, 0, 100, 0, 3, 0, 7, 0];
        let payload = Payload::decode(&units).unwrap();
        assert_eq!(payload.switch_cases(), vec![(1, 3), (100, 7)]);
        assert_eq!(payload.encode(), units);
    }

    #[test]
    fn test_fill_array_data_odd_length() {
        let units = [0x0300, 1, 3, 0, 0x0201, 0x0003];
        let payload = Payload::decode(&units).unwrap();
        assert_eq!(
            payload,
            Payload::FillArrayData {
                element_width: 1,
                size: 3,
                data: vec![1, 2, 3]
            }
        );
        assert_eq!(payload.units(), 6);
        assert_eq!(payload.encode(), units);
    }

    #[test]
    fn test_declared_size_past_end() {
        let units = [0x0100, 40, 0, 0];
        assert_eq!(declared_units(&units), Some(84));
        assert!(Payload::decode(&units).is_err());
        assert!(Payload::decode(&[0x0300, 4]).is_err());
    }
}
