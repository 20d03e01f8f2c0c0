// Mon Oct 12 2026 - Alex

//! Modified UTF-8 as used by DEX string_data_item: NUL is written as the
//! two-byte form `C0 80` and supplementary characters are written as two
//! three-byte surrogate sequences.

pub fn decode(bytes: &[u8], expected_utf16_len: usize) -> Result<String, String> {
    let mut units: Vec<u16> = Vec::with_capacity(expected_utf16_len);
    let mut i = 0;

    while i < bytes.len() {
        let b0 = bytes[i];
        if b0 & 0x80 == 0 {
            units.push(b0 as u16);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = continuation(bytes, i, 1)?;
            units.push((((b0 & 0x1F) as u16) << 6) | b1 as u16);
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = continuation(bytes, i, 1)?;
            let b2 = continuation(bytes, i, 2)?;
            units.push((((b0 & 0x0F) as u16) << 12) | ((b1 as u16) << 6) | b2 as u16);
            i += 3;
        } else {
            return Err(format!("invalid lead byte {:#04x} at position {}", b0, i));
        }
    }

    if units.len() != expected_utf16_len {
        return Err(format!(
            "declared {} UTF-16 units, decoded {}",
            expected_utf16_len,
            units.len()
        ));
    }

    String::from_utf16(&units).map_err(|_| "unpaired surrogate".to_string())
}

fn continuation(bytes: &[u8], start: usize, index: usize) -> Result<u8, String> {
    match bytes.get(start + index) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(b & 0x3F),
        Some(&b) => Err(format!(
            "invalid continuation byte {:#04x} at position {}",
            b,
            start + index
        )),
        None => Err(format!("sequence at position {} is cut short", start)),
    }
}

pub fn encode(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}
