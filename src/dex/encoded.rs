// Tue Oct 13 2026 - Alex

use crate::dex::{EncodedValueError, Pools};
use crate::reader::Cursor;
use std::fmt::Write;

pub const MAX_NESTING: usize = 64;

const VALUE_BYTE: u8 = 0x00;
const VALUE_SHORT: u8 = 0x02;
const VALUE_CHAR: u8 = 0x03;
const VALUE_INT: u8 = 0x04;
const VALUE_LONG: u8 = 0x06;
const VALUE_FLOAT: u8 = 0x10;
const VALUE_DOUBLE: u8 = 0x11;
const VALUE_METHOD_TYPE: u8 = 0x15;
const VALUE_METHOD_HANDLE: u8 = 0x16;
const VALUE_STRING: u8 = 0x17;
const VALUE_TYPE: u8 = 0x18;
const VALUE_FIELD: u8 = 0x19;
const VALUE_METHOD: u8 = 0x1a;
const VALUE_ENUM: u8 = 0x1b;
const VALUE_ARRAY: u8 = 0x1c;
const VALUE_ANNOTATION: u8 = 0x1d;
const VALUE_NULL: u8 = 0x1e;
const VALUE_BOOLEAN: u8 = 0x1f;

/// Constant stored in `encoded_value` form. Pool-backed variants keep the
/// raw index; resolve them through [`EncodedValue::render`].
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    MethodType(u32),
    MethodHandle(u32),
    String(u32),
    Type(u32),
    Field(u32),
    Method(u32),
    Enum(u32),
    Array(Vec<EncodedValue>),
    Annotation(EncodedAnnotation),
    Null,
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAnnotation {
    pub type_idx: u32,
    pub elements: Vec<(u32, EncodedValue)>,
}

impl EncodedValue {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self, EncodedValueError> {
        read_value(cursor, 0)
    }

    /// Reads an `encoded_array` (ULEB128 size followed by values).
    pub fn read_array(cursor: &mut Cursor<'_>) -> Result<Vec<Self>, EncodedValueError> {
        read_array(cursor, 0)
    }

    /// Smali spelling of the value with pool references resolved.
    pub fn render(&self, pools: &Pools) -> String {
        let mut out = String::new();
        self.render_into(pools, &mut out);
        out
    }

    fn render_into(&self, pools: &Pools, out: &mut String) {
        let _ = match self {
            EncodedValue::Byte(v) => write!(out, "{:#x}t", v),
            EncodedValue::Short(v) => write!(out, "{:#x}s", v),
            EncodedValue::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(out, "{:?}", c),
                None => write!(out, "'\\u{:04x}'", v),
            },
            EncodedValue::Int(v) => write!(out, "{:#x}", v),
            EncodedValue::Long(v) => write!(out, "{:#x}L", v),
            EncodedValue::Float(v) => write!(out, "{}f", v),
            EncodedValue::Double(v) => write!(out, "{}", v),
            EncodedValue::MethodType(idx) => match pools.proto(*idx) {
                Some(proto) => write!(out, "{}", proto),
                None => write!(out, "proto@{}", idx),
            },
            EncodedValue::MethodHandle(idx) => write!(out, "method_handle@{}", idx),
            EncodedValue::String(idx) => match pools.string(*idx) {
                Some(s) => write!(out, "{:?}", s),
                None => write!(out, "string@{}", idx),
            },
            EncodedValue::Type(idx) => match pools.type_name(*idx) {
                Some(t) => write!(out, "{}", t),
                None => write!(out, "type@{}", idx),
            },
            EncodedValue::Field(idx) | EncodedValue::Enum(idx) => match pools.field(*idx) {
                Some(f) => write!(out, "{}", f.full_name()),
                None => write!(out, "field@{}", idx),
            },
            EncodedValue::Method(idx) => match pools.method(*idx) {
                Some(m) => write!(out, "{}", m.dalvik_name()),
                None => write!(out, "method@{}", idx),
            },
            EncodedValue::Array(values) => {
                out.push('{');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    value.render_into(pools, out);
                }
                out.push('}');
                Ok(())
            }
            EncodedValue::Annotation(annotation) => {
                let _ = write!(
                    out,
                    "{} {{",
                    pools.type_name(annotation.type_idx).unwrap_or("?")
                );
                for (i, (name_idx, value)) in annotation.elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} = ", pools.string(*name_idx).unwrap_or("?"));
                    value.render_into(pools, out);
                }
                out.push('}');
                Ok(())
            }
            EncodedValue::Null => write!(out, "null"),
            EncodedValue::Boolean(v) => write!(out, "{}", v),
        };
    }
}

fn read_array(cursor: &mut Cursor<'_>, depth: usize) -> Result<Vec<EncodedValue>, EncodedValueError> {
    if depth > MAX_NESTING {
        return Err(EncodedValueError::TooDeep(MAX_NESTING));
    }
    let size = cursor.read_uleb128()? as usize;
    // Every value takes at least one byte.
    let mut values = Vec::with_capacity(size.min(4096));
    for _ in 0..size {
        values.push(read_value(cursor, depth)?);
    }
    Ok(values)
}

fn read_annotation(
    cursor: &mut Cursor<'_>,
    depth: usize,
) -> Result<EncodedAnnotation, EncodedValueError> {
    if depth > MAX_NESTING {
        return Err(EncodedValueError::TooDeep(MAX_NESTING));
    }
    let type_idx = cursor.read_uleb128()?;
    let size = cursor.read_uleb128()? as usize;
    let mut elements = Vec::with_capacity(size.min(4096));
    for _ in 0..size {
        let name_idx = cursor.read_uleb128()?;
        elements.push((name_idx, read_value(cursor, depth)?));
    }
    Ok(EncodedAnnotation { type_idx, elements })
}

fn read_value(cursor: &mut Cursor<'_>, depth: usize) -> Result<EncodedValue, EncodedValueError> {
    let offset = cursor.position();
    let header = cursor.read_u8()?;
    let value_type = header & 0x1f;
    let arg = (header >> 5) as usize;
    let size = arg + 1;

    let check = |max: usize| {
        if size > max {
            Err(EncodedValueError::InvalidSize { value_type, size })
        } else {
            Ok(())
        }
    };

    let value = match value_type {
        VALUE_BYTE => {
            check(1)?;
            EncodedValue::Byte(read_signed(cursor, size)? as i8)
        }
        VALUE_SHORT => {
            check(2)?;
            EncodedValue::Short(read_signed(cursor, size)? as i16)
        }
        VALUE_CHAR => {
            check(2)?;
            EncodedValue::Char(read_unsigned(cursor, size)? as u16)
        }
        VALUE_INT => {
            check(4)?;
            EncodedValue::Int(read_signed(cursor, size)? as i32)
        }
        VALUE_LONG => {
            check(8)?;
            EncodedValue::Long(read_signed(cursor, size)?)
        }
        VALUE_FLOAT => {
            check(4)?;
            let bits = read_unsigned(cursor, size)? << ((4 - size) * 8);
            EncodedValue::Float(f32::from_bits(bits as u32))
        }
        VALUE_DOUBLE => {
            check(8)?;
            let bits = read_unsigned(cursor, size)? << ((8 - size) * 8);
            EncodedValue::Double(f64::from_bits(bits))
        }
        VALUE_METHOD_TYPE
        | VALUE_METHOD_HANDLE
        | VALUE_STRING
        | VALUE_TYPE
        | VALUE_FIELD
        | VALUE_METHOD
        | VALUE_ENUM => {
            check(4)?;
            let idx = read_unsigned(cursor, size)? as u32;
            match value_type {
                VALUE_METHOD_TYPE => EncodedValue::MethodType(idx),
                VALUE_METHOD_HANDLE => EncodedValue::MethodHandle(idx),
                VALUE_STRING => EncodedValue::String(idx),
                VALUE_TYPE => EncodedValue::Type(idx),
                VALUE_FIELD => EncodedValue::Field(idx),
                VALUE_METHOD => EncodedValue::Method(idx),
                _ => EncodedValue::Enum(idx),
            }
        }
        VALUE_ARRAY => {
            check(1)?;
            EncodedValue::Array(read_array(cursor, depth + 1)?)
        }
        VALUE_ANNOTATION => {
            check(1)?;
            EncodedValue::Annotation(read_annotation(cursor, depth + 1)?)
        }
        VALUE_NULL => {
            check(1)?;
            EncodedValue::Null
        }
        VALUE_BOOLEAN => {
            if arg > 1 {
                return Err(EncodedValueError::InvalidSize { value_type, size });
            }
            EncodedValue::Boolean(arg == 1)
        }
        _ => return Err(EncodedValueError::UnknownType { value_type, offset }),
    };
    Ok(value)
}

fn read_unsigned(cursor: &mut Cursor<'_>, size: usize) -> Result<u64, EncodedValueError> {
    let bytes = cursor.read_bytes(size)?;
    Ok(bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

fn read_signed(cursor: &mut Cursor<'_>, size: usize) -> Result<i64, EncodedValueError> {
    let raw = read_unsigned(cursor, size)?;
    let shift = 64 - size * 8;
    Ok(((raw << shift) as i64) >> shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::BinaryReader;

    fn decode(bytes: &[u8]) -> Result<EncodedValue, EncodedValueError> {
        let mut cursor = Cursor::new(BinaryReader::new(bytes), 0);
        EncodedValue::read(&mut cursor)
    }

    #[test]
    fn test_sign_extension() {
        assert_eq!(decode(&[0x00, 0xFF]).unwrap(), EncodedValue::Byte(-1));
        assert_eq!(decode(&[0x04, 0x80]).unwrap(), EncodedValue::Int(-128));
        assert_eq!(decode(&[0x24, 0x34, 0x12]).unwrap(), EncodedValue::Int(0x1234));
        assert_eq!(decode(&[0x26, 0xFF, 0xFF]).unwrap(), EncodedValue::Long(-1));
        assert_eq!(decode(&[0x23, 0xFF, 0xFF]).unwrap(), EncodedValue::Char(0xFFFF));
    }

    #[test]
    fn test_float_zero_extends_right() {
        // 1.0f is 0x3F800000; only the two high bytes are stored.
        assert_eq!(decode(&[0x30, 0x80, 0x3F]).unwrap(), EncodedValue::Float(1.0));
        // 2.0 is 0x4000000000000000.
        assert_eq!(decode(&[0x11, 0x40]).unwrap(), EncodedValue::Double(2.0));
    }

    #[test]
    fn test_null_boolean_and_indices() {
        assert_eq!(decode(&[0x1e]).unwrap(), EncodedValue::Null);
        assert_eq!(decode(&[0x3f]).unwrap(), EncodedValue::Boolean(true));
        assert_eq!(decode(&[0x1f]).unwrap(), EncodedValue::Boolean(false));
        assert_eq!(decode(&[0x17, 0x05]).unwrap(), EncodedValue::String(5));
        assert_eq!(decode(&[0x38, 0x01, 0x01]).unwrap(), EncodedValue::Type(0x101));
    }

    #[test]
    fn test_nested_array() {
        let value = decode(&[0x1c, 0x02, 0x04, 0x07, 0x1c, 0x01, 0x1e]).unwrap();
        assert_eq!(
            value,
            EncodedValue::Array(vec![
                EncodedValue::Int(7),
                EncodedValue::Array(vec![EncodedValue::Null]),
            ])
        );
    }

    #[test]
    fn test_annotation() {
        let value = decode(&[0x1d, 0x03, 0x01, 0x02, 0x1f]).unwrap();
        assert_eq!(
            value,
            EncodedValue::Annotation(EncodedAnnotation {
                type_idx: 3,
                elements: vec![(2, EncodedValue::Boolean(false))],
            })
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            decode(&[0x05]),
            Err(EncodedValueError::UnknownType { value_type: 0x05, .. })
        ));
        assert!(matches!(
            decode(&[0x20, 0x00, 0x00]),
            Err(EncodedValueError::InvalidSize { value_type: 0x00, size: 2 })
        ));
        assert!(matches!(decode(&[0x64, 0x01]), Err(EncodedValueError::Reader(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let mut bytes = Vec::new();
        for _ in 0..(MAX_NESTING + 2) {
            bytes.extend_from_slice(&[0x1c, 0x01]);
        }
        bytes.push(0x1e);
        assert!(matches!(decode(&bytes), Err(EncodedValueError::TooDeep(_))));
    }
}
