// Mon Oct 12 2026 - Alex

use crate::reader::{mutf8, ReaderError};

/// Bounds-checked little-endian view over a DEX image. Every read takes an
/// absolute offset and fails with `TruncatedData` instead of panicking.
#[derive(Debug, Clone, Copy)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    pub fn check_range(&self, offset: usize, len: usize) -> Result<(), ReaderError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(ReaderError::TruncatedData {
                offset,
                len,
                size: self.data.len(),
            }),
        }
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], ReaderError> {
        self.check_range(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], ReaderError> {
        let bytes = self.read_bytes(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ReaderError> {
        self.check_range(offset, 1)?;
        Ok(self.data[offset])
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, ReaderError> {
        Ok(self.read_u8(offset)? as i8)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, ReaderError> {
        Ok(u16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, ReaderError> {
        Ok(i16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, ReaderError> {
        Ok(u32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32, ReaderError> {
        Ok(i32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64, ReaderError> {
        Ok(u64::from_le_bytes(self.read_array(offset)?))
    }

    /// Returns the decoded value and the number of bytes it occupied.
    pub fn read_uleb128(&self, offset: usize) -> Result<(u32, usize), ReaderError> {
        let mut result: u32 = 0;
        for i in 0..5 {
            let byte = self.read_u8(offset + i)?;
            let bits = (byte & 0x7F) as u32;
            if i == 4 && bits > 0x0F {
                return Err(ReaderError::MalformedLeb128 { offset });
            }
            result |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok((result, i + 1));
            }
        }
        Err(ReaderError::MalformedLeb128 { offset })
    }

    /// ULEB128 biased by one, so an encoded zero is `NO_INDEX`.
    pub fn read_uleb128p1(&self, offset: usize) -> Result<(Option<u32>, usize), ReaderError> {
        let (value, size) = self.read_uleb128(offset)?;
        Ok((value.checked_sub(1), size))
    }

    pub fn read_sleb128(&self, offset: usize) -> Result<(i32, usize), ReaderError> {
        let mut result: i32 = 0;
        let mut shift = 0u32;
        for i in 0..5 {
            let byte = self.read_u8(offset + i)?;
            result |= ((byte & 0x7F) as i32) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 32 && byte & 0x40 != 0 {
                    result |= -1i32 << shift;
                }
                return Ok((result, i + 1));
            }
        }
        Err(ReaderError::MalformedLeb128 { offset })
    }

    /// Decodes a Modified UTF-8 string starting at `offset`. `encoded_length`
    /// is the UTF-16 unit count from the string_data_item prefix.
    pub fn read_string(&self, offset: usize, encoded_length: usize) -> Result<String, ReaderError> {
        self.check_range(offset, 0)?;
        let tail = &self.data[offset..];
        let end = tail.iter().position(|&b| b == 0).ok_or(ReaderError::TruncatedData {
            offset,
            len: tail.len() + 1,
            size: self.data.len(),
        })?;
        mutf8::decode(&tail[..end], encoded_length).map_err(|reason| {
            ReaderError::MalformedString { offset, reason }
        })
    }
}
