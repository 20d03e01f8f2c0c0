// Mon Oct 12 2026 - Alex

use crate::reader::{BinaryReader, ReaderError};

/// Sequential reader used for the variable-length structures (class data,
/// code items, catch handlers, encoded values).
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    reader: BinaryReader<'a>,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(reader: BinaryReader<'a>, position: usize) -> Self {
        Self { reader, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ReaderError> {
        self.reader.check_range(self.position, len)?;
        self.position += len;
        Ok(())
    }

    pub fn align(&mut self, alignment: usize) {
        let rem = self.position % alignment;
        if rem != 0 {
            self.position += alignment - rem;
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        let value = self.reader.read_u8(self.position)?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let value = self.reader.read_u16(self.position)?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let value = self.reader.read_u32(self.position)?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReaderError> {
        let bytes = self.reader.read_bytes(self.position, len)?;
        self.position += len;
        Ok(bytes)
    }

    pub fn read_uleb128(&mut self) -> Result<u32, ReaderError> {
        let (value, size) = self.reader.read_uleb128(self.position)?;
        self.position += size;
        Ok(value)
    }

    pub fn read_uleb128p1(&mut self) -> Result<Option<u32>, ReaderError> {
        let (value, size) = self.reader.read_uleb128p1(self.position)?;
        self.position += size;
        Ok(value)
    }

    pub fn read_sleb128(&mut self) -> Result<i32, ReaderError> {
        let (value, size) = self.reader.read_sleb128(self.position)?;
        self.position += size;
        Ok(value)
    }
}
