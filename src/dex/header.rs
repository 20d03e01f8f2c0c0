// Tue Oct 13 2026 - Alex

use crate::dex::{ParseError, PoolKind};
use crate::reader::BinaryReader;

pub const HEADER_SIZE: usize = 0x70;
pub const ENDIAN_CONSTANT: u32 = 0x1234_5678;
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x7856_3412;

const CHECKSUM_OFFSET: usize = 0x08;
const SIGNATURE_OFFSET: usize = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Section {
    pub size: u32,
    pub offset: u32,
}

impl Section {
    fn read(reader: &BinaryReader<'_>, at: usize) -> Result<Self, ParseError> {
        Ok(Self {
            size: reader.read_u32(at)?,
            offset: reader.read_u32(at + 4)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexHeader {
    pub version: u16,
    pub checksum: u32,
    pub signature: [u8; 20],
    pub file_size: u32,
    pub header_size: u32,
    pub endian_tag: u32,
    pub link: Section,
    pub map_off: u32,
    pub string_ids: Section,
    pub type_ids: Section,
    pub proto_ids: Section,
    pub field_ids: Section,
    pub method_ids: Section,
    pub class_defs: Section,
    pub data: Section,
}

impl DexHeader {
    pub fn parse(reader: &BinaryReader<'_>) -> Result<Self, ParseError> {
        let magic = reader.read_bytes(0, 8)?;
        let version = parse_magic(magic)?;
        reader.check_range(0, HEADER_SIZE)?;

        let mut signature = [0u8; 20];
        signature.copy_from_slice(reader.read_bytes(SIGNATURE_OFFSET, 20)?);

        let header = Self {
            version,
            checksum: reader.read_u32(CHECKSUM_OFFSET)?,
            signature,
            file_size: reader.read_u32(0x20)?,
            header_size: reader.read_u32(0x24)?,
            endian_tag: reader.read_u32(0x28)?,
            link: Section::read(reader, 0x2C)?,
            map_off: reader.read_u32(0x34)?,
            string_ids: Section::read(reader, 0x38)?,
            type_ids: Section::read(reader, 0x40)?,
            proto_ids: Section::read(reader, 0x48)?,
            field_ids: Section::read(reader, 0x50)?,
            method_ids: Section::read(reader, 0x58)?,
            class_defs: Section::read(reader, 0x60)?,
            data: Section::read(reader, 0x68)?,
        };
        header.validate(reader.len())?;
        Ok(header)
    }

    fn validate(&self, actual: usize) -> Result<(), ParseError> {
        match self.endian_tag {
            ENDIAN_CONSTANT => {}
            other => return Err(ParseError::UnsupportedEndian(other)),
        }
        if (self.header_size as usize) < HEADER_SIZE {
            return Err(ParseError::InvalidHeaderSize(self.header_size));
        }
        if self.file_size as usize != actual {
            return Err(ParseError::HeaderSizeMismatch {
                declared: self.file_size,
                actual,
            });
        }
        for kind in [
            PoolKind::Strings,
            PoolKind::Types,
            PoolKind::Protos,
            PoolKind::Fields,
            PoolKind::Methods,
            PoolKind::Classes,
        ] {
            let section = self.section(kind);
            if section.is_empty() {
                continue;
            }
            let end = (section.offset as u64) + (section.size as u64) * kind.entry_size() as u64;
            if end > actual as u64 {
                return Err(ParseError::PoolOutOfBounds {
                    pool: kind,
                    offset: section.offset,
                    count: section.size,
                });
            }
        }
        Ok(())
    }

    pub fn section(&self, kind: PoolKind) -> Section {
        match kind {
            PoolKind::Strings => self.string_ids,
            PoolKind::Types => self.type_ids,
            PoolKind::Protos => self.proto_ids,
            PoolKind::Fields => self.field_ids,
            PoolKind::Methods => self.method_ids,
            PoolKind::Classes => self.class_defs,
        }
    }

    /// Adler-32 over everything after the checksum field.
    pub fn compute_checksum(data: &[u8]) -> u32 {
        adler32(data.get(SIGNATURE_OFFSET..).unwrap_or(&[]))
    }
}

fn parse_magic(magic: &[u8]) -> Result<u16, ParseError> {
    if &magic[0..4] != b"dex\n" || magic[7] != 0 {
        return Err(ParseError::BadMagic(magic.to_vec()));
    }
    let digits = &magic[4..7];
    if !digits.iter().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::BadMagic(magic.to_vec()));
    }
    let version = digits
        .iter()
        .fold(0u16, |acc, d| acc * 10 + (d - b'0') as u16);
    if !(35..=41).contains(&version) {
        return Err(ParseError::UnsupportedVersion(version));
    }
    Ok(version)
}

pub fn adler32(data: &[u8]) -> u32 {
    const MOD: u32 = 65_521;
    let mut a = 1u32;
    let mut b = 0u32;

    for chunk in data.chunks(5552) {
        for &byte in chunk {
            a += byte as u32;
            b += a;
        }
        a %= MOD;
        b %= MOD;
    }

    (b << 16) | a
}
