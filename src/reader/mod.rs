// Mon Oct 12 2026 - Alex

pub mod binary;
pub mod cursor;
pub mod error;
pub mod mutf8;
pub mod source;

pub use binary::BinaryReader;
pub use cursor::Cursor;
pub use error::ReaderError;
pub use source::load_file;

pub const NO_INDEX: u32 = 0xFFFF_FFFF;
