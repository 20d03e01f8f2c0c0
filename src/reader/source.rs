// Mon Oct 12 2026 - Alex

use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

/// Maps a DEX file into memory and wraps the mapping in a `Bytes` handle so
/// the parsed context can keep the image alive without copying it.
pub fn load_file<P: AsRef<Path>>(path: P) -> io::Result<Bytes> {
    let file = File::open(path.as_ref())?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(Bytes::new());
    }
    let mmap = unsafe { Mmap::map(&file) }?;
    Ok(Bytes::from_owner(mmap))
}
