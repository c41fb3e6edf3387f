//! Reading source files whole for the container writer.

use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use crate::utils::config::ReadingConsts;

/// Full contents of one source file: copied into a buffer, or memory-mapped when large.
pub enum SourceBytes {
    Buffered(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for SourceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            SourceBytes::Buffered(buf) => buf,
            SourceBytes::Mapped(map) => map,
        }
    }
}

/// Read the whole file at `path`. `size` is the statused length and only picks the strategy;
/// the returned bytes reflect what is on disk now.
pub fn read_source(path: &Path, size: u64) -> std::io::Result<SourceBytes> {
    let mut file = File::open(path)?;
    if size > ReadingConsts::MMAP_THRESHOLD {
        // Map instead of copying; the mapping lives only until the record is appended.
        let map = unsafe { Mmap::map(&file)? };
        Ok(SourceBytes::Mapped(map))
    } else {
        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)?;
        Ok(SourceBytes::Buffered(buf))
    }
}
