//! Container file format: a header followed by self-delimited (key, value) records.
//!
//! ```text
//! header:  magic "SEQPACK\0" | version u8 | flags u8 (bit0 = gzip records)
//! record:  key_len u32 LE | key (UTF-8) | value_len u64 LE | value (stored) | blake3(raw value)
//! ```
//!
//! There is no record count or footer; a clean EOF on a record boundary ends the container.

mod reader;
mod writer;

pub use reader::ContainerReader;
pub use writer::ContainerWriter;

use crate::Compression;
use crate::error::{PackError, Result};

pub(crate) const MAGIC: &[u8; 8] = b"SEQPACK\0";
pub(crate) const FORMAT_VERSION: u8 = 1;
pub(crate) const HEADER_LEN: usize = MAGIC.len() + 2;

/// Header flag: every stored value is a gzip member.
pub(crate) const FLAG_GZIP: u8 = 0b0000_0001;
const KNOWN_FLAGS: u8 = FLAG_GZIP;

/// Keys are paths; anything longer than this is treated as corruption on read.
pub(crate) const MAX_KEY_LEN: usize = 64 * 1024;
pub(crate) const CHECKSUM_LEN: usize = 32;

pub(crate) fn encode_header(compression: Compression) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..MAGIC.len()].copy_from_slice(MAGIC);
    header[MAGIC.len()] = FORMAT_VERSION;
    header[MAGIC.len() + 1] = match compression {
        Compression::None => 0,
        Compression::Gzip => FLAG_GZIP,
    };
    header
}

pub(crate) fn decode_header(header: &[u8; HEADER_LEN]) -> Result<Compression> {
    if &header[..MAGIC.len()] != MAGIC {
        return Err(PackError::corrupt(0, "not a seqpack container (bad magic)"));
    }
    let version = header[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(PackError::corrupt(
            MAGIC.len() as u64,
            format!("unsupported format version {version}"),
        ));
    }
    let flags = header[MAGIC.len() + 1];
    if flags & !KNOWN_FLAGS != 0 {
        return Err(PackError::corrupt(
            MAGIC.len() as u64 + 1,
            format!("unknown header flags {flags:#010b}"),
        ));
    }
    Ok(if flags & FLAG_GZIP != 0 {
        Compression::Gzip
    } else {
        Compression::None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_carries_compression_flag() {
        assert_eq!(
            decode_header(&encode_header(Compression::Gzip)).unwrap(),
            Compression::Gzip
        );
        assert_eq!(
            decode_header(&encode_header(Compression::None)).unwrap(),
            Compression::None
        );
    }

    #[test]
    fn header_rejects_bad_magic() {
        let mut header = encode_header(Compression::None);
        header[0] = b'X';
        assert!(matches!(
            decode_header(&header),
            Err(PackError::ContainerCorrupt { offset: 0, .. })
        ));
    }

    #[test]
    fn header_rejects_unknown_version_and_flags() {
        let mut header = encode_header(Compression::None);
        header[MAGIC.len()] = 9;
        assert!(decode_header(&header).is_err());

        let mut header = encode_header(Compression::None);
        header[MAGIC.len() + 1] = 0b1000_0000;
        assert!(decode_header(&header).is_err());
    }
}
