//! Sequential, single-pass container reader.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{PackError, Result};
use crate::utils::config::ReadingConsts;
use crate::{Compression, ContainerRecord};

use super::{CHECKSUM_LEN, HEADER_LEN, MAX_KEY_LEN, decode_header};

/// Lazy sequence of records. The first corrupt record is yielded as `ContainerCorrupt` and ends
/// the sequence; there is no resynchronization.
pub struct ContainerReader {
    input: BufReader<File>,
    path: PathBuf,
    compression: Compression,
    /// Bytes consumed so far (header included).
    offset: u64,
    len: u64,
    done: bool,
}

impl ContainerReader {
    /// Open `path` and validate the header. `NotFound` if the file is absent.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PackError::NotFound(path.to_path_buf()),
            _ => PackError::Io(e),
        })?;
        let len = file.metadata()?.len();
        let mut reader = Self {
            input: BufReader::with_capacity(ReadingConsts::IO_BUFFER_SIZE, file),
            path: path.to_path_buf(),
            compression: Compression::None,
            offset: 0,
            len,
            done: false,
        };
        let mut header = [0u8; HEADER_LEN];
        reader.read_field(&mut header, "header")?;
        reader.compression = decode_header(&header)?;
        log::debug!(
            "Container {} opened ({} bytes, compression {:?})",
            path.display(),
            len,
            reader.compression
        );
        Ok(reader)
    }

    /// Compression flag recorded in the header.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.offset)
    }

    /// Fill `buf` exactly; running out of bytes mid-field is corruption, not EOF.
    fn read_field(&mut self, buf: &mut [u8], what: &str) -> Result<()> {
        self.input.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => {
                PackError::corrupt(self.offset, format!("truncated {what}"))
            }
            _ => PackError::Io(e),
        })?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn read_record(&mut self) -> Result<ContainerRecord> {
        let record_start = self.offset;

        let mut len_buf = [0u8; 4];
        self.read_field(&mut len_buf, "key length")?;
        let key_len = u32::from_le_bytes(len_buf) as usize;
        if key_len > MAX_KEY_LEN || key_len as u64 > self.remaining() {
            return Err(PackError::corrupt(
                record_start,
                format!("key length {key_len} out of range"),
            ));
        }
        let mut key = vec![0u8; key_len];
        self.read_field(&mut key, "key")?;
        let key = String::from_utf8(key)
            .map_err(|_| PackError::corrupt(record_start, "key is not valid UTF-8"))?;

        let mut len_buf = [0u8; 8];
        self.read_field(&mut len_buf, "value length")?;
        let value_len = u64::from_le_bytes(len_buf);
        if value_len.saturating_add(CHECKSUM_LEN as u64) > self.remaining() {
            return Err(PackError::corrupt(
                record_start,
                format!("value length {value_len} for {key:?} runs past end of container"),
            ));
        }
        let mut stored = vec![0u8; value_len as usize];
        self.read_field(&mut stored, "value")?;

        let mut checksum = [0u8; CHECKSUM_LEN];
        self.read_field(&mut checksum, "checksum")?;

        let value = match self.compression {
            Compression::None => stored,
            Compression::Gzip => gunzip(&stored).map_err(|e| {
                PackError::corrupt(record_start, format!("value for {key:?} does not inflate: {e}"))
            })?,
        };
        if blake3::hash(&value).as_bytes() != &checksum {
            return Err(PackError::corrupt(
                record_start,
                format!("checksum mismatch for {key:?}"),
            ));
        }
        Ok(ContainerRecord { key, value })
    }
}

impl Iterator for ContainerReader {
    type Item = Result<ContainerRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.remaining() == 0 {
            self.done = true;
            return None;
        }
        let record = self.read_record();
        if record.is_err() {
            self.done = true;
        }
        Some(record)
    }
}

fn gunzip(stored: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(stored.len() * 2);
    GzDecoder::new(stored).read_to_end(&mut raw)?;
    Ok(raw)
}
