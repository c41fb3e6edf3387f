//! Append-only container writer. Never overwrites an existing destination.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;

use crate::Compression;
use crate::engine::tools::map_create_error;
use crate::error::{PackError, Result};
use crate::utils::config::ReadingConsts;

use super::{MAX_KEY_LEN, encode_header};

/// Writes records in append order. Call [`ContainerWriter::finish`] to flush and sync; a writer
/// dropped without finishing leaves an unusable container behind.
pub struct ContainerWriter {
    out: BufWriter<File>,
    path: PathBuf,
    compression: Compression,
    records: u64,
}

impl ContainerWriter {
    /// Create `path` and write the header. Fails with `OutputAlreadyExists` if anything is already there.
    pub fn create(path: &Path, compression: Compression) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| map_create_error(e, path))?;
        let mut out = BufWriter::with_capacity(ReadingConsts::IO_BUFFER_SIZE, file);
        out.write_all(&encode_header(compression))?;
        log::debug!(
            "Container {} created (compression {:?})",
            path.display(),
            compression
        );
        Ok(Self {
            out,
            path: path.to_path_buf(),
            compression,
            records: 0,
        })
    }

    /// Append one record. Duplicate keys are written again, never merged.
    pub fn append(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if key.len() > MAX_KEY_LEN {
            return Err(PackError::invalid_input(
                key.chars().take(256).collect::<String>(),
                format!("key is {} bytes; the limit is {MAX_KEY_LEN}", key.len()),
            ));
        }
        let checksum = blake3::hash(value);
        let stored: Cow<'_, [u8]> = match self.compression {
            Compression::None => Cow::Borrowed(value),
            Compression::Gzip => Cow::Owned(gzip(value)?),
        };

        self.out.write_all(&(key.len() as u32).to_le_bytes())?;
        self.out.write_all(key.as_bytes())?;
        self.out.write_all(&(stored.len() as u64).to_le_bytes())?;
        self.out.write_all(&stored)?;
        self.out.write_all(checksum.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered records and fsync. Returns the number of records written.
    pub fn finish(self) -> Result<u64> {
        let file = self.out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        log::debug!(
            "Container {} closed with {} records",
            self.path.display(),
            self.records
        );
        Ok(self.records)
    }
}

fn gzip(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(raw.len() / 2 + 64),
        flate2::Compression::fast(),
    );
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}
