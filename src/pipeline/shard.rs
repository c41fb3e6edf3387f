//! Sharded text output: a directory of `part-NNNNN` files plus a `_SUCCESS` marker.
//!
//! Each shard is owned by exactly one worker. The marker is written only by
//! [`ShardedWriter::commit`]; a directory without it is partial and must not be consumed.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::engine::tools::map_create_error;
use crate::error::{PackError, Result};
use crate::utils::config::{ReadingConsts, SHARD_PREFIX, SUCCESS_MARKER};

/// One partition's line sink.
pub struct ShardSink {
    index: usize,
    path: PathBuf,
    out: BufWriter<File>,
    lines: u64,
}

impl ShardSink {
    fn create(dir: &Path, index: usize) -> Result<Self> {
        let path = dir.join(shard_file_name(index));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| map_create_error(e, &path))?;
        Ok(Self {
            index,
            path,
            out: BufWriter::with_capacity(ReadingConsts::IO_BUFFER_SIZE, file),
            lines: 0,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Append one record line; the newline is added here.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Flush and sync. Returns the number of lines written.
    pub fn finish(self) -> Result<u64> {
        let file = self.out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        debug!("{} closed with {} lines", self.path.display(), self.lines);
        Ok(self.lines)
    }
}

pub fn shard_file_name(index: usize) -> String {
    format!("{SHARD_PREFIX}{index:05}")
}

/// Output directory with a fixed number of shards.
pub struct ShardedWriter {
    dir: PathBuf,
    shards: Vec<ShardSink>,
}

impl ShardedWriter {
    /// Create `dir` and its `num_shards` empty shard files. `OutputAlreadyExists` if `dir` exists.
    pub fn create(dir: &Path, num_shards: usize) -> Result<Self> {
        if num_shards == 0 {
            return Err(PackError::invalid_input(dir, "at least one shard is required"));
        }
        if let Some(parent) = dir.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir(dir).map_err(|e| map_create_error(e, dir))?;
        let shards = (0..num_shards)
            .map(|i| ShardSink::create(dir, i))
            .collect::<Result<Vec<_>>>()?;
        debug!("Output {} created with {} shards", dir.display(), num_shards);
        Ok(Self {
            dir: dir.to_path_buf(),
            shards,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hand the shard sinks to the workers. Each sink must be finished before [`Self::commit`].
    pub fn take_shards(&mut self) -> Vec<ShardSink> {
        std::mem::take(&mut self.shards)
    }

    /// Mark the output complete by writing the `_SUCCESS` marker.
    pub fn commit(self) -> Result<()> {
        let marker = self.dir.join(SUCCESS_MARKER);
        File::create(&marker)?.sync_all()?;
        debug!("Output {} committed", self.dir.display());
        Ok(())
    }
}

/// Write `lines` round-robin across `num_shards` shards under `dir`, then commit.
/// Returns the number of lines written.
pub fn write_all<I, S>(lines: I, dir: &Path, num_shards: usize) -> Result<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = ShardedWriter::create(dir, num_shards)?;
    let mut shards = writer.take_shards();
    for (i, line) in lines.into_iter().enumerate() {
        shards[i % num_shards].write_line(line.as_ref())?;
    }
    let mut written = 0;
    for shard in shards {
        written += shard.finish()?;
    }
    writer.commit()?;
    Ok(written)
}

/// Read every line from every shard under `dir` (shard order, then line order).
/// Fails with `InvalidInput` if the output was never committed.
pub fn read_all_lines(dir: &Path) -> Result<Vec<String>> {
    if !dir.join(SUCCESS_MARKER).is_file() {
        return Err(PackError::invalid_input(
            dir,
            format!("no {SUCCESS_MARKER} marker; output is partial"),
        ));
    }
    let mut parts: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SHARD_PREFIX))
        })
        .collect();
    parts.sort();
    let mut lines = Vec::new();
    for part in parts {
        let text = fs::read_to_string(&part)?;
        lines.extend(text.lines().map(str::to_string));
    }
    Ok(lines)
}
