//! File enumeration: a lazy sequence of [`FileDescriptor`] from a directory walk or a manifest.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::FileDescriptor;
use crate::error::{PackError, Result};

/// How an input path is enumerated. Resolved once, up front.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Walk the tree recursively.
    Directory,
    /// Regular file listing one path per line.
    Manifest,
}

impl InputKind {
    /// Status `input`; missing or neither file nor directory is `InvalidInput`.
    pub fn resolve(input: &Path) -> Result<Self> {
        let meta = fs::metadata(input).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PackError::invalid_input(input, "does not exist"),
            _ => PackError::invalid_input(input, e.to_string()),
        })?;
        if meta.is_file() {
            Ok(InputKind::Manifest)
        } else if meta.is_dir() {
            Ok(InputKind::Directory)
        } else {
            Err(PackError::invalid_input(
                input,
                "neither a regular file nor a directory",
            ))
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EnumerateOpts {
    /// Follow symbolic links while walking a directory.
    pub follow_links: bool,
}

/// Forward-only, not restartable. The first error ends the sequence.
pub enum FileEnumeration {
    Directory(DirectoryWalk),
    Manifest(ManifestReader),
}

impl Iterator for FileEnumeration {
    type Item = Result<FileDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FileEnumeration::Directory(walk) => walk.next(),
            FileEnumeration::Manifest(manifest) => manifest.next(),
        }
    }
}

/// Start enumerating `input`. Fails with `InvalidInput` before yielding anything if it is missing.
pub fn enumerate(input: &Path, opts: &EnumerateOpts) -> Result<FileEnumeration> {
    let kind = InputKind::resolve(input)?;
    debug!("Enumerating {} as {:?}", input.display(), kind);
    match kind {
        InputKind::Directory => {
            let walk = DirectoryWalk::new(input, opts.follow_links)?;
            debug!("Walking {}", walk.root().display());
            Ok(FileEnumeration::Directory(walk))
        }
        InputKind::Manifest => Ok(FileEnumeration::Manifest(ManifestReader::open(input)?)),
    }
}

/// Recursive walk of a canonicalized root. Yields every non-directory entry (symlinks included,
/// reported as non-regular unless followed), sorted by name within each directory.
pub struct DirectoryWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
    done: bool,
}

impl DirectoryWalk {
    pub fn new(root: &Path, follow_links: bool) -> Result<Self> {
        let root = root
            .canonicalize()
            .map_err(|e| PackError::invalid_input(root, format!("canonicalize: {e}")))?;
        let inner = WalkDir::new(&root)
            .follow_links(follow_links)
            .sort_by_file_name()
            .into_iter();
        Ok(Self {
            root,
            inner,
            done: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for DirectoryWalk {
    type Item = Result<FileDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let entry = match self.inner.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    self.done = true;
                    let path = err.path().unwrap_or(&self.root).to_path_buf();
                    return Some(Err(PackError::invalid_input(path, err.to_string())));
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            return Some(match entry.metadata() {
                Ok(meta) => Ok(FileDescriptor {
                    path: entry.into_path(),
                    byte_length: meta.len(),
                    is_regular_file: meta.is_file(),
                }),
                Err(err) => {
                    self.done = true;
                    Err(PackError::invalid_input(entry.path(), err.to_string()))
                }
            });
        }
    }
}

/// Reads a newline-delimited manifest lazily. Blank lines are skipped; every other trimmed line
/// is statused. The manifest handle is released exactly once: at end of input, after the first
/// error, or when the reader is dropped.
pub struct ManifestReader {
    source: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
}

impl ManifestReader {
    pub fn open(source: &Path) -> Result<Self> {
        let file = File::open(source)
            .map_err(|e| PackError::invalid_input(source, format!("open manifest: {e}")))?;
        Ok(Self {
            source: source.to_path_buf(),
            lines: Some(BufReader::new(file).lines()),
            line_no: 0,
        })
    }

    /// True once the underlying handle has been dropped.
    pub fn is_released(&self) -> bool {
        self.lines.is_none()
    }

    fn release(&mut self) {
        if self.lines.take().is_some() {
            debug!(
                "Manifest {} released after {} lines",
                self.source.display(),
                self.line_no
            );
        }
    }
}

impl Iterator for ManifestReader {
    type Item = Result<FileDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.as_mut()?.next() {
                None => {
                    self.release();
                    return None;
                }
                Some(Err(e)) => {
                    self.release();
                    return Some(Err(PackError::invalid_input(
                        &self.source,
                        format!("read manifest line {}: {e}", self.line_no + 1),
                    )));
                }
                Some(Ok(line)) => line,
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let path = PathBuf::from(trimmed);
            return Some(match fs::metadata(&path) {
                Ok(meta) => Ok(FileDescriptor {
                    path,
                    byte_length: meta.len(),
                    is_regular_file: meta.is_file(),
                }),
                Err(source) => {
                    self.release();
                    Err(PackError::ManifestResolutionFailure {
                        line_no: self.line_no,
                        path,
                        source,
                    })
                }
            });
        }
    }
}
