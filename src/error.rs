//! Error taxonomy shared by the pack and extract pipelines.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library. The binary wraps these in `anyhow` for context and exit code.
#[derive(Debug, Error)]
pub enum PackError {
    /// Input path missing, unreadable, or of an unsupported kind.
    #[error("invalid input {path:?}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// Destination already exists; nothing is ever overwritten.
    #[error("output already exists, not overwriting it: {0:?}")]
    OutputAlreadyExists(PathBuf),

    /// A manifest line names a path that cannot be statused. Fatal to the whole enumeration.
    #[error("manifest line {line_no}: cannot resolve {path:?}: {source}")]
    ManifestResolutionFailure {
        line_no: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Container (or other required input) does not exist.
    #[error("not found: {0:?}")]
    NotFound(PathBuf),

    /// Malformed container header or record.
    #[error("container corrupt at byte {offset}: {reason}")]
    ContainerCorrupt { offset: u64, reason: String },

    /// Per-record parse failure. Isolated by the extraction stage, never fatal to a batch.
    #[error("extraction failed: {0}")]
    ExtractionFailure(String),

    /// Parsing or execution capability cannot be reached.
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Stopped by the user; the destination is partially written and unusable.
    #[error("cancelled by user; {0:?} is partially written and must be deleted")]
    Cancelled(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PackError {
    pub(crate) fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PackError::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        PackError::ContainerCorrupt {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, PackError>;
