//! Content parsing capability: raw bytes in, [`AttributeSet`] out.
//!
//! The extraction stage only sees this trait. [`BasicParser`] is the built-in implementation the
//! CLI uses; library callers plug in their own (a full document parser, a model server client, ...).

mod basic;

pub use basic::BasicParser;

use crate::AttributeSet;
use crate::error::Result;

/// Attribute carrying the decoded textual body.
pub const CONTENT: &str = "CONTENT";
/// Attribute carrying the failure reason for a record that could not be parsed.
pub const ERROR: &str = "ERROR";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Parses one record's bytes. Called concurrently from many workers, so implementations must be
/// `Send + Sync` and keep no per-call mutable state.
///
/// Return `PackError::ExtractionFailure` for corrupt or unsupported content (isolated to that
/// record) and `PackError::CapabilityUnavailable` when the parser itself cannot run (fatal).
pub trait ContentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<AttributeSet>;
}

impl<F> ContentParser for F
where
    F: Fn(&[u8]) -> Result<AttributeSet> + Send + Sync,
{
    fn parse(&self, bytes: &[u8]) -> Result<AttributeSet> {
        self(bytes)
    }
}
