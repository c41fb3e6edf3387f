//! seqpack: pack many small files into one keyed container, then run a content parser over
//! every record in parallel and write the extracted attributes as sharded text output.

pub mod engine;
pub mod error;
pub mod extract;
pub mod pack;
pub mod parse;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{PackError, Result};
pub use extract::{extract_container, extract_with_cancel, parse_file};
pub use pack::{pack_descriptors, pack_files, pack_with_cancel};
pub use parse::{BasicParser, ContentParser};
