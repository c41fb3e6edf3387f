//! Pipeline components: enumeration and filtering for packing; reader thread, extraction
//! workers, formatting, and sharded output for extraction.

pub mod context;
pub mod enumerate;
pub mod executor;
pub mod extraction;
pub mod filter;
pub mod format;
pub mod orchestrator;
pub mod read;
pub mod shard;
pub mod workers;

pub use context::{PipelineHandles, ReaderControl, WorkerContext, WorkerStats};
pub use enumerate::{
    DirectoryWalk, EnumerateOpts, FileEnumeration, InputKind, ManifestReader, enumerate,
};
pub use executor::ExecutionEndpoint;
pub use extraction::{Extraction, extract, extract_batch};
pub use filter::{accept, rejection_reason};
pub use format::{encode_attributes, format_record};
pub use orchestrator::{run_pipeline, shutdown_pipeline_handles};
pub use read::{run_read_loop, spawn_reader_thread};
pub use shard::{ShardSink, ShardedWriter, read_all_lines, write_all};
pub use workers::spawn_extraction_workers;
