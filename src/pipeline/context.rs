//! Pipeline context: handles and per-worker results for the extraction pipeline.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::JoinHandle;

use crate::engine::progress::ProgressBar;
use crate::error::Result;
use crate::parse::ContentParser;

/// Counts returned by one worker when it exits. Summed by the caller after join; workers never
/// share an accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub written: u64,
    pub failed: u64,
}

impl WorkerStats {
    pub fn merge(&mut self, other: WorkerStats) {
        self.written += other.written;
        self.failed += other.failed;
    }
}

/// Shared, read-only context handed to every extraction worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub parser: Arc<dyn ContentParser>,
    pub progress: Option<ProgressBar>,
    /// Set by a worker that hit a fatal error; the reader and the other workers stop early.
    pub stop: Arc<AtomicBool>,
}

/// Flags the reader thread polls before each record.
pub struct ReaderControl {
    pub cancel: Option<Arc<AtomicBool>>,
    pub stop: Arc<AtomicBool>,
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): join them with
/// [`shutdown_pipeline_handles`](super::shutdown_pipeline_handles).
/// `reader_handle` yields the number of records read; each worker yields its [`WorkerStats`].
pub struct PipelineHandles {
    pub reader_handle: JoinHandle<Result<u64>>,
    pub worker_handles: Vec<JoinHandle<Result<WorkerStats>>>,
}
