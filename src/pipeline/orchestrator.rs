use crossbeam_channel::bounded;
use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::ContainerRecord;
use crate::engine::container::ContainerReader;
use crate::engine::progress::ProgressBar;
use crate::error::{PackError, Result};
use crate::parse::ContentParser;
use crate::pipeline;
use crate::utils::config::RECORDS_IN_FLIGHT_PER_WORKER;

/// Start the read + extract pipeline: one reader thread feeding one worker per shard.
/// Caller must join the returned handles with [`shutdown_pipeline_handles`].
pub fn run_pipeline(
    reader: ContainerReader,
    shards: Vec<pipeline::ShardSink>,
    parser: Arc<dyn ContentParser>,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<ProgressBar>,
) -> pipeline::PipelineHandles {
    let cap = shards.len().max(1) * RECORDS_IN_FLIGHT_PER_WORKER;
    let (record_tx, record_rx) = bounded::<ContainerRecord>(cap);
    let stop = Arc::new(AtomicBool::new(false));

    let reader_handle = pipeline::spawn_reader_thread(
        reader,
        record_tx,
        pipeline::ReaderControl {
            cancel,
            stop: Arc::clone(&stop),
        },
    );

    let ctx = pipeline::WorkerContext {
        parser,
        progress,
        stop,
    };
    // Workers hold the only receivers; once they all exit the reader's send fails and it stops.
    let worker_handles = pipeline::spawn_extraction_workers(record_rx, shards, &ctx);

    pipeline::PipelineHandles {
        reader_handle,
        worker_handles,
    }
}

/// Join the reader and all workers. Returns (records read, summed worker stats).
/// A worker error wins over a reader error: when a worker fails it stops the reader early.
pub fn shutdown_pipeline_handles(
    handles: pipeline::PipelineHandles,
) -> Result<(u64, pipeline::WorkerStats)> {
    let read = handles
        .reader_handle
        .join()
        .map_err(|_| PackError::Io(io::Error::other("reader thread panicked")))?;

    let mut totals = pipeline::WorkerStats::default();
    let mut first_error: Option<PackError> = None;
    for h in handles.worker_handles {
        match h.join() {
            Ok(Ok(stats)) => totals.merge(stats),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(_) => {
                first_error.get_or_insert(PackError::Io(io::Error::other(
                    "extraction worker panicked",
                )));
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }
    Ok((read?, totals))
}
