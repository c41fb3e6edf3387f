use crossbeam_channel::Receiver;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use crate::ContainerRecord;
use crate::engine::progress::{flush_progress_remainder, report_progress_batched};
use crate::error::Result;
use crate::utils::config::PROGRESS_UPDATE_BATCH_SIZE;

use super::context::{WorkerContext, WorkerStats};
use super::extraction::{Extraction, extract};
use super::format::format_record;
use super::shard::ShardSink;

/// Single extraction worker: receive records, parse, format, append to this worker's own shard.
/// A record that fails to parse is still written (with `ERROR`) and counted in `failed`.
fn extraction_worker_loop(
    record_rx: Receiver<ContainerRecord>,
    mut shard: ShardSink,
    ctx: WorkerContext,
) -> Result<WorkerStats> {
    let mut stats = WorkerStats::default();
    while let Ok(record) = record_rx.recv() {
        if ctx.stop.load(Ordering::Relaxed) {
            break;
        }
        let (key, extraction) = extract(ctx.parser.as_ref(), record)?;
        if let Extraction::Failed(reason) = &extraction {
            warn!("{}: {}", key, reason);
            stats.failed += 1;
        }
        shard.write_line(&format_record(&key, &extraction.into_attributes())?)?;
        stats.written += 1;
        report_progress_batched(
            ctx.progress.as_ref(),
            stats.written as usize,
            PROGRESS_UPDATE_BATCH_SIZE,
        );
    }
    drop(record_rx);
    flush_progress_remainder(
        ctx.progress.as_ref(),
        stats.written as usize,
        PROGRESS_UPDATE_BATCH_SIZE,
    );
    let index = shard.index();
    shard.finish()?;
    debug!(
        "worker {}: {} written, {} failed",
        index, stats.written, stats.failed
    );
    Ok(stats)
}

/// Spawn one worker per shard. Any fatal error sets `ctx.stop` so the rest wind down.
pub fn spawn_extraction_workers(
    record_rx: Receiver<ContainerRecord>,
    shards: Vec<ShardSink>,
    ctx: &WorkerContext,
) -> Vec<JoinHandle<Result<WorkerStats>>> {
    shards
        .into_iter()
        .map(|shard| {
            let record_rx = record_rx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || {
                let stop = Arc::clone(&ctx.stop);
                let result = extraction_worker_loop(record_rx, shard, ctx);
                if result.is_err() {
                    stop.store(true, Ordering::Relaxed);
                }
                result
            })
        })
        .collect()
}
