//! Extract pipeline: read a container, run every record through a [`ContentParser`] on a pool of
//! workers, write one `key\t\t{json}` line per record into a sharded output directory.

use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::engine::container::ContainerReader;
use crate::engine::progress::{ProgressBar, close_bar, create_counter};
use crate::engine::source::read_source;
use crate::engine::tools::{cancel_requested, path_to_key};
use crate::error::{PackError, Result};
use crate::parse::ContentParser;
use crate::pipeline::{
    ExecutionEndpoint, ShardedWriter, extract, format_record, run_pipeline,
    shutdown_pipeline_handles,
};
use crate::utils::config::WorkerThreadLimits;
use crate::{ContainerRecord, ExtractOpts, ExtractStats};

pub fn extract_container(
    input: &Path,
    output: &Path,
    opts: &ExtractOpts,
    parser: Arc<dyn ContentParser>,
) -> Result<ExtractStats> {
    extract_with_cancel(input, output, opts, parser, None)
}

/// [`extract_container`] with a cancel flag.
///
/// Order of checks: endpoint, then input container, then output directory. Nothing is created
/// unless the first two succeed. `_SUCCESS` is written only after every shard is flushed.
pub fn extract_with_cancel(
    input: &Path,
    output: &Path,
    opts: &ExtractOpts,
    parser: Arc<dyn ContentParser>,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<ExtractStats> {
    debug!(
        "{} EXTRACT CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let endpoint = ExecutionEndpoint::parse(&opts.endpoint)?;
    let reader = ContainerReader::open(input)?;
    let workers = endpoint.worker_count(opts.partitions, &WorkerThreadLimits::current());
    debug!(
        "{}: endpoint {} -> {} workers, compression {:?}",
        reader.path().display(),
        endpoint,
        workers,
        reader.compression()
    );

    let mut writer = ShardedWriter::create(output, workers)?;
    let bar: Option<ProgressBar> = opts
        .verbose
        .then(|| create_counter("Extracting", " records"));

    let handles = run_pipeline(
        reader,
        writer.take_shards(),
        parser,
        cancel.clone(),
        bar.clone(),
    );
    let joined = shutdown_pipeline_handles(handles);
    close_bar(bar.as_ref());
    let (records_read, totals) = joined?;

    if cancel_requested(cancel.as_ref()) {
        return Err(PackError::Cancelled(output.to_path_buf()));
    }
    let output_dir = writer.dir().to_path_buf();
    writer.commit()?;

    if totals.failed > 0 {
        warn!(
            "{} of {} records failed extraction and carry an ERROR attribute",
            totals.failed, totals.written
        );
    }
    info!(
        "Extracted {} records into {} ({} partitions)",
        records_read,
        output_dir.display(),
        workers
    );
    Ok(ExtractStats {
        written: totals.written,
        failed: totals.failed,
        partitions: workers,
    })
}

/// Run `parser` over one local file, no container involved. Returns the formatted output line
/// and whether the parse failed (the line then carries `ERROR`).
pub fn parse_file(path: &Path, parser: &dyn ContentParser) -> Result<(String, bool)> {
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PackError::NotFound(path.to_path_buf()),
        _ => PackError::Io(e),
    })?;
    if !meta.is_file() {
        return Err(PackError::invalid_input(path, "not a regular file"));
    }
    let value = read_source(path, meta.len())?.to_vec();
    let record = ContainerRecord {
        key: path_to_key(path),
        value,
    };
    let (key, extraction) = extract(parser, record)?;
    let failed = extraction.is_failed();
    Ok((format_record(&key, &extraction.into_attributes())?, failed))
}
