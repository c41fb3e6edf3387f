//! Pack pipeline: enumerate input files, filter by size, append each accepted file to one container.

use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::engine::container::ContainerWriter;
use crate::engine::progress::{ProgressBar, close_bar, create_counter, update_progress_bar};
use crate::engine::source::read_source;
use crate::engine::tools::{cancel_requested, path_to_key};
use crate::error::{PackError, Result};
use crate::pipeline::{EnumerateOpts, enumerate, rejection_reason};
use crate::{FileDescriptor, PackOpts, PackStats};

/// Pack every file under `input` (a directory, or a manifest file listing one path per line)
/// into a new container at `output`.
pub fn pack_files(input: &Path, output: &Path, opts: &PackOpts) -> Result<PackStats> {
    pack_with_cancel(input, output, opts, None)
}

/// [`pack_files`] with a cancel flag (set from Ctrl+C by the CLI).
/// Input is resolved before the destination is touched, so a bad input leaves no output behind.
pub fn pack_with_cancel(
    input: &Path,
    output: &Path,
    opts: &PackOpts,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<PackStats> {
    debug!(
        "{} PACK CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let files = enumerate(
        input,
        &EnumerateOpts {
            follow_links: opts.follow_links,
        },
    )?;
    pack_descriptors(files, output, opts, cancel.as_ref())
}

/// Pack an already-enumerated sequence of descriptors. Records are appended in sequence order;
/// the first error from the sequence (or from reading a source) aborts the job.
pub fn pack_descriptors<I>(
    descriptors: I,
    output: &Path,
    opts: &PackOpts,
    cancel: Option<&Arc<AtomicBool>>,
) -> Result<PackStats>
where
    I: IntoIterator<Item = Result<FileDescriptor>>,
{
    let mut writer = ContainerWriter::create(output, opts.compression)?;
    let own_path = writer.path().canonicalize()?;
    let bar: Option<ProgressBar> = opts.verbose.then(|| create_counter("Packing", " files"));
    let mut stats = PackStats::default();

    for descriptor in descriptors {
        if cancel_requested(cancel) {
            close_bar(bar.as_ref());
            return Err(PackError::Cancelled(output.to_path_buf()));
        }
        let descriptor = descriptor?;
        if is_own_output(&descriptor.path, &own_path) {
            debug!("skip {}: destination container", descriptor.path.display());
            stats.skipped += 1;
            continue;
        }
        if let Some(reason) = rejection_reason(&descriptor, &opts.bounds) {
            debug!("skip {}: {}", descriptor.path.display(), reason);
            stats.skipped += 1;
            continue;
        }
        let bytes = read_source(&descriptor.path, descriptor.byte_length).map_err(|e| {
            PackError::invalid_input(&descriptor.path, format!("read source: {}", e))
        })?;
        writer.append(&path_to_key(&descriptor.path), &bytes)?;
        stats.copied += 1;
        if let Some(ref b) = bar {
            update_progress_bar(b, 1);
        }
    }

    close_bar(bar.as_ref());
    let records = writer.finish()?;
    info!(
        "Packed {} files into {} ({} skipped)",
        records,
        output.display(),
        stats.skipped
    );
    Ok(stats)
}

/// True when `path` is the container being written (output placed inside the input tree).
/// Only paths sharing the file name are canonicalized.
fn is_own_output(path: &Path, own_path: &Path) -> bool {
    if path == own_path {
        return true;
    }
    path.file_name() == own_path.file_name()
        && path.canonicalize().is_ok_and(|p| p == own_path)
}
