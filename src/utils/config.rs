//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Optional settings file looked up in the working directory (CLI only).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Size filter ----

/// Default inclusive bounds for the size filter.
pub struct SizeDefaults;

impl SizeDefaults {
    /// Empty files are skipped by default.
    pub const MIN_FILE_SIZE: u64 = 1;
    /// Every accepted file is held in memory whole, so keep this bounded. 64 MiB.
    pub const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;
}

// ---- Reading sources ----

/// Source reading thresholds.
pub struct ReadingConsts;

impl ReadingConsts {
    /// Sources above this size are memory-mapped instead of copied into a buffer (bytes). 8 MiB.
    pub const MMAP_THRESHOLD: u64 = 8 * 1024 * 1024;
    /// Buffer size for the container writer and reader (bytes). 1 MiB.
    pub const IO_BUFFER_SIZE: usize = 1024 * 1024;
}

// ---- Worker threads ----

/// Thread limits for the extraction workers.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Minimum worker count.
    pub floor: usize,
    /// Upper bound for an explicit `local[N]` or `--partitions`.
    pub max: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
            max: Self::MAX_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 1;
    pub const MAX_THREADS: usize = 1024;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }
}

// ---- Extraction ----

/// Endpoint used when none is given: in-process, one worker per available thread.
pub const DEFAULT_EXECUTION_ENDPOINT: &str = "local[*]";

/// Records in flight between the reader thread and the workers, per worker.
/// Bounds memory to roughly this many records times the max record size.
pub const RECORDS_IN_FLIGHT_PER_WORKER: usize = 4;

/// Separator between key and encoded attributes in an output line.
pub const KEY_SEPARATOR: &str = "\t\t";

/// Marker file written into the output directory once every shard is flushed.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Shard file name prefix; shards are `part-00000`, `part-00001`, ...
pub const SHARD_PREFIX: &str = "part-";

// ---- Progress ----

/// Batch size for progress counter updates (reduce lock contention).
pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 100;
