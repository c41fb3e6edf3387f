//! Path and destination utilities

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::PackError;

/// Container key for a path: the path string as given, lossily converted to UTF-8.
pub fn path_to_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Map an error from creating a destination: an existing object means the non-overwrite rule fired.
pub fn map_create_error(err: std::io::Error, path: &Path) -> PackError {
    match err.kind() {
        ErrorKind::AlreadyExists => PackError::OutputAlreadyExists(path.to_path_buf()),
        _ => PackError::Io(err),
    }
}

/// True once the user asked to stop (Ctrl+C in the CLI).
pub fn cancel_requested(cancel: Option<&Arc<AtomicBool>>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}
