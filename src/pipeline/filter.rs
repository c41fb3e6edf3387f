//! Size filter: pure predicate over a [`FileDescriptor`].

use crate::{FileDescriptor, SizeBounds};

/// Why a descriptor was rejected, or `None` if it passes.
pub fn rejection_reason(descriptor: &FileDescriptor, bounds: &SizeBounds) -> Option<&'static str> {
    if !descriptor.is_regular_file {
        Some("not a regular file")
    } else if descriptor.byte_length < bounds.min {
        Some("below min size")
    } else if descriptor.byte_length > bounds.max {
        Some("above max size")
    } else {
        None
    }
}

/// True iff the descriptor is a regular file with `min <= len <= max`.
pub fn accept(descriptor: &FileDescriptor, bounds: &SizeBounds) -> bool {
    rejection_reason(descriptor, bounds).is_none()
}
