//! Extraction stage: one container record in, one keyed attribute set out.
//!
//! Parse failures are isolated to their record: the record still produces output, carrying only
//! an `ERROR` attribute with the reason. Only an unavailable parsing capability stops the job.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::error::{PackError, Result};
use crate::parse::{CONTENT, ContentParser, ERROR};
use crate::{AttributeSet, ContainerRecord};

/// Outcome of parsing one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    Parsed(AttributeSet),
    Failed(String),
}

impl Extraction {
    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }

    /// Attribute set to format: the parsed set, or a set holding only `ERROR`.
    pub fn into_attributes(self) -> AttributeSet {
        match self {
            Extraction::Parsed(attrs) => attrs,
            Extraction::Failed(reason) => {
                let mut attrs = AttributeSet::new();
                attrs.set(ERROR, reason);
                attrs
            }
        }
    }
}

/// Parse one record's bytes (no filename hint). `Err` only for `CapabilityUnavailable`.
pub fn extract(
    parser: &dyn ContentParser,
    record: ContainerRecord,
) -> Result<(String, Extraction)> {
    let ContainerRecord { key, value } = record;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| parser.parse(&value)));
    let extraction = match outcome {
        Ok(Ok(mut attrs)) => {
            if !attrs.contains(CONTENT) {
                attrs.set(CONTENT, "");
            }
            Extraction::Parsed(attrs)
        }
        Ok(Err(err @ PackError::CapabilityUnavailable(_))) => return Err(err),
        Ok(Err(PackError::ExtractionFailure(reason))) => Extraction::Failed(reason),
        Ok(Err(other)) => Extraction::Failed(other.to_string()),
        Err(payload) => {
            Extraction::Failed(format!("parser panicked: {}", panic_message(&*payload)))
        }
    };
    Ok((key, extraction))
}

/// Run [`extract`] over an in-memory batch on the rayon pool. Output order is not meaningful.
pub fn extract_batch(
    parser: &dyn ContentParser,
    records: Vec<ContainerRecord>,
) -> Result<Vec<(String, Extraction)>> {
    records
        .into_par_iter()
        .map(|record| extract(parser, record))
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
