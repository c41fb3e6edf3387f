//! Public and internal types for the seqpack API and pipelines.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use crate::error::{PackError, Result};
use crate::utils::config::SizeDefaults;

/// Status of one candidate file, produced during enumeration and dropped right after filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub byte_length: u64,
    pub is_regular_file: bool,
}

/// One (key, bytes) pair in a container. Key is the original path string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRecord {
    pub key: String,
    pub value: Vec<u8>,
}

/// Record-level compression, fixed for the whole container and stored in its header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Gzip,
}

/// Inclusive byte-length bounds applied by the size filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeBounds {
    pub min: u64,
    pub max: u64,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min: SizeDefaults::MIN_FILE_SIZE,
            max: SizeDefaults::MAX_FILE_SIZE,
        }
    }
}

impl SizeBounds {
    /// Bounds with `min <= max`; anything else would reject every file.
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min > max {
            return Err(PackError::invalid_input(
                PathBuf::new(),
                format!("min size {min} is greater than max size {max}"),
            ));
        }
        Ok(Self { min, max })
    }
}

/// Value bound to one attribute name. The variant is the multiplicity flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    Single(String),
    Multi(Vec<String>),
}

/// Name → value(s) extracted from one record's content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: BTreeMap<String, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a single value, replacing whatever was there.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), AttributeValue::Single(value.into()));
    }

    /// Bind `name` to a list of values. The name is multi-valued even for a one-element list.
    pub fn set_multi<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.attrs.insert(name.into(), AttributeValue::Multi(values));
    }

    /// Append a value; a second value promotes a single-valued name to multi-valued.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(AttributeValue::Single(value));
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                match current {
                    AttributeValue::Multi(values) => values.push(value),
                    AttributeValue::Single(first) => {
                        let first = std::mem::take(first);
                        *current = AttributeValue::Multi(vec![first, value]);
                    }
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn is_multi_valued(&self, name: &str) -> bool {
        matches!(self.attrs.get(name), Some(AttributeValue::Multi(_)))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Counts reported by the pack pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackStats {
    pub copied: u64,
    pub skipped: u64,
}

/// Counts reported by the extract pipeline. `failed` records are still written, carrying `ERROR`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub written: u64,
    pub failed: u64,
    pub partitions: usize,
}

/// Options for the pack pipeline (CLI and lib).
#[derive(Clone, Debug, Default)]
pub struct PackOpts {
    /// Inclusive size bounds; files outside are skipped.
    pub bounds: SizeBounds,
    /// Record compression written into the container header.
    pub compression: Compression,
    /// Follow symbolic links during a directory walk.
    pub follow_links: bool,
    /// Show a progress counter.
    pub verbose: bool,
}

/// Options for the extract pipeline (CLI and lib).
#[derive(Clone, Debug)]
pub struct ExtractOpts {
    /// Execution endpoint: `local`, `local[*]` or `local[N]`.
    pub endpoint: String,
    /// Override the number of output partitions (one worker per partition).
    pub partitions: Option<usize>,
    /// Show a progress counter.
    pub verbose: bool,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        Self {
            endpoint: crate::utils::config::DEFAULT_EXECUTION_ENDPOINT.to_string(),
            partitions: None,
            verbose: false,
        }
    }
}
