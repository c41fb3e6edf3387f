//! Load `.seqpack.toml` from a directory (CLI only). Lib callers build [`PackOpts`] / [`ExtractOpts`] directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::utils::config::PackagePaths;
use crate::{Compression, ExtractOpts, PackOpts};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeqpackToml {
    #[serde(default)]
    pack: PackSection,
    #[serde(default)]
    extract: ExtractSection,
}

#[derive(Debug, Default, Deserialize)]
struct PackSection {
    min_size: Option<u64>,
    max_size: Option<u64>,
    compress: Option<Compression>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractSection {
    execution_endpoint: Option<String>,
    partitions: Option<usize>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is no file; a malformed file is an error. CLI only.
pub(crate) fn load_seqpack_toml(dir: &Path) -> Result<Option<SeqpackToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let file = parse_seqpack_toml(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

pub(crate) fn parse_seqpack_toml(s: &str) -> std::result::Result<SeqpackToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply the `[pack]` section (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_pack_opts(file: &SeqpackToml, opts: &mut PackOpts) {
    let section = &file.pack;
    apply_file_opt!(section, opts, min_size => bounds.min);
    apply_file_opt!(section, opts, max_size => bounds.max);
    apply_file_opt!(section, opts, compress => compression);
    apply_file_opt!(section, opts, follow_links => follow_links);
    apply_file_opt!(section, opts, verbose => verbose);
}

/// Apply the `[extract]` section (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_extract_opts(file: &SeqpackToml, opts: &mut ExtractOpts) {
    let section = &file.extract;
    apply_file_opt!(section, opts, execution_endpoint => endpoint);
    if let Some(n) = section.partitions {
        opts.partitions = Some(n);
    }
    apply_file_opt!(section, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_section_overrides_only_present_fields() {
        let file = parse_seqpack_toml("[pack]\nmax_size = 1024\ncompress = \"none\"\n").unwrap();
        let mut opts = PackOpts::default();
        apply_file_to_pack_opts(&file, &mut opts);
        assert_eq!(opts.bounds.min, 1);
        assert_eq!(opts.bounds.max, 1024);
        assert_eq!(opts.compression, Compression::None);
        assert!(!opts.follow_links);
    }

    #[test]
    fn extract_section_sets_endpoint_and_partitions() {
        let file = parse_seqpack_toml(
            "[extract]\nexecution_endpoint = \"local[2]\"\npartitions = 3\n",
        )
        .unwrap();
        let mut opts = ExtractOpts::default();
        apply_file_to_extract_opts(&file, &mut opts);
        assert_eq!(opts.endpoint, "local[2]");
        assert_eq!(opts.partitions, Some(3));
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let file = parse_seqpack_toml("").unwrap();
        let mut opts = ExtractOpts::default();
        apply_file_to_extract_opts(&file, &mut opts);
        assert_eq!(opts.endpoint, "local[*]");
        assert_eq!(opts.partitions, None);
    }
}
