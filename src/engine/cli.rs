//! CLI command handlers: merge defaults < `.seqpack.toml` < flags, then run pack or extract.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::{Cli, Commands, ExtractArgs, PackArgs, ParseArgs};
use crate::extract::{extract_with_cancel, parse_file};
use crate::pack::pack_with_cancel;
use crate::parse::BasicParser;
use crate::utils::seqpack_toml::{
    SeqpackToml, apply_file_to_extract_opts, apply_file_to_pack_opts, load_seqpack_toml,
};
use crate::utils::{print_summary, setup_logging};
use crate::{ExtractOpts, PackOpts, SizeBounds};

fn setup_pack_opts(args: &PackArgs, file: Option<&SeqpackToml>) -> Result<PackOpts> {
    let mut opts = PackOpts::default();
    if let Some(f) = file {
        apply_file_to_pack_opts(f, &mut opts);
    }
    let min = args.min_size.unwrap_or(opts.bounds.min);
    let max = args.max_size.unwrap_or(opts.bounds.max);
    opts.bounds = SizeBounds::new(min, max)?;
    if let Some(c) = args.compress {
        opts.compression = c;
    }
    if let Some(f) = args.follow_links {
        opts.follow_links = f;
    }
    if let Some(v) = args.verbose {
        opts.verbose = v;
    }
    Ok(opts)
}

fn setup_extract_opts(args: &ExtractArgs, file: Option<&SeqpackToml>) -> ExtractOpts {
    let mut opts = ExtractOpts::default();
    if let Some(f) = file {
        apply_file_to_extract_opts(f, &mut opts);
    }
    if let Some(ref e) = args.execution_endpoint {
        opts.endpoint = e.clone();
    }
    if args.partitions.is_some() {
        opts.partitions = args.partitions;
    }
    if let Some(v) = args.verbose {
        opts.verbose = v;
    }
    opts
}

/// Ctrl+C sets the returned flag; the running job stops at its next record.
fn install_cancel_handler() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;
    Ok(cancel)
}

/// Failed jobs do not clean up after themselves; say so when they left something behind.
fn warn_partial_output(output: &Path, existed_before: bool) {
    if !existed_before && output.exists() {
        warn!(
            "Partial output left at {}; delete it before retrying",
            output.display()
        );
    }
}

pub(crate) fn handle_pack(args: &PackArgs, file: Option<&SeqpackToml>) -> Result<()> {
    let opts = setup_pack_opts(args, file)?;
    setup_logging(opts.verbose);
    let cancel = install_cancel_handler()?;
    let existed_before = args.output.exists();

    let stats = pack_with_cancel(&args.input, &args.output, &opts, Some(cancel)).inspect_err(
        |_| warn_partial_output(&args.output, existed_before),
    )?;
    print_summary("Files copied", stats.copied);
    print_summary("Files skipped", stats.skipped);
    Ok(())
}

pub(crate) fn handle_extract(args: &ExtractArgs, file: Option<&SeqpackToml>) -> Result<()> {
    let opts = setup_extract_opts(args, file);
    setup_logging(opts.verbose);
    let cancel = install_cancel_handler()?;
    let existed_before = args.output.exists();

    let stats = extract_with_cancel(
        &args.input,
        &args.output,
        &opts,
        Arc::new(BasicParser),
        Some(cancel),
    )
    .inspect_err(|_| warn_partial_output(&args.output, existed_before))?;
    print_summary("Records written", stats.written);
    print_summary("Records failed", stats.failed);
    print_summary("Partitions", stats.partitions);
    Ok(())
}

pub(crate) fn handle_parse(args: &ParseArgs) -> Result<()> {
    setup_logging(args.verbose.unwrap_or(false));
    let (line, failed) = parse_file(&args.file, &BasicParser)?;
    println!("{}", line);
    if failed {
        warn!("{}: parse failed", args.file.display());
    }
    Ok(())
}

/// Dispatch the subcommand. Settings file is read from the current directory.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let file = load_seqpack_toml(Path::new("."))?;
    if file.is_some() {
        debug!("loaded settings file");
    }
    match &cli.command {
        Commands::Pack(args) => handle_pack(args, file.as_ref()),
        Commands::Extract(args) => handle_extract(args, file.as_ref()),
        Commands::Parse(args) => handle_parse(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Compression;
    use crate::utils::seqpack_toml::parse_seqpack_toml;
    use clap::Parser;

    fn pack_args(argv: &[&str]) -> PackArgs {
        match Cli::parse_from(argv).command {
            Commands::Pack(a) => a,
            _ => panic!("expected pack"),
        }
    }

    #[test]
    fn flags_override_settings_file() {
        let file = parse_seqpack_toml("[pack]\nmax_size = 500\ncompress = \"none\"\n").unwrap();
        let args = pack_args(&[
            "seqpack", "pack", "--in", "a", "--out", "b", "--max-size", "900",
        ]);
        let opts = setup_pack_opts(&args, Some(&file)).unwrap();
        assert_eq!(opts.bounds.max, 900);
        assert_eq!(opts.compression, Compression::None);
    }

    #[test]
    fn inverted_bounds_rejected() {
        let args = pack_args(&[
            "seqpack", "pack", "--in", "a", "--out", "b", "--min-size", "10", "--max-size", "5",
        ]);
        assert!(setup_pack_opts(&args, None).is_err());
    }

    #[test]
    fn bare_verbose_flag_is_true() {
        let args = pack_args(&["seqpack", "pack", "--in", "a", "--out", "b", "-v"]);
        assert_eq!(args.verbose, Some(true));
    }

    #[test]
    fn extract_endpoint_default_and_override() {
        let cli = Cli::parse_from(["seqpack", "extract", "--in", "c", "--out", "d"]);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        let opts = setup_extract_opts(&args, None);
        assert_eq!(opts.endpoint, "local[*]");

        let cli = Cli::parse_from([
            "seqpack", "extract", "--in", "c", "--out", "d", "-e", "local[2]", "-p", "3",
        ]);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        let opts = setup_extract_opts(&args, None);
        assert_eq!(opts.endpoint, "local[2]");
        assert_eq!(opts.partitions, Some(3));
    }

    #[test]
    fn parse_subcommand_takes_file() {
        let cli = Cli::parse_from(["seqpack", "parse", "--file", "/tmp/x.jpg"]);
        let Commands::Parse(args) = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(args.file, std::path::PathBuf::from("/tmp/x.jpg"));
        assert_eq!(args.verbose, None);
    }
}
