use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::Compression;

/// Pack many small files into one container; extract per-file metadata from it in parallel.
#[derive(Clone, Parser)]
#[command(name = "seqpack")]
#[command(about = "Pack small files into a single container, then extract metadata from it.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Pack a directory (or a manifest listing one path per line) into a container file.
    Pack(PackArgs),
    /// Run every record of a container through the content parser into a sharded output directory.
    Extract(ExtractArgs),
    /// Run the content parser over one local file and print its output line.
    Parse(ParseArgs),
}

#[derive(Clone, Args)]
pub struct PackArgs {
    /// Input directory, or a text file listing one file path per line.
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Container file to create. Must not already exist.
    #[arg(long = "out", value_name = "FILE")]
    pub output: PathBuf,

    /// Skip files smaller than this many bytes.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub min_size: Option<u64>,

    /// Skip files larger than this many bytes.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub max_size: Option<u64>,

    /// Record compression.
    #[arg(long, short = 'c', value_enum)]
    pub compress: Option<Compression>,

    /// Follow symbolic links while walking a directory.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[derive(Clone, Args)]
pub struct ExtractArgs {
    /// Container file produced by `pack`.
    #[arg(long = "in", value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory to create. Must not already exist.
    #[arg(long = "out", value_name = "DIR")]
    pub output: PathBuf,

    /// Where to run: `local`, `local[*]` or `local[N]`.
    #[arg(long, short = 'e')]
    pub execution_endpoint: Option<String>,

    /// Number of output partitions (one worker each). Default: from the endpoint.
    #[arg(long, short = 'p', value_parser = clap::value_parser!(usize))]
    pub partitions: Option<usize>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[derive(Clone, Args)]
pub struct ParseArgs {
    /// File to parse.
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
