//! seqpack CLI: `pack` files into a container, `extract` metadata from one.

use anyhow::Result;
use clap::Parser;
use seqpack::engine::arg_parser::Cli;
use seqpack::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
