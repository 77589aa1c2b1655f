//! Renamer CLI: scan, propose renames, and optionally perform them.

use anyhow::Result;
use clap::Parser;
use renamer::engine::arg_parser::Cli;
use renamer::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    // Values from .env become environment defaults for the CLI.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
