//! Component F — CLI Surface (`spec.md` §4.F / SPEC_FULL.md §F).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::error::ConvertError;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a device's allocator trace into a packed memory timeline and
    /// write the result as SQLite + JSON artifacts.
    Convert(ConvertArgs),
}

#[derive(clap::Args, Clone)]
pub struct ConvertArgs {
    /// Path to the input snapshot JSON file.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the artifacts are written into. Must not already contain
    /// `elements.db` or `allocations.json`.
    #[arg(short, long)]
    output: PathBuf,

    /// Index into the snapshot's per-device traces.
    #[arg(short, long, default_value_t = 0)]
    device: usize,
}

impl Cli {
    pub fn run() -> Result<(), ConvertError> {
        let cli = Cli::parse();

        match cli.command {
            Commands::Convert(args) => run_convert(args)?,
        }

        Ok(())
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), ConvertError> {
    info!("reading snapshot from {}", args.input.display());
    let raw = std::fs::read_to_string(&args.input)?;
    let snapshot: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| ConvertError::DecodeError(format!("{}: {e}", args.input.display())))?;

    crate::convert::convert(&snapshot, &args.output, args.device)?;

    info!("artifacts written to {}", args.output.display());
    Ok(())
}
