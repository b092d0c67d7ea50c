//! Command implementations for the HL7v2 processor CLI
//!
//! This module contains the command execution logic and shared helpers
//! for logging setup and summary reporting. Each command is implemented
//! in its own module.

pub mod inspect;
pub mod process;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::error::Result;
use crate::models::ProcessingStats;
use tokio_util::sync::CancellationToken;

/// Main command runner for the HL7v2 processor
///
/// Dispatches to the appropriate subcommand handler based on CLI args:
/// - `process`: batch decoding with per-segment Parquet output
/// - `inspect`: human-facing review of one message file
pub async fn run(args: Args, cancel: CancellationToken) -> Result<ProcessingStats> {
    match args.get_command() {
        Commands::Process(process_args) => process::run_process(process_args, cancel).await,
        Commands::Inspect(inspect_args) => inspect::run_inspect(inspect_args).await,
    }
}
