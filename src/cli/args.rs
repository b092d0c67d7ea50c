//! Command-line argument definitions for the HL7v2 processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::CompressionAlgorithm;
use crate::error::{Hl7Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the HL7v2 segment processor
///
/// Decodes pipe-delimited HL7v2 clinical messages and projects them into
/// flat per-segment tables for columnar storage and profiling.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hl7v2-processor",
    version,
    about = "Decode HL7v2 messages and project them into per-segment Parquet tables",
    long_about = "Decodes raw pipe-delimited HL7v2 clinical messages into their hierarchical \
                  field structure, then projects each recognized segment type into a flat \
                  Parquet table keyed by the MSH-10 message control id. Compound field values \
                  are stored as JSON nested-array text so columns stay self-describing."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the HL7v2 processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process raw message files into per-segment Parquet tables
    Process(ProcessArgs),
    /// Parse a message file and print its fields for human review
    Inspect(InspectArgs),
}

/// Arguments for the process command (main batch processing)
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Input path: a raw message file or a directory of .hl7/.txt files
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input message file or directory"
    )]
    pub input_path: PathBuf,

    /// Output directory for generated Parquet tables
    ///
    /// One `segment=<NAME>/` partition directory is created per
    /// recognized segment type. Defaults to ./output
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory for Parquet tables"
    )]
    pub output_path: Option<PathBuf>,

    /// Segment schema file (JSON)
    ///
    /// Maps each recognized segment name to an array of field position
    /// strings, e.g. {"PID": ["3", "5"], "OBX": ["3", "5"]}.
    #[arg(
        short = 's',
        long = "schema",
        value_name = "FILE",
        help = "Segment schema file (JSON)"
    )]
    pub schema_file: PathBuf,

    /// Number of parallel workers
    ///
    /// Controls how many message files are decoded concurrently.
    /// Defaults to the number of CPU cores.
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of parallel workers for processing"
    )]
    pub workers: Option<usize>,

    /// Report segments absent from the schema
    ///
    /// By default unrecognized segment names are skipped silently. This
    /// flag reports each skip as a diagnostic; it never fails the run.
    #[arg(long = "strict-schema", help = "Report segments absent from the schema")]
    pub strict_schema: bool,

    /// Compression algorithm for Parquet output
    #[arg(
        long = "compression",
        value_enum,
        default_value = "snappy",
        help = "Compression algorithm for Parquet output"
    )]
    pub compression: CompressionAlgorithm,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the inspect command (human-facing message review)
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Raw message file to inspect
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Raw message file to inspect"
    )]
    pub input_file: PathBuf,

    /// Only show segments with this name (e.g. PID)
    #[arg(
        long = "segment",
        value_name = "NAME",
        help = "Only show segments with this name"
    )]
    pub segment: Option<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(Hl7Error::Configuration {
                message: format!("Input path does not exist: {}", self.input_path.display()),
            });
        }

        if !self.schema_file.exists() {
            return Err(Hl7Error::Configuration {
                message: format!(
                    "Schema file does not exist: {}",
                    self.schema_file.display()
                ),
            });
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Hl7Error::Configuration {
                    message: "Number of workers must be greater than 0".to_string(),
                });
            }
            if workers > 100 {
                return Err(Hl7Error::Configuration {
                    message: "Number of workers cannot exceed 100".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            verbosity_to_level(self.verbose)
        }
    }
}

impl InspectArgs {
    /// Validate the inspect command arguments
    pub fn validate(&self) -> Result<()> {
        if !self.input_file.exists() {
            return Err(Hl7Error::Configuration {
                message: format!("Input file does not exist: {}", self.input_file.display()),
            });
        }

        if !self.input_file.is_file() {
            return Err(Hl7Error::Configuration {
                message: format!("Input path is not a file: {}", self.input_file.display()),
            });
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        verbosity_to_level(self.verbose)
    }
}

fn verbosity_to_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
