use clap::Parser;
use hl7v2_processor::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Set up graceful shutdown handling
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");

            // Cancel all operations when Ctrl+C is received
            cancellation_token.cancel();
        };

        // Run the main command with cancellation support
        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(hl7v2_processor::Hl7Error::Interrupted {
                    reason: "Processing interrupted by user".to_string(),
                })
            }
        }
    });

    match result {
        Ok(_stats) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("HL7v2 Processor - Clinical Message Decoder");
    println!("==========================================");
    println!();
    println!("Decode pipe-delimited HL7v2 clinical messages and project them into");
    println!("flat per-segment Parquet tables keyed by the message control id.");
    println!();
    println!("USAGE:");
    println!("    hl7v2-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Process raw message files into Parquet tables (main command)");
    println!("    inspect     Parse a message file and print its fields for review");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process a directory of raw messages:");
    println!("    hl7v2-processor process --input ./messages --output ./tables \\");
    println!("                            --schema ./hl7_segment_schema.json");
    println!();
    println!("    # Inspect a single message file:");
    println!("    hl7v2-processor inspect --input ./messages/adt.hl7 --segment PID");
    println!();
    println!("For detailed help on any command, use:");
    println!("    hl7v2-processor <COMMAND> --help");
}
