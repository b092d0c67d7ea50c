//! Inspect command: parse one message file and print its fields
//! using the display renderer.

use crate::assembler::parse_messages;
use crate::cli::args::InspectArgs;
use crate::cli::commands::shared::setup_logging;
use crate::codec::render_field_for_display;
use crate::error::Result;
use crate::models::ProcessingStats;

use colored::*;
use std::time::Instant;

/// Run the inspect command
pub async fn run_inspect(args: InspectArgs) -> Result<ProcessingStats> {
    args.validate()?;
    setup_logging(args.get_log_level())?;

    let start_time = Instant::now();
    let blob = tokio::fs::read_to_string(&args.input_file).await?;
    let messages = parse_messages(&blob);

    println!(
        "{} {} ({} messages)",
        "Inspecting".bright_green().bold(),
        args.input_file.display(),
        messages.len()
    );

    let mut segments_shown = 0;
    for (index, message) in messages.iter().enumerate() {
        println!(
            "\n{} {}",
            "Message".bright_yellow().bold(),
            (index + 1).to_string().bright_white()
        );

        for (segment_name, group) in &message.segments {
            if let Some(filter) = &args.segment {
                if segment_name != filter {
                    continue;
                }
            }

            for segment in group.normalize() {
                println!("  {}", segment_name.bright_cyan().bold());
                segments_shown += 1;
                for (position, value) in &segment.fields {
                    println!(
                        "    {}-{}: {}",
                        segment_name,
                        position,
                        render_field_for_display(value)
                    );
                }
            }
        }
    }

    if let Some(filter) = &args.segment {
        if segments_shown == 0 {
            println!(
                "\n{} no segments named '{}' found",
                "Note:".bright_yellow(),
                filter
            );
        }
    }

    Ok(ProcessingStats {
        files_processed: 1,
        messages_parsed: messages.len(),
        segments_projected: segments_shown,
        processing_time_ms: start_time.elapsed().as_millis(),
        ..Default::default()
    })
}
