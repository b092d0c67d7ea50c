//! Process command: batch decoding with per-segment Parquet output

use crate::cli::args::ProcessArgs;
use crate::cli::commands::shared::setup_logging;
use crate::config::ProcessorConfig;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::error::Result;
use crate::models::ProcessingStats;
use crate::processor::BatchProcessor;
use crate::projector::SegmentSchema;

use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run the process command
pub async fn run_process(
    args: ProcessArgs,
    cancel: CancellationToken,
) -> Result<ProcessingStats> {
    args.validate()?;
    setup_logging(args.get_log_level())?;

    let schema = SegmentSchema::from_file(&args.schema_file)?;
    let mut recognized: Vec<&str> = schema.segment_names().collect();
    recognized.sort_unstable();
    info!(
        "Processing with {} recognized segment types: {}",
        schema.len(),
        recognized.join(", ")
    );

    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let mut config = ProcessorConfig::default().with_compression(args.compression.clone());
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if args.strict_schema {
        config = config.with_strict_schema();
    }

    let processor =
        BatchProcessor::new(args.input_path.clone(), output_path, schema)?.with_config(config);

    processor.process(&cancel).await
}
