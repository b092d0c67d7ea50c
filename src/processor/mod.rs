//! Batch processing engine.
//!
//! Orchestrates the complete workflow: discover raw message files,
//! decode them concurrently, project the assembled messages against the
//! segment schema, and write per-segment Parquet tables.

pub mod writer;

#[cfg(test)]
pub mod tests;

use self::writer::TableWriter;

use crate::assembler::parse_messages;
use crate::config::ProcessorConfig;
use crate::constants::MESSAGE_FILE_EXTENSIONS;
use crate::error::{Hl7Error, Result};
use crate::models::{Message, ProcessingStats};
use crate::projector::{Projector, SegmentSchema};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Main processor for HL7 message batches
#[derive(Debug)]
pub struct BatchProcessor {
    input_path: PathBuf,
    output_path: PathBuf,
    config: ProcessorConfig,
    projector: Projector,
    table_writer: TableWriter,
}

impl BatchProcessor {
    /// Create a new batch processor for an input file or directory.
    pub fn new(
        input_path: PathBuf,
        output_path: PathBuf,
        schema: SegmentSchema,
    ) -> Result<Self> {
        if !input_path.exists() {
            return Err(Hl7Error::InputNotFound { path: input_path });
        }

        let config = ProcessorConfig::default();

        Ok(Self {
            input_path,
            output_path: output_path.clone(),
            projector: Projector::new(schema).with_strict_schema(config.strict_schema),
            table_writer: TableWriter::new(output_path, config.clone()),
            config,
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.projector = self.projector.with_strict_schema(config.strict_schema);
        self.table_writer = TableWriter::new(self.output_path.clone(), config.clone());
        self.config = config;
        self
    }

    /// Main processing entry point
    pub async fn process(&self, cancel: &CancellationToken) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting HL7 batch processing".bright_green().bold());
        println!("  {} {}", "Input:".bright_cyan(), self.input_path.display());
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.output_path.display()
        );

        // Step 1: Discover message files
        let message_files = self.discover_message_files()?;
        println!(
            "  {} {} message files",
            "Found".bright_green(),
            message_files.len().to_string().bright_white().bold()
        );

        let mut stats = ProcessingStats {
            output_path: self.output_path.clone(),
            ..Default::default()
        };

        if message_files.is_empty() {
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        // Step 2: Parse files concurrently
        println!("\n{}", "Parsing messages...".bright_yellow());
        let progress = ProgressBar::new(message_files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .expect("progress template is valid")
                .progress_chars("##-"),
        );

        // The semaphore caps simultaneously open file reads; the buffer
        // width is the decode fan-out.
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_files));
        let parse_results = stream::iter(message_files.iter())
            .map(|file_path| {
                let sem = semaphore.clone();
                let progress = progress.clone();
                let file_path = file_path.clone();
                async move {
                    let _permit = sem.acquire().await.ok()?;
                    let result = parse_message_file(&file_path).await;
                    progress.inc(1);
                    Some((file_path, result))
                }
            })
            .buffered(self.config.workers)
            .collect::<Vec<_>>()
            .await;
        progress.finish_and_clear();

        if cancel.is_cancelled() {
            return Err(Hl7Error::Interrupted {
                reason: "Cancelled during message parsing".to_string(),
            });
        }

        let mut messages: Vec<Message> = Vec::new();
        for (file_path, result) in parse_results.into_iter().flatten() {
            match result {
                Ok(parsed) => {
                    debug!("Parsed {} messages from {}", parsed.len(), file_path.display());
                    stats.files_processed += 1;
                    messages.extend(parsed);
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", file_path.display(), e);
                    stats.files_failed += 1;
                }
            }
        }
        stats.messages_parsed = messages.len();
        println!(
            "  {} {} messages from {} files",
            "Parsed".bright_green(),
            stats.messages_parsed.to_string().bright_white().bold(),
            stats.files_processed
        );

        // Step 3: Project against the schema
        let tables = self.projector.project(&messages);
        stats.segments_projected = tables.values().map(Vec::len).sum();

        if cancel.is_cancelled() {
            return Err(Hl7Error::Interrupted {
                reason: "Cancelled before writing output".to_string(),
            });
        }

        // Step 4: Write per-segment Parquet tables
        println!("\n{}", "Writing segment tables...".bright_yellow());
        std::fs::create_dir_all(&self.output_path)?;

        let written = self.table_writer.write_tables(&tables)?;

        for table in &written {
            println!(
                "  {} {} ({} rows) -> {}",
                "Table".bright_cyan(),
                table.segment.bright_white().bold(),
                table.rows,
                table.path.display()
            );
            stats.rows_written += table.rows;
        }
        stats.tables_written = written.len();

        let total_time = start_time.elapsed().as_millis();
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!("  {} {}ms", "Time elapsed:".bright_cyan(), total_time);
        println!(
            "  {} {}",
            "Messages parsed:".bright_cyan(),
            stats.messages_parsed.to_string().bright_white()
        );
        if stats.files_failed > 0 {
            println!(
                "  {} {}",
                "Files failed:".bright_red(),
                stats.files_failed.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Rows written:".bright_cyan(),
            stats.rows_written.to_string().bright_white().bold()
        );

        stats.processing_time_ms = total_time;
        Ok(stats)
    }

    /// Discover raw message files beneath the input path.
    ///
    /// A file input is used directly; a directory is walked for files
    /// with recognized message extensions, in sorted order so batch
    /// output is deterministic.
    fn discover_message_files(&self) -> Result<Vec<PathBuf>> {
        if self.input_path.is_file() {
            return Ok(vec![self.input_path.clone()]);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        let ext = ext.to_lowercase();
                        MESSAGE_FILE_EXTENSIONS.contains(&ext.as_str())
                    })
                    .unwrap_or(false)
            })
            .collect();

        files.sort();
        Ok(files)
    }
}

/// Read and parse one message file off the async runtime's blocking pool.
async fn parse_message_file(path: &PathBuf) -> Result<Vec<Message>> {
    let blob = tokio::fs::read_to_string(path).await?;
    let parsed = task::spawn_blocking(move || parse_messages(&blob))
        .await
        .map_err(|e| Hl7Error::ProcessingFailed {
            path: path.clone(),
            reason: format!("Parse task failed: {}", e),
        })?;
    Ok(parsed)
}
