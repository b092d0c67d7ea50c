//! Configuration for batch processing.
//!
//! Provides the processor configuration value passed into the batch
//! pipeline, including concurrency limits, schema strictness, and
//! Parquet compression selection.

use crate::constants::DEFAULT_MAX_CONCURRENT_FILES;
use clap::ValueEnum;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};

/// Supported compression algorithms for Parquet output
#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Configuration for HL7 batch processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Number of message files decoded in parallel
    pub workers: usize,

    /// Cap on simultaneously open file reads
    pub max_concurrent_files: usize,

    /// Report segments absent from the schema instead of skipping silently
    pub strict_schema: bool,

    /// Compression algorithm for Parquet output
    pub compression: CompressionAlgorithm,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            max_concurrent_files: DEFAULT_MAX_CONCURRENT_FILES,
            strict_schema: false,
            compression: CompressionAlgorithm::Snappy,
        }
    }
}

impl ProcessorConfig {
    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set maximum concurrent file reads
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Enable strict schema diagnostics
    pub fn with_strict_schema(mut self) -> Self {
        self.strict_schema = true;
        self
    }

    /// Set the Parquet compression algorithm
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert!(config.workers > 0);
        assert_eq!(config.max_concurrent_files, DEFAULT_MAX_CONCURRENT_FILES);
        assert!(!config.strict_schema);
    }

    #[test]
    fn test_builder_methods() {
        let config = ProcessorConfig::default()
            .with_workers(2)
            .with_max_concurrent_files(4)
            .with_strict_schema();

        assert_eq!(config.workers, 2);
        assert_eq!(config.max_concurrent_files, 4);
        assert!(config.strict_schema);
    }
}
