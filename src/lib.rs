//! HL7v2 Processor Library
//!
//! A Rust library for decoding pipe-delimited HL7v2 clinical messages
//! and projecting them into flat per-segment tables for columnar
//! storage and statistical profiling.
//!
//! This library provides tools for:
//! - Decoding raw fields against the four-level separator grammar
//!   (repetitions, components, sub-components) with round-trip fidelity
//! - Splitting raw blobs into messages anchored on the MSH header token
//! - Assembling structured messages with the MSH offset rule and the
//!   single/multiple occurrence collapse
//! - Projecting messages into per-segment row sets keyed by the MSH-10
//!   message control id
//! - Writing partitioned Parquet tables with selectable compression
//! - Rendering field values for human-facing reports

pub mod assembler;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;
pub mod projector;
pub mod splitter;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use codec::{decode_field, encode_field, render_for_display};
pub use config::ProcessorConfig;
pub use error::{Hl7Error, Result};
pub use models::{FieldValue, Message, ProcessingStats, Segment, SegmentGroup};
pub use projector::{Projector, SegmentSchema};
