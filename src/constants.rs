//! Application constants for the HL7v2 processor
//!
//! This module contains the separator grammar, header segment conventions,
//! output naming, and default values used throughout the application.

// =============================================================================
// Separator Grammar
// =============================================================================

/// Separates positional fields within a segment line
pub const FIELD_SEPARATOR: char = '|';

/// Separates repetitions of a field (split first when decoding)
pub const REPETITION_SEPARATOR: char = '~';

/// Separates components within a field or repetition
pub const COMPONENT_SEPARATOR: char = '^';

/// Separates sub-components within a component (split last when decoding)
pub const SUBCOMPONENT_SEPARATOR: char = '&';

/// Repetition delimiter used when rendering values for human-facing
/// reports. Deliberately not the wire repetition separator.
pub const DISPLAY_REPETITION_SEPARATOR: &str = ", ";

// =============================================================================
// Header Segment (MSH) Conventions
// =============================================================================

/// Name of the message header segment
pub const HEADER_SEGMENT: &str = "MSH";

/// Token that anchors the start of every message in a raw blob
pub const MESSAGE_START_TOKEN: &str = "MSH|";

/// Synthetic MSH position holding the field separator character itself
pub const MSH_FIELD_SEPARATOR_POSITION: &str = "1";

/// MSH position holding the encoding characters verbatim (never decoded)
pub const MSH_ENCODING_CHARS_POSITION: &str = "2";

/// First numbered position for the remaining MSH tokens
pub const MSH_FIELD_OFFSET: usize = 3;

/// First numbered position for tokens of every other segment type
pub const DEFAULT_FIELD_OFFSET: usize = 1;

/// MSH field position carrying the message control id used to correlate
/// projected rows back to their source message
pub const CORRELATION_FIELD_POSITION: &str = "10";

// =============================================================================
// Output Conventions
// =============================================================================

/// Correlation key column present in every projected table
pub const MESSAGE_CONTROL_ID_COLUMN: &str = "message_control_id";

/// Directory prefix for per-segment table partitions (`segment=PID/`)
pub const SEGMENT_PARTITION_PREFIX: &str = "segment=";

/// Prefix for generated Parquet file names
pub const OUTPUT_FILE_PREFIX: &str = "hl7_";

/// Timestamp format embedded in generated Parquet file names
pub const OUTPUT_FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Default output directory when none is specified
pub const DEFAULT_OUTPUT_DIR: &str = "output";

// =============================================================================
// Processing Configuration Defaults
// =============================================================================

/// File extensions recognized as raw HL7 message files during discovery
pub const MESSAGE_FILE_EXTENSIONS: &[&str] = &["hl7", "txt"];

/// Default maximum number of message files decoded concurrently
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_set_is_distinct() {
        let seps = [
            FIELD_SEPARATOR,
            REPETITION_SEPARATOR,
            COMPONENT_SEPARATOR,
            SUBCOMPONENT_SEPARATOR,
        ];
        for (i, a) in seps.iter().enumerate() {
            for b in seps.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_message_start_token_matches_header_segment() {
        assert_eq!(
            MESSAGE_START_TOKEN,
            format!("{}{}", HEADER_SEGMENT, FIELD_SEPARATOR)
        );
    }
}
