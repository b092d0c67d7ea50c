//! Raw message splitting.
//!
//! Splits a raw multi-message blob into individual message texts
//! anchored on the `MSH|` token, and splits one message into segment
//! lines on either line-feed or carriage-return terminators.

use crate::constants::MESSAGE_START_TOKEN;
use regex::Regex;
use std::sync::LazyLock;

static SEGMENT_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("segment terminator pattern is valid"));

/// Split a raw blob into individual message texts.
///
/// The split consumes the `MSH|` delimiter itself, so every surviving
/// chunk has it re-prefixed. Empty or whitespace-only input yields an
/// empty sequence rather than an error.
pub fn split_messages(blob: &str) -> Vec<String> {
    blob.trim()
        .split(MESSAGE_START_TOKEN)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            if chunk.starts_with(MESSAGE_START_TOKEN) {
                chunk.to_string()
            } else {
                format!("{}{}", MESSAGE_START_TOKEN, chunk)
            }
        })
        .collect()
}

/// Split one message into segment lines, dropping blank lines.
pub fn split_segments(message: &str) -> Vec<&str> {
    SEGMENT_TERMINATOR
        .split(message.trim())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MESSAGES: &str = "MSH|^~\\&|SendApp|SendFac|RecvApp|RecvFac|202401011200||ADT^A01|MSG001|P|2.5\r\
                                PID|1||12345\r\
                                MSH|^~\\&|SendApp|SendFac|RecvApp|RecvFac|202401011230||ADT^A01|MSG002|P|2.5\r\
                                PID|1||67890";

    #[test]
    fn test_split_two_messages() {
        let messages = split_messages(TWO_MESSAGES);

        assert_eq!(messages.len(), 2);
        for message in &messages {
            assert!(message.starts_with("MSH|"));
        }
        assert!(messages[0].contains("MSG001"));
        assert!(messages[1].contains("MSG002"));
    }

    #[test]
    fn test_split_single_message() {
        let messages = split_messages("MSH|^~\\&|App|Fac\rPID|1||12345");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "MSH|^~\\&|App|Fac\rPID|1||12345");
    }

    #[test]
    fn test_split_empty_blob() {
        assert!(split_messages("").is_empty());
        assert!(split_messages("   \r\n  ").is_empty());
    }

    #[test]
    fn test_split_segments_handles_all_terminators() {
        for message in [
            "MSH|^~\\&|App\rPID|1\rOBX|1",
            "MSH|^~\\&|App\nPID|1\nOBX|1",
            "MSH|^~\\&|App\r\nPID|1\r\nOBX|1",
        ] {
            let segments = split_segments(message);
            assert_eq!(segments, vec!["MSH|^~\\&|App", "PID|1", "OBX|1"]);
        }
    }

    #[test]
    fn test_split_segments_drops_blank_lines() {
        let segments = split_segments("MSH|^~\\&|App\r\r\nPID|1\n\n");
        assert_eq!(segments, vec!["MSH|^~\\&|App", "PID|1"]);
    }

    #[test]
    fn test_split_segments_empty_message() {
        assert!(split_segments("").is_empty());
    }
}
