//! Message assembly from decoded segment lines.
//!
//! Splits each line on the field separator, decodes every non-empty
//! token, applies the MSH header offset rule, and collapses segment
//! names with a single occurrence to a bare segment.

use crate::codec::decode_field;
use crate::constants::{
    DEFAULT_FIELD_OFFSET, FIELD_SEPARATOR, HEADER_SEGMENT, MSH_ENCODING_CHARS_POSITION,
    MSH_FIELD_OFFSET, MSH_FIELD_SEPARATOR_POSITION,
};
use crate::models::{FieldValue, Message, Segment, SegmentGroup};

/// Assemble one structured message from its segment lines.
///
/// Occurrences are appended in encounter order under their segment name;
/// a name with exactly one occurrence collapses to a bare segment.
pub fn assemble_message(segment_lines: &[&str]) -> Message {
    let mut message = Message::default();

    for line in segment_lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let segment = assemble_segment(trimmed);
        append_segment(&mut message, segment);
    }

    message
}

/// Decode one segment line into a segment.
///
/// Malformed or short lines are tolerated: a line containing only a
/// name and separator produces a segment with an empty field mapping.
pub fn assemble_segment(line: &str) -> Segment {
    let tokens: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let mut segment = Segment::new(tokens[0]);

    let (fields, offset) = if segment.name == HEADER_SEGMENT {
        // The split elides the field separator from the token stream, so
        // MSH-1 is synthesized to hold it. MSH-2 is the encoding
        // characters field, stored verbatim and never decoded.
        segment.fields.push((
            MSH_FIELD_SEPARATOR_POSITION.to_string(),
            FieldValue::Scalar(FIELD_SEPARATOR.to_string()),
        ));
        if tokens.len() > 1 {
            segment.fields.push((
                MSH_ENCODING_CHARS_POSITION.to_string(),
                FieldValue::Scalar(tokens[1].to_string()),
            ));
        }
        (&tokens[2.min(tokens.len())..], MSH_FIELD_OFFSET)
    } else {
        (&tokens[1.min(tokens.len())..], DEFAULT_FIELD_OFFSET)
    };

    for (i, token) in fields.iter().enumerate() {
        if token.is_empty() {
            continue;
        }
        segment
            .fields
            .push(((offset + i).to_string(), decode_field(token)));
    }

    segment
}

/// Parse every message in a raw blob: split into messages, then into
/// segment lines, then assemble each message independently.
pub fn parse_messages(blob: &str) -> Vec<Message> {
    crate::splitter::split_messages(blob)
        .iter()
        .map(|message| assemble_message(&crate::splitter::split_segments(message)))
        .collect()
}

fn append_segment(message: &mut Message, segment: Segment) {
    match message
        .segments
        .iter_mut()
        .find(|(name, _)| *name == segment.name)
    {
        Some((_, group)) => match group {
            SegmentGroup::One(first) => {
                let first = std::mem::replace(first, Segment::new(""));
                *group = SegmentGroup::Many(vec![first, segment]);
            }
            SegmentGroup::Many(segments) => segments.push(segment),
        },
        None => {
            let name = segment.name.clone();
            message.segments.push((name, SegmentGroup::One(segment)));
        }
    }
}
