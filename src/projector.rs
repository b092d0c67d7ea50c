//! Tabular projection of assembled messages.
//!
//! Turns structured messages into flat per-segment-type row sets keyed
//! by the MSH-10 message control id, with compound field values
//! serialized to JSON nested-array text so storage columns hold
//! self-describing scalar strings.

use crate::constants::{CORRELATION_FIELD_POSITION, HEADER_SEGMENT};
use crate::error::{Hl7Error, Result};
use crate::models::{FieldValue, Message, ProjectedRow};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Recognized segment names and their field positions, loaded once per
/// run and treated as read-only for that run. Reloading for a new batch
/// means constructing a fresh value and a fresh [`Projector`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SegmentSchema {
    segments: HashMap<String, Vec<String>>,
}

impl SegmentSchema {
    /// Build a schema from segment names with their recognized positions.
    pub fn new(segments: HashMap<String, Vec<String>>) -> Self {
        Self { segments }
    }

    /// Load the schema from a JSON file mapping segment name to an array
    /// of field position strings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Hl7Error::SchemaLoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let schema: SegmentSchema =
            serde_json::from_str(&contents).map_err(|e| Hl7Error::SchemaLoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(
            "Loaded segment schema with {} segment types from {}",
            schema.segments.len(),
            path.display()
        );
        Ok(schema)
    }

    pub fn contains(&self, segment_name: &str) -> bool {
        self.segments.contains_key(segment_name)
    }

    pub fn positions(&self, segment_name: &str) -> Option<&[String]> {
        self.segments.get(segment_name).map(Vec::as_slice)
    }

    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Projects assembled messages into per-segment row sets.
#[derive(Debug, Clone)]
pub struct Projector {
    schema: SegmentSchema,
    strict_schema: bool,
}

impl Projector {
    pub fn new(schema: SegmentSchema) -> Self {
        Self {
            schema,
            strict_schema: false,
        }
    }

    /// In strict mode, segments absent from the schema are reported as
    /// diagnostics. They are still skipped, never fatal.
    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Project messages into tables keyed by segment name.
    ///
    /// Rows preserve message order, and occurrences of one segment
    /// within a message stay contiguous. Segment names absent from the
    /// schema produce no table and no error.
    pub fn project(&self, messages: &[Message]) -> HashMap<String, Vec<ProjectedRow>> {
        let mut tables: HashMap<String, Vec<ProjectedRow>> = HashMap::new();

        for message in messages {
            let message_control_id = self.correlation_key(message);

            for (segment_name, group) in &message.segments {
                if !self.schema.contains(segment_name) {
                    if self.strict_schema {
                        warn!("Segment '{}' not in schema, skipping", segment_name);
                    } else {
                        debug!("Segment '{}' not in schema, skipping", segment_name);
                    }
                    continue;
                }

                let rows = tables.entry(segment_name.clone()).or_default();
                for segment in group.normalize() {
                    let cells = segment
                        .fields
                        .iter()
                        .map(|(position, value)| {
                            (
                                format!("{}-{}", segment_name, position),
                                serialize_cell(value),
                            )
                        })
                        .collect();

                    rows.push(ProjectedRow {
                        message_control_id: message_control_id.clone(),
                        cells,
                    });
                }
            }
        }

        tables
    }

    /// Extract the MSH-10 correlation key, tolerating its absence.
    ///
    /// The key is not guaranteed unique across messages; collisions are
    /// documented, not prevented.
    fn correlation_key(&self, message: &Message) -> String {
        message
            .get(HEADER_SEGMENT)
            .and_then(|group| group.normalize().first())
            .and_then(|header| header.field(CORRELATION_FIELD_POSITION))
            .map(|value| match value {
                FieldValue::Scalar(s) => s.clone(),
                compound => compound.to_json().to_string(),
            })
            .unwrap_or_default()
    }
}

/// Serialize one field value to its storage-safe scalar form: scalars
/// pass through as plain text, compound values become JSON nested-array
/// text rather than being re-flattened to wire separators.
pub fn serialize_cell(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(s) => s.clone(),
        compound => compound.to_json().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble_message;
    use crate::splitter::split_segments;

    fn test_schema() -> SegmentSchema {
        SegmentSchema::new(HashMap::from([
            (
                "MSH".to_string(),
                vec!["9".to_string(), "10".to_string()],
            ),
            ("PID".to_string(), vec!["3".to_string(), "5".to_string()]),
            ("OBX".to_string(), vec!["3".to_string(), "5".to_string()]),
        ]))
    }

    fn parse(raw: &str) -> Message {
        assemble_message(&split_segments(raw))
    }

    const MESSAGE: &str = "MSH|^~\\&|SendApp|SendFac|RecvApp|RecvFac|202401011200||ADT^A01|MSG001|P|2.5\r\
                           PID|1||12345||Doe^John\r\
                           OBX|1|NM|GLU||98\r\
                           OBX|2|NM|HGB||13.2";

    #[test]
    fn test_rows_share_correlation_key() {
        let projector = Projector::new(test_schema());
        let tables = projector.project(&[parse(MESSAGE)]);

        let pid_rows = &tables["PID"];
        let obx_rows = &tables["OBX"];
        assert_eq!(pid_rows.len(), 1);
        assert_eq!(obx_rows.len(), 2);

        for row in pid_rows.iter().chain(obx_rows.iter()) {
            assert_eq!(row.message_control_id, "MSG001");
        }
    }

    #[test]
    fn test_cell_column_naming() {
        let projector = Projector::new(test_schema());
        let tables = projector.project(&[parse(MESSAGE)]);

        let pid_row = &tables["PID"][0];
        assert_eq!(pid_row.cell("PID-3"), Some("12345"));
        assert_eq!(pid_row.cell("PID-2"), None);
    }

    #[test]
    fn test_compound_cells_serialize_to_json() {
        let projector = Projector::new(test_schema());
        let tables = projector.project(&[parse(MESSAGE)]);

        let pid_row = &tables["PID"][0];
        assert_eq!(pid_row.cell("PID-5"), Some(r#"["Doe","John"]"#));

        let msh_row = &tables["MSH"][0];
        assert_eq!(msh_row.cell("MSH-9"), Some(r#"["ADT","A01"]"#));
    }

    #[test]
    fn test_schema_filtering_is_silent() {
        let projector = Projector::new(SegmentSchema::new(HashMap::from([(
            "PID".to_string(),
            vec![],
        )])));
        let tables = projector.project(&[parse(MESSAGE)]);

        assert!(tables.contains_key("PID"));
        assert!(!tables.contains_key("MSH"));
        assert!(!tables.contains_key("OBX"));
    }

    #[test]
    fn test_missing_correlation_key_tolerated() {
        // MSH line short enough that field 10 never materializes.
        let message = parse("MSH|^~\\&|SendApp\rPID|1||12345");
        let projector = Projector::new(test_schema());
        let tables = projector.project(&[message]);

        assert_eq!(tables["PID"][0].message_control_id, "");
    }

    #[test]
    fn test_rows_from_different_messages_keep_their_keys() {
        let other = MESSAGE.replace("MSG001", "MSG002");
        let projector = Projector::new(test_schema());
        let tables = projector.project(&[parse(MESSAGE), parse(&other)]);

        let keys: Vec<&str> = tables["PID"]
            .iter()
            .map(|row| row.message_control_id.as_str())
            .collect();
        assert_eq!(keys, vec!["MSG001", "MSG002"]);
    }

    #[test]
    fn test_serialize_cell_repetitions() {
        let value = crate::codec::decode_field("ICU^101~ER^102");
        assert_eq!(
            serialize_cell(&value),
            r#"[["ICU","101"],["ER","102"]]"#
        );
    }

    #[test]
    fn test_schema_round_trips_through_json() {
        let parsed: SegmentSchema =
            serde_json::from_str(r#"{"PID": ["3", "5"], "OBX": []}"#).unwrap();
        assert!(parsed.contains("PID"));
        assert_eq!(
            parsed.positions("PID"),
            Some(&["3".to_string(), "5".to_string()][..])
        );
        assert!(parsed.contains("OBX"));
        assert!(!parsed.contains("MSH"));

        let mut names: Vec<&str> = parsed.segment_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["OBX", "PID"]);
    }
}
