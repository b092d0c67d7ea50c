//! Core data structures for HL7v2 processing.
//!
//! Defines the decoded field value hierarchy, segment and message
//! structures, projected row types, and processing statistics used
//! throughout the library.

use std::path::PathBuf;

/// One component of a field: either plain text or a sub-component list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Scalar(String),
    /// Produced when the raw component contains at least one `&`.
    /// Empty entries are preserved so positions survive re-encoding.
    Subcomponents(Vec<String>),
}

/// The decoded form of one field.
///
/// Decoding is total: any input string maps to exactly one of these
/// shapes. For a repetition-free field, a component list of length one
/// collapses to its single component, so "field with no components" and
/// "field with exactly one component" are structurally
/// indistinguishable. The collapse never applies inside a repetition
/// list: each repetition element stays a `Components` value even with a
/// single element, so the serialized nesting depth still distinguishes
/// `A&B~C` from `A^B~C`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text; the empty string is a valid, distinct scalar.
    Scalar(String),
    /// A single component that itself splits on `&`.
    Subcomponents(Vec<String>),
    /// Two or more components, or any component list inside a repetition.
    Components(Vec<Component>),
    /// Two or more repetitions, each an uncollapsed `Components` list
    /// (repetitions do not nest).
    Repetitions(Vec<FieldValue>),
}

impl FieldValue {
    /// Convert to the nested-array JSON form used for storage-safe cell
    /// serialization: scalars map to JSON strings, lists to JSON arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Scalar(s) => serde_json::Value::String(s.clone()),
            FieldValue::Subcomponents(subs) => subs
                .iter()
                .map(|s| serde_json::Value::String(s.clone()))
                .collect(),
            FieldValue::Components(comps) => comps.iter().map(Component::to_json).collect(),
            FieldValue::Repetitions(reps) => reps.iter().map(FieldValue::to_json).collect(),
        }
    }

    /// True when the value carries no component or repetition structure.
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldValue::Scalar(_))
    }
}

impl Component {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Component::Scalar(s) => serde_json::Value::String(s.clone()),
            Component::Subcomponents(subs) => subs
                .iter()
                .map(|s| serde_json::Value::String(s.clone()))
                .collect(),
        }
    }
}

/// One named record within a message: a segment name plus a mapping from
/// 1-based field position (string key, since MSH injects a synthetic
/// position) to decoded value.
///
/// Fields that are empty in the raw text are omitted, not stored as
/// empty scalars. Positions are kept in encounter order, which for
/// decoded segments is ascending numeric order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field by its position key ("1", "10", ...).
    pub fn field(&self, position: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(pos, _)| pos == position)
            .map(|(_, value)| value)
    }
}

/// Occurrences of one segment name within a message.
///
/// The single/multiple distinction is a load-bearing invariant of
/// downstream consumers: exactly one occurrence collapses to `One`,
/// two or more stay an ordered `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentGroup {
    One(Segment),
    Many(Vec<Segment>),
}

impl SegmentGroup {
    /// View the group as a slice regardless of cardinality, so callers
    /// do not have to branch on the shape.
    pub fn normalize(&self) -> &[Segment] {
        match self {
            SegmentGroup::One(segment) => std::slice::from_ref(segment),
            SegmentGroup::Many(segments) => segments,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SegmentGroup::One(_) => 1,
            SegmentGroup::Many(segments) => segments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One structured message: segment groups keyed by segment name, in
/// first-encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub segments: Vec<(String, SegmentGroup)>,
}

impl Message {
    pub fn get(&self, segment_name: &str) -> Option<&SegmentGroup> {
        self.segments
            .iter()
            .find(|(name, _)| name == segment_name)
            .map(|(_, group)| group)
    }

    /// Number of segment occurrences across all groups.
    pub fn segment_count(&self) -> usize {
        self.segments.iter().map(|(_, group)| group.len()).sum()
    }
}

/// One projected row: the correlation key plus one storage-safe cell per
/// field position, keyed as `"<segment>-<position>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    pub message_control_id: String,
    pub cells: Vec<(String, String)>,
}

impl ProjectedRow {
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Processing statistics for batch runs
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub messages_parsed: usize,
    pub segments_projected: usize,
    pub tables_written: usize,
    pub rows_written: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
