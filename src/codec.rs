//! Field decoding and encoding against the separator grammar.
//!
//! Decoding splits on the repetition separator first, then components,
//! then sub-components. Encoding reverses that precedence. Two rendering
//! modes are exposed under distinct names: [`encode_field`] is the
//! wire-faithful inverse of [`decode_field`], while
//! [`render_for_display`] produces reader-friendly report text and joins
//! repeated values with `", "` instead of the wire separator.
//!
//! No escaping of separator characters inside literal text is supported;
//! a literal separator inside data is indistinguishable from a
//! structural one.

use crate::constants::{
    COMPONENT_SEPARATOR, DISPLAY_REPETITION_SEPARATOR, REPETITION_SEPARATOR,
    SUBCOMPONENT_SEPARATOR,
};
use crate::models::{Component, FieldValue};

/// Decode one raw field string into its hierarchical value.
///
/// Total over any input: an absent separator yields a one-element list
/// which collapses, so the empty string decodes to `Scalar("")`.
pub fn decode_field(raw: &str) -> FieldValue {
    let repetitions: Vec<&str> = raw.split(REPETITION_SEPARATOR).collect();
    if repetitions.len() == 1 {
        decode_component_group(repetitions[0])
    } else {
        // Repetition elements keep their component list even when it has
        // a single element, so the serialized nesting depth records
        // whether the inner split was on `^` or `&`.
        FieldValue::Repetitions(
            repetitions
                .into_iter()
                .map(|chunk| FieldValue::Components(decode_components(chunk)))
                .collect(),
        )
    }
}

fn decode_components(chunk: &str) -> Vec<Component> {
    chunk
        .split(COMPONENT_SEPARATOR)
        .map(decode_component)
        .collect()
}

/// Decode one repetition-free chunk, applying the length-1 collapse.
fn decode_component_group(chunk: &str) -> FieldValue {
    let mut components = decode_components(chunk);

    if components.len() == 1 {
        match components.remove(0) {
            Component::Scalar(s) => FieldValue::Scalar(s),
            Component::Subcomponents(subs) => FieldValue::Subcomponents(subs),
        }
    } else {
        FieldValue::Components(components)
    }
}

fn decode_component(piece: &str) -> Component {
    if piece.contains(SUBCOMPONENT_SEPARATOR) {
        Component::Subcomponents(
            piece
                .split(SUBCOMPONENT_SEPARATOR)
                .map(str::to_string)
                .collect(),
        )
    } else {
        Component::Scalar(piece.to_string())
    }
}

/// Re-encode a decoded value into wire-format text.
///
/// For any field text `t` free of literal separator characters,
/// `encode_field(&decode_field(t)) == t`.
pub fn encode_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(s) => s.clone(),
        FieldValue::Subcomponents(subs) => subs.join(&SUBCOMPONENT_SEPARATOR.to_string()),
        FieldValue::Components(components) => components
            .iter()
            .map(encode_component)
            .collect::<Vec<_>>()
            .join(&COMPONENT_SEPARATOR.to_string()),
        FieldValue::Repetitions(repetitions) => repetitions
            .iter()
            .map(encode_field)
            .collect::<Vec<_>>()
            .join(&REPETITION_SEPARATOR.to_string()),
    }
}

fn encode_component(component: &Component) -> String {
    match component {
        Component::Scalar(s) => s.clone(),
        Component::Subcomponents(subs) => subs.join(&SUBCOMPONENT_SEPARATOR.to_string()),
    }
}

/// Flatten one hand-constructed or decoded value to wire-style text.
///
/// Accepts arbitrary JSON input so reporting can render sample data
/// without failing: strings that themselves contain a serialized JSON
/// array are re-parsed before flattening, nested arrays join with `^`
/// and `&`, and any other shape is stringified verbatim.
pub fn flatten_value(value: &serde_json::Value) -> String {
    use serde_json::Value;

    // Cell values arrive from storage as JSON-array text; recover the
    // structure before rendering.
    if let Value::String(s) = value {
        let trimmed = s.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
                return flatten_value(&parsed);
            }
        }
        return s.clone();
    }

    match value {
        Value::Array(items) => items
            .iter()
            .map(flatten_array_item)
            .collect::<Vec<_>>()
            .join(&COMPONENT_SEPARATOR.to_string()),
        Value::Null => String::new(),
        other => stringify(other),
    }
}

fn flatten_array_item(item: &serde_json::Value) -> String {
    use serde_json::Value;

    match item {
        Value::Array(subitems) => subitems
            .iter()
            .map(|subitem| match subitem {
                Value::Array(deep) => deep
                    .iter()
                    .map(stringify)
                    .collect::<Vec<_>>()
                    .join(&SUBCOMPONENT_SEPARATOR.to_string()),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(&SUBCOMPONENT_SEPARATOR.to_string()),
        other => stringify(other),
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render a value list for human-facing reports.
///
/// Each repetition is flattened, empty repetitions are dropped, and the
/// survivors join with `", "` for readability. This path is lossless but
/// deliberately not round-trippable; use [`encode_field`] for
/// re-transmission.
pub fn render_for_display(value: &serde_json::Value) -> String {
    let repetitions: Vec<&serde_json::Value> = match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Null => Vec::new(),
        single => vec![single],
    };

    repetitions
        .iter()
        .map(|v| flatten_value(v))
        .filter(|flattened| !flattened.is_empty())
        .collect::<Vec<_>>()
        .join(DISPLAY_REPETITION_SEPARATOR)
}

/// Render a decoded field for display, treating repetition lists as the
/// value list and anything else as a single value.
pub fn render_field_for_display(value: &FieldValue) -> String {
    match value {
        FieldValue::Repetitions(_) => render_for_display(&value.to_json()),
        single => flatten_value(&single.to_json()),
    }
}
