//! Field extraction over loosely-structured JSON records.
//!
//! Every accessor resolves a dotted/indexed path against a record and reports
//! a three-way outcome instead of failing: the value when it is present and
//! well-shaped, [`FieldOutcome::Absent`] when the key (or any ancestor) is
//! missing, and [`FieldOutcome::WrongShape`] when the field exists but is not
//! of the expected JSON shape. Nothing here can abort the record being read.
//!
//! JSON `null` counts as absent: the upstream API emits explicit nulls for
//! fields it simply does not have, and absence is never worth a diagnostic.

use serde_json::Value;

/// Outcome of reading one field from a record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldOutcome<T> {
    /// Field present and coerced to the expected shape.
    Value(T),
    /// Field or an ancestor key missing. Common, never logged.
    Absent,
    /// Field present but of the wrong shape; carries the message to log.
    WrongShape(String),
}

impl<T> FieldOutcome<T> {
    #[cfg(test)]
    pub(crate) fn is_absent(&self) -> bool {
        matches!(self, FieldOutcome::Absent)
    }
}

/// Resolves a dotted path, using numeric segments as array indices.
///
/// Returns `None` whenever the path cannot be followed, which the callers
/// treat as absence.
fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Human-readable name of a JSON value's shape, for diagnostics.
pub(crate) fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch<T>(expected: &str, path: &str, found: &Value) -> FieldOutcome<T> {
    FieldOutcome::WrongShape(format!(
        "expected {} at `{}`, found {}",
        expected,
        path,
        shape_name(found)
    ))
}

/// Reads a string field.
pub(crate) fn extract_str(record: &Value, path: &str) -> FieldOutcome<String> {
    match lookup(record, path) {
        None | Some(Value::Null) => FieldOutcome::Absent,
        Some(Value::String(s)) => FieldOutcome::Value(s.clone()),
        Some(other) => mismatch("string", path, other),
    }
}

/// Reads an unsigned integer field fitting 32 bits.
pub(crate) fn extract_u32(record: &Value, path: &str) -> FieldOutcome<u32> {
    match lookup(record, path) {
        None | Some(Value::Null) => FieldOutcome::Absent,
        Some(value @ Value::Number(n)) => match n.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(v) => FieldOutcome::Value(v),
            None => mismatch("unsigned 32-bit integer", path, value),
        },
        Some(other) => mismatch("unsigned 32-bit integer", path, other),
    }
}

/// Reads a numeric field as a float.
pub(crate) fn extract_f64(record: &Value, path: &str) -> FieldOutcome<f64> {
    match lookup(record, path) {
        None | Some(Value::Null) => FieldOutcome::Absent,
        Some(value @ Value::Number(n)) => match n.as_f64() {
            Some(v) => FieldOutcome::Value(v),
            None => mismatch("number", path, value),
        },
        Some(other) => mismatch("number", path, other),
    }
}

/// Reads a boolean field.
pub(crate) fn extract_bool(record: &Value, path: &str) -> FieldOutcome<bool> {
    match lookup(record, path) {
        None | Some(Value::Null) => FieldOutcome::Absent,
        Some(Value::Bool(b)) => FieldOutcome::Value(*b),
        Some(other) => mismatch("boolean", path, other),
    }
}

/// Reads an array field, borrowing its elements.
///
/// Element-level coercion is left to the caller, which applies its own
/// skip-and-log policy per element.
pub(crate) fn extract_array<'a>(record: &'a Value, path: &str) -> FieldOutcome<&'a [Value]> {
    match lookup(record, path) {
        None | Some(Value::Null) => FieldOutcome::Absent,
        Some(Value::Array(items)) => FieldOutcome::Value(items.as_slice()),
        Some(other) => mismatch("array", path, other),
    }
}
