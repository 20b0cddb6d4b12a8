//! Helpers over `serde_json::Value` that follow the loose conventions of the
//! REST backends this client talks to: truthiness, dotted paths, and the
//! number/string coercions used by property casts.

use serde_json::{Map, Number, Value};

/// Largest integer a JSON number can carry without losing precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Returns whether a value counts as "set".
///
/// `null`, `false`, `0`, `NaN` and the empty string are falsy; every array
/// and object (empty or not) is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Builds a JSON number, preferring the integer representation when the
/// float is integral. Non-finite input becomes `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return Value::from(value as i64);
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Truncating integer conversion. Unparseable input yields `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_integer(value: &Value) -> i64 {
    let truncate = |f: f64| if f.is_finite() { f.trunc() as i64 } else { 0 };
    match value {
        Value::Number(number) => number
            .as_i64()
            .unwrap_or_else(|| number.as_f64().map_or(0, truncate)),
        Value::String(text) => text.trim().parse::<f64>().map_or(0, truncate),
        Value::Bool(flag) => i64::from(*flag),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

/// Renders a value the way it appears in a form field or query string.
#[must_use]
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number
            .as_f64()
            .filter(|_| !number.is_i64() && !number.is_u64())
            .map_or_else(|| number.to_string(), |f| number_value(f).to_string()),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Reads a dotted path (`meta.title`, `items.0.name`) out of a value.
///
/// A key that literally contains the dots wins over the nested lookup.
#[must_use]
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.as_object().and_then(|map| map.get(path)) {
        return Some(direct);
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at a dotted path, creating intermediate containers.
///
/// A numeric segment creates an array slot, any other segment an object key.
/// An index more than [`MAX_INDEX_GAP`] past the end of the array is stored
/// as an object key instead; the array's existing items keep their
/// positions as keys.
pub fn set_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut root = Value::Object(std::mem::take(target));
    set_in(&mut root, &segments, value);
    if let Value::Object(map) = root {
        *target = map;
    }
}

/// Largest number of slots a single numeric segment may append to an array.
pub const MAX_INDEX_GAP: usize = 1024;

fn array_index(segment: &str, slot: &Value) -> Option<usize> {
    let position = segment.parse::<usize>().ok()?;
    let len = match slot {
        Value::Array(items) => items.len(),
        _ => 0,
    };
    (position <= len.saturating_add(MAX_INDEX_GAP)).then_some(position)
}

fn set_in(slot: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    let index = array_index(head, slot);
    if index.is_none()
        && let Value::Array(items) = slot
    {
        let entries: Map<String, Value> = std::mem::take(items)
            .into_iter()
            .enumerate()
            .map(|(position, item)| (position.to_string(), item))
            .collect();
        *slot = Value::Object(entries);
    }

    match (index, &*slot) {
        (Some(_), Value::Array(_)) | (_, Value::Object(_)) => {}
        (Some(_), _) => *slot = Value::Array(Vec::new()),
        (None, _) => *slot = Value::Object(Map::new()),
    }

    match slot {
        Value::Array(items) => {
            if let Some(position) = index {
                if items.len() <= position {
                    items.resize(position + 1, Value::Null);
                }
                if let Some(child) = items.get_mut(position) {
                    set_in(child, rest, value);
                }
            }
        }
        Value::Object(map) => {
            let child = map.entry((*head).to_string()).or_insert(Value::Null);
            set_in(child, rest, value);
        }
        _ => {}
    }
}
