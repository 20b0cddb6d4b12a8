//! Declared cast targets and the primitive coercions behind them.

use std::fmt;

use serde_json::Value;

use super::Schema;
use crate::json::{is_truthy, number_value, to_display_string, to_integer};

/// A one-way value transformation supplied by the schema author.
pub type CastFn = fn(&Value) -> Value;

/// The type a property is cast to when read from or written to JSON.
#[derive(Clone, Copy)]
pub enum Cast {
    /// Coerce to a string
    String,
    /// Coerce to a number; unparseable input becomes `null`
    Number,
    /// Coerce to a truncated integer
    Integer,
    /// Coerce to a boolean by truthiness
    Boolean,
    /// Copy an array as-is
    Array,
    /// Copy an object as-is
    Object,
    /// Cast recursively into another entity
    Entity(fn() -> &'static Schema),
    /// Apply a custom transformation
    Function(CastFn),
}

impl Cast {
    /// Returns whether the cast copies containers instead of mapping their
    /// elements.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }

    /// Returns the nested schema of an entity cast.
    #[must_use]
    pub fn entity_schema(self) -> Option<&'static Schema> {
        match self {
            Self::Entity(schema) => Some(schema()),
            _ => None,
        }
    }

    /// Applies a non-entity cast to a single value. `null` passes through;
    /// entity casts leave the value untouched.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        match self {
            Self::String => Value::String(to_display_string(value)),
            Self::Number => to_number(value),
            Self::Integer => Value::from(to_integer(value)),
            Self::Boolean => Value::Bool(is_truthy(value)),
            Self::Array | Self::Object | Self::Entity(_) => value.clone(),
            Self::Function(cast) => cast(value),
        }
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Number => f.write_str("Number"),
            Self::Integer => f.write_str("Integer"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Array => f.write_str("Array"),
            Self::Object => f.write_str("Object"),
            Self::Entity(schema) => write!(f, "Entity({})", schema().name()),
            Self::Function(_) => f.write_str("Function"),
        }
    }
}

fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::Bool(flag) => Value::from(i64::from(*flag)),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Value::from(0);
            }
            trimmed.parse::<f64>().map_or(Value::Null, number_value)
        }
        Value::Null | Value::Array(_) | Value::Object(_) => Value::Null,
    }
}
