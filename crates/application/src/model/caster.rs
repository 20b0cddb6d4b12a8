//! Conversion of single values between JSON and their declared cast.

use serde_json::Value;

use restmodel_domain::Cast;

use super::Model;
use super::value::PropertyValue;

/// Applies [`Cast`]s in both directions.
pub struct Caster;

impl Caster {
    /// Reads `value` through `cast`. `null` stays `null`; entity casts build
    /// a nested [`Model`].
    #[must_use]
    pub fn from_json(cast: Cast, value: &Value) -> PropertyValue {
        if value.is_null() {
            return PropertyValue::Json(Value::Null);
        }
        match cast.entity_schema() {
            Some(schema) => PropertyValue::from(Model::from_json(schema, value)),
            None => PropertyValue::Json(cast.coerce(value)),
        }
    }

    /// Writes `value` through `cast`. Entities serialize themselves.
    #[must_use]
    pub fn to_json(cast: Cast, value: &PropertyValue) -> Value {
        match value {
            PropertyValue::Json(Value::Null) => Value::Null,
            PropertyValue::Entity(model) => model.to_json(),
            PropertyValue::List(items) => {
                Value::Array(items.iter().map(|item| Self::to_json(cast, item)).collect())
            }
            PropertyValue::Json(value) if cast.entity_schema().is_some() => value.clone(),
            PropertyValue::Json(value) => cast.coerce(value),
        }
    }

    /// Like [`Caster::from_json`], mapping over arrays unless the cast
    /// takes the container whole.
    #[must_use]
    pub fn from_json_each(cast: Cast, value: &Value) -> PropertyValue {
        match value {
            Value::Array(items) if maps_elements(cast) => {
                collapse(items.iter().map(|item| Self::from_json(cast, item)).collect())
            }
            _ => Self::from_json(cast, value),
        }
    }

    /// Like [`Caster::to_json`], mapping over arrays unless the cast takes
    /// the container whole.
    #[must_use]
    pub fn to_json_each(cast: Cast, value: &PropertyValue) -> Value {
        match value {
            PropertyValue::Json(Value::Array(items)) if maps_elements(cast) => Value::Array(
                items
                    .iter()
                    .map(|item| Self::to_json(cast, &PropertyValue::Json(item.clone())))
                    .collect(),
            ),
            _ => Self::to_json(cast, value),
        }
    }
}

const fn maps_elements(cast: Cast) -> bool {
    !cast.is_container() && !matches!(cast, Cast::Function(_))
}

fn collapse(items: Vec<PropertyValue>) -> PropertyValue {
    if items.iter().all(|item| item.as_json().is_some()) {
        PropertyValue::Json(Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    PropertyValue::Json(value) => value,
                    other => other.to_json(),
                })
                .collect(),
        ))
    } else {
        PropertyValue::List(items)
    }
}
