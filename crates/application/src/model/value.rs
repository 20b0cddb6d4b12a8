//! In-memory property values.

use serde_json::Value;

use super::Model;

/// Current value of one entity property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A plain JSON value
    Json(Value),
    /// A nested entity
    Entity(Box<Model>),
    /// A list holding at least one nested entity
    List(Vec<PropertyValue>),
}

impl Default for PropertyValue {
    fn default() -> Self {
        Self::Json(Value::Null)
    }
}

impl PropertyValue {
    /// Wire representation without any cast applied.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Entity(model) => model.to_json(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// The plain value, if this is one.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The nested entity, if this is one.
    #[must_use]
    pub fn as_entity(&self) -> Option<&Model> {
        match self {
            Self::Entity(model) => Some(model),
            _ => None,
        }
    }

    /// The list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns whether the value is a JSON `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Model> for PropertyValue {
    fn from(model: Model) -> Self {
        Self::Entity(Box::new(model))
    }
}

impl From<Vec<Model>> for PropertyValue {
    fn from(models: Vec<Model>) -> Self {
        Self::List(models.into_iter().map(Self::from).collect())
    }
}
