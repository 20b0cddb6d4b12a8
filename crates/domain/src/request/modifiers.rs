//! Modifier builders: computed attributes to append and fields to hide.

use serde_json::{Map, Value, json};

use super::filters::QueryComponent;
use crate::case::snake_path;

/// Accessors the backend should append to each record (`appends`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Appends {
    fields: Vec<String>,
}

impl Appends {
    /// Adds accessor names; each is snake-cased.
    pub fn add<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields
            .extend(fields.into_iter().map(|field| snake_path(field.as_ref())));
    }
}

impl QueryComponent for Appends {
    fn is_filled(&self) -> bool {
        !self.fields.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if self.is_filled() {
            map.insert("appends".to_string(), json!(self.fields));
        }
        map
    }
}

/// Fields the backend should leave out (`hidden_fields`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenFields {
    fields: Vec<String>,
}

impl HiddenFields {
    /// Adds field names as given.
    pub fn add<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
    }
}

impl QueryComponent for HiddenFields {
    fn is_filled(&self) -> bool {
        !self.fields.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if self.is_filled() {
            map.insert("hidden_fields".to_string(), json!(self.fields));
        }
        map
    }
}

/// All modifier builders of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// `appends`
    pub appends: Appends,
    /// `hidden_fields`
    pub hidden_fields: HiddenFields,
}

impl QueryComponent for Modifiers {
    fn is_filled(&self) -> bool {
        self.appends.is_filled() || self.hidden_fields.is_filled()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        let mut merged = self.appends.to_plain_object();
        merged.extend(self.hidden_fields.to_plain_object());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn modifiers_merge_both_builders() {
        let mut modifiers = Modifiers::default();
        assert!(!modifiers.is_filled());

        modifiers.appends.add(["fullName"]);
        modifiers.hidden_fields.add(["password"]);

        assert_eq!(
            Value::Object(modifiers.to_plain_object()),
            json!({"appends": ["full_name"], "hidden_fields": ["password"]})
        );
    }
}
