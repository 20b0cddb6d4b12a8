//! Validation error bodies (status 422).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::{get_path, set_path};

/// The `{message, errors}` body a 422 response carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationPayload {
    /// Summary message
    #[serde(default)]
    pub message: String,
    /// Messages per (possibly dotted) field path
    #[serde(default)]
    pub errors: Map<String, Value>,
}

impl ValidationPayload {
    /// Reads a payload from a response body, tolerating missing keys.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_else(|_| Self {
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            errors: body
                .get("errors")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Builds the structure handed to validation callbacks.
    ///
    /// Every error key is written as a dotted path into a fresh object, so
    /// `items.0.name` ends up at `errors.items[0].name`.
    #[must_use]
    pub fn to_error(&self) -> ValidationError {
        let mut errors = Map::new();
        for (path, messages) in &self.errors {
            set_path(&mut errors, path, messages.clone());
        }
        ValidationError {
            message: self.message.clone(),
            errors: Value::Object(errors),
        }
    }
}

/// Validation failure as delivered to callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Summary message, verbatim from the wire
    pub message: String,
    /// Expanded error tree
    pub errors: Value,
}

impl ValidationError {
    /// Returns the messages stored for a dotted field path.
    #[must_use]
    pub fn messages(&self, path: &str) -> Vec<&str> {
        get_path(&self.errors, path)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns whether any message exists for a dotted field path.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        !self.messages(path).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_wire_payload() {
        let payload = ValidationPayload::from_body(&json!({
            "message": "The given data was invalid.",
            "errors": {"title": ["The title field is required."]}
        }));
        assert_eq!(payload.message, "The given data was invalid.");
        assert_eq!(payload.errors.get("title"), Some(&json!(["The title field is required."])));
    }

    #[test]
    fn tolerates_null_message() {
        let payload = ValidationPayload::from_body(&json!({"message": null, "errors": {"a": ["x"]}}));
        assert_eq!(payload.message, "");
        assert_eq!(payload.errors.len(), 1);
    }

    #[test]
    fn expands_dotted_paths_into_fresh_tree() {
        let payload = ValidationPayload::from_body(&json!({
            "message": "Invalid",
            "errors": {
                "items.0.name": ["Name required"],
                "author.email": ["Invalid email"]
            }
        }));

        let mut error = payload.to_error();
        assert_eq!(
            error.errors,
            json!({
                "author": {"email": ["Invalid email"]},
                "items": [{"name": ["Name required"]}]
            })
        );
        assert_eq!(error.messages("items.0.name"), vec!["Name required"]);
        assert!(error.has("author.email"));
        assert!(!error.has("title"));

        error.errors = json!({});
        assert_eq!(payload.errors.len(), 2);
    }

    #[test]
    fn out_of_range_indexes_do_not_grow_arrays() {
        let payload = ValidationPayload::from_body(&json!({
            "message": "Invalid",
            "errors": {
                "items.4000000000.name": ["bad"],
                "rows.18446744073709551615": ["bad"]
            }
        }));

        let error = payload.to_error();
        assert_eq!(error.messages("items.4000000000.name"), vec!["bad"]);
        assert_eq!(error.messages("rows.18446744073709551615"), vec!["bad"]);
    }
}
