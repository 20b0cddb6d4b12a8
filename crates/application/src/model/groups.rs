//! The four property groups. Each reads and writes its own declarations;
//! defaults, lookup, wire naming and storage are shared.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use restmodel_domain::case::camel;
use restmodel_domain::json::{get_path, is_truthy, set_path, to_integer};
use restmodel_domain::{PropertyDeclaration, PropertyKind, Schema};

use super::caster::Caster;
use super::value::PropertyValue;

/// In-memory values keyed by property name.
pub type Values = BTreeMap<String, PropertyValue>;

pub trait PropertyGroup {
    const KIND: PropertyKind;

    /// Converts the raw wire value (absent when `None`) into memory.
    fn read_value(declaration: &PropertyDeclaration, raw: Option<&Value>) -> PropertyValue;

    /// Converts the in-memory value into its wire form.
    fn write_value(declaration: &PropertyDeclaration, value: &PropertyValue) -> Value;

    fn lookup<'a>(declaration: &PropertyDeclaration, json: &'a Value) -> Option<&'a Value> {
        get_path(json, &declaration.wire_key(Self::KIND))
            .or_else(|| get_path(json, &camel(declaration.name())))
    }

    fn initialize_defaults(schema: &Schema, values: &mut Values) {
        for declaration in schema.properties(Self::KIND) {
            values.insert(
                declaration.memory_key(Self::KIND),
                PropertyValue::Json(declaration.default_value()),
            );
        }
    }

    fn apply_from_json(schema: &Schema, json: &Value, values: &mut Values) {
        for declaration in schema.properties(Self::KIND) {
            let raw = Self::lookup(declaration, json);
            values.insert(
                declaration.memory_key(Self::KIND),
                Self::read_value(declaration, raw),
            );
        }
    }

    fn to_json(schema: &Schema, values: &Values) -> Map<String, Value> {
        let mut json = Map::new();
        for declaration in schema.properties(Self::KIND) {
            let value = values
                .get(&declaration.memory_key(Self::KIND))
                .map_or(Value::Null, |value| Self::write_value(declaration, value));
            set_path(&mut json, &declaration.wire_key(Self::KIND), value);
        }
        json
    }

    fn get<'a>(schema: &Schema, values: &'a Values, name: &str) -> Option<&'a PropertyValue> {
        Self::declares(schema, name).then(|| values.get(name)).flatten()
    }

    /// Stores `value` when `name` belongs to this group.
    fn set(schema: &Schema, values: &mut Values, name: &str, value: PropertyValue) -> bool {
        let declared = Self::declares(schema, name);
        if declared {
            values.insert(name.to_string(), value);
        }
        declared
    }

    fn declares(schema: &Schema, name: &str) -> bool {
        schema
            .properties(Self::KIND)
            .iter()
            .any(|declaration| declaration.memory_key(Self::KIND) == name)
    }
}

fn read_plain(declaration: &PropertyDeclaration, raw: Option<&Value>) -> PropertyValue {
    match raw {
        None | Some(Value::Null) => PropertyValue::Json(declaration.default_value()),
        Some(value) => declaration.read_cast().map_or_else(
            || PropertyValue::Json(value.clone()),
            |cast| Caster::from_json_each(cast, value),
        ),
    }
}

fn write_plain(declaration: &PropertyDeclaration, value: &PropertyValue) -> Value {
    declaration
        .write_cast()
        .map_or_else(|| value.to_json(), |cast| Caster::to_json_each(cast, value))
}

pub struct Accessors;

impl PropertyGroup for Accessors {
    const KIND: PropertyKind = PropertyKind::Accessor;

    fn read_value(declaration: &PropertyDeclaration, raw: Option<&Value>) -> PropertyValue {
        read_plain(declaration, raw)
    }

    fn write_value(declaration: &PropertyDeclaration, value: &PropertyValue) -> Value {
        write_plain(declaration, value)
    }
}

pub struct Attributes;

impl PropertyGroup for Attributes {
    const KIND: PropertyKind = PropertyKind::Attribute;

    fn read_value(declaration: &PropertyDeclaration, raw: Option<&Value>) -> PropertyValue {
        read_plain(declaration, raw)
    }

    fn write_value(declaration: &PropertyDeclaration, value: &PropertyValue) -> Value {
        write_plain(declaration, value)
    }
}

/// Counts are integers under a `_count` wire key and never go through a
/// cast.
pub struct Counts;

impl PropertyGroup for Counts {
    const KIND: PropertyKind = PropertyKind::Count;

    fn lookup<'a>(declaration: &PropertyDeclaration, json: &'a Value) -> Option<&'a Value> {
        get_path(json, &declaration.wire_key(Self::KIND))
    }

    fn read_value(declaration: &PropertyDeclaration, raw: Option<&Value>) -> PropertyValue {
        match raw {
            None | Some(Value::Null) => PropertyValue::Json(declaration.default_value()),
            Some(value) => PropertyValue::Json(Value::from(to_integer(value))),
        }
    }

    fn write_value(_declaration: &PropertyDeclaration, value: &PropertyValue) -> Value {
        value.to_json()
    }
}

/// Relations keep falsy wire values as they are, so an absent relation
/// stays distinguishable from an empty one.
pub struct Relations;

impl PropertyGroup for Relations {
    const KIND: PropertyKind = PropertyKind::Relation;

    fn read_value(declaration: &PropertyDeclaration, raw: Option<&Value>) -> PropertyValue {
        match raw {
            Some(value) if is_truthy(value) => declaration.declared_cast().map_or_else(
                || PropertyValue::Json(value.clone()),
                |cast| Caster::from_json_each(cast, value),
            ),
            other => PropertyValue::Json(other.cloned().unwrap_or(Value::Null)),
        }
    }

    fn write_value(declaration: &PropertyDeclaration, value: &PropertyValue) -> Value {
        declaration
            .declared_cast()
            .map_or_else(|| value.to_json(), |cast| Caster::to_json_each(cast, value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use restmodel_domain::Cast;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::builder("Post")
            .attribute(PropertyDeclaration::new("publishedAt").default(json!("never")))
            .attribute(PropertyDeclaration::new("title").json_key("meta.title"))
            .count(PropertyDeclaration::new("comments"))
            .relation(PropertyDeclaration::new("tags").cast(Cast::String))
            .build()
            .unwrap()
    }

    #[test]
    fn attributes_fall_back_to_camel_case_and_defaults() {
        let schema = schema();
        let mut values = Values::new();
        Attributes::apply_from_json(&schema, &json!({"meta": {"title": "Hi"}}), &mut values);
        assert_eq!(values["title"], PropertyValue::Json(json!("Hi")));
        assert_eq!(values["publishedAt"], PropertyValue::Json(json!("never")));

        Attributes::apply_from_json(&schema, &json!({"publishedAt": "today"}), &mut values);
        assert_eq!(values["publishedAt"], PropertyValue::Json(json!("today")));

        assert_eq!(
            Value::Object(Attributes::to_json(&schema, &values)),
            json!({"published_at": "today", "meta": {"title": null}})
        );
    }

    #[test]
    fn counts_use_suffixed_names() {
        let schema = schema();
        let mut values = Values::new();
        Counts::initialize_defaults(&schema, &mut values);
        assert_eq!(values["commentsCount"], PropertyValue::Json(Value::Null));

        Counts::apply_from_json(&schema, &json!({"comments_count": "4"}), &mut values);
        assert_eq!(values["commentsCount"], PropertyValue::Json(json!(4)));
        assert_eq!(
            Value::Object(Counts::to_json(&schema, &values)),
            json!({"comments_count": 4})
        );
    }

    #[test]
    fn relations_keep_falsy_values_raw() {
        let schema = schema();
        let mut values = Values::new();
        Relations::apply_from_json(&schema, &json!({"tags": false}), &mut values);
        assert_eq!(values["tags"], PropertyValue::Json(json!(false)));

        Relations::apply_from_json(&schema, &json!({}), &mut values);
        assert_eq!(values["tags"], PropertyValue::Json(Value::Null));

        Relations::apply_from_json(&schema, &json!({"tags": [1, 2]}), &mut values);
        assert_eq!(values["tags"], PropertyValue::Json(json!(["1", "2"])));
    }

    #[test]
    fn set_only_accepts_declared_names() {
        let schema = schema();
        let mut values = Values::new();
        assert!(Attributes::set(&schema, &mut values, "title", json!("x").into()));
        assert!(!Attributes::set(&schema, &mut values, "tags", json!([]).into()));
        assert_eq!(
            Attributes::get(&schema, &values, "title"),
            Some(&PropertyValue::Json(json!("x")))
        );
        assert_eq!(Relations::get(&schema, &values, "title"), None);
    }
}
