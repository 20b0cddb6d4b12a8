//! Entity schema declarations.
//!
//! A [`Schema`] is built once per entity type and describes every property
//! in four groups: accessors appended by the backend, plain attributes,
//! relation counts, and relations. Each property carries its wire key,
//! default value and cast.

mod cast;

pub use cast::{Cast, CastFn};

use std::collections::BTreeSet;

use serde_json::Value;

use crate::case::{camel, snake};
use crate::error::{DomainError, DomainResult};

/// The four property groups of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    /// Computed values appended by the backend
    Accessor,
    /// Plain attributes; the only group sent by `store`/`update`
    Attribute,
    /// Relation counts, always integers
    Count,
    /// Nested entities or lists of them
    Relation,
}

impl PropertyKind {
    /// Every group, in casting order.
    pub const ALL: [Self; 4] = [Self::Accessor, Self::Attribute, Self::Count, Self::Relation];
}

/// Declaration of one entity property.
#[derive(Debug, Clone)]
pub struct PropertyDeclaration {
    name: String,
    json_key: Option<String>,
    default: Option<Value>,
    cast: Option<Cast>,
    from_json: Option<CastFn>,
    to_json: Option<CastFn>,
}

impl PropertyDeclaration {
    /// Declares a property by its in-memory (camel case) name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json_key: None,
            default: None,
            cast: None,
            from_json: None,
            to_json: None,
        }
    }

    /// Overrides the wire key; may be a dotted path.
    #[must_use]
    pub fn json_key(mut self, key: impl Into<String>) -> Self {
        self.json_key = Some(key.into());
        self
    }

    /// Sets the value used when the wire value is absent or null.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the cast applied in both directions.
    #[must_use]
    pub const fn cast(mut self, cast: Cast) -> Self {
        self.cast = Some(cast);
        self
    }

    /// Sets a transformation applied when reading JSON, unless a cast is set.
    #[must_use]
    pub fn from_json(mut self, cast: CastFn) -> Self {
        self.from_json = Some(cast);
        self
    }

    /// Sets a transformation applied when writing JSON, unless a cast is set.
    #[must_use]
    pub fn to_json(mut self, cast: CastFn) -> Self {
        self.to_json = Some(cast);
        self
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The explicit wire key, if any.
    #[must_use]
    pub fn explicit_json_key(&self) -> Option<&str> {
        self.json_key.as_deref()
    }

    /// The default value, `null` when none was declared.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    /// Cast used when reading JSON.
    #[must_use]
    pub fn read_cast(&self) -> Option<Cast> {
        self.cast.or_else(|| self.from_json.map(Cast::Function))
    }

    /// Cast used when writing JSON.
    #[must_use]
    pub fn write_cast(&self) -> Option<Cast> {
        self.cast.or_else(|| self.to_json.map(Cast::Function))
    }

    /// The explicitly declared cast, ignoring one-way transformations.
    #[must_use]
    pub const fn declared_cast(&self) -> Option<Cast> {
        self.cast
    }

    /// Wire key of a property in `kind`.
    ///
    /// Counts are always suffixed `_count`; other groups use the explicit
    /// key or the snake-cased name.
    #[must_use]
    pub fn wire_key(&self, kind: PropertyKind) -> String {
        match kind {
            PropertyKind::Count => count_key(&self.name),
            _ => self.json_key.clone().unwrap_or_else(|| snake(&self.name)),
        }
    }

    /// In-memory name of a property in `kind`; counts become `xCount`.
    #[must_use]
    pub fn memory_key(&self, kind: PropertyKind) -> String {
        match kind {
            PropertyKind::Count => camel(&count_key(&self.name)),
            _ => self.name.clone(),
        }
    }
}

/// Snake-cased wire name of a count, suffixed `_count` once.
#[must_use]
pub fn count_key(name: &str) -> String {
    let key = snake(name);
    if key.ends_with("_count") {
        key
    } else {
        format!("{key}_count")
    }
}

/// Immutable description of an entity type.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    endpoint: Option<String>,
    identifier: String,
    accessors: Vec<PropertyDeclaration>,
    attributes: Vec<PropertyDeclaration>,
    counts: Vec<PropertyDeclaration>,
    relations: Vec<PropertyDeclaration>,
}

impl Schema {
    /// Starts describing an entity type.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name: name.into(),
                endpoint: None,
                identifier: "id".to_string(),
                accessors: Vec::new(),
                attributes: Vec::new(),
                counts: Vec::new(),
                relations: Vec::new(),
            },
        }
    }

    /// Entity type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// REST endpoint of the entity.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingEndpoint`] when none was declared.
    pub fn endpoint(&self) -> DomainResult<&str> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| DomainError::MissingEndpoint {
                entity: self.name.clone(),
            })
    }

    /// In-memory name of the identity property.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Declarations of one group, in declaration order.
    #[must_use]
    pub fn properties(&self, kind: PropertyKind) -> &[PropertyDeclaration] {
        match kind {
            PropertyKind::Accessor => &self.accessors,
            PropertyKind::Attribute => &self.attributes,
            PropertyKind::Count => &self.counts,
            PropertyKind::Relation => &self.relations,
        }
    }

    /// Finds a property by in-memory name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(PropertyKind, &PropertyDeclaration)> {
        PropertyKind::ALL.into_iter().find_map(|kind| {
            self.properties(kind)
                .iter()
                .find(|declaration| declaration.memory_key(kind) == name)
                .map(|declaration| (kind, declaration))
        })
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Sets the REST endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.schema.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the identity property (defaults to `id`).
    #[must_use]
    pub fn identifier(mut self, name: impl Into<String>) -> Self {
        self.schema.identifier = name.into();
        self
    }

    /// Declares an accessor.
    #[must_use]
    pub fn accessor(mut self, declaration: PropertyDeclaration) -> Self {
        self.schema.accessors.push(declaration);
        self
    }

    /// Declares an attribute.
    #[must_use]
    pub fn attribute(mut self, declaration: PropertyDeclaration) -> Self {
        self.schema.attributes.push(declaration);
        self
    }

    /// Declares a relation count.
    #[must_use]
    pub fn count(mut self, declaration: PropertyDeclaration) -> Self {
        self.schema.counts.push(declaration);
        self
    }

    /// Declares a relation.
    #[must_use]
    pub fn relation(mut self, declaration: PropertyDeclaration) -> Self {
        self.schema.relations.push(declaration);
        self
    }

    /// Finishes the schema.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DuplicateProperty`] when two declarations
    /// share an in-memory name, across all groups.
    pub fn build(self) -> DomainResult<Schema> {
        let mut seen = BTreeSet::new();
        for kind in PropertyKind::ALL {
            for declaration in self.schema.properties(kind) {
                let name = declaration.memory_key(kind);
                if !seen.insert(name.clone()) {
                    return Err(DomainError::DuplicateProperty {
                        entity: self.schema.name.clone(),
                        name,
                    });
                }
            }
        }
        Ok(self.schema)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn post_schema() -> Schema {
        Schema::builder("Post")
            .endpoint("/posts")
            .attribute(PropertyDeclaration::new("id").cast(Cast::Integer))
            .attribute(PropertyDeclaration::new("publishedAt"))
            .attribute(PropertyDeclaration::new("title").json_key("meta.title"))
            .accessor(PropertyDeclaration::new("excerpt").default(json!("")))
            .count(PropertyDeclaration::new("comments"))
            .build()
            .unwrap()
    }

    #[test]
    fn wire_and_memory_keys() {
        let schema = post_schema();
        let attributes = schema.properties(PropertyKind::Attribute);
        assert_eq!(attributes[1].wire_key(PropertyKind::Attribute), "published_at");
        assert_eq!(attributes[2].wire_key(PropertyKind::Attribute), "meta.title");

        let count = &schema.properties(PropertyKind::Count)[0];
        assert_eq!(count.wire_key(PropertyKind::Count), "comments_count");
        assert_eq!(count.memory_key(PropertyKind::Count), "commentsCount");
    }

    #[test]
    fn count_key_is_suffixed_once() {
        assert_eq!(count_key("likes"), "likes_count");
        assert_eq!(count_key("likesCount"), "likes_count");
    }

    #[test]
    fn find_by_memory_name() {
        let schema = post_schema();
        assert_eq!(schema.find("commentsCount").map(|(kind, _)| kind), Some(PropertyKind::Count));
        assert_eq!(schema.find("excerpt").map(|(kind, _)| kind), Some(PropertyKind::Accessor));
        assert!(schema.find("comments").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = Schema::builder("Post")
            .attribute(PropertyDeclaration::new("author"))
            .relation(PropertyDeclaration::new("author"))
            .build();

        assert_eq!(
            result.err(),
            Some(DomainError::DuplicateProperty {
                entity: "Post".to_string(),
                name: "author".to_string(),
            })
        );
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let schema = Schema::builder("Draft").build().unwrap();
        assert_eq!(
            schema.endpoint(),
            Err(DomainError::MissingEndpoint {
                entity: "Draft".to_string()
            })
        );
    }

    #[test]
    fn from_json_applies_without_cast() {
        fn trim(value: &Value) -> Value {
            Value::String(value.as_str().unwrap_or_default().trim().to_string())
        }
        let declaration = PropertyDeclaration::new("name").from_json(trim);
        assert!(declaration.read_cast().is_some());
        assert!(declaration.write_cast().is_none());

        let cast = PropertyDeclaration::new("name").cast(Cast::String).from_json(trim);
        assert!(matches!(cast.read_cast(), Some(Cast::String)));
    }
}
