//! Property name conversions between in-memory (camel) and wire (snake) form.

use convert_case::{Case, Casing};

/// Converts a property name to its snake-cased wire form.
#[must_use]
pub fn snake(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Converts a wire name to its camel-cased in-memory form.
#[must_use]
pub fn camel(name: &str) -> String {
    name.to_case(Case::Camel)
}

/// Snake-cases the last segment of a dotted column reference.
///
/// Relation prefixes are kept as written: `author.firstName` becomes
/// `author.first_name`.
#[must_use]
pub fn snake_path(column: &str) -> String {
    match column.rsplit_once('.') {
        Some((relations, attribute)) => format!("{relations}.{}", snake(attribute)),
        None => snake(column),
    }
}
