//! Filter builders for the request body.
//!
//! Each builder is a small accumulator. It contributes its keys to the
//! composed body only once it has been given something to send.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::case::snake_path;
use crate::json::is_truthy;

/// A piece of the request body that can be switched on by configuration.
pub trait QueryComponent {
    /// Returns whether the component has anything to contribute.
    fn is_filled(&self) -> bool;

    /// Flattens the component into body keys. Empty when not filled.
    fn to_plain_object(&self) -> Map<String, Value>;
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

/// Relations whose counts should be loaded (`count`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Count {
    relations: Vec<String>,
}

impl Count {
    /// Adds relation names.
    pub fn add<I, S>(&mut self, relations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(relations.into_iter().map(Into::into));
    }
}

impl QueryComponent for Count {
    fn is_filled(&self) -> bool {
        !self.relations.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        single("count", json!(self.relations))
    }
}

/// Maximum number of records (`limit`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    amount: Option<u64>,
}

impl Limit {
    /// Sets the amount. Zero disables the limit.
    pub const fn amount(&mut self, amount: u64) {
        self.amount = Some(amount);
    }
}

impl QueryComponent for Limit {
    fn is_filled(&self) -> bool {
        self.amount.is_some_and(|amount| amount > 0)
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        match self.amount {
            Some(amount) if amount > 0 => single("limit", json!(amount)),
            _ => Map::new(),
        }
    }
}

/// Sort direction of an order clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending (default)
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl Direction {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Ordering clauses (`orders`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    orders: Vec<(String, Direction)>,
}

impl Order {
    /// Adds a clause; the column is snake-cased.
    pub fn add(&mut self, column: &str, direction: Direction) {
        self.orders.push((snake_path(column), direction));
    }
}

impl QueryComponent for Order {
    fn is_filled(&self) -> bool {
        !self.orders.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        let orders = self
            .orders
            .iter()
            .map(|(column, direction)| json!({"column": column, "direction": direction.as_str()}))
            .collect();
        single("orders", Value::Array(orders))
    }
}

/// Relations to eager load (`with`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    relations: Vec<String>,
}

impl Relations {
    /// Adds relation names.
    pub fn add<I, S>(&mut self, relations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(relations.into_iter().map(Into::into));
    }
}

impl QueryComponent for Relations {
    fn is_filled(&self) -> bool {
        !self.relations.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        single("with", json!(self.relations))
    }
}

/// Named backend scopes with their parameters (`scopes`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scopes {
    scopes: Vec<(String, Vec<Value>)>,
}

impl Scopes {
    /// Adds a scope.
    pub fn add(&mut self, name: impl Into<String>, params: Vec<Value>) {
        self.scopes.push((name.into(), params));
    }
}

impl QueryComponent for Scopes {
    fn is_filled(&self) -> bool {
        !self.scopes.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        let scopes = self
            .scopes
            .iter()
            .map(|(name, params)| json!({"name": name, "params": params}))
            .collect();
        single("scopes", Value::Array(scopes))
    }
}

/// Full text search (`search_value`, `search_columns`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Search {
    value: Value,
    columns: Vec<String>,
}

impl Search {
    /// Sets the searched value.
    pub fn value(&mut self, value: Value) {
        self.value = value;
    }

    /// Replaces the searched columns; each is snake-cased.
    pub fn columns<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.columns = columns
            .into_iter()
            .map(|column| snake_path(column.as_ref()))
            .collect();
    }
}

impl QueryComponent for Search {
    fn is_filled(&self) -> bool {
        is_truthy(&self.value)
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        let mut map = single("search_value", self.value.clone());
        map.insert("search_columns".to_string(), json!(self.columns));
        map
    }
}

/// Column comparisons (`wheres`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wheres {
    wheres: Vec<(String, String, Value)>,
}

impl Wheres {
    /// Adds a comparison; the column is snake-cased.
    pub fn add(&mut self, column: &str, operator: impl Into<String>, value: Value) {
        self.wheres.push((snake_path(column), operator.into(), value));
    }
}

impl QueryComponent for Wheres {
    fn is_filled(&self) -> bool {
        !self.wheres.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        let wheres = self
            .wheres
            .iter()
            .map(|(column, operator, value)| {
                json!({"column": column, "operator": operator, "value": value})
            })
            .collect();
        single("wheres", Value::Array(wheres))
    }
}

/// Set membership clauses, either inclusive (`where_in`) or exclusive
/// (`where_not_in`).
#[derive(Debug, Clone, PartialEq)]
pub struct WhereIn {
    key: &'static str,
    clauses: Vec<(String, Vec<Value>)>,
}

impl WhereIn {
    /// Creates an inclusive (`where_in`) builder.
    #[must_use]
    pub const fn including() -> Self {
        Self {
            key: "where_in",
            clauses: Vec::new(),
        }
    }

    /// Creates an exclusive (`where_not_in`) builder.
    #[must_use]
    pub const fn excluding() -> Self {
        Self {
            key: "where_not_in",
            clauses: Vec::new(),
        }
    }

    /// Adds a clause; the column is snake-cased.
    pub fn add(&mut self, column: &str, values: Vec<Value>) {
        self.clauses.push((snake_path(column), values));
    }
}

impl QueryComponent for WhereIn {
    fn is_filled(&self) -> bool {
        !self.clauses.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        let clauses = self
            .clauses
            .iter()
            .map(|(column, values)| json!({"column": column, "values": values}))
            .collect();
        single(self.key, Value::Array(clauses))
    }
}

/// Columns to return instead of full records (`pluck`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pluck {
    fields: Vec<String>,
}

impl Pluck {
    /// Adds fields; each is snake-cased.
    pub fn add<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields
            .extend(fields.into_iter().map(|field| snake_path(field.as_ref())));
    }
}

impl QueryComponent for Pluck {
    fn is_filled(&self) -> bool {
        !self.fields.is_empty()
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        if !self.is_filled() {
            return Map::new();
        }
        single("pluck", json!(self.fields))
    }
}

/// All filter builders of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    /// `count`
    pub count: Count,
    /// `limit`
    pub limit: Limit,
    /// `orders`
    pub order: Order,
    /// `with`
    pub relations: Relations,
    /// `scopes`
    pub scopes: Scopes,
    /// `search_value` / `search_columns`
    pub search: Search,
    /// `wheres`
    pub wheres: Wheres,
    /// `where_in`
    pub where_in: WhereIn,
    /// `where_not_in`
    pub where_not_in: WhereIn,
    /// `pluck`
    pub pluck: Pluck,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            count: Count::default(),
            limit: Limit::default(),
            order: Order::default(),
            relations: Relations::default(),
            scopes: Scopes::default(),
            search: Search::default(),
            wheres: Wheres::default(),
            where_in: WhereIn::including(),
            where_not_in: WhereIn::excluding(),
            pluck: Pluck::default(),
        }
    }
}

impl Filters {
    fn components(&self) -> [&dyn QueryComponent; 10] {
        [
            &self.count,
            &self.limit,
            &self.order,
            &self.relations,
            &self.scopes,
            &self.search,
            &self.wheres,
            &self.where_in,
            &self.where_not_in,
            &self.pluck,
        ]
    }
}

impl QueryComponent for Filters {
    fn is_filled(&self) -> bool {
        self.components().iter().any(|component| component.is_filled())
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for component in self.components() {
            if component.is_filled() {
                merged.extend(component.to_plain_object());
            }
        }
        merged
    }
}
