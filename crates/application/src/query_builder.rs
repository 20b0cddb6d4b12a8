//! Fluent builder surface shared by requests and entities.

use serde_json::{Map, Value};

use restmodel_domain::{Direction, QueryParameters};

/// Configures the parameters sent with the next verb.
///
/// Implementors expose their [`QueryParameters`]; every other method has a
/// default that forwards to the matching builder.
pub trait QueryBuilder {
    /// The parameters being configured.
    fn query_mut(&mut self) -> &mut QueryParameters;

    /// Id used by [`QueryBuilder::action`] when none is given.
    fn identifier_value(&self) -> Value {
        Value::Null
    }

    /// Requests relation counts.
    fn count<I, S>(&mut self, relations: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_mut().filters.count.add(relations);
        self
    }

    /// Limits the number of results; zero clears the limit.
    fn limit(&mut self, amount: u64) -> &mut Self {
        self.query_mut().filters.limit.amount(amount);
        self
    }

    /// Orders by one column.
    fn order(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.query_mut().filters.order.add(column, direction);
        self
    }

    /// Orders by several columns, in sequence.
    fn orders<'a, I>(&mut self, orders: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'a str, Direction)>,
    {
        for (column, direction) in orders {
            self.query_mut().filters.order.add(column, direction);
        }
        self
    }

    /// Eager-loads relations.
    fn with<I, S>(&mut self, relations: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_mut().filters.relations.add(relations);
        self
    }

    /// Applies a named scope with parameters.
    fn scope(&mut self, name: &str, params: Vec<Value>) -> &mut Self {
        self.query_mut().filters.scopes.add(name, params);
        self
    }

    /// Applies several scopes.
    fn scopes<I, S>(&mut self, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        for (name, params) in scopes {
            self.query_mut().filters.scopes.add(name, params);
        }
        self
    }

    /// Searches `columns` for `value`; a falsy value sends nothing.
    fn search<I, S>(&mut self, value: Value, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let search = &mut self.query_mut().filters.search;
        search.value(value);
        search.columns(columns);
        self
    }

    /// Adds `column = value`.
    fn where_eq(&mut self, column: &str, value: Value) -> &mut Self {
        self.where_op(column, "=", value)
    }

    /// Adds `column operator value`.
    fn where_op(&mut self, column: &str, operator: &str, value: Value) -> &mut Self {
        self.query_mut().filters.wheres.add(column, operator, value);
        self
    }

    /// Adds several `(column, operator, value)` clauses.
    fn wheres<'a, I>(&mut self, clauses: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, Value)>,
    {
        for (column, operator, value) in clauses {
            self.where_op(column, operator, value);
        }
        self
    }

    /// Restricts `column` to `values`.
    fn where_in(&mut self, column: &str, values: Vec<Value>) -> &mut Self {
        self.query_mut().filters.where_in.add(column, values);
        self
    }

    /// Adds several `where_in` clauses.
    fn where_ins<'a, I>(&mut self, clauses: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'a str, Vec<Value>)>,
    {
        for (column, values) in clauses {
            self.where_in(column, values);
        }
        self
    }

    /// Excludes `values` from `column`.
    fn where_not_in(&mut self, column: &str, values: Vec<Value>) -> &mut Self {
        self.query_mut().filters.where_not_in.add(column, values);
        self
    }

    /// Adds several `where_not_in` clauses.
    fn where_not_ins<'a, I>(&mut self, clauses: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'a str, Vec<Value>)>,
    {
        for (column, values) in clauses {
            self.where_not_in(column, values);
        }
        self
    }

    /// Returns only the given fields.
    fn pluck<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.query_mut().filters.pluck.add(fields);
        self
    }

    /// Requests backend accessors.
    fn appends<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.query_mut().modifiers.appends.add(fields);
        self
    }

    /// Hides fields from the result.
    fn hidden_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_mut().modifiers.hidden_fields.add(fields);
        self
    }

    /// Runs a bulk action; `id` defaults to [`QueryBuilder::identifier_value`].
    fn action(&mut self, name: &str, id: Option<Value>) -> &mut Self {
        let id = id.unwrap_or_else(|| self.identifier_value());
        self.query_mut().action.set(name, id);
        self
    }

    /// Selects a page, or the page containing `page_for_id`.
    fn pagination(&mut self, page: Option<u64>, per_page: u64, page_for_id: Option<Value>) -> &mut Self {
        self.query_mut().pagination.set(page, per_page, page_for_id);
        self
    }

    /// Asks for pagination without a total count.
    fn simple_pagination(&mut self, simple: bool) -> &mut Self {
        self.query_mut().pagination.simple(simple);
        self
    }

    /// Adds parameters merged after every builder.
    fn custom_parameters(&mut self, parameters: Map<String, Value>) -> &mut Self {
        self.query_mut().push_custom(parameters);
        self
    }
}
