//! Composition of all body builders into one flat parameter object.

use serde_json::{Map, Value};

use super::action::Action;
use super::filters::{Filters, QueryComponent};
use super::modifiers::Modifiers;
use super::pagination::Pagination;

/// Every builder that contributes to a request's query or body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    /// Filter builders.
    pub filters: Filters,
    /// Modifier builders.
    pub modifiers: Modifiers,
    /// Page selection.
    pub pagination: Pagination,
    /// Bulk action.
    pub action: Action,
    custom: Vec<Map<String, Value>>,
}

impl QueryParameters {
    /// Creates an empty set of parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds caller-supplied parameters, merged after every builder.
    pub fn push_custom(&mut self, parameters: Map<String, Value>) {
        self.custom.push(parameters);
    }

    /// Flat-merges filters, modifiers, pagination, action and custom
    /// parameters, in that order. Later keys overwrite earlier ones.
    #[must_use]
    pub fn to_body(&self) -> Map<String, Value> {
        let mut body = self.filters.to_plain_object();
        body.extend(self.modifiers.to_plain_object());
        body.extend(self.pagination.to_plain_object());
        body.extend(self.action.to_plain_object());
        for parameters in &self.custom {
            body.extend(parameters.clone());
        }
        body
    }

    /// Returns whether nothing would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_body().is_empty()
    }
}
