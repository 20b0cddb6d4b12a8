//! Pagination builder.

use serde_json::{Map, Value, json};

use super::filters::QueryComponent;
use crate::json::is_truthy;

/// Page selection (`page`, `paginate`, `page_for_id`).
///
/// Contributes keys only when a page size is set together with either a
/// page number or an identifier whose page should be located.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    page: Option<u64>,
    per_page: Option<u64>,
    page_for_id: Option<Value>,
    simple: bool,
}

impl Pagination {
    /// Replaces the whole page selection.
    pub fn set(&mut self, page: Option<u64>, per_page: u64, page_for_id: Option<Value>) {
        self.page = page;
        self.per_page = Some(per_page);
        self.page_for_id = page_for_id.filter(is_truthy);
    }

    /// Asks the backend for pagination without a total count.
    pub const fn simple(&mut self, simple: bool) {
        self.simple = simple;
    }
}

impl QueryComponent for Pagination {
    fn is_filled(&self) -> bool {
        let has_size = self.per_page.is_some_and(|size| size > 0);
        let has_target = self.page.is_some_and(|page| page > 0) || self.page_for_id.is_some();
        has_size && has_target
    }

    fn to_plain_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if !self.is_filled() {
            return map;
        }
        if let Some(page) = self.page {
            map.insert("page".to_string(), json!(page));
        }
        if let Some(per_page) = self.per_page {
            map.insert("paginate".to_string(), json!(per_page));
        }
        if let Some(id) = &self.page_for_id {
            map.insert("page_for_id".to_string(), id.clone());
        }
        if self.simple {
            map.insert("simplePagination".to_string(), Value::Bool(true));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_and_size() {
        let mut pagination = Pagination::default();
        pagination.set(Some(2), 25, None);
        assert_eq!(
            Value::Object(pagination.to_plain_object()),
            json!({"page": 2, "paginate": 25})
        );
    }

    #[test]
    fn page_for_id_without_page() {
        let mut pagination = Pagination::default();
        pagination.set(None, 25, Some(json!(7)));
        assert_eq!(
            Value::Object(pagination.to_plain_object()),
            json!({"paginate": 25, "page_for_id": 7})
        );
    }

    #[test]
    fn size_alone_is_not_filled() {
        let mut pagination = Pagination::default();
        pagination.set(None, 25, None);
        assert!(!pagination.is_filled());
        assert_eq!(pagination.to_plain_object(), Map::new());
    }

    #[test]
    fn simple_pagination_flag() {
        let mut pagination = Pagination::default();
        pagination.set(Some(1), 10, None);
        pagination.simple(true);
        assert_eq!(
            Value::Object(pagination.to_plain_object()),
            json!({"page": 1, "paginate": 10, "simplePagination": true})
        );
    }
}
