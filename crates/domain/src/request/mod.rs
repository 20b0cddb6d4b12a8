//! Request description: method, body builders and payload encoding.

mod action;
mod body;
mod filters;
mod method;
mod modifiers;
mod pagination;
mod query;

pub use action::Action;
pub use body::{
    FileUpload, FormField, FormValue, RequestPayload, UploadFiles, append_query, encode_query,
    flatten_fields, multipart_fields,
};
pub use filters::{
    Count, Direction, Filters, Limit, Order, Pluck, QueryComponent, Relations, Scopes, Search,
    WhereIn, Wheres,
};
pub use method::HttpMethod;
pub use modifiers::{Appends, HiddenFields, Modifiers};
pub use pagination::Pagination;
pub use query::QueryParameters;
