//! Request payloads and form encoding

use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::json::to_display_string;

/// An in-memory file ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name reported to the server
    pub file_name: String,
    /// MIME type, guessed by the transport when absent
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Creates an upload without an explicit content type.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadEntry {
    Single(FileUpload),
    Many(Vec<FileUpload>),
}

/// Named files for a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFiles {
    entries: Vec<(String, UploadEntry)>,
}

impl UploadFiles {
    /// Creates an empty set of files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file under `name`.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, upload: FileUpload) -> Self {
        self.entries.push((name.into(), UploadEntry::Single(upload)));
        self
    }

    /// Adds a list of files; each part is named `name[i]`.
    #[must_use]
    pub fn files(mut self, name: impl Into<String>, uploads: Vec<FileUpload>) -> Self {
        self.entries.push((name.into(), UploadEntry::Many(uploads)));
        self
    }

    /// Returns whether no file was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Value of a single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File part
    File(FileUpload),
}

/// A named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Field name, with bracketed path segments for nested data
    pub name: String,
    /// Field value
    pub value: FormValue,
}

impl FormField {
    /// Creates a text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// Creates a file field.
    #[must_use]
    pub fn file(name: impl Into<String>, upload: FileUpload) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File(upload),
        }
    }
}

/// What a transport call carries besides URL and headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestPayload {
    /// Nothing
    #[default]
    Empty,
    /// Parameters encoded into the query string
    Query(Map<String, Value>),
    /// JSON object body
    Json(Map<String, Value>),
    /// Multipart form body
    Multipart(Vec<FormField>),
}

impl RequestPayload {
    /// Returns the content type the payload is sent with.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty | Self::Query(_) => None,
            Self::Json(_) => Some("application/json"),
            Self::Multipart(_) => Some("multipart/form-data"),
        }
    }
}

/// Deep-flattens an object into `(name, value)` pairs.
///
/// Nested keys become bracketed segments (`meta[tags][0]`), booleans become
/// `"1"`/`"0"`, empty arrays and objects become an empty value.
#[must_use]
pub fn flatten_fields(data: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in data {
        append_field(&mut pairs, key.clone(), value);
    }
    pairs
}

fn append_field(pairs: &mut Vec<(String, String)>, name: String, value: &Value) {
    match value {
        Value::Bool(flag) => pairs.push((name, if *flag { "1" } else { "0" }.to_string())),
        Value::Array(items) if items.is_empty() => pairs.push((name, String::new())),
        Value::Object(map) if map.is_empty() => pairs.push((name, String::new())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_field(pairs, format!("{name}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                append_field(pairs, format!("{name}[{key}]"), item);
            }
        }
        scalar => pairs.push((name, to_display_string(scalar))),
    }
}

/// Builds the multipart fields for a file upload: files first, then the
/// flattened data.
#[must_use]
pub fn multipart_fields(files: &UploadFiles, data: &Map<String, Value>) -> Vec<FormField> {
    let mut fields = Vec::new();
    for (name, entry) in &files.entries {
        match entry {
            UploadEntry::Single(upload) => fields.push(FormField::file(name.clone(), upload.clone())),
            UploadEntry::Many(uploads) => {
                fields.extend(
                    uploads
                        .iter()
                        .enumerate()
                        .map(|(index, upload)| FormField::file(format!("{name}[{index}]"), upload.clone())),
                );
            }
        }
    }
    fields.extend(
        flatten_fields(data)
            .into_iter()
            .map(|(name, value)| FormField::text(name, value)),
    );
    fields
}

/// Encodes parameters as an `application/x-www-form-urlencoded` query string.
///
/// # Errors
///
/// Returns [`DomainError::Encoding`] if the pairs cannot be serialized.
pub fn encode_query(parameters: &Map<String, Value>) -> DomainResult<String> {
    serde_urlencoded::to_string(flatten_fields(parameters))
        .map_err(|e| DomainError::Encoding(e.to_string()))
}

/// Appends encoded parameters to a URL, keeping an existing query string.
///
/// # Errors
///
/// Returns [`DomainError::Encoding`] if the parameters cannot be serialized.
pub fn append_query(url: &str, parameters: &Map<String, Value>) -> DomainResult<String> {
    if parameters.is_empty() {
        return Ok(url.to_string());
    }
    let encoded = encode_query(parameters)?;
    let separator = if url.contains('?') { '&' } else { '?' };
    Ok(format!("{url}{separator}{encoded}"))
}
