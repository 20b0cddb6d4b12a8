//! Multipart body building.
//!
//! Turns the flattened multipart fields of an upload into a
//! `reqwest::multipart::Form` and loads files from disk into uploads.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use restmodel_domain::{FileUpload, FormField, FormValue};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// Failed to read file.
    #[error("Failed to read file {path}: {message}")]
    FileReadError {
        /// Path that was read
        path: String,
        /// Underlying error message
        message: String,
    },

    /// A part carried a content type reqwest rejects.
    #[error("Invalid MIME type: {message}")]
    InvalidMime {
        /// Underlying error message
        message: String,
    },
}

/// Builds a multipart form, keeping the order of `fields`.
///
/// File parts without a content type get one guessed from their file
/// name, falling back to `application/octet-stream`.
///
/// # Errors
///
/// Returns [`BodyBuildError::InvalidMime`] for an unparsable content type.
pub fn build_form(fields: Vec<FormField>) -> Result<Form, BodyBuildError> {
    let mut form = Form::new();

    for FormField { name, value } in fields {
        match value {
            FormValue::Text(text) => {
                form = form.text(name, text);
            }
            FormValue::File(upload) => {
                let mime_type = upload.content_type.clone().unwrap_or_else(|| {
                    mime_guess::from_path(&upload.file_name)
                        .first_or(mime::APPLICATION_OCTET_STREAM)
                        .to_string()
                });
                let part = Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| BodyBuildError::InvalidMime {
                        message: e.to_string(),
                    })?;
                form = form.part(name, part);
            }
        }
    }

    Ok(form)
}

/// Reads a file into an upload named after it, with a guessed content type.
///
/// # Errors
///
/// Returns [`BodyBuildError::FileReadError`] if the file cannot be read.
pub async fn load_upload(path: impl AsRef<Path>) -> Result<FileUpload, BodyBuildError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BodyBuildError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    Ok(FileUpload::new(file_name, bytes).with_content_type(content_type))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_text_and_file_parts() {
        let fields = vec![
            FormField::file("cover", FileUpload::new("cover.png", vec![1, 2, 3])),
            FormField::text("title", "Report"),
        ];
        let form = build_form(fields).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn rejects_invalid_content_type() {
        let upload = FileUpload::new("a.bin", vec![0]).with_content_type("not a mime");
        let result = build_form(vec![FormField::file("blob", upload)]);
        assert!(matches!(result, Err(BodyBuildError::InvalidMime { .. })));
    }

    #[tokio::test]
    async fn loads_upload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let upload = load_upload(&path).await.unwrap();
        assert_eq!(upload.file_name, "notes.txt");
        assert_eq!(upload.content_type.as_deref(), Some("text/plain"));
        assert_eq!(upload.bytes, b"hello".to_vec());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let result = load_upload("/definitely/not/here.txt").await;
        assert!(matches!(result, Err(BodyBuildError::FileReadError { .. })));
    }
}
