//! HTTP infrastructure utilities.
//!
//! This module provides multipart body building and file loading for
//! uploads.

mod body_builder;

pub use body_builder::{BodyBuildError, build_form, load_upload};
