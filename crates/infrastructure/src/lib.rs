//! Restmodel Infrastructure - Adapters and implementations
//!
//! This crate provides the reqwest transport behind the application
//! layer's `Transport` port, multipart body building, settings loading and
//! tracing setup.

pub mod adapters;
pub mod config;
pub mod http;
pub mod logging;

use std::sync::Arc;

use restmodel_application::Api;
use restmodel_application::ports::TransportError;
use restmodel_domain::{ClientSettings, DomainError};

pub use adapters::ReqwestTransport;
pub use config::{SettingsError, SettingsLoader};
pub use http::{BodyBuildError, build_form, load_upload};
pub use logging::{LoggingError, init_tracing};

/// Errors raised while creating a client.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Settings failed validation.
    #[error(transparent)]
    Settings(#[from] DomainError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Creates a client that sends its requests over reqwest.
///
/// # Errors
///
/// Returns an error for invalid settings or if the HTTP client cannot be
/// built.
pub fn connect(settings: ClientSettings) -> Result<Api, ConnectError> {
    settings.validate()?;
    let transport = ReqwestTransport::new(&settings)?;
    Ok(Api::new(Arc::new(transport), settings))
}

/// Loads the default settings file, applies the environment and connects.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or the client cannot
/// be built.
pub async fn connect_default() -> Result<Api, Box<dyn std::error::Error + Send + Sync>> {
    let loader = SettingsLoader::new();
    let settings = loader.apply_env(loader.load_default().await?)?;
    Ok(connect(settings)?)
}
