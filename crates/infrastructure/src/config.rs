//! Client settings loading.
//!
//! Settings come from a YAML or JSON file, by default
//! `restmodel/settings.yaml` in the platform config directory:
//! - Linux: ~/.config/restmodel/settings.yaml
//! - macOS: ~/Library/Application Support/restmodel/settings.yaml
//! - Windows: %APPDATA%/restmodel/settings.yaml
//!
//! Environment variables are applied on top of the file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use restmodel_domain::{ClientSettings, DomainError};

/// Overrides the host.
pub const ENV_HOST: &str = "RESTMODEL_HOST";
/// Overrides the path suffix.
pub const ENV_SUFFIX: &str = "RESTMODEL_SUFFIX";
/// Overrides the timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "RESTMODEL_TIMEOUT_MS";
/// Sets a bearer token in the `Authorization` header.
pub const ENV_BEARER: &str = "RESTMODEL_BEARER";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable held an unusable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name
        name: String,
        /// Rejected value
        value: String,
    },

    /// The loaded settings failed validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Loads and saves [`ClientSettings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader;

impl SettingsLoader {
    /// Creates a new settings loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("restmodel"))
    }

    /// Returns the path of the default settings file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.yaml"))
    }

    /// Loads settings from `path`; `.json` files are read as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub async fn load_file(&self, path: &Path) -> Result<ClientSettings, SettingsError> {
        let content = fs::read(path).await?;
        let settings: ClientSettings = if is_json(path) {
            serde_json::from_slice(&content)?
        } else {
            serde_yaml::from_slice(&content)?
        };
        settings.validate()?;
        debug!(path = %path.display(), host = %settings.host, "settings loaded");
        Ok(settings)
    }

    /// Loads the default settings file, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub async fn load_default(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = Self::default_path() else {
            return Ok(ClientSettings::default());
        };

        if !path.exists() {
            return Ok(ClientSettings::default());
        }

        self.load_file(&path).await
    }

    /// Saves settings to `path` in the format its extension names.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub async fn save_file(
        &self,
        path: &Path,
        settings: &ClientSettings,
    ) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = if is_json(path) {
            serde_json::to_vec_pretty(settings)?
        } else {
            serde_yaml::to_string(settings)?.into_bytes()
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Saves settings to the default settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory is unknown or the write fails.
    pub async fn save_default(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_file(&path, settings).await
    }

    /// Applies the process environment on top of `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable timeout or invalid resulting
    /// settings.
    pub fn apply_env(&self, settings: ClientSettings) -> Result<ClientSettings, SettingsError> {
        self.apply_vars(settings, |name| std::env::var(name).ok())
    }

    /// Applies variables from `lookup` on top of `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable timeout or invalid resulting
    /// settings.
    pub fn apply_vars<F>(
        &self,
        mut settings: ClientSettings,
        lookup: F,
    ) -> Result<ClientSettings, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            settings.host = host;
        }
        if let Some(suffix) = lookup(ENV_SUFFIX) {
            settings = settings.with_suffix(suffix);
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            settings.timeout_ms = value
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidEnv {
                    name: ENV_TIMEOUT_MS.to_string(),
                    value,
                })?;
        }
        if let Some(token) = lookup(ENV_BEARER) {
            settings
                .headers
                .insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
