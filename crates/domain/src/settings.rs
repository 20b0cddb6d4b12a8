//! Client Settings Domain Model
//!
//! Defines where requests are sent and which headers accompany them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Connection settings shared by every request of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Scheme and authority, e.g. `https://api.example.com`.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path prefix appended to the host, e.g. `/api/v1`.
    #[serde(default)]
    pub suffix: String,

    /// Headers sent with every request.
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    /// Transport timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User agent reported to the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_host() -> String {
    "http://localhost".to_string()
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("X-Requested-With".to_string(), "XMLHttpRequest".to_string())])
}

const fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            suffix: String::new(),
            headers: default_headers(),
            timeout_ms: default_timeout_ms(),
            user_agent: None,
        }
    }
}

impl ClientSettings {
    /// Creates settings for a host with default headers and timeout.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Sets the path suffix, adding a leading `/` when missing.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = normalize_suffix(&suffix.into());
        self
    }

    /// Host followed by the suffix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}{}",
            self.host.trim_end_matches('/'),
            normalize_suffix(&self.suffix)
        )
    }

    /// Resolves a request path against the base URL.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url())
        } else {
            format!("{}/{path}", self.base_url())
        }
    }

    /// Checks that the settings can produce absolute URLs.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidSettings`] for a host without an
    /// `http(s)` scheme or a zero timeout.
    pub fn validate(&self) -> DomainResult<()> {
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(DomainError::InvalidSettings(format!(
                "host `{}` must start with http:// or https://",
                self.host
            )));
        }
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidSettings(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_suffix(suffix: &str) -> String {
    if suffix.is_empty() || suffix.starts_with('/') {
        suffix.to_string()
    } else {
        format!("/{suffix}")
    }
}
