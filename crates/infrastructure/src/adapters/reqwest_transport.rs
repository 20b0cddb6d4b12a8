//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port. Every response that
//! carries a status is returned as `Ok`, error statuses included, so the
//! request lifecycle can classify it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

use restmodel_application::ports::{Transport, TransportError, TransportRequest, TransportResponse};
use restmodel_domain::request::append_query;
use restmodel_domain::{ClientSettings, HttpMethod, RequestPayload};

use crate::http::build_form;

const MAX_REDIRECTS: usize = 10;
const DEFAULT_USER_AGENT: &str = concat!("restmodel/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport using the timeout and user agent of `settings`.
    ///
    /// Redirects are followed up to 10 times.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: settings.timeout_ms,
        })
    }

    /// Wraps a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves the final URL; query payloads are appended to it.
    fn target_url(url: &str, payload: &RequestPayload) -> Result<Url, TransportError> {
        let full = match payload {
            RequestPayload::Query(parameters) => append_query(url, parameters)
                .map_err(|e| TransportError::InvalidBody(e.to_string()))?,
            _ => url.to_string(),
        };
        Url::parse(&full).map_err(|e| TransportError::InvalidUrl(format!("{e}: {full}")))
    }

    /// Attaches the body of a JSON or multipart payload.
    fn apply_payload(
        builder: reqwest::RequestBuilder,
        payload: RequestPayload,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        match payload {
            RequestPayload::Empty | RequestPayload::Query(_) => Ok(builder),
            RequestPayload::Json(body) => Ok(builder.json(&body)),
            RequestPayload::Multipart(fields) => {
                let form = build_form(fields).map_err(|e| TransportError::InvalidBody(e.to_string()))?;
                Ok(builder.multipart(form))
            }
        }
    }

    /// Parses a response body: JSON when possible, text otherwise, `null`
    /// when empty.
    fn parse_body(bytes: &[u8]) -> Value {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error.url().and_then(Url::port_or_known_default).unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects {
                max: u32::try_from(MAX_REDIRECTS).unwrap_or(u32::MAX),
            };
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            payload,
            headers,
        } = request;

        let parsed_url = Self::target_url(&url, &payload)?;
        debug!(method = %method, url = %parsed_url, "dispatching http request");

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(method), parsed_url);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        builder = Self::apply_payload(builder, payload)?;

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?;

        debug!(status, bytes = bytes.len(), "http response received");
        Ok(TransportResponse::new(status, Self::parse_body(&bytes)))
    }
}
