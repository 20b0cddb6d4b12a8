//! Response record and its classification.

mod outcome;
mod status;
mod validation;

pub use outcome::ResponseOutcome;
pub use status::StatusCode;
pub use validation::{ValidationError, ValidationPayload};

use serde_json::Value;

/// The recorded result of one transport attempt.
///
/// `data` holds the body of 2xx and 4xx responses other than 422; 422
/// bodies are parsed into `validation` instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    status: Option<StatusCode>,
    data: Option<Value>,
    validation: Option<ValidationPayload>,
    finished: bool,
    cancelled: bool,
}

impl Response {
    /// Records an attempt that reached the server.
    #[must_use]
    pub fn completed(status: impl Into<StatusCode>, body: Value) -> Self {
        let status = status.into();
        let mut response = Self {
            status: Some(status),
            finished: true,
            ..Self::default()
        };

        if status.as_u16() == 422 {
            response.validation = Some(ValidationPayload::from_body(&body));
        } else if (status.is_success() || status.is_client_error()) && !body.is_null() {
            response.data = Some(body);
        }
        response
    }

    /// Records an attempt that failed before any status was received.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }

    /// Records an attempt aborted through its cancellation token.
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    /// Status code, absent for failed or cancelled attempts.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Numeric status code.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status.map(StatusCode::as_u16)
    }

    /// Parsed body of a success or non-validation client error.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Parsed body of a 422 response.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationPayload> {
        self.validation.as_ref()
    }

    /// True once the transport reported any outcome.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// True only when the attempt was aborted by its own token.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True for statuses from 400 upwards and for attempts that ended
    /// without a status.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        match self.status {
            Some(status) => status.is_failure(),
            None => self.finished || self.cancelled,
        }
    }

    /// The primary classification of this response.
    #[must_use]
    pub const fn outcome(&self) -> ResponseOutcome {
        ResponseOutcome::classify(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn success_keeps_data() {
        let response = Response::completed(200, json!({"id": 1}));
        assert_eq!(response.status_code(), Some(200));
        assert_eq!(response.data(), Some(&json!({"id": 1})));
        assert!(response.is_finished());
        assert!(!response.is_cancelled());
        assert!(!response.is_failed());
        assert_eq!(response.outcome(), ResponseOutcome::Success);
    }

    #[test]
    fn unprocessable_entity_fills_validation_only() {
        let response = Response::completed(422, json!({"message": "Invalid", "errors": {}}));
        assert_eq!(response.data(), None);
        assert_eq!(response.validation().map(|v| v.message.as_str()), Some("Invalid"));
        assert!(response.is_failed());
        assert_eq!(response.outcome(), ResponseOutcome::ValidationError);
    }

    #[test]
    fn client_error_keeps_data_server_error_does_not() {
        let not_found = Response::completed(404, json!({"message": "Missing"}));
        assert_eq!(not_found.data(), Some(&json!({"message": "Missing"})));

        let server = Response::completed(500, json!({"message": "Boom"}));
        assert_eq!(server.data(), None);
        assert_eq!(server.outcome(), ResponseOutcome::Error);
    }

    #[test]
    fn failed_and_cancelled_have_no_status() {
        let failed = Response::failed();
        assert!(failed.is_finished());
        assert!(failed.is_failed());
        assert_eq!(failed.outcome(), ResponseOutcome::Error);

        let cancelled = Response::cancelled();
        assert!(!cancelled.is_finished());
        assert!(cancelled.is_cancelled());
        assert!(cancelled.is_failed());
        assert_eq!(cancelled.status_code(), None);
    }
}
