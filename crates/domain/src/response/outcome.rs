//! Classification of a completed attempt into one primary outcome.

use super::status::StatusCode;

/// The primary channel a response is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseOutcome {
    /// 2xx
    Success,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 422
    ValidationError,
    /// Every other status, and attempts that produced no status at all
    Error,
}

impl ResponseOutcome {
    /// Classifies a status; `None` means the transport gave no status.
    #[must_use]
    pub const fn classify(status: Option<StatusCode>) -> Self {
        match status {
            Some(status) if status.is_success() => Self::Success,
            Some(StatusCode(401)) => Self::Unauthorized,
            Some(StatusCode(403)) => Self::Forbidden,
            Some(StatusCode(422)) => Self::ValidationError,
            _ => Self::Error,
        }
    }

    /// Returns a short name used in log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::ValidationError => "validation_error",
            Self::Error => "error",
        }
    }
}
