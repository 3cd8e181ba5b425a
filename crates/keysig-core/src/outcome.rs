//! Terminal result of one `authenticate` call.

use http::StatusCode;

use crate::error::AuthError;

/// What a strategy reports back to its host. Exactly one per request.
#[derive(Debug)]
pub enum Outcome<P, I> {
    /// The request is authenticated as `principal`.
    Success {
        /// The authenticated principal.
        principal: P,
        /// Extra data supplied by the verifier.
        info: Option<I>,
    },
    /// The request is not authenticated.
    Fail(Failure<I>),
    /// Authentication could not be completed.
    Error(AuthError),
}

/// Why a request was not authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<I> {
    /// Credentials are missing from the request. Always status 400.
    BadRequest {
        /// Human-readable reason (`"Missing signature"`, ...).
        message: String,
    },
    /// The verifier refused the credentials. The host picks the status.
    Rejected {
        /// Extra data supplied by the verifier.
        info: Option<I>,
    },
}

impl<I> Failure<I> {
    /// Build a malformed-request failure.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// The status this failure forces, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            Self::Rejected { .. } => None,
        }
    }

    /// The malformed-request message, if this is [`Failure::BadRequest`].
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::BadRequest { message } => Some(message),
            Self::Rejected { .. } => None,
        }
    }
}

impl<P, I> Outcome<P, I> {
    /// Whether the request was authenticated.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether the request was refused.
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Whether authentication errored.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Convert into `Ok(principal)`, or `Err(self)` for anything but success.
    pub fn into_principal(self) -> Result<P, Self> {
        match self {
            Self::Success { principal, .. } => Ok(principal),
            other => Err(other),
        }
    }
}
