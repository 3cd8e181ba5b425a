//! Error types for the public-key strategy.
//!
//! [`AuthError`] covers construction failures and verifier failures. Malformed
//! requests and rejected credentials are not errors: they are reported as
//! [`crate::Outcome::Fail`].

/// Boxed error type returned by verifiers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while building or running a [`crate::PublicKeyStrategy`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The strategy was built without a verifier.
    #[error("PublicKeyStrategy requires a verify callback")]
    MissingVerifier,

    /// The verifier reported an error. The original error is kept as-is.
    #[error(transparent)]
    Verifier(BoxError),

    /// The verifier panicked instead of completing.
    #[error("{0}")]
    VerifierPanicked(String),
}

impl AuthError {
    /// Borrow the verifier's original error, if this is [`AuthError::Verifier`].
    #[must_use]
    pub fn verifier_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Verifier(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Errors raised while loading [`crate::StrategyOverrides`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A boolean variable held something other than a recognised boolean.
    #[error("invalid boolean for {key}: {value:?} (expected 1/true/yes or 0/false/no)")]
    InvalidBool {
        /// Environment variable name.
        key: String,
        /// Raw value found.
        value: String,
    },
}
