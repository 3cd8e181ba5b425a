//! The host-facing strategy contract and the public-key strategy.
//!
//! [`PublicKeyStrategy::authenticate`] runs the following steps:
//!
//! 1. Resolve effective options (defaults, construction overrides, call overrides).
//! 2. Look up the configured location, the `find_by` field and `signature`;
//!    the first missing one fails the request with status 400.
//! 3. Hand the values to the [`Verifier`] and map its verdict to an [`Outcome`].
//!
//! A verifier that panics is reported as [`Outcome::Error`]; nothing unwinds
//! into the host.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::options::{StrategyOptions, StrategyOverrides};
use crate::outcome::{Failure, Outcome};
use crate::source::CredentialSource;
use crate::verifier::{Credentials, Verdict, Verifier};

/// Name under which [`PublicKeyStrategy`] registers with a host.
pub const STRATEGY_NAME: &str = "publicKey";

/// Field carrying the signature inside the configured location.
pub const SIGNATURE_FIELD: &str = "signature";

/// An authentication strategy a host can dispatch requests of type `R` to.
#[async_trait]
pub trait Strategy<R: ?Sized + Sync>: Send + Sync {
    /// The authenticated identity type.
    type Principal: Send;
    /// Extra data attached to successes and rejections.
    type Info: Send;

    /// Identifier used by the host's strategy registry.
    fn name(&self) -> &str;

    /// Authenticate `request`, applying `overrides` on top of the strategy's options.
    async fn authenticate(
        &self,
        request: &R,
        overrides: &StrategyOverrides,
    ) -> Outcome<Self::Principal, Self::Info>;
}

/// Authenticates requests carrying a principal identifier and a signature.
///
/// # Examples
///
/// ```
/// use keysig_core::{
///     Credentials, Outcome, PublicKeyStrategy, Strategy, StrategyOverrides, Verdict, verify_fn,
/// };
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let strategy = PublicKeyStrategy::new(verify_fn(|creds: Credentials<'_, serde_json::Value>| {
///     if creds.signature == "correct_token" {
///         Ok(Verdict::<String, ()>::accept(creds.find_by_value))
///     } else {
///         Ok(Verdict::reject())
///     }
/// }));
///
/// let req = json!({ "body": { "id": "1234", "signature": "correct_token" } });
/// let outcome = strategy.authenticate(&req, &StrategyOverrides::default()).await;
/// assert!(matches!(outcome, Outcome::Success { ref principal, .. } if principal == "1234"));
/// # });
/// ```
#[derive(Debug)]
pub struct PublicKeyStrategy<V> {
    options: StrategyOptions,
    verifier: Arc<V>,
}

impl<V> Clone for PublicKeyStrategy<V> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

impl<V> PublicKeyStrategy<V> {
    /// Create a strategy with default options.
    #[must_use]
    pub fn new(verifier: V) -> Self {
        Self::with_options(&StrategyOverrides::default(), verifier)
    }

    /// Create a strategy with `overrides` applied to the default options.
    #[must_use]
    pub fn with_options(overrides: &StrategyOverrides, verifier: V) -> Self {
        Self {
            options: StrategyOptions::default().merged(overrides),
            verifier: Arc::new(verifier),
        }
    }

    /// Start building a strategy whose verifier may be supplied later.
    #[must_use]
    pub fn builder() -> PublicKeyStrategyBuilder<V> {
        PublicKeyStrategyBuilder::default()
    }

    /// Options fixed at construction time.
    #[must_use]
    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    /// The configured verifier.
    #[must_use]
    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}

/// Builder for [`PublicKeyStrategy`], for hosts that assemble the verifier
/// and options separately.
#[derive(Debug)]
pub struct PublicKeyStrategyBuilder<V> {
    overrides: StrategyOverrides,
    verifier: Option<V>,
}

impl<V> Default for PublicKeyStrategyBuilder<V> {
    fn default() -> Self {
        Self {
            overrides: StrategyOverrides::default(),
            verifier: None,
        }
    }
}

impl<V> PublicKeyStrategyBuilder<V> {
    /// Set the construction-time overrides.
    #[must_use]
    pub fn options(mut self, overrides: StrategyOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set the verifier.
    #[must_use]
    pub fn verifier(mut self, verifier: V) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Finish the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingVerifier`] if no verifier was supplied.
    pub fn build(self) -> Result<PublicKeyStrategy<V>, AuthError> {
        let verifier = self.verifier.ok_or(AuthError::MissingVerifier)?;
        Ok(PublicKeyStrategy::with_options(&self.overrides, verifier))
    }
}

#[async_trait]
impl<R, V> Strategy<R> for PublicKeyStrategy<V>
where
    R: CredentialSource + ?Sized + Sync,
    V: Verifier<R>,
{
    type Principal = V::Principal;
    type Info = V::Info;

    fn name(&self) -> &str {
        STRATEGY_NAME
    }

    async fn authenticate(
        &self,
        request: &R,
        overrides: &StrategyOverrides,
    ) -> Outcome<V::Principal, V::Info> {
        let options = self.options.merged(overrides);

        let (find_by_value, signature) = match extract_credentials(request, &options) {
            Ok(values) => values,
            Err(failure) => return Outcome::Fail(failure),
        };

        debug!(
            find_by = %options.find_by,
            location = %options.location,
            find_by_value = %find_by_value,
            "Dispatching credentials to verifier"
        );

        let credentials = Credentials {
            request: options.pass_req_to_callback.then_some(request),
            find_by_value,
            signature,
        };

        let verification = AssertUnwindSafe(async { self.verifier.verify(credentials).await })
            .catch_unwind()
            .await;

        match verification {
            Ok(Ok(Verdict::Accept { principal, info })) => {
                debug!(find_by = %options.find_by, "Verifier accepted credentials");
                Outcome::Success { principal, info }
            }
            Ok(Ok(Verdict::Reject { info })) => {
                debug!(find_by = %options.find_by, "Verifier rejected credentials");
                Outcome::Fail(Failure::Rejected { info })
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Verifier reported an error");
                Outcome::Error(AuthError::Verifier(err))
            }
            Err(payload) => {
                let message = panic_message(payload);
                warn!(error = %message, "Verifier panicked");
                Outcome::Error(AuthError::VerifierPanicked(message))
            }
        }
    }
}

/// Pull the `find_by` value and the signature out of the configured location.
fn extract_credentials<R, I>(
    request: &R,
    options: &StrategyOptions,
) -> Result<(String, String), Failure<I>>
where
    R: CredentialSource + ?Sized,
{
    let Some(location) = request.location(&options.location) else {
        debug!(location = %options.location, "Request location is absent");
        return Err(Failure::bad_request(
            options.bad_request_message_or("Missing credentials"),
        ));
    };

    let Some(find_by_value) = location.field(&options.find_by) else {
        debug!(location = %options.location, field = %options.find_by, "Principal field is absent");
        return Err(Failure::bad_request(
            options.bad_request_message_or(format!("Missing {}", options.find_by)),
        ));
    };

    let Some(signature) = location.field(SIGNATURE_FIELD) else {
        debug!(location = %options.location, "Signature field is absent");
        return Err(Failure::bad_request(
            options.bad_request_message_or("Missing signature"),
        ));
    };

    Ok((find_by_value.into_owned(), signature.into_owned()))
}

/// Recover the text of a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_owned(),
            Err(_) => "verifier panicked".to_owned(),
        },
    }
}
