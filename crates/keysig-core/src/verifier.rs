//! The application-supplied verification hook.
//!
//! The strategy never checks signatures itself. It extracts the principal
//! identifier and signature from the request and hands them to a [`Verifier`],
//! which decides whether they are valid (typically by looking up the
//! principal's public key and checking a signed `nonce:timestamp` challenge).
//!
//! A verifier completes exactly once by returning from [`Verifier::verify`]:
//!
//! - `Ok(Verdict::Accept { .. })` authenticates the principal.
//! - `Ok(Verdict::Reject { .. })` refuses the credentials.
//! - `Err(e)` signals that verification itself failed (storage down, ...).

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::BoxError;

/// Values extracted from a request for verification.
#[derive(Debug)]
pub struct Credentials<'a, R: ?Sized> {
    /// The raw request, present only when `pass_req_to_callback` is enabled.
    pub request: Option<&'a R>,
    /// Value of the configured `find_by` field.
    pub find_by_value: String,
    /// Value of the `signature` field.
    pub signature: String,
}

/// A verifier's decision on a set of credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<P, I> {
    /// The credentials identify `principal`.
    Accept {
        /// The authenticated principal.
        principal: P,
        /// Extra data for the host (scopes, ...).
        info: Option<I>,
    },
    /// The credentials are not valid.
    Reject {
        /// Extra data explaining the refusal.
        info: Option<I>,
    },
}

impl<P, I> Verdict<P, I> {
    /// Accept `principal` without extra info.
    #[must_use]
    pub fn accept(principal: P) -> Self {
        Self::Accept {
            principal,
            info: None,
        }
    }

    /// Accept `principal` with extra info.
    #[must_use]
    pub fn accept_with(principal: P, info: I) -> Self {
        Self::Accept {
            principal,
            info: Some(info),
        }
    }

    /// Reject without extra info.
    #[must_use]
    pub fn reject() -> Self {
        Self::Reject { info: None }
    }

    /// Reject with extra info.
    #[must_use]
    pub fn reject_with(info: I) -> Self {
        Self::Reject { info: Some(info) }
    }
}

/// Result of a single verification.
pub type VerifyResult<P, I> = Result<Verdict<P, I>, BoxError>;

/// Checks extracted credentials for requests of type `R`.
#[async_trait]
pub trait Verifier<R: ?Sized + Sync>: Send + Sync {
    /// The authenticated identity type.
    type Principal: Send;
    /// Extra data attached to a verdict.
    type Info: Send;

    /// Verify `credentials`.
    async fn verify(
        &self,
        credentials: Credentials<'_, R>,
    ) -> VerifyResult<Self::Principal, Self::Info>;
}

/// A [`Verifier`] backed by a synchronous closure. Build one with [`verify_fn`].
pub struct FnVerifier<F, P, I> {
    f: F,
    _marker: PhantomData<fn() -> (P, I)>,
}

impl<F, P, I> std::fmt::Debug for FnVerifier<F, P, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnVerifier").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`Verifier`].
///
/// # Examples
///
/// ```
/// use keysig_core::{Credentials, Verdict, verify_fn};
///
/// let verifier = verify_fn(|creds: Credentials<'_, serde_json::Value>| {
///     if creds.find_by_value == "1234" && creds.signature == "correct_token" {
///         Ok(Verdict::<String, ()>::accept("1234".to_owned()))
///     } else {
///         Ok(Verdict::reject())
///     }
/// });
/// # let _ = verifier;
/// ```
pub fn verify_fn<R, P, I, F>(f: F) -> FnVerifier<F, P, I>
where
    R: ?Sized,
    F: Fn(Credentials<'_, R>) -> VerifyResult<P, I>,
{
    FnVerifier {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<R, P, I, F> Verifier<R> for FnVerifier<F, P, I>
where
    R: ?Sized + Sync,
    P: Send,
    I: Send,
    F: Fn(Credentials<'_, R>) -> VerifyResult<P, I> + Send + Sync,
{
    type Principal = P;
    type Info = I;

    async fn verify(&self, credentials: Credentials<'_, R>) -> VerifyResult<P, I> {
        (self.f)(credentials)
    }
}
