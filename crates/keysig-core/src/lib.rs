//! Public-key signature authentication strategy.
//!
//! This crate reads a principal identifier and a signature from a
//! configurable request location and hands them to an application-supplied
//! [`Verifier`]. The verifier's verdict becomes one of three outcomes:
//! success, failure, or error.
//!
//! # Overview
//!
//! The strategy performs no cryptography itself. Looking up the principal's
//! public key and checking the signed challenge (typically `nonce:timestamp`
//! within an application-defined window) is the verifier's job. The strategy
//! only guarantees the request shape and the outcome mapping:
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Location, principal field or `signature` missing | [`Outcome::Fail`] with status 400 |
//! | Verifier rejects the credentials | [`Outcome::Fail`] without a status |
//! | Verifier errors or panics | [`Outcome::Error`] |
//! | Verifier accepts | [`Outcome::Success`] |
//!
//! # Modules
//!
//! - [`error`] - Construction, verifier and configuration errors
//! - [`options`] - Layered strategy options
//! - [`outcome`] - The three terminal outcomes
//! - [`source`] - Request locations and field lookup
//! - [`strategy`] - The [`Strategy`] contract and [`PublicKeyStrategy`]
//! - [`verifier`] - The verification hook

pub mod error;
pub mod options;
pub mod outcome;
pub mod source;
pub mod strategy;
pub mod verifier;

pub use error::{AuthError, BoxError, ConfigError};
pub use options::{StrategyOptions, StrategyOverrides};
pub use outcome::{Failure, Outcome};
pub use source::{CredentialSource, FieldLookup};
pub use strategy::{PublicKeyStrategy, PublicKeyStrategyBuilder, STRATEGY_NAME, Strategy};
pub use verifier::{Credentials, FnVerifier, Verdict, Verifier, VerifyResult, verify_fn};
