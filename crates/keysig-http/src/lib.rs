//! HTTP adapter for the keysig public-key strategy.
//!
//! This crate connects [`keysig_core::PublicKeyStrategy`] to `http`/`hyper`:
//!
//! - **Request**: [`HttpCredentials`] exposes `headers`, `query` and the
//!   decoded `body` (JSON or form-encoded) as credential locations
//! - **Service**: [`AuthHttpService`] authenticates each request and forwards
//!   it to an inner hyper `Service` with an [`Authenticated`] extension
//! - **Response helpers**: JSON refusal formatting for 400/401/500

pub mod request;
pub mod response;
pub mod service;

pub use request::{HttpCredentials, RequestBody};
pub use service::{AuthHttpConfig, AuthHttpService, Authenticated};
