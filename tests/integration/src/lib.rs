//! End-to-end tests for the keysig HTTP service.
//!
//! Each test starts an in-process server on an ephemeral port, wrapping a
//! small "who am I" service behind [`AuthHttpService`], and talks to it with
//! `reqwest`.
//!
//! Run them with:
//! ```text
//! cargo test -p keysig-integration
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Once;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use keysig_core::{Credentials, PublicKeyStrategy, Verdict, Verifier, VerifyResult};
use keysig_http::{AuthHttpConfig, AuthHttpService, Authenticated, HttpCredentials};
use tokio::net::TcpListener;
use tracing::warn;

#[cfg(test)]
mod test_auth;

static INIT: Once = Once::new();

/// Key id known to [`test_verifier`].
pub const KEY_ID: &str = "1234";

/// Signature accepted for [`KEY_ID`].
pub const GOOD_SIGNATURE: &str = "correct_token";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// In-memory verifier mapping key ids to the one signature they accept.
///
/// Stands in for an application's key store; real verifiers check the
/// signature against the principal's public key.
#[derive(Debug, Clone)]
pub struct StaticKeyVerifier {
    signatures: HashMap<String, String>,
}

impl StaticKeyVerifier {
    /// Create a verifier from `(key_id, signature)` pairs.
    pub fn new(signatures: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            signatures: signatures.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Verifier<HttpCredentials> for StaticKeyVerifier {
    type Principal = String;
    type Info = String;

    async fn verify(
        &self,
        creds: Credentials<'_, HttpCredentials>,
    ) -> VerifyResult<String, String> {
        match self.signatures.get(&creds.find_by_value) {
            Some(expected) if *expected == creds.signature => {
                Ok(Verdict::accept_with(creds.find_by_value, "read".to_owned()))
            }
            Some(_) => Ok(Verdict::reject_with("signature mismatch".to_owned())),
            None => Ok(Verdict::reject()),
        }
    }
}

/// The verifier used by [`spawn_server`].
#[must_use]
pub fn test_verifier() -> StaticKeyVerifier {
    StaticKeyVerifier::new([(KEY_ID.to_owned(), GOOD_SIGNATURE.to_owned())])
}

/// Inner service answering `{"principal": ..., "scope": ...}`.
#[derive(Debug, Clone, Copy)]
pub struct WhoAmI;

impl hyper::service::Service<http::Request<Full<Bytes>>> for WhoAmI {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<Full<Bytes>>) -> Self::Future {
        let body = match req.extensions().get::<Authenticated<String, String>>() {
            Some(auth) => serde_json::json!({
                "principal": auth.principal,
                "scope": auth.info,
            }),
            None => serde_json::json!({ "principal": null }),
        };

        let mut response = http::Response::new(Full::new(Bytes::from(body.to_string())));
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        std::future::ready(Ok(response))
    }
}

/// Start a server on `127.0.0.1:0` and return its address.
///
/// The accept loop runs on the current tokio runtime and stops with it.
pub async fn spawn_server(config: AuthHttpConfig) -> Result<SocketAddr> {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let service = AuthHttpService::new(WhoAmI, PublicKeyStrategy::new(test_verifier()), config);

    tokio::spawn(async move {
        let http = HttpConnBuilder::new(TokioExecutor::new());
        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let conn = http
                .serve_connection(TokioIo::new(stream), service.clone())
                .into_owned();
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    warn!(peer_addr = %peer_addr, error = %e, "connection error");
                }
            });
        }
    });

    Ok(addr)
}

/// Base URL for a server started with [`spawn_server`].
#[must_use]
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}
