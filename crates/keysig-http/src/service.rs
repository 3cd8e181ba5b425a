//! Hyper `Service` that authenticates requests before forwarding them.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use keysig_core::{BoxError, Outcome, Strategy, StrategyOverrides};
use tracing::{debug, info, warn};

use crate::request::HttpCredentials;
use crate::response::{REQUEST_ID_HEADER, error_response, failure_to_response, json_response};

/// Default cap on the request body collected for credential extraction.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for [`AuthHttpService`].
#[derive(Debug, Clone)]
pub struct AuthHttpConfig {
    /// Overrides applied to every `authenticate` call.
    pub overrides: StrategyOverrides,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for AuthHttpConfig {
    fn default() -> Self {
        Self {
            overrides: StrategyOverrides::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Request extension set on authenticated requests before they reach the
/// inner service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated<P, I> {
    /// The authenticated principal.
    pub principal: P,
    /// Extra data supplied by the verifier.
    pub info: Option<I>,
}

/// Hyper `Service` gating an inner service behind a [`Strategy`].
///
/// The request body is collected (up to [`AuthHttpConfig::max_body_bytes`])
/// so credentials can be read from it, then forwarded as `Full<Bytes>`.
///
/// | Outcome | Response |
/// |---------|----------|
/// | Success | inner service, with [`Authenticated`] in the request extensions |
/// | Fail (malformed) | 400 with the failure message |
/// | Fail (rejected) | 401 with a `www-authenticate` challenge |
/// | Error | 500, cause logged only |
#[derive(Debug)]
pub struct AuthHttpService<S, St> {
    inner: Arc<S>,
    strategy: Arc<St>,
    config: Arc<AuthHttpConfig>,
}

impl<S, St> AuthHttpService<S, St> {
    /// Wrap `inner` behind `strategy`.
    pub fn new(inner: S, strategy: St, config: AuthHttpConfig) -> Self {
        Self {
            inner: Arc::new(inner),
            strategy: Arc::new(strategy),
            config: Arc::new(config),
        }
    }
}

impl<S, St> Clone for AuthHttpService<S, St> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            strategy: Arc::clone(&self.strategy),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, St, B, ResBody> hyper::service::Service<http::Request<B>> for AuthHttpService<S, St>
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    St: Strategy<HttpCredentials> + 'static,
    St::Principal: Clone + Send + Sync + 'static,
    St::Info: Clone + Send + Sync + 'static,
    S: hyper::service::Service<
            http::Request<Full<Bytes>>,
            Response = http::Response<ResBody>,
            Error = Infallible,
        > + Send
        + Sync
        + 'static,
    S::Future: Send,
    ResBody: From<Bytes> + Send + 'static,
{
    type Response = http::Response<ResBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        let strategy = Arc::clone(&self.strategy);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response =
                process_request(req, inner.as_ref(), strategy.as_ref(), &config, &request_id)
                    .await;
            Ok(add_request_id(response, &request_id))
        })
    }
}

/// Authenticate one request and either refuse it or forward it.
async fn process_request<S, St, B, ResBody>(
    req: http::Request<B>,
    inner: &S,
    strategy: &St,
    config: &AuthHttpConfig,
    request_id: &str,
) -> http::Response<ResBody>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
    St: Strategy<HttpCredentials>,
    St::Principal: Clone + Send + Sync + 'static,
    St::Info: Clone + Send + Sync + 'static,
    S: hyper::service::Service<
            http::Request<Full<Bytes>>,
            Response = http::Response<ResBody>,
            Error = Infallible,
        >,
    ResBody: From<Bytes>,
{
    let (mut parts, incoming) = req.into_parts();

    let body = match Limited::new(incoming, config.max_body_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(request_id, error = %e, "Failed to read request body");
            return json_response(
                http::StatusCode::BAD_REQUEST,
                "Failed to read request body",
                request_id,
            );
        }
    };

    let credentials = HttpCredentials::from_parts(&parts, &body);

    match strategy.authenticate(&credentials, &config.overrides).await {
        Outcome::Success { principal, info } => {
            info!(request_id, strategy = strategy.name(), "Request authenticated");
            parts
                .extensions
                .insert(Authenticated { principal, info });
            let req = http::Request::from_parts(parts, Full::new(body));
            match inner.call(req).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        }
        Outcome::Fail(failure) => {
            debug!(
                request_id,
                status = ?failure.status(),
                message = failure.message().unwrap_or_default(),
                "Request not authenticated"
            );
            failure_to_response(&failure, strategy.name(), request_id)
        }
        Outcome::Error(err) => {
            warn!(request_id, error = %err, "Authentication error");
            error_response(request_id)
        }
    }
}

/// Stamp the request id on every response, keeping one set by the inner service.
fn add_request_id<B>(mut response: http::Response<B>, request_id: &str) -> http::Response<B> {
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        response.headers_mut().entry(REQUEST_ID_HEADER).or_insert(hv);
    }
    response
}
