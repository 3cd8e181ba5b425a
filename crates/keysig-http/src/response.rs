//! Response formatting for unauthenticated requests.
//!
//! Every refusal is a small JSON document:
//!
//! ```json
//! { "message": "Missing signature" }
//! ```

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use keysig_core::Failure;

/// Content type of refusal bodies.
pub const CONTENT_TYPE: &str = "application/json";

/// Header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Message returned when the verifier rejects the credentials.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message returned when authentication errors.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Serialize `message` into the refusal JSON body.
#[must_use]
pub fn message_json(message: &str) -> Bytes {
    Bytes::from(serde_json::json!({ "message": message }).to_string())
}

/// Build a JSON refusal response.
#[must_use]
pub fn json_response<B: From<Bytes>>(
    status: StatusCode,
    message: &str,
    request_id: &str,
) -> http::Response<B> {
    let mut response = http::Response::new(B::from(message_json(message)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static(CONTENT_TYPE),
    );
    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, hv);
    }

    response
}

/// Convert a strategy failure into a response.
///
/// Malformed requests use their forced status (400) and message. Rejections
/// carry no status of their own and become 401 with a `www-authenticate`
/// challenge naming the strategy.
#[must_use]
pub fn failure_to_response<I, B: From<Bytes>>(
    failure: &Failure<I>,
    challenge: &str,
    request_id: &str,
) -> http::Response<B> {
    let status = failure.status().unwrap_or(StatusCode::UNAUTHORIZED);
    let message = failure.message().unwrap_or(UNAUTHORIZED_MESSAGE);
    let mut response = json_response(status, message, request_id);

    if status == StatusCode::UNAUTHORIZED {
        if let Ok(hv) = HeaderValue::from_str(challenge) {
            response
                .headers_mut()
                .insert(http::header::WWW_AUTHENTICATE, hv);
        }
    }

    response
}

/// Response for an authentication error. The cause is never echoed.
#[must_use]
pub fn error_response<B: From<Bytes>>(request_id: &str) -> http::Response<B> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_ERROR_MESSAGE,
        request_id,
    )
}
