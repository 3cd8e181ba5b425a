//! HTTP request view exposing `headers`, `query` and `body` locations.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use keysig_core::{CredentialSource, FieldLookup};
use serde_json::Value;
use tracing::debug;

/// Location name for request headers.
pub const HEADERS: &str = "headers";
/// Location name for the decoded query string.
pub const QUERY: &str = "query";
/// Location name for the decoded request body.
pub const BODY: &str = "body";

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/json` (or `+json`) payload.
    Json(Value),
    /// `application/x-www-form-urlencoded` payload.
    Form(HashMap<String, String>),
}

impl FieldLookup for RequestBody {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self {
            Self::Json(value) => value.field(name),
            Self::Form(fields) => fields.field(name),
        }
    }
}

/// Credential source built from an HTTP request.
///
/// - `headers` is always present.
/// - `query` is always present, empty when the URI has no query string.
/// - `body` is present only for a non-empty JSON or form-encoded payload.
#[derive(Debug, Clone)]
pub struct HttpCredentials {
    method: http::Method,
    uri: http::Uri,
    headers: http::HeaderMap,
    query: HashMap<String, String>,
    body: Option<RequestBody>,
}

impl HttpCredentials {
    /// Build a credential source from request parts and the collected body.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, body: &Bytes) -> Self {
        let query = parts
            .uri
            .query()
            .map_or_else(HashMap::new, |q| parse_form(q.as_bytes()));

        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            query,
            body: decode_body(&parts.headers, body),
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &http::Method {
        &self.method
    }

    /// The request URI.
    #[must_use]
    pub fn uri(&self) -> &http::Uri {
        &self.uri
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// The decoded query string.
    #[must_use]
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// The decoded body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

impl CredentialSource for HttpCredentials {
    fn location(&self, name: &str) -> Option<&dyn FieldLookup> {
        match name {
            HEADERS => Some(&self.headers as &dyn FieldLookup),
            QUERY => Some(&self.query as &dyn FieldLookup),
            BODY => self.body.as_ref().map(|body| body as &dyn FieldLookup),
            _ => None,
        }
    }
}

/// Decode `body` according to its `content-type`.
fn decode_body(headers: &http::HeaderMap, body: &Bytes) -> Option<RequestBody> {
    if body.is_empty() {
        return None;
    }

    let content_type = headers
        .get(http::header::CONTENT_TYPE)?
        .to_str()
        .ok()?
        .parse::<mime::Mime>()
        .ok()?;

    if content_type.type_() != mime::APPLICATION {
        return None;
    }

    if content_type.subtype() == mime::JSON || content_type.suffix() == Some(mime::JSON) {
        return match serde_json::from_slice(body) {
            Ok(value) => Some(RequestBody::Json(value)),
            Err(e) => {
                debug!(error = %e, "Ignoring undecodable JSON body");
                None
            }
        };
    }

    if content_type.subtype() == mime::WWW_FORM_URLENCODED {
        return Some(RequestBody::Form(parse_form(body)));
    }

    None
}

/// Decode `application/x-www-form-urlencoded` data. The first value of a
/// repeated key wins.
fn parse_form(input: &[u8]) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (key, value) in form_urlencoded::parse(input) {
        fields
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    fields
}
