//! Read-only views over a request's credential-bearing locations.
//!
//! A request is a [`CredentialSource`]: a set of named locations (`body`,
//! `query`, `headers`, ...), each a [`FieldLookup`] of string-keyed fields.
//! A location or field that is missing or JSON `null` is absent; an empty
//! string is present.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde_json::{Map, Value};

/// A string-keyed set of fields inside one request location.
pub trait FieldLookup {
    /// Return the field value as text, or `None` when it is absent.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// A request exposing named locations to read credentials from.
pub trait CredentialSource {
    /// Return the location called `name`, or `None` when it is absent.
    fn location(&self, name: &str) -> Option<&dyn FieldLookup>;
}

/// JSON objects render non-string scalars as their JSON text, so `{"id": 42}`
/// yields `"42"`.
impl FieldLookup for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

/// Non-object values have no fields.
impl FieldLookup for Value {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.as_object()?.field(name)
    }
}

impl<S: BuildHasher> FieldLookup for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl FieldLookup for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// Header names match case-insensitively. Values that are not visible ASCII
/// are treated as absent.
impl FieldLookup for http::HeaderMap {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name)?.to_str().ok().map(Cow::Borrowed)
    }
}

/// A JSON object whose keys are location names, e.g.
/// `{"body": {"id": "1234", "signature": "..."}}`.
impl CredentialSource for Value {
    fn location(&self, name: &str) -> Option<&dyn FieldLookup> {
        match self.get(name)? {
            Value::Null => None,
            location => Some(location as &dyn FieldLookup),
        }
    }
}

impl<T: FieldLookup, S: BuildHasher> CredentialSource for HashMap<String, T, S> {
    fn location(&self, name: &str) -> Option<&dyn FieldLookup> {
        self.get(name).map(|location| location as &dyn FieldLookup)
    }
}
