//! Strategy configuration.
//!
//! Effective options are resolved in three layers, each a shallow merge over the
//! previous one:
//!
//! 1. [`StrategyOptions::default`] (`findBy = "id"`, `in = "body"`)
//! 2. overrides passed when the strategy is constructed
//! 3. overrides passed to a single `authenticate` call
//!
//! Both types use the camelCase key names hosts already know (`findBy`, `in`,
//! `passReqToCallback`, `badRequestMessage`) when (de)serialized.

use std::env;

use crate::error::ConfigError;

/// Default name of the field identifying the principal.
pub const DEFAULT_FIND_BY: &str = "id";

/// Default request location fields are read from.
pub const DEFAULT_LOCATION: &str = "body";

/// Fully resolved strategy options.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyOptions {
    /// Name of the field identifying the principal.
    pub find_by: String,
    /// Name of the request location (`body`, `query`, `headers`, ...).
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the raw request is handed to the verifier.
    pub pass_req_to_callback: bool,
    /// Replacement text for malformed-request failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bad_request_message: Option<String>,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            find_by: DEFAULT_FIND_BY.to_owned(),
            location: DEFAULT_LOCATION.to_owned(),
            pass_req_to_callback: false,
            bad_request_message: None,
        }
    }
}

impl StrategyOptions {
    /// Return a copy of these options with every field set in `overrides` replaced.
    #[must_use]
    pub fn merged(&self, overrides: &StrategyOverrides) -> Self {
        Self {
            find_by: overrides
                .find_by
                .clone()
                .unwrap_or_else(|| self.find_by.clone()),
            location: overrides
                .location
                .clone()
                .unwrap_or_else(|| self.location.clone()),
            pass_req_to_callback: overrides
                .pass_req_to_callback
                .unwrap_or(self.pass_req_to_callback),
            bad_request_message: overrides
                .bad_request_message
                .clone()
                .or_else(|| self.bad_request_message.clone()),
        }
    }

    /// The malformed-request message to report, honouring `bad_request_message`.
    ///
    /// An empty override counts as unset.
    #[must_use]
    pub fn bad_request_message_or(&self, default: impl Into<String>) -> String {
        match self.bad_request_message.as_deref() {
            Some(message) if !message.is_empty() => message.to_owned(),
            _ => default.into(),
        }
    }
}

/// One layer of optional overrides on top of [`StrategyOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyOverrides {
    /// Overrides [`StrategyOptions::find_by`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_by: Option<String>,
    /// Overrides [`StrategyOptions::location`].
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Overrides [`StrategyOptions::pass_req_to_callback`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_req_to_callback: Option<bool>,
    /// Overrides [`StrategyOptions::bad_request_message`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bad_request_message: Option<String>,
}

impl StrategyOverrides {
    /// Create an empty override layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the principal field name.
    #[must_use]
    pub fn find_by(mut self, find_by: impl Into<String>) -> Self {
        self.find_by = Some(find_by.into());
        self
    }

    /// Set the request location.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set whether the raw request is passed to the verifier.
    #[must_use]
    pub fn pass_req_to_callback(mut self, pass: bool) -> Self {
        self.pass_req_to_callback = Some(pass);
        self
    }

    /// Set the malformed-request message.
    #[must_use]
    pub fn bad_request_message(mut self, message: impl Into<String>) -> Self {
        self.bad_request_message = Some(message.into());
        self
    }

    /// Load overrides from `KEYSIG_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `KEYSIG_FIND_BY` | `find_by` |
    /// | `KEYSIG_IN` | `location` |
    /// | `KEYSIG_PASS_REQ_TO_CALLBACK` | `pass_req_to_callback` |
    /// | `KEYSIG_BAD_REQUEST_MESSAGE` | `bad_request_message` |
    ///
    /// Unset variables leave the field unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load overrides through an arbitrary variable lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pass_req_to_callback = get("KEYSIG_PASS_REQ_TO_CALLBACK")
            .map(|v| parse_bool("KEYSIG_PASS_REQ_TO_CALLBACK", &v))
            .transpose()?;

        Ok(Self {
            find_by: get("KEYSIG_FIND_BY"),
            location: get("KEYSIG_IN"),
            pass_req_to_callback,
            bad_request_message: get("KEYSIG_BAD_REQUEST_MESSAGE"),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
    }
}
