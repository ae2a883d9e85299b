//! Configuration for the HTTP key source.
//!
//! This module provides [`HttpKeySourceConfig`], which tells
//! [`HttpPublicKeySource`](crate::HttpPublicKeySource) where the remote
//! service lives and how to talk to it.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{HttpKeySourceError, Result};

/// Default request timeout (15 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default `Accept-Language` header value.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Configuration for [`HttpPublicKeySource`](crate::HttpPublicKeySource).
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use ledger_webhook_keystore_http::HttpKeySourceConfig;
///
/// let config = HttpKeySourceConfig::builder()
///     .base_url("https://sandbox.api.example.com")
///     .timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// From a configuration file:
///
/// ```toml
/// base_url = "https://api.example.com"
/// timeout = "10s"
/// language = "pt-BR"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpKeySourceConfig {
    /// Root URL of the remote API, without the version segment.
    pub(crate) base_url: String,

    /// Request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub(crate) timeout: Duration,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub(crate) user_agent: String,

    /// `Accept-Language` header value.
    #[serde(default = "default_language")]
    pub(crate) language: String,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_owned()
}

#[bon::bon]
impl HttpKeySourceConfig {
    /// Creates a new configuration, validating all required fields.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the remote API.
    ///
    /// # Optional Fields
    ///
    /// * `timeout` - Request timeout (default: 15 seconds).
    /// * `user_agent` - `User-Agent` header (default: crate name and version).
    /// * `language` - `Accept-Language` header (default: `en-US`).
    ///
    /// # Errors
    ///
    /// Returns [`HttpKeySourceError::Config`] if `base_url` is empty or not
    /// an absolute URL, or if `timeout` is zero.
    #[builder]
    pub fn new(
        #[builder(into)] base_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(into, default = default_user_agent())] user_agent: String,
        #[builder(into, default = default_language())] language: String,
    ) -> Result<Self> {
        let config = Self { base_url, timeout, user_agent, language };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants enforced by the builder.
    ///
    /// Configurations obtained through deserialization should be validated
    /// before use; [`HttpPublicKeySource::new`](crate::HttpPublicKeySource::new)
    /// does so.
    ///
    /// # Errors
    ///
    /// Returns [`HttpKeySourceError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(HttpKeySourceError::Config("base_url cannot be empty".into()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| HttpKeySourceError::Config(format!("invalid base_url: {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(HttpKeySourceError::Config(format!(
                "base_url must be an absolute http(s) URL: {}",
                self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(HttpKeySourceError::Config("timeout must be greater than zero".into()));
        }

        Ok(())
    }

    /// Returns the root URL of the remote API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the `Accept-Language` header value.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the URL of the public key listing endpoint.
    pub(crate) fn public_key_url(&self, limit: u32) -> Result<Url> {
        let endpoint = format!("{}/v2/public-key", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&endpoint)
            .map_err(|e| HttpKeySourceError::Config(format!("invalid base_url: {e}")))?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        Ok(url)
    }
}
