//! Error types for the HTTP key source.
//!
//! This module provides [`HttpKeySourceError`] and its mapping onto the
//! canonical [`KeySourceError`] returned through the
//! [`PublicKeySource`](ledger_webhook_keystore::PublicKeySource) trait.

use ledger_webhook_keystore::KeySourceError;
use thiserror::Error;

/// Result type alias for HTTP key source operations.
pub type Result<T> = std::result::Result<T, HttpKeySourceError>;

/// Errors specific to the HTTP key source.
#[derive(Debug, Error)]
pub enum HttpKeySourceError {
    /// Error from the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The access signature could not be produced from the credentials.
    #[error("Request signing error: {0}")]
    Signing(String),

    /// The remote service answered with a non-success status.
    #[error("Remote service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The listing body could not be decoded.
    #[error("Listing decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<HttpKeySourceError> for KeySourceError {
    fn from(err: HttpKeySourceError) -> Self {
        match err {
            HttpKeySourceError::Http(source) => reqwest_error_to_key_source_error(source),
            HttpKeySourceError::Config(message) => {
                KeySourceError::internal(format!("Config: {message}"))
            },
            HttpKeySourceError::Signing(message) => {
                KeySourceError::internal(format!("Signing: {message}"))
            },
            HttpKeySourceError::Status { status, body } => KeySourceError::rejected(status, body),
            HttpKeySourceError::Decode(source) => KeySourceError::serialization_with_source(
                "public key listing could not be decoded",
                source,
            ),
        }
    }
}

/// Converts a client error to a key source error.
///
/// Timeouts and connection failures keep their transient classification so
/// callers can tell them apart from rejections.
fn reqwest_error_to_key_source_error(err: reqwest::Error) -> KeySourceError {
    if err.is_timeout() {
        tracing::warn!(error = %err, "public key listing timed out");
        return KeySourceError::timeout();
    }

    if let Some(status) = err.status() {
        return KeySourceError::rejected(status.as_u16(), err.to_string());
    }

    if err.is_decode() {
        let message = err.to_string();
        return KeySourceError::serialization_with_source(message, err);
    }

    if err.is_builder() {
        let message = err.to_string();
        return KeySourceError::internal_with_source(message, err);
    }

    let message = err.to_string();
    KeySourceError::connection_with_source(message, err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_status_maps_to_rejected() {
        let err: KeySourceError =
            HttpKeySourceError::Status { status: 401, body: "invalid signature".into() }.into();
        assert!(matches!(
            err,
            KeySourceError::Rejected { status: 401, ref message } if message == "invalid signature"
        ));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_decode_maps_to_serialization_with_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: KeySourceError = HttpKeySourceError::Decode(json_err).into();
        assert!(matches!(err, KeySourceError::Serialization { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_and_signing_map_to_internal() {
        let err: KeySourceError = HttpKeySourceError::Config("bad url".into()).into();
        assert_eq!(err.to_string(), "Internal error: Config: bad url");

        let err: KeySourceError = HttpKeySourceError::Signing("bad key".into()).into();
        assert_eq!(err.to_string(), "Internal error: Signing: bad key");
    }

    #[test]
    fn test_error_display() {
        let err = HttpKeySourceError::Status { status: 503, body: String::new() };
        assert_eq!(err.to_string(), "Remote service returned 503: ");
    }
}
