//! Authentication error types.
//!
//! This module defines errors that can occur while authenticating webhook
//! events and while generating client key pairs.

use std::path::PathBuf;

use ledger_webhook_keystore::KeySourceError;
use thiserror::Error;

/// Webhook authentication errors.
///
/// Any error returned by [`EventParser::parse`](crate::EventParser::parse)
/// means the payload must not be trusted. There is no degraded-trust mode.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`: new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Payload is not well-formed JSON or misses required event fields.
    #[error("Invalid event payload: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
        /// Underlying JSON error, if any.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Signature did not verify under the cached key nor under a freshly
    /// fetched key.
    #[error("Invalid signature: {message}")]
    InvalidSignature {
        /// Description of the failure.
        message: String,
    },

    /// Fetching the remote public key failed.
    ///
    /// Wraps the underlying [`KeySourceError`] to preserve the full error source
    /// chain for debugging and structured logging.
    #[error("Public key fetch failed: {0}")]
    KeySource(
        /// The underlying key source error.
        #[source]
        KeySourceError,
    ),

    /// The remote key listing was empty.
    #[error("Public key listing returned no keys")]
    NoPublicKey,

    /// A public key could not be parsed from its PEM text.
    #[error("Invalid public key: {message}")]
    InvalidPublicKey {
        /// Description of the parse failure.
        message: String,
    },

    /// A private key could not be parsed from its PEM text.
    #[error("Invalid private key: {message}")]
    InvalidPrivateKey {
        /// Description of the parse failure.
        message: String,
    },

    /// A generated key could not be encoded as PEM.
    #[error("Key encoding failed: {message}")]
    KeyEncoding {
        /// Description of the encoding failure.
        message: String,
    },

    /// Writing a key pair to disk failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    /// Creates a new `Decode` error with the given message.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into(), source: None }
    }

    /// Creates a new `Decode` error from a JSON error.
    #[must_use]
    pub fn decode_with_source(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode { message: message.into(), source: Some(source) }
    }

    /// Creates a new `InvalidSignature` error.
    #[must_use]
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature { message: message.into() }
    }

    /// Creates a new `KeySource` error.
    #[must_use]
    pub fn key_source(err: KeySourceError) -> Self {
        Self::KeySource(err)
    }

    /// Creates a new `NoPublicKey` error.
    #[must_use]
    pub fn no_public_key() -> Self {
        Self::NoPublicKey
    }

    /// Creates a new `InvalidPublicKey` error.
    #[must_use]
    pub fn invalid_public_key(message: impl Into<String>) -> Self {
        Self::InvalidPublicKey { message: message.into() }
    }

    /// Creates a new `InvalidPrivateKey` error.
    #[must_use]
    pub fn invalid_private_key(message: impl Into<String>) -> Self {
        Self::InvalidPrivateKey { message: message.into() }
    }

    /// Creates a new `KeyEncoding` error.
    #[must_use]
    pub fn key_encoding(message: impl Into<String>) -> Self {
        Self::KeyEncoding { message: message.into() }
    }

    /// Creates a new `Io` error for the given path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Returns `true` when the failure came from obtaining the remote key
    /// rather than from the payload or its signature.
    ///
    /// Covers transport failures, an empty listing, and unparsable key
    /// content; none of these are locally recoverable.
    #[must_use]
    pub fn is_transport_class(&self) -> bool {
        matches!(self, Self::KeySource(_) | Self::NoPublicKey | Self::InvalidPublicKey { .. })
    }
}

impl From<KeySourceError> for AuthError {
    fn from(err: KeySourceError) -> Self {
        AuthError::KeySource(err)
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::decode("missing field `event`");
        assert_eq!(err.to_string(), "Invalid event payload: missing field `event`");

        let err = AuthError::invalid_signature("signature and content do not match");
        assert_eq!(err.to_string(), "Invalid signature: signature and content do not match");

        let err = AuthError::no_public_key();
        assert_eq!(err.to_string(), "Public key listing returned no keys");

        let err = AuthError::invalid_public_key("bad PEM");
        assert_eq!(err.to_string(), "Invalid public key: bad PEM");
    }

    #[test]
    fn test_key_source_error_display() {
        let err = AuthError::key_source(KeySourceError::connection("connection refused"));
        assert_eq!(
            err.to_string(),
            "Public key fetch failed: Connection error: connection refused"
        );
    }

    #[test]
    fn test_key_source_error_preserves_source_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let auth_err: AuthError =
            KeySourceError::connection_with_source("listing failed", inner).into();

        // Level 1: AuthError → KeySourceError
        let level_1 = auth_err.source().expect("level 1 source");
        assert_eq!(level_1.to_string(), "Connection error: listing failed");

        // Level 2: KeySourceError → io::Error
        let level_2 = level_1.source().expect("level 2 source");
        assert_eq!(level_2.to_string(), "read timed out");
    }

    #[test]
    fn test_decode_error_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AuthError::decode_with_source("payload is not valid JSON", json_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = AuthError::io(
            "/nonexistent/keys",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error at /nonexistent/keys: denied");
    }

    #[test]
    fn test_transport_class() {
        assert!(AuthError::key_source(KeySourceError::timeout()).is_transport_class());
        assert!(AuthError::no_public_key().is_transport_class());
        assert!(AuthError::invalid_public_key("x").is_transport_class());
        assert!(!AuthError::invalid_signature("x").is_transport_class());
        assert!(!AuthError::decode("x").is_transport_class());
    }
}
