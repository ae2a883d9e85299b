//! Key source error types and result alias.
//!
//! Every [`PublicKeySource`](crate::PublicKeySource) implementation maps its
//! transport-level failures to these variants, so callers can reason about
//! key-fetch failures without knowing which backend produced them.
//!
//! # Error Types
//!
//! - [`KeySourceError::Connection`] - Network or connection-related failures
//! - [`KeySourceError::Timeout`] - The listing request exceeded its time limit
//! - [`KeySourceError::Rejected`] - The remote service answered with an error status
//! - [`KeySourceError::Serialization`] - The listing response could not be decoded
//! - [`KeySourceError::Internal`] - Anything else
//!
//! # Example
//!
//! ```
//! use ledger_webhook_keystore::{KeySourceError, KeySourceResult};
//!
//! fn fetch() -> KeySourceResult<Vec<u8>> {
//!     Err(KeySourceError::connection("connection refused"))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for key source operations.
pub type KeySourceResult<T> = Result<T, KeySourceError>;

/// Errors that can occur while listing the remote service's public keys.
///
/// Errors preserve their source chain via the `#[source]` attribute.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`. Downstream match expressions
/// must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeySourceError {
    /// Connection or network error.
    ///
    /// DNS failure, connection refused, TLS handshake failure and similar.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// The listing request timed out.
    #[error("Operation timeout")]
    Timeout,

    /// The remote service answered with a non-success status.
    #[error("Request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the remote service.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The listing response could not be decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the decoding error.
        message: String,
        /// The underlying error that caused decoding to fail.
        #[source]
        source: Option<BoxError>,
    },

    /// Internal error that fits no other category.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },
}

impl KeySourceError {
    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates a new `Rejected` error for the given status code.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }

    /// Creates a new `Serialization` error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Creates a new `Serialization` error with a message and source error.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Returns `true` for failures where the remote service was never reached
    /// or never answered (connection and timeout errors).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}
