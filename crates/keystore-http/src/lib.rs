//! HTTPS implementation of [`PublicKeySource`](ledger_webhook_keystore::PublicKeySource).
//!
//! This crate provides [`HttpPublicKeySource`], the production key source
//! used by `ledger-webhook-authn` to fetch the remote service's current
//! webhook signing key.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledger_webhook_authn::{EventParser, PublicKeyCache};
//! use ledger_webhook_keystore::Credentials;
//! use ledger_webhook_keystore_http::{HttpKeySourceConfig, HttpPublicKeySource};
//!
//! # async fn example(body: &str, signature: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config =
//!     HttpKeySourceConfig::builder().base_url("https://sandbox.api.example.com").build()?;
//! let source = Arc::new(HttpPublicKeySource::new(config)?);
//! let parser = EventParser::new(Arc::new(PublicKeyCache::new(source)));
//!
//! let private_key_pem = std::fs::read_to_string("privateKey.pem")?;
//! let credentials = Credentials::project("5656565656565656", private_key_pem);
//! let event = parser.parse(body, signature, &credentials).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// HTTP key source configuration.
pub mod config;
/// HTTP key source errors.
pub mod error;
/// Access signature headers.
pub mod signer;
/// The HTTP key source.
pub mod source;

pub use config::{DEFAULT_LANGUAGE, DEFAULT_TIMEOUT, HttpKeySourceConfig};
pub use error::{HttpKeySourceError, Result};
pub use signer::{AccessHeaders, sign_request};
pub use source::HttpPublicKeySource;
