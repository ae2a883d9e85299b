//! Remote public-key listing for webhook signature verification.
//!
//! The remote ledger service signs every webhook it delivers. To verify those
//! signatures a client needs the service's current public key, which it
//! obtains from a key-listing endpoint. This crate defines that seam:
//!
//! - [`PublicKeySource`]: the listing trait (newest key first)
//! - [`PublicKeyRecord`]: one listed key, PEM content plus metadata
//! - [`Credentials`] / [`AccessId`]: who is asking
//! - [`KeySourceError`]: the canonical transport error taxonomy
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │  ledger-webhook-authn    │  EventParser → PublicKeyCache
//! ├──────────────────────────┤
//! │  PublicKeySource trait   │  list_public_keys(credentials, limit)
//! ├────────────┬─────────────┤
//! │  Memory    │  HTTP       │
//! │ (testing)  │ (keystore-  │
//! │            │   http)     │
//! └────────────┴─────────────┘
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod source;
pub mod types;

pub use error::{BoxError, KeySourceError, KeySourceResult};
pub use record::PublicKeyRecord;
pub use source::{MemoryPublicKeySource, PublicKeySource};
pub use types::{AccessId, Credentials};
