//! Single-slot cache for the remote service's webhook signing key.
//!
//! This module provides [`PublicKeyCache`], which wraps a
//! [`PublicKeySource`] and remembers the most recently fetched verifying key
//! so that webhook verification does not hit the network on every event.
//!
//! # Architecture
//!
//! ```text
//! verify event → cached() ──hit──→ verify signature
//!                   │
//!                  miss / stale
//!                   ↓
//!               refresh() → list_public_keys(limit = 1) → parse PEM → overwrite slot
//! ```
//!
//! # Cache Strategy
//!
//! - **Capacity**: exactly one key; a refresh overwrites, never merges
//! - **Expiry**: none; the key is replaced only by an explicit refresh
//! - **Invalidation**: driven by the caller, typically after a signature fails
//!   to verify under the cached key (the remote service rotated its key)
//!
//! Concurrent refreshes are tolerated: each one overwrites the slot with the
//! key it fetched and the last writer wins.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledger_webhook_authn::PublicKeyCache;
//! use ledger_webhook_keystore::{Credentials, PublicKeySource};
//!
//! async fn example(source: Arc<dyn PublicKeySource>, credentials: Credentials) {
//!     let cache = PublicKeyCache::new(source);
//!
//!     // First call fetches, later calls are served from memory.
//!     let key = cache.get_or_fetch(&credentials).await;
//! }
//! ```

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use fail::fail_point;
use k256::{PublicKey, ecdsa::VerifyingKey, pkcs8::DecodePublicKey};
use ledger_webhook_keystore::{Credentials, KeySourceError, PublicKeySource};
use parking_lot::RwLock;

use crate::error::{AuthError, Result};

/// Cache for the remote service's current public signing key.
///
/// Holds at most one key. The slot starts empty, so the first verification
/// always triggers a fetch.
///
/// The cache is an ordinary value owned by whoever constructs it. Share it
/// across tasks with an [`Arc`].
pub struct PublicKeyCache {
    /// The listing endpoint keys are fetched from.
    source: Arc<dyn PublicKeySource>,
    /// The current key, if any.
    slot: RwLock<Option<Arc<VerifyingKey>>>,
    /// Number of refresh attempts made against the source.
    refresh_count: AtomicU64,
    /// Number of refresh attempts that failed.
    refresh_errors_total: AtomicU64,
}

impl PublicKeyCache {
    /// Creates an empty cache backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn PublicKeySource>) -> Self {
        Self {
            source,
            slot: RwLock::new(None),
            refresh_count: AtomicU64::new(0),
            refresh_errors_total: AtomicU64::new(0),
        }
    }

    /// Returns the cached key without touching the network.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<VerifyingKey>> {
        self.slot.read().clone()
    }

    /// Returns the cached key, fetching it first when the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`refresh`](Self::refresh) when a fetch is
    /// needed.
    #[tracing::instrument(skip(self, credentials))]
    pub async fn get_or_fetch(&self, credentials: &Credentials) -> Result<Arc<VerifyingKey>> {
        if let Some(key) = self.cached() {
            tracing::debug!(cache = "public_key", "cache hit");
            return Ok(key);
        }
        tracing::debug!(cache = "public_key", "cache miss");

        self.refresh(credentials).await
    }

    /// Fetches the newest remote key and overwrites the slot with it.
    ///
    /// Exactly one listing call is made. There is no retry; on failure the
    /// slot keeps its previous content.
    ///
    /// # Errors
    ///
    /// - [`AuthError::KeySource`] if the listing call fails
    /// - [`AuthError::NoPublicKey`] if the listing is empty
    /// - [`AuthError::InvalidPublicKey`] if the returned PEM cannot be parsed
    #[tracing::instrument(skip(self, credentials), fields(access_id = %credentials.access_id()))]
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Arc<VerifyingKey>> {
        self.refresh_count.fetch_add(1, Ordering::Relaxed);

        match self.fetch(credentials).await {
            Ok((key_id, key)) => {
                let key = Arc::new(key);
                let replaced = self.slot.write().replace(Arc::clone(&key)).is_some();
                tracing::info!(
                    audit.action = "overwrite_public_key",
                    audit.resource = %key_id,
                    audit.result = "success",
                    audit.replaced = replaced,
                    "audit_event"
                );
                Ok(key)
            },
            Err(err) => {
                self.refresh_errors_total.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %err, "public key refresh failed");
                Err(err)
            },
        }
    }

    /// Stores `key` directly, bypassing the source.
    pub fn seed(&self, key: VerifyingKey) {
        *self.slot.write() = Some(Arc::new(key));
    }

    /// Empties the slot so the next lookup fetches again.
    pub fn clear(&self) {
        let had_key = self.slot.write().take().is_some();
        tracing::info!(
            audit.action = "clear_public_key",
            audit.result = "success",
            audit.evicted = had_key,
            "audit_event"
        );
    }

    /// Returns the number of refresh attempts made against the source.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::Relaxed)
    }

    /// Returns the number of refresh attempts that failed.
    #[must_use]
    pub fn refresh_errors_total(&self) -> u64 {
        self.refresh_errors_total.load(Ordering::Relaxed)
    }

    async fn fetch(&self, credentials: &Credentials) -> Result<(String, VerifyingKey)> {
        fail_point!("public-key-cache-before-fetch", |_| {
            Err(AuthError::key_source(KeySourceError::internal(
                "injected failure before public key fetch",
            )))
        });

        let records = self.source.list_public_keys(credentials, 1).await?;
        let record = records.into_iter().next().ok_or_else(AuthError::no_public_key)?;
        let key = parse_public_key(&record.content)?;

        Ok((record.id, key))
    }
}

impl fmt::Debug for PublicKeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeyCache")
            .field("cached", &self.slot.read().is_some())
            .field("refresh_count", &self.refresh_count())
            .field("refresh_errors_total", &self.refresh_errors_total())
            .finish_non_exhaustive()
    }
}

/// Parses a SubjectPublicKeyInfo PEM into a secp256k1 verifying key.
///
/// # Errors
///
/// Returns [`AuthError::InvalidPublicKey`] if the PEM is malformed or does
/// not hold a secp256k1 point.
pub fn parse_public_key(pem: &str) -> Result<VerifyingKey> {
    let public_key = PublicKey::from_public_key_pem(pem)
        .map_err(|e| AuthError::invalid_public_key(e.to_string()))?;
    Ok(VerifyingKey::from(public_key))
}
