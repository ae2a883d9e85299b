//! The remote public-key listing seam.
//!
//! [`PublicKeySource`] abstracts the single outbound call the webhook
//! authentication core makes: listing the remote service's public keys.
//! Production code uses the HTTP implementation from
//! `ledger-webhook-keystore-http`; tests use [`MemoryPublicKeySource`].
//!
//! # Usage
//!
//! ```no_run
//! use ledger_webhook_keystore::{Credentials, KeySourceError, PublicKeySource};
//!
//! async fn newest_pem<S: PublicKeySource>(
//!     source: &S,
//!     credentials: &Credentials,
//! ) -> Result<Option<String>, KeySourceError> {
//!     let records = source.list_public_keys(credentials, 1).await?;
//!     Ok(records.into_iter().next().map(|record| record.content))
//! }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{Credentials, KeySourceResult, PublicKeyRecord};

/// Lists the remote service's signing public keys.
///
/// # Ordering
///
/// Implementations must return records newest first. Callers that want the
/// key currently in use request `limit = 1` and take the first element.
///
/// # Error Handling
///
/// Implementations map transport failures to
/// [`KeySourceError`](crate::KeySourceError) and must not retry internally;
/// retry policy belongs to the caller.
#[async_trait]
pub trait PublicKeySource: Send + Sync {
    /// Returns at most `limit` public key records, newest first.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Identifies the account whose listing endpoint is queried
    /// * `limit` - Maximum number of records to return
    ///
    /// # Errors
    ///
    /// Returns an error if the remote service cannot be reached, rejects the
    /// request, or answers with a body that cannot be decoded.
    async fn list_public_keys(
        &self,
        credentials: &Credentials,
        limit: u32,
    ) -> KeySourceResult<Vec<PublicKeyRecord>>;
}

/// In-memory implementation of [`PublicKeySource`] for testing.
///
/// Holds an ordered list of records (newest first) and counts how many
/// listing calls it has served, so tests can assert on network usage.
///
/// Cloning shares the underlying state.
///
/// # Examples
///
/// ```
/// use ledger_webhook_keystore::{
///     Credentials, MemoryPublicKeySource, PublicKeyRecord, PublicKeySource,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = MemoryPublicKeySource::new();
///     source.publish(PublicKeyRecord::builder().id("k0").content("old").build());
///     source.publish(PublicKeyRecord::builder().id("k1").content("new").build());
///
///     let credentials = Credentials::project("1", "unused");
///     let records = source.list_public_keys(&credentials, 1).await?;
///     assert_eq!(records[0].id, "k1");
///     assert_eq!(source.list_call_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryPublicKeySource {
    /// Records, newest first.
    records: Arc<RwLock<Vec<PublicKeyRecord>>>,
    /// Number of `list_public_keys` calls served.
    calls: Arc<AtomicU64>,
}

impl MemoryPublicKeySource {
    /// Creates a new empty in-memory source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source whose newest key is `record`.
    #[must_use]
    pub fn with_record(record: PublicKeyRecord) -> Self {
        let source = Self::new();
        source.publish(record);
        source
    }

    /// Publishes a new key, making it the newest record.
    ///
    /// This is how tests simulate a key rotation on the remote side.
    pub fn publish(&self, record: PublicKeyRecord) {
        self.records.write().insert(0, record);
    }

    /// Returns how many listing calls have been served.
    #[must_use]
    pub fn list_call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublicKeySource for MemoryPublicKeySource {
    #[tracing::instrument(skip(self, credentials), fields(access_id = %credentials.access_id()))]
    async fn list_public_keys(
        &self,
        credentials: &Credentials,
        limit: u32,
    ) -> KeySourceResult<Vec<PublicKeyRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read();
        Ok(records.iter().take(limit as usize).cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn record(id: &str) -> PublicKeyRecord {
        PublicKeyRecord::builder().id(id).content(format!("pem-{id}")).build()
    }

    fn credentials() -> Credentials {
        Credentials::project("1", "unused")
    }

    #[tokio::test]
    async fn test_empty_source_returns_empty_listing() {
        let source = MemoryPublicKeySource::new();
        let records = source.list_public_keys(&credentials(), 1).await.expect("list");
        assert!(records.is_empty());
        assert_eq!(source.list_call_count(), 1);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let source = MemoryPublicKeySource::new();
        source.publish(record("k0"));
        source.publish(record("k1"));
        source.publish(record("k2"));

        let records = source.list_public_keys(&credentials(), 10).await.expect("list");
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["k2", "k1", "k0"]);
    }

    #[tokio::test]
    async fn test_limit_respected() {
        let source = MemoryPublicKeySource::with_record(record("k0"));
        source.publish(record("k1"));

        let records = source.list_public_keys(&credentials(), 1).await.expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "k1");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let source = MemoryPublicKeySource::new();
        let clone = source.clone();
        clone.publish(record("k0"));

        let records = source.list_public_keys(&credentials(), 1).await.expect("list");
        assert_eq!(records[0].id, "k0");
        assert_eq!(clone.list_call_count(), 1);
    }
}
