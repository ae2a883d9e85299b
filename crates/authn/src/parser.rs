//! Webhook event authentication.
//!
//! [`EventParser::parse`] turns an untrusted webhook body and its
//! `Digital-Signature` header into an authenticated [`Event`]:
//!
//! ```text
//! content ──decode──→ candidate Event
//!                         │
//!          verify(cached key, fetched if empty) ──valid──→ Ok(Event)
//!                         │ invalid
//!          refresh key, verify again ────────────valid──→ Ok(Event)
//!                         │ invalid
//!                  Err(InvalidSignature)
//! ```
//!
//! The single forced refresh covers remote key rotation: a signature made
//! with the new key fails under the stale cached key, then succeeds after the
//! refresh. A forged signature fails both times. At most two signature
//! verifications and two key fetches happen per call.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use k256::ecdsa::VerifyingKey;
use ledger_webhook_keystore::Credentials;

use crate::{
    error::{AuthError, Result},
    event::{Event, LogRegistry, decode_event},
    public_key_cache::PublicKeyCache,
    signature,
};

/// Authenticates webhook events against the remote service's public key.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use ledger_webhook_authn::{EventParser, PublicKeyCache};
/// use ledger_webhook_keystore::{Credentials, PublicKeySource};
///
/// # async fn example(
/// #     source: Arc<dyn PublicKeySource>,
/// #     credentials: Credentials,
/// #     body: &str,
/// #     signature: &str,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let parser = EventParser::new(Arc::new(PublicKeyCache::new(source)));
///
/// let event = parser.parse(body, signature, &credentials).await?;
/// println!("{} {}", event.subscription, event.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventParser {
    cache: Arc<PublicKeyCache>,
    registry: LogRegistry,
    verifications: AtomicU64,
}

impl EventParser {
    /// Creates a parser using `cache` and the built-in subscriptions.
    #[must_use]
    pub fn new(cache: Arc<PublicKeyCache>) -> Self {
        Self { cache, registry: LogRegistry::default(), verifications: AtomicU64::new(0) }
    }

    /// Replaces the subscription registry used to decode event logs.
    #[must_use]
    pub fn with_registry(mut self, registry: LogRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the key cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<PublicKeyCache> {
        &self.cache
    }

    /// Returns the subscription registry.
    #[must_use]
    pub fn registry(&self) -> &LogRegistry {
        &self.registry
    }

    /// Returns how many signature verifications this parser has performed.
    #[must_use]
    pub fn verification_count(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }

    /// Decodes `content` and authenticates it with `signature_base64`.
    ///
    /// `content` must be the exact request body as received; any change in
    /// bytes, whitespace included, invalidates the signature.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Decode`] if `content` is not a well-formed event; no key
    ///   is fetched and no signature is checked
    /// - [`AuthError::InvalidSignature`] if the signature verifies neither
    ///   under the cached key nor under a freshly fetched one
    /// - [`AuthError::KeySource`], [`AuthError::NoPublicKey`] or
    ///   [`AuthError::InvalidPublicKey`] if a needed key fetch fails
    #[tracing::instrument(
        name = "parse_event",
        skip_all,
        fields(subscription = tracing::field::Empty, event_id = tracing::field::Empty)
    )]
    pub async fn parse(
        &self,
        content: &str,
        signature_base64: &str,
        credentials: &Credentials,
    ) -> Result<Event> {
        let event = decode_event(content, &self.registry)?;

        let span = tracing::Span::current();
        span.record("subscription", event.subscription.as_str());
        span.record("event_id", event.id.as_str());

        let key = self.cache.get_or_fetch(credentials).await?;
        if self.verify(content, signature_base64, &key) {
            return Ok(event);
        }

        tracing::warn!("signature did not verify under cached key, refreshing");

        let key = self.cache.refresh(credentials).await?;
        if self.verify(content, signature_base64, &key) {
            tracing::debug!("signature verified after key refresh");
            return Ok(event);
        }

        Err(AuthError::invalid_signature(
            "signature and content do not match the remote public key",
        ))
    }

    fn verify(&self, content: &str, signature_base64: &str, key: &VerifyingKey) -> bool {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        signature::is_valid(content, signature_base64, key)
    }
}
