//! Shared test utilities for webhook authentication testing.
//!
//! This module provides helpers for building signed webhook payloads,
//! simulating remote key rotation, and crafting malformed signatures. It is
//! feature-gated behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! ledger-webhook-authn = { path = "../authn", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use ledger_webhook_authn::testutil::{event_payload, signed_payload};
//! ```

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use ledger_webhook_keystore::{
    Credentials, MemoryPublicKeySource, PublicKeyRecord, PublicKeySource,
};
use serde_json::json;

use crate::{
    EventParser, PublicKeyCache,
    key_pair::{self, KeyPair},
    signature,
};

/// Creates a fresh key pair.
///
/// # Panics
///
/// Panics if key generation fails (should not happen).
#[allow(clippy::expect_used)]
pub fn generate_key_pair() -> KeyPair {
    key_pair::create().expect("key pair generation should not fail")
}

/// Builds a public key record for `pair` as the remote listing returns it.
pub fn public_key_record(id: &str, pair: &KeyPair) -> PublicKeyRecord {
    PublicKeyRecord::builder().id(id).content(pair.public_key_pem()).build()
}

/// Returns a canonical webhook body for `subscription`.
///
/// The resource object is placed under the field built-in subscriptions read
/// it from (`payment` for the payment kinds, `holmes` for `boleto-holmes`,
/// the subscription name otherwise).
pub fn event_payload(event_id: &str, subscription: &str) -> String {
    let field = match subscription {
        "boleto-payment" | "utility-payment" | "brcode-payment" | "tax-payment"
        | "darf-payment" => "payment",
        "boleto-holmes" => "holmes",
        other => other,
    };

    let mut log = json!({
        "id": "6028014399012864",
        "created": "2020-10-26T17:41:22.917123+00:00",
        "type": "success",
        "errors": [],
    });
    log[field] = json!({ "id": "4933140435468288", "amount": 100 });

    json!({
        "event": {
            "id": event_id,
            "created": "2020-10-26T17:41:23.123456+00:00",
            "isDelivered": false,
            "subscription": subscription,
            "workspaceId": "6341320293482496",
            "log": log,
        }
    })
    .to_string()
}

/// Signs `content` with `pair` and returns the base64 DER signature.
///
/// # Panics
///
/// Panics if the pair's private key cannot be parsed.
#[allow(clippy::expect_used)]
pub fn sign_with(content: &str, pair: &KeyPair) -> String {
    signature::sign(content, &pair.signing_key().expect("test key pair should parse"))
}

/// Returns a transfer event body and its signature under `pair`.
pub fn signed_payload(pair: &KeyPair) -> (String, String) {
    let content = event_payload("5158957497384960", "transfer");
    let signature = sign_with(&content, pair);
    (content, signature)
}

/// Returns a signature that decodes as base64 but not as DER.
pub fn malformed_der_signature() -> String {
    STANDARD.encode(b"definitely not DER")
}

/// Returns placeholder credentials for sources that ignore them.
pub fn test_credentials() -> Credentials {
    Credentials::project("5656565656565656", "unused")
}

/// Builds an [`EventParser`] over `source` with an empty key cache.
pub fn parser_over(source: &MemoryPublicKeySource) -> EventParser {
    let source = Arc::new(source.clone()) as Arc<dyn PublicKeySource>;
    EventParser::new(Arc::new(PublicKeyCache::new(source)))
}

/// Asserts that a [`Result<T, AuthError>`] is an `Err` matching the given [`AuthError`] variant.
///
/// Works with any `AuthError` variant. On failure, prints the expected variant
/// and the actual result for debugging.
///
/// [`AuthError`]: crate::error::AuthError
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use ledger_webhook_authn::assert_auth_error;
/// use ledger_webhook_authn::error::AuthError;
///
/// let result: Result<(), AuthError> = Err(AuthError::no_public_key());
/// assert_auth_error!(result, NoPublicKey);
/// ```
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "expected AuthError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "{}: expected AuthError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}
