//! Access signature headers for authenticated requests.
//!
//! Every request to the remote service carries three headers:
//!
//! | Header             | Value                                                  |
//! |--------------------|--------------------------------------------------------|
//! | `Access-Id`        | `project/{id}` or `organization/{id}[/workspace/{id}]` |
//! | `Access-Time`      | Unix time in seconds                                   |
//! | `Access-Signature` | base64 DER ECDSA signature of `"{id}:{time}:{body}"`   |
//!
//! The body is empty for `GET` requests.

use chrono::{DateTime, Utc};
use ledger_webhook_authn::{KeyPair, signature};
use ledger_webhook_keystore::Credentials;

use crate::error::{HttpKeySourceError, Result};

/// `Access-Id` header name.
pub const ACCESS_ID_HEADER: &str = "Access-Id";

/// `Access-Time` header name.
pub const ACCESS_TIME_HEADER: &str = "Access-Time";

/// `Access-Signature` header name.
pub const ACCESS_SIGNATURE_HEADER: &str = "Access-Signature";

/// Signed access headers for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessHeaders {
    /// `Access-Id` value.
    pub access_id: String,
    /// `Access-Time` value.
    pub access_time: String,
    /// `Access-Signature` value.
    pub access_signature: String,
}

impl AccessHeaders {
    /// Returns the exact message the signature covers.
    #[must_use]
    pub fn signed_message(&self, body: &str) -> String {
        signed_message(&self.access_id, &self.access_time, body)
    }
}

fn signed_message(access_id: &str, access_time: &str, body: &str) -> String {
    format!("{access_id}:{access_time}:{body}")
}

/// Signs a request made at `now` with `body` using `credentials`.
///
/// # Errors
///
/// Returns [`HttpKeySourceError::Signing`] if the credentials' private key
/// cannot be parsed.
pub fn sign_request(
    credentials: &Credentials,
    now: DateTime<Utc>,
    body: &str,
) -> Result<AccessHeaders> {
    let signing_key = KeyPair::from_private_key_pem(credentials.private_key_pem())
        .and_then(|pair| pair.signing_key())
        .map_err(|e| HttpKeySourceError::Signing(e.to_string()))?;

    let access_id = credentials.access_id().to_string();
    let access_time = now.timestamp().to_string();
    let access_signature =
        signature::sign(&signed_message(&access_id, &access_time, body), &signing_key);

    Ok(AccessHeaders { access_id, access_time, access_signature })
}
