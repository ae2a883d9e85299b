//! Public key record as returned by the remote key listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the remote service's public-key listing.
///
/// The remote service signs every webhook it delivers with the private half
/// of its most recent key. Listings are returned newest first, so the first
/// record of a `limit=1` listing is the key currently in use.
///
/// # Example
///
/// ```
/// use ledger_webhook_keystore::PublicKeyRecord;
///
/// let record = PublicKeyRecord::builder()
///     .id("5715709195714560")
///     .content("-----BEGIN PUBLIC KEY-----\n...\n-----END PUBLIC KEY-----\n")
///     .build();
///
/// assert!(record.content.starts_with("-----BEGIN PUBLIC KEY-----"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyRecord {
    /// Remote identifier of the key; empty when the listing omits it.
    #[serde(default)]
    #[builder(into, default)]
    pub id: String,

    /// SubjectPublicKeyInfo PEM text of the secp256k1 public key.
    #[builder(into)]
    pub content: String,

    /// When the remote service issued the key, if the listing says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}
