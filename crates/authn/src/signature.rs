//! ECDSA (secp256k1 / SHA-256) signature verification.
//!
//! The remote service signs the exact webhook body and sends the signature
//! base64-encoded (standard alphabet) in ASN.1 DER form. Verification is:
//!
//! ```text
//! base64 → DER → (r, s) → normalize s → ECDSA-SHA256 verify(payload bytes)
//! ```
//!
//! [`verify`] returns a typed error so the caller can log why a signature
//! failed; [`is_valid`] collapses that into the boolean contract used by the
//! event parser. Neither panics on malformed input.

use base64::{Engine, engine::general_purpose::STANDARD};
use k256::ecdsa::{
    Signature, SigningKey, VerifyingKey,
    signature::{Signer, Verifier},
};
use thiserror::Error;

/// Name of the HTTP header carrying the webhook signature.
pub const DIGITAL_SIGNATURE_HEADER: &str = "Digital-Signature";

/// Reasons a signature is not valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The signature is not valid base64.
    #[error("signature is not valid base64: {0}")]
    Encoding(String),

    /// The decoded bytes are not a DER-encoded ECDSA signature.
    #[error("signature is not a DER-encoded ECDSA signature: {0}")]
    Format(String),

    /// The signature is well-formed but does not match payload and key.
    #[error("signature does not match content")]
    Mismatch,
}

/// Decodes a base64 DER signature into its `(r, s)` form.
///
/// High-S signatures are normalized to low-S, since the remote signer does
/// not restrict itself to low-S values and verification of the normalized
/// form is equivalent.
///
/// # Errors
///
/// Returns [`SignatureError::Encoding`] or [`SignatureError::Format`].
pub fn decode_signature(signature_base64: &str) -> Result<Signature, SignatureError> {
    let der = STANDARD
        .decode(signature_base64.trim())
        .map_err(|e| SignatureError::Encoding(e.to_string()))?;
    let signature = Signature::from_der(&der).map_err(|e| SignatureError::Format(e.to_string()))?;
    Ok(signature.normalize_s().unwrap_or(signature))
}

/// Verifies `signature_base64` over the bytes of `payload` with `key`.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing why the signature is not valid.
pub fn verify(
    payload: &str,
    signature_base64: &str,
    key: &VerifyingKey,
) -> Result<(), SignatureError> {
    let signature = decode_signature(signature_base64)?;
    key.verify(payload.as_bytes(), &signature).map_err(|_| SignatureError::Mismatch)
}

/// Returns `true` only if the signature is valid for this exact payload and key.
///
/// Malformed signatures are reported as `false`, never as an error.
#[must_use]
pub fn is_valid(payload: &str, signature_base64: &str, key: &VerifyingKey) -> bool {
    match verify(payload, signature_base64, key) {
        Ok(()) => true,
        Err(err) => {
            tracing::trace!(error = %err, "signature rejected");
            false
        },
    }
}

/// Signs `payload` and returns the base64 DER signature.
///
/// Produces signatures in the same format the remote service sends, and the
/// format it expects on authenticated requests.
#[must_use]
pub fn sign(payload: &str, key: &SigningKey) -> String {
    let signature: Signature = key.sign(payload.as_bytes());
    STANDARD.encode(signature.to_der().as_bytes())
}
