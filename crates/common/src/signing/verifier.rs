//! Signature verification.
//!
//! Verification is a boolean gate: malformed keys, signatures or messages
//! yield `false` and are never reported as errors.

use base64::{engine::general_purpose, Engine};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use serde::{Deserialize, Serialize};

use crate::signing::discovery::DiscoveryDocument;
use crate::signing::hasher::digest_hex;
use crate::signing::headers::SignatureHeaders;
use crate::signing::message::build_message;

fn parse_verifying_key(public_key_hex: &str) -> Option<VerifyingKey> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = hex::decode(public_key_hex).ok()?.try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

fn parse_signature(signature_b64: &str) -> Option<Signature> {
    let bytes: [u8; SIGNATURE_LENGTH] = general_purpose::STANDARD
        .decode(signature_b64)
        .ok()?
        .try_into()
        .ok()?;
    Some(Signature::from_bytes(&bytes))
}

/// Verify a base64 Ed25519 signature over `message` with a hex public key.
#[must_use]
pub fn verify_signature(public_key_hex: &str, message: &str, signature_b64: &str) -> bool {
    verify_signature_bytes(public_key_hex, message.as_bytes(), signature_b64)
}

/// Byte-oriented variant of [`verify_signature`].
#[must_use]
pub fn verify_signature_bytes(public_key_hex: &str, message: &[u8], signature_b64: &str) -> bool {
    let Some(verifying_key) = parse_verifying_key(public_key_hex) else {
        return false;
    };
    let Some(signature) = parse_signature(signature_b64) else {
        return false;
    };

    verifying_key.verify(message, &signature).is_ok()
}

/// Recompute digests and the canonical message for an exchange, then verify.
#[must_use]
pub fn verify_exchange(
    public_key_hex: &str,
    request: &[u8],
    response: &[u8],
    timestamp: &str,
    signature_b64: &str,
) -> bool {
    let message = build_message(&digest_hex(request), &digest_hex(response), timestamp);
    verify_signature(public_key_hex, &message, signature_b64)
}

/// Outcome of checking a provider signature against its published keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVerification {
    pub verified: bool,
    pub key_id: String,
    pub signature_timestamp: String,
}

/// Verify a provider signature using the keys from its discovery document.
///
/// Returns `None` when the document does not publish `key_id`: the signature
/// cannot be checked, which is not the same as being invalid.
#[must_use]
pub fn verify_with_discovery(
    document: &DiscoveryDocument,
    request_hash: &str,
    response_hash: &str,
    headers: &SignatureHeaders,
) -> Option<ProviderVerification> {
    let key = document.find_key(&headers.key_id)?;
    let message = build_message(request_hash, response_hash, &headers.timestamp);

    Some(ProviderVerification {
        verified: verify_signature(&key.public_key, &message, &headers.signature),
        key_id: headers.key_id.clone(),
        signature_timestamp: headers.timestamp.clone(),
    })
}
