//! Response signing.
//!
//! A [`ResponseSigner`] holds an Ed25519 signing key derived from a 32-byte
//! seed and signs request/response pairs over the canonical message. It is
//! immutable after construction and can be shared across threads freely.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine};
use chrono::{SecondsFormat, Utc};
use ed25519_dalek::{Signer as Ed25519Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::IoProofError;
use crate::signing::discovery::KeyEntry;
use crate::signing::hasher::digest_hex;
use crate::signing::message::build_message;

/// Output of a single signing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResult {
    /// Base64 (standard, padded) Ed25519 signature.
    pub signature: String,
    /// UTC timestamp embedded in the signed message.
    pub timestamp: String,
    pub key_id: String,
    /// SHA-256 hex of the request body.
    pub request_hash: String,
    /// SHA-256 hex of the response body.
    pub response_hash: String,
    /// The exact message that was signed.
    pub message: String,
}

/// Anything that can attest to a request/response exchange.
///
/// [`ResponseSigner`] never fails, but signers backed by remote key services
/// can, which is why the interceptor treats the result as fallible.
pub trait ExchangeSigner {
    /// Identifier of the key used for signing.
    fn key_id(&self) -> &str;

    /// Sign a request/response pair at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::SigningFailure`] if no signature could be produced.
    fn sign_exchange(
        &self,
        request: &[u8],
        response: &[u8],
    ) -> Result<SignResult, Report<IoProofError>>;
}

/// Current UTC time as `YYYY-MM-DDTHH:mm:ss.sssZ`.
#[must_use]
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_seed_hex(
    private_key_hex: &str,
) -> Result<[u8; SECRET_KEY_LENGTH], Report<IoProofError>> {
    if private_key_hex.is_empty() {
        return Err(Report::new(IoProofError::invalid_key(
            "private key is empty",
        )));
    }

    let bytes = hex::decode(private_key_hex).map_err(|e| {
        Report::new(IoProofError::invalid_key(format!(
            "private key is not valid hex: {e}"
        )))
    })?;

    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        Report::new(IoProofError::invalid_key(format!(
            "private key must be {SECRET_KEY_LENGTH} bytes, got {len}"
        )))
    })
}

/// Ed25519 signer for request/response exchanges.
pub struct ResponseSigner {
    key: SigningKey,
    kid: String,
}

impl ResponseSigner {
    /// Create a signer from a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH], kid: impl Into<String>) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
            kid: kid.into(),
        }
    }

    /// Create a signer from a hex-encoded 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::InvalidKeyMaterial`] if the seed is empty, not
    /// valid hex, or not exactly 32 bytes.
    pub fn from_hex(
        private_key_hex: &str,
        kid: impl Into<String>,
    ) -> Result<Self, Report<IoProofError>> {
        let seed = parse_seed_hex(private_key_hex)?;
        Ok(Self::from_seed(&seed, kid))
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.kid
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Public key as lowercase hex.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }

    /// Discovery entry publishing this signer's public key.
    #[must_use]
    pub fn discovery_entry(&self) -> KeyEntry {
        KeyEntry::new(self.kid.clone(), self.public_key_hex())
    }

    /// Sign a request/response pair using the current wall-clock time.
    #[must_use]
    pub fn sign(&self, request: &[u8], response: &[u8]) -> SignResult {
        self.sign_with_timestamp(request, response, &current_timestamp())
    }

    /// Sign a request/response pair with a caller-supplied timestamp.
    ///
    /// Ed25519 is deterministic, so the same seed, bodies and timestamp always
    /// produce the same signature.
    #[must_use]
    pub fn sign_with_timestamp(
        &self,
        request: &[u8],
        response: &[u8],
        timestamp: &str,
    ) -> SignResult {
        let request_hash = digest_hex(request);
        let response_hash = digest_hex(response);
        let message = build_message(&request_hash, &response_hash, timestamp);

        let signature_bytes = self.key.sign(message.as_bytes()).to_bytes();

        SignResult {
            signature: general_purpose::STANDARD.encode(signature_bytes),
            timestamp: timestamp.to_string(),
            key_id: self.kid.clone(),
            request_hash,
            response_hash,
            message,
        }
    }
}

impl ExchangeSigner for ResponseSigner {
    fn key_id(&self) -> &str {
        &self.kid
    }

    fn sign_exchange(
        &self,
        request: &[u8],
        response: &[u8],
    ) -> Result<SignResult, Report<IoProofError>> {
        Ok(self.sign(request, response))
    }
}

impl<T: ExchangeSigner + ?Sized> ExchangeSigner for Arc<T> {
    fn key_id(&self) -> &str {
        (**self).key_id()
    }

    fn sign_exchange(
        &self,
        request: &[u8],
        response: &[u8],
    ) -> Result<SignResult, Report<IoProofError>> {
        (**self).sign_exchange(request, response)
    }
}

impl fmt::Debug for ResponseSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSigner")
            .field("kid", &self.kid)
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
