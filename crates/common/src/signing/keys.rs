//! Ed25519 key pair generation.

use std::fmt;

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use error_stack::Report;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::IoProofError;
use crate::signing::discovery::KeyEntry;
use crate::signing::signer::ResponseSigner;

/// Freshly generated key material, hex encoded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// 32-byte public key as lowercase hex.
    pub public_key: String,
    /// 32-byte seed as lowercase hex.
    pub private_key: String,
    /// Suggested identifier, `YYYY-MM` unless overridden.
    pub key_id: String,
}

/// Advisory `YYYY-MM` key id for the month containing `now`.
#[must_use]
pub fn month_key_id(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

impl KeyPair {
    /// Generate a new key pair with a key id for the current UTC month.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with_key_id(month_key_id(Utc::now()))
    }

    /// Generate a new key pair with a caller-chosen key id.
    #[must_use]
    pub fn generate_with_key_id(key_id: impl Into<String>) -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);

        Self {
            public_key: hex::encode(signing_key.verifying_key().as_bytes()),
            private_key: hex::encode(signing_key.to_bytes()),
            key_id: key_id.into(),
        }
    }

    /// Signer for this key pair.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::InvalidKeyMaterial`] if `private_key` has been
    /// replaced with something that is not a 32-byte hex seed.
    pub fn signer(&self) -> Result<ResponseSigner, Report<IoProofError>> {
        ResponseSigner::from_hex(&self.private_key, self.key_id.clone())
    }

    /// Discovery entry publishing the public half.
    #[must_use]
    pub fn discovery_entry(&self) -> KeyEntry {
        KeyEntry::new(self.key_id.clone(), self.public_key.clone())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("key_id", &self.key_id)
            .finish()
    }
}
