//! Error types for the signing core.
//!
//! All fallible operations return [`error_stack::Report<IoProofError>`] so that
//! callers get the full context chain when something goes wrong. Signature
//! verification is deliberately not part of this taxonomy: a malformed
//! verification input is a plain `false`, never an error.

use derive_more::Display;

/// Errors raised by the IOProof signing core.
#[derive(Debug, Display)]
pub enum IoProofError {
    /// Private key material is absent, not hex, or the wrong length.
    #[display("Invalid key material: {message}")]
    InvalidKeyMaterial { message: String },

    /// A sign operation failed; the interceptor logs this and sends the
    /// response unsigned.
    #[display("Signing failure: {message}")]
    SigningFailure { message: String },

    /// Settings could not be loaded or failed validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// A document could not be encoded or decoded.
    #[display("Serialization error: {message}")]
    Serialization { message: String },
}

impl core::error::Error for IoProofError {}

impl IoProofError {
    pub(crate) fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKeyMaterial {
            message: message.into(),
        }
    }

    pub(crate) fn signing(message: impl Into<String>) -> Self {
        Self::SigningFailure {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}
