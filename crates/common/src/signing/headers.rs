//! `X-IOProof-*` response headers.

use error_stack::Report;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::constants::{HEADER_X_IOPROOF_KEY_ID, HEADER_X_IOPROOF_SIG, HEADER_X_IOPROOF_SIG_TS};
use crate::error::IoProofError;
use crate::signing::signer::SignResult;

/// The three signature values attached to a signed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeaders {
    pub signature: String,
    pub timestamp: String,
    pub key_id: String,
}

impl From<SignResult> for SignatureHeaders {
    fn from(result: SignResult) -> Self {
        Self {
            signature: result.signature,
            timestamp: result.timestamp,
            key_id: result.key_id,
        }
    }
}

impl SignatureHeaders {
    /// Convert to `(name, value)` pairs ready to be set on a response.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::SigningFailure`] if a value cannot be carried in
    /// an HTTP header, e.g. a key id containing control characters.
    pub fn to_header_values(&self) -> Result<[(HeaderName, HeaderValue); 3], Report<IoProofError>> {
        let value = |name: &HeaderName, raw: &str| {
            HeaderValue::from_str(raw).map_err(|e| {
                Report::new(IoProofError::signing(format!(
                    "invalid value for header {name}: {e}"
                )))
            })
        };

        Ok([
            (
                HEADER_X_IOPROOF_SIG,
                value(&HEADER_X_IOPROOF_SIG, &self.signature)?,
            ),
            (
                HEADER_X_IOPROOF_SIG_TS,
                value(&HEADER_X_IOPROOF_SIG_TS, &self.timestamp)?,
            ),
            (
                HEADER_X_IOPROOF_KEY_ID,
                value(&HEADER_X_IOPROOF_KEY_ID, &self.key_id)?,
            ),
        ])
    }

    /// Set all three headers, replacing existing values.
    ///
    /// Nothing is written unless every value is valid.
    ///
    /// # Errors
    ///
    /// See [`SignatureHeaders::to_header_values`].
    pub fn insert_into(&self, headers: &mut HeaderMap) -> Result<(), Report<IoProofError>> {
        for (name, value) in self.to_header_values()? {
            headers.insert(name, value);
        }
        Ok(())
    }

    /// Extract signature values from response headers.
    ///
    /// Returns `None` unless all three headers are present and valid UTF-8.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: HeaderName| -> Option<String> {
            headers.get(name)?.to_str().ok().map(str::to_string)
        };

        Some(Self {
            signature: get(HEADER_X_IOPROOF_SIG)?,
            timestamp: get(HEADER_X_IOPROOF_SIG_TS)?,
            key_id: get(HEADER_X_IOPROOF_KEY_ID)?,
        })
    }
}
