//! Discovery document for IOProof providers.
//!
//! Providers publish their public keys at `/.well-known/ioproof.json` so that
//! verifiers can look up the key named in `X-IOProof-Key-Id`:
//!
//! ```json
//! { "version": "1.0", "keys": [ { "kid": "2026-02", "algorithm": "ed25519", "public_key": "<hex>" } ] }
//! ```
//!
//! Rendering performs no validation of key material.

use bytes::Bytes;
use error_stack::{Report, ResultExt};
use http::{header, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::constants::{DISCOVERY_VERSION, SIGNATURE_ALGORITHM, WELL_KNOWN_PATH};
use crate::error::IoProofError;

/// A published key as supplied by the integrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub kid: String,
    /// Public key as hex.
    pub public_key: String,
}

impl KeyEntry {
    #[must_use]
    pub fn new(kid: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            public_key: public_key.into(),
        }
    }
}

/// A key as it appears in the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryKey {
    pub kid: String,
    pub algorithm: String,
    pub public_key: String,
}

/// Main discovery document returned by `.well-known/ioproof.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    /// Version of the discovery document format
    pub version: String,

    /// Public keys for signature verification, in publication order
    pub keys: Vec<DiscoveryKey>,
}

impl DiscoveryDocument {
    /// Creates a new discovery document from the given entries
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = KeyEntry>) -> Self {
        Self {
            version: DISCOVERY_VERSION.to_string(),
            keys: entries
                .into_iter()
                .map(|entry| DiscoveryKey {
                    kid: entry.kid,
                    algorithm: SIGNATURE_ALGORITHM.to_string(),
                    public_key: entry.public_key,
                })
                .collect(),
        }
    }

    /// Look up a key by its identifier.
    #[must_use]
    pub fn find_key(&self, kid: &str) -> Option<&DiscoveryKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    /// Serialize the document to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::Serialization`] if the document cannot be encoded.
    pub fn to_json(&self) -> Result<Vec<u8>, Report<IoProofError>> {
        serde_json::to_vec(self).change_context(IoProofError::serialization(
            "Failed to serialize discovery document",
        ))
    }

    /// Parse a discovery document fetched from a provider.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::Serialization`] if `bytes` is not a valid document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Report<IoProofError>> {
        serde_json::from_slice(bytes).change_context(IoProofError::serialization(
            "Failed to parse discovery document",
        ))
    }
}

/// Build the `.well-known/ioproof.json` response for `document`.
///
/// The document is cacheable by verifiers for `max_age` seconds.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn discovery_response(
    document: &DiscoveryDocument,
    max_age: u32,
) -> Result<Response<Bytes>, Report<IoProofError>> {
    let body = document.to_json()?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CACHE_CONTROL, format!("public, max-age={max_age}"))
        .body(Bytes::from(body))
        .change_context(IoProofError::serialization(
            "Failed to build discovery response",
        ))
}

/// Answer `GET /.well-known/ioproof.json`.
///
/// Returns `None` for any other request so the caller can route it onward.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn handle_discovery<B>(
    request: &Request<B>,
    document: &DiscoveryDocument,
    max_age: u32,
) -> Option<Result<Response<Bytes>, Report<IoProofError>>> {
    if request.method() != Method::GET || request.uri().path() != WELL_KNOWN_PATH {
        return None;
    }

    log::debug!("Serving discovery document with {} keys", document.keys.len());
    Some(discovery_response(document, max_age))
}
