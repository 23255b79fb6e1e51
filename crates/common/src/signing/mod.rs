//! Response signing utilities.
//!
//! This module provides Ed25519 signing and verification of HTTP
//! request/response exchanges over the canonical `ioproof:v1` message,
//! together with key generation and the discovery document.

pub mod discovery;
pub mod hasher;
pub mod headers;
pub mod keys;
pub mod message;
pub mod signer;
pub mod verifier;

pub use discovery::*;
pub use hasher::*;
pub use headers::*;
pub use keys::*;
pub use message::*;
pub use signer::*;
pub use verifier::*;

/// Cross-implementation test vector shared with the other IOProof provider
/// libraries. Ed25519 is deterministic, so every implementation must
/// reproduce `SIGNATURE` exactly.
#[cfg(test)]
pub(crate) mod test_vector {
    pub const PRIVATE_KEY: &str =
        "4c830864429505b175ea2fd113367a2b0671a24bd78a827fa24377c66d66b64f";
    pub const PUBLIC_KEY: &str =
        "24ab368303288a10e15205fa54f15d0761b7cd3363bb017a2d4afaec1db14703";
    pub const KEY_ID: &str = "test-2026";
    pub const REQUEST_BODY: &str =
        r#"{"model":"gpt-4o","messages":[{"role":"user","content":"Hello"}]}"#;
    pub const RESPONSE_BODY: &str = r#"{"choices":[{"message":{"content":"Hi there!"}}]}"#;
    pub const TIMESTAMP: &str = "2026-01-15T12:00:00.000Z";
    pub const REQUEST_HASH: &str =
        "32b417167ac89a4a2469d959dcedebf471e94058668ae4c3dc4c84a8c80fbb02";
    pub const RESPONSE_HASH: &str =
        "018600114fec1d6995a43c74c6c26b97a4f65bd7a8d6afaf55af8fcd9deabfbf";
    pub const MESSAGE: &str = "ioproof:v1:32b417167ac89a4a2469d959dcedebf471e94058668ae4c3dc4c84a8c80fbb02|018600114fec1d6995a43c74c6c26b97a4f65bd7a8d6afaf55af8fcd9deabfbf|2026-01-15T12:00:00.000Z";
    pub const SIGNATURE: &str =
        "kz5LDmarkNtpwNa4up0Yvb+1+r/C7QIKr7R3WPvDEtdl5TQQp9bj7bG4LvcLRi+Lan1jEv0KugLC6q3ZVbnXCg==";
}
