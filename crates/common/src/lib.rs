//! Provider-side signing for IOProof.
//!
//! This crate lets an API provider attest to what it served: every
//! request/response exchange is hashed, bound to a timestamp and signed with
//! Ed25519, and the signature travels back to the client in `X-IOProof-*`
//! headers. Verifiers fetch the provider's public keys from
//! `/.well-known/ioproof.json`.
//!
//! # Modules
//!
//! - [`constants`]: Header names, the message prefix and other fixed values
//! - [`error`]: Error types and error handling utilities
//! - [`interceptor`]: Captures handler output and attaches signature headers
//! - [`logging`]: Logger setup shared by binaries
//! - [`settings`]: Configuration management and validation
//! - [`signing`]: Hashing, message construction, signing, verification and discovery

pub mod constants;
pub mod error;
pub mod interceptor;
pub mod logging;
pub mod settings;
pub mod signing;
