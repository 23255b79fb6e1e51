//! Canonical message construction.
//!
//! The message layout is the interoperability contract with every other
//! IOProof implementation. It must stay byte-for-byte identical:
//!
//! ```text
//! ioproof:v1:<request sha256 hex>|<response sha256 hex>|<timestamp>
//! ```

use crate::constants::MESSAGE_PREFIX;

/// Build the canonical message that gets signed and verified.
#[must_use]
pub fn build_message(request_hash: &str, response_hash: &str, timestamp: &str) -> String {
    let mut message = String::with_capacity(
        MESSAGE_PREFIX.len() + request_hash.len() + response_hash.len() + timestamp.len() + 2,
    );
    message.push_str(MESSAGE_PREFIX);
    message.push_str(request_hash);
    message.push('|');
    message.push_str(response_hash);
    message.push('|');
    message.push_str(timestamp);
    message
}
