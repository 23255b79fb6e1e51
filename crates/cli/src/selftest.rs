//! Local sign-and-verify check for a provider key pair.

use ioproof_common::signing::{verify_signature, ResponseSigner, SignResult};

use crate::error::CliError;

pub const SAMPLE_REQUEST: &str =
    r#"{"model":"gpt-4o","messages":[{"role":"user","content":"test"}]}"#;
pub const SAMPLE_RESPONSE: &str = r#"{"choices":[{"message":{"content":"Hello!"}}]}"#;

/// Key id used when none is supplied.
pub const DEFAULT_TEST_KEY_ID: &str = "test";

#[derive(Debug)]
pub struct SelfTestReport {
    pub result: SignResult,
    pub verified: bool,
}

impl SelfTestReport {
    /// Human-readable summary, one field per line.
    #[must_use]
    pub fn summary(&self) -> String {
        let preview: String = self.result.signature.chars().take(32).collect();
        format!(
            "  Request hash:  {}\n  Response hash: {}\n  Signature:     {}...\n  Timestamp:     {}",
            self.result.request_hash, self.result.response_hash, preview, self.result.timestamp
        )
    }
}

/// Sign the sample exchange with `private_key` and verify it against
/// `public_key`.
///
/// A key pair that does not match is reported as `verified: false`, not as an
/// error.
pub fn run(private_key: &str, public_key: &str, key_id: &str) -> Result<SelfTestReport, CliError> {
    let signer = ResponseSigner::from_hex(private_key, key_id)?;
    let result = signer.sign(SAMPLE_REQUEST.as_bytes(), SAMPLE_RESPONSE.as_bytes());
    let verified = verify_signature(public_key, &result.message, &result.signature);

    log::debug!(
        "Self-test signed with key {} at {}: verified={}",
        result.key_id,
        result.timestamp,
        verified
    );

    Ok(SelfTestReport { result, verified })
}

/// `ioproof test`: check the configured key pair end to end.
pub fn test(
    private_key: Option<&str>,
    public_key: Option<&str>,
    key_id: &str,
) -> Result<(), CliError> {
    let (Some(private_key), Some(public_key)) = (private_key, public_key) else {
        return Err(CliError::Config(
            "Missing IOPROOF_PRIVATE_KEY and/or IOPROOF_PUBLIC_KEY. Run `ioproof init` to generate them."
                .into(),
        ));
    };

    println!("\n  IOProof Signature Test");
    println!("  {}\n", "=".repeat(22));

    let report = run(private_key, public_key, key_id)?;
    println!("{}", report.summary());

    if report.verified {
        println!("\n  \u{2713} All checks passed\n");
        Ok(())
    } else {
        println!("\n  \u{2717} Test failed\n");
        Err(CliError::VerificationFailed)
    }
}
