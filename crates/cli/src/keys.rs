//! Key generation and provider setup.

use std::fs;
use std::path::Path;

use ioproof_common::settings::{DiscoverySettings, PublishedKey, Settings, SigningSettings};
use ioproof_common::signing::KeyPair;

use crate::error::CliError;
use crate::selftest;

const INTEGRATION_SNIPPET: &str = r#"
  Add to your server:
  ───────────────────

    use std::sync::Arc;
    use ioproof_common::interceptor::SigningInterceptor;
    use ioproof_common::settings::Settings;
    use ioproof_common::signing::discovery_response;

    let settings = Settings::from_file("ioproof.toml".as_ref())?;
    let interceptor = Arc::new(SigningInterceptor::new(settings.signer()?));

    // Per request:
    let response = interceptor.call(request, &handler).await;

    // GET /.well-known/ioproof.json
    let keys = discovery_response(
        &settings.discovery_document()?,
        settings.discovery.cache_max_age,
    )?;
"#;

fn generate(key_id: Option<String>) -> KeyPair {
    match key_id {
        Some(key_id) => KeyPair::generate_with_key_id(key_id),
        None => KeyPair::generate(),
    }
}

/// `.env` lines for a key pair.
#[must_use]
pub fn env_lines(pair: &KeyPair) -> String {
    format!(
        "IOPROOF_PRIVATE_KEY={}\nIOPROOF_PUBLIC_KEY={}\nIOPROOF_KEY_ID={}",
        pair.private_key, pair.public_key, pair.key_id
    )
}

/// Settings that sign with `pair` and publish its public key.
#[must_use]
pub fn settings_for(pair: &KeyPair) -> Settings {
    Settings {
        signing: SigningSettings {
            private_key: pair.private_key.clone(),
            key_id: pair.key_id.clone(),
        },
        discovery: DiscoverySettings {
            keys: vec![PublishedKey {
                kid: pair.key_id.clone(),
                public_key: pair.public_key.clone(),
            }],
            ..DiscoverySettings::default()
        },
    }
}

/// Write a settings file for `pair`. Existing files are never overwritten.
pub fn write_settings(pair: &KeyPair, output: &Path) -> Result<(), CliError> {
    if output.exists() {
        return Err(CliError::Config(format!(
            "Refusing to overwrite existing file: {}",
            output.display()
        )));
    }

    let toml = settings_for(pair).to_toml()?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(output, toml)?;
    log::info!("Settings written to {}", output.display());
    Ok(())
}

/// `ioproof keygen`: print a fresh key pair as environment variables.
pub fn keygen(key_id: Option<String>) {
    let pair = generate(key_id);
    println!("\n{}\n", env_lines(&pair));
}

/// `ioproof init`: generate keys, show how to wire them up and check them.
pub fn init(key_id: Option<String>, output: Option<&Path>) -> Result<(), CliError> {
    println!("\n  IOProof Provider Signing Setup");
    println!("  {}\n", "=".repeat(34));

    let pair = generate(key_id);
    println!("  Generated Ed25519 keypair:\n");
    println!("  PUBLIC KEY:   {}", pair.public_key);
    println!("  PRIVATE KEY:  {}", pair.private_key);
    println!("  KEY ID:       {}\n", pair.key_id);

    println!("  Add to your .env:");
    println!("  ─────────────────");
    for line in env_lines(&pair).lines() {
        println!("  {line}");
    }

    if let Some(output) = output {
        write_settings(&pair, output)?;
        println!("\n  Settings written to: {}", output.display());
    }

    println!("{INTEGRATION_SNIPPET}");

    println!("  Verifying signature locally...");
    let report = selftest::run(&pair.private_key, &pair.public_key, &pair.key_id)?;
    println!("{}", report.summary());
    if !report.verified {
        println!("  \u{2717} Signature verification failed!\n");
        return Err(CliError::VerificationFailed);
    }
    println!("  \u{2713} Signature verified successfully\n");
    println!("  Done! Your API responses will now be cryptographically signed.\n");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use validator::Validate;

    #[test]
    fn test_env_lines() {
        let pair = KeyPair::generate_with_key_id("2026-02");
        let lines: Vec<String> = env_lines(&pair).lines().map(str::to_string).collect();

        assert_eq!(
            lines,
            vec![
                format!("IOPROOF_PRIVATE_KEY={}", pair.private_key),
                format!("IOPROOF_PUBLIC_KEY={}", pair.public_key),
                "IOPROOF_KEY_ID=2026-02".to_string(),
            ]
        );
    }

    #[test]
    fn test_generate_honours_key_id() {
        assert_eq!(generate(Some("prod".into())).key_id, "prod");
        assert_eq!(generate(None).key_id.len(), "2026-02".len());
    }

    #[test]
    fn test_write_settings_roundtrip() {
        let dir = TempDir::new().expect("should create temp dir");
        let output = dir.path().join("ioproof.toml");
        let pair = KeyPair::generate_with_key_id("2026-02");

        write_settings(&pair, &output).expect("should write settings");

        let settings = Settings::from_file(&output).expect("should load written settings");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.signing.key_id, "2026-02");

        let signer = settings.signer().expect("should build signer");
        assert_eq!(signer.public_key_hex(), pair.public_key);

        let document = settings
            .discovery_document()
            .expect("should build discovery document");
        assert_eq!(document.keys.len(), 1);
        assert_eq!(document.keys[0].public_key, pair.public_key);
    }

    #[test]
    fn test_write_settings_creates_parent_dirs() {
        let dir = TempDir::new().expect("should create temp dir");
        let output = dir.path().join("nested").join("deep").join("ioproof.toml");

        write_settings(&KeyPair::generate(), &output).expect("should write settings");
        assert!(output.exists());
    }

    #[test]
    fn test_write_settings_refuses_overwrite() {
        let dir = TempDir::new().expect("should create temp dir");
        let output = dir.path().join("ioproof.toml");
        fs::write(&output, "keep me").expect("should write file");

        let result = write_settings(&KeyPair::generate(), &output);
        assert!(matches!(result, Err(CliError::Config(_))));
        assert_eq!(
            fs::read_to_string(&output).expect("should read file"),
            "keep me"
        );
    }

    #[test]
    fn test_init_writes_settings() {
        let dir = TempDir::new().expect("should create temp dir");
        let output = dir.path().join("ioproof.toml");

        init(Some("2026-03".into()), Some(&output)).expect("init should succeed");

        let settings = Settings::from_file(&output).expect("should load written settings");
        assert_eq!(settings.signing.key_id, "2026-03");
    }
}
