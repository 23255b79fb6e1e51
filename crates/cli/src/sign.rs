//! One-off signing, verification and discovery rendering.

use std::fs;
use std::path::{Path, PathBuf};

use ioproof_common::settings::Settings;
use ioproof_common::signing::{verify_signature, ResponseSigner, SignResult};

use crate::error::CliError;

/// Where the signing key comes from.
#[derive(Debug)]
pub enum KeySource {
    Config(PathBuf),
    Inline { private_key: String, key_id: String },
}

impl KeySource {
    /// Pick a key source from the `sign` arguments. `--config` wins.
    pub fn from_args(
        config: Option<PathBuf>,
        private_key: Option<String>,
        key_id: Option<String>,
    ) -> Result<Self, CliError> {
        match (config, private_key, key_id) {
            (Some(path), _, _) => Ok(KeySource::Config(path)),
            (None, Some(private_key), Some(key_id)) => Ok(KeySource::Inline {
                private_key,
                key_id,
            }),
            _ => Err(CliError::Config(
                "Either --config or both --private-key and --key-id are required".into(),
            )),
        }
    }

    fn signer(&self) -> Result<ResponseSigner, CliError> {
        let signer = match self {
            KeySource::Config(path) => Settings::from_file(path)?.signer()?,
            KeySource::Inline {
                private_key,
                key_id,
            } => ResponseSigner::from_hex(private_key, key_id.clone())?,
        };
        Ok(signer)
    }
}

fn read_body(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) => Ok(fs::read(path)?),
        None => Ok(Vec::new()),
    }
}

/// Sign the bodies read from `request` and `response`. A missing file
/// argument signs an empty body.
pub fn sign_files(
    source: &KeySource,
    request: Option<&Path>,
    response: Option<&Path>,
    timestamp: Option<&str>,
) -> Result<SignResult, CliError> {
    let signer = source.signer()?;
    let request = read_body(request)?;
    let response = read_body(response)?;

    let result = match timestamp {
        Some(timestamp) => signer.sign_with_timestamp(&request, &response, timestamp),
        None => signer.sign(&request, &response),
    };
    log::debug!("Signed exchange with key {}", result.key_id);
    Ok(result)
}

/// `ioproof sign`: print the signing result as JSON.
pub fn sign(
    source: &KeySource,
    request: Option<&Path>,
    response: Option<&Path>,
    timestamp: Option<&str>,
) -> Result<(), CliError> {
    let result = sign_files(source, request, response, timestamp)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// `ioproof verify`: check a signature over a canonical message.
pub fn verify(public_key: &str, message: &str, signature: &str) -> Result<(), CliError> {
    if verify_signature(public_key, message, signature) {
        println!("valid");
        Ok(())
    } else {
        println!("invalid");
        Err(CliError::VerificationFailed)
    }
}

/// Discovery document JSON for the settings at `config`.
pub fn render_well_known(config: &Path) -> Result<String, CliError> {
    let settings = Settings::from_file(config)?;
    let document = settings.discovery_document()?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// `ioproof well-known`: print the discovery document.
pub fn well_known(config: &Path) -> Result<(), CliError> {
    println!("{}", render_well_known(config)?);
    Ok(())
}
