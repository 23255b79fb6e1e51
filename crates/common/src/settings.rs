//! Provider signing configuration.
//!
//! Settings are read from TOML and merged with environment variables prefixed
//! with `IOPROOF__`. For example `IOPROOF__SIGNING__PRIVATE_KEY` overrides
//! `signing.private_key`, which keeps the seed out of files checked into
//! source control.

use std::fmt;
use std::fs;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::constants::{
    DEFAULT_DISCOVERY_MAX_AGE, ENVIRONMENT_VARIABLE_PREFIX, ENVIRONMENT_VARIABLE_SEPARATOR,
};
use crate::error::IoProofError;
use crate::signing::{DiscoveryDocument, KeyEntry, ResponseSigner};

fn validate_hex_key(value: &str) -> Result<(), ValidationError> {
    if value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_key").with_message("expected 64 hex characters".into()))
    }
}

#[derive(Clone, Deserialize, Serialize, Validate)]
pub struct SigningSettings {
    /// Hex-encoded 32-byte Ed25519 seed.
    #[validate(custom(function = "validate_hex_key"))]
    pub private_key: String,
    #[validate(length(min = 1))]
    pub key_id: String,
}

impl fmt::Debug for SigningSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSettings")
            .field("private_key", &"<redacted>")
            .field("key_id", &self.key_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PublishedKey {
    #[validate(length(min = 1))]
    pub kid: String,
    /// Hex-encoded 32-byte Ed25519 public key.
    #[validate(custom(function = "validate_hex_key"))]
    pub public_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DiscoverySettings {
    /// `Cache-Control` max-age for the discovery document, in seconds.
    #[serde(default = "default_cache_max_age")]
    #[validate(range(min = 60, max = 86400))]
    pub cache_max_age: u32,

    /// Keys to publish. When empty, the signing key is published.
    #[serde(default)]
    #[validate(nested)]
    pub keys: Vec<PublishedKey>,
}

fn default_cache_max_age() -> u32 {
    DEFAULT_DISCOVERY_MAX_AGE
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            cache_max_age: default_cache_max_age(),
            keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub signing: SigningSettings,
    #[serde(default)]
    #[validate(nested)]
    pub discovery: DiscoverySettings,
}

impl Settings {
    /// Parse settings from a TOML string, applying `IOPROOF__*` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::Configuration`] if the TOML is invalid or
    /// required fields are missing.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<IoProofError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_VARIABLE_PREFIX)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        Self::from_toml_with_environment(toml_str, environment)
    }

    /// Parse settings from a TOML string, taking overrides from `environment`
    /// instead of the `IOPROOF__*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::Configuration`] if the TOML is invalid or
    /// required fields are missing.
    pub fn from_toml_with_environment(
        toml_str: &str,
        environment: Environment,
    ) -> Result<Self, Report<IoProofError>> {
        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(IoProofError::configuration("Failed to build configuration"))?;

        config
            .try_deserialize()
            .change_context(IoProofError::configuration("Failed to deserialize settings"))
    }

    /// Read, parse and validate settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::Configuration`] if the file cannot be read or
    /// the settings are invalid.
    pub fn from_file(path: &Path) -> Result<Self, Report<IoProofError>> {
        let content = fs::read_to_string(path).change_context(IoProofError::configuration(
            format!("Failed to read settings file {}", path.display()),
        ))?;

        let settings = Self::from_toml(&content)?;
        settings
            .validate()
            .change_context(IoProofError::configuration(format!(
                "Settings validation failed for {}",
                path.display()
            )))?;
        Ok(settings)
    }

    /// Build the configured signer.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::InvalidKeyMaterial`] if the private key is malformed.
    pub fn signer(&self) -> Result<ResponseSigner, Report<IoProofError>> {
        ResponseSigner::from_hex(&self.signing.private_key, self.signing.key_id.clone())
    }

    /// Discovery document for the configured keys.
    ///
    /// Publishes the signing key itself when no keys are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if no keys are configured and the private key is malformed.
    pub fn discovery_document(&self) -> Result<DiscoveryDocument, Report<IoProofError>> {
        if self.discovery.keys.is_empty() {
            return Ok(DiscoveryDocument::new([self.signer()?.discovery_entry()]));
        }

        Ok(DiscoveryDocument::new(self.discovery.keys.iter().map(
            |key| KeyEntry::new(key.kid.clone(), key.public_key.clone()),
        )))
    }

    /// Serialize the settings back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`IoProofError::Serialization`] if the settings cannot be encoded.
    pub fn to_toml(&self) -> Result<String, Report<IoProofError>> {
        toml::to_string_pretty(self)
            .change_context(IoProofError::serialization("Failed to serialize settings"))
    }
}
