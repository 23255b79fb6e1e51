use http::header::HeaderName;

/// Base64 Ed25519 signature over the canonical message.
pub const HEADER_X_IOPROOF_SIG: HeaderName = HeaderName::from_static("x-ioproof-sig");
/// Timestamp embedded in the canonical message.
pub const HEADER_X_IOPROOF_SIG_TS: HeaderName = HeaderName::from_static("x-ioproof-sig-ts");
/// Identifier of the key that produced the signature.
pub const HEADER_X_IOPROOF_KEY_ID: HeaderName = HeaderName::from_static("x-ioproof-key-id");

/// Version prefix of every canonical message.
pub const MESSAGE_PREFIX: &str = "ioproof:v1:";

/// Algorithm name published in the discovery document.
pub const SIGNATURE_ALGORITHM: &str = "ed25519";

/// Discovery document format version.
pub const DISCOVERY_VERSION: &str = "1.0";

/// Path at which providers publish their discovery document.
pub const WELL_KNOWN_PATH: &str = "/.well-known/ioproof.json";

/// Default `Cache-Control` max-age for the discovery document, in seconds.
pub const DEFAULT_DISCOVERY_MAX_AGE: u32 = 3600;

/// Prefix for environment variable overrides of settings.
pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "IOPROOF";
/// Separator between nested settings keys in environment variables.
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";
