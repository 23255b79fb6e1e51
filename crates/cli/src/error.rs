//! CLI error types.

use std::fmt;

use error_stack::Report;
use ioproof_common::error::IoProofError;

#[derive(Debug)]
pub enum CliError {
    /// Configuration file or argument error
    Config(String),
    /// Key material could not be used
    Key(String),
    /// IO error
    Io(std::io::Error),
    /// JSON encoding error
    Json(String),
    /// A signature did not verify
    VerificationFailed,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Key(msg) => write!(f, "Key error: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
            CliError::VerificationFailed => write!(f, "Signature verification failed"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err.to_string())
    }
}

impl From<Report<IoProofError>> for CliError {
    fn from(report: Report<IoProofError>) -> Self {
        log::debug!("{report:?}");

        // `{:#}` renders every context in the chain, outermost first.
        let chain = format!("{report:#}");
        let top = report.current_context().to_string();
        let causes = chain.strip_prefix(top.as_str()).unwrap_or_default();

        match report.current_context() {
            IoProofError::InvalidKeyMaterial { message } => {
                CliError::Key(format!("{message}{causes}"))
            }
            IoProofError::Serialization { message } => CliError::Json(format!("{message}{causes}")),
            IoProofError::Configuration { message } | IoProofError::SigningFailure { message } => {
                CliError::Config(format!("{message}{causes}"))
            }
        }
    }
}
