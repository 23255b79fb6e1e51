//! IOProof provider CLI.
//!
//! This tool provides commands for:
//! - Generating Ed25519 signing keys
//! - Setting up a provider with keys, settings and a local self-test
//! - Signing and verifying exchanges by hand
//! - Rendering the `.well-known/ioproof.json` discovery document

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use ioproof_common::logging::init_logger;

mod error;
mod keys;
mod selftest;
mod sign;

use error::CliError;
use sign::KeySource;

#[derive(Parser)]
#[command(name = "ioproof")]
#[command(about = "IOProof provider signing CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new Ed25519 keypair
    Keygen {
        /// Key identifier (default: current UTC month, YYYY-MM)
        #[arg(long)]
        key_id: Option<String>,
    },

    /// Generate keys and show setup instructions
    Init {
        /// Key identifier (default: current UTC month, YYYY-MM)
        #[arg(long)]
        key_id: Option<String>,

        /// Write a settings TOML file for the new keys
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify signing works with your current keys
    Test {
        /// Hex-encoded private key seed
        #[arg(long, env = "IOPROOF_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,

        /// Hex-encoded public key
        #[arg(long, env = "IOPROOF_PUBLIC_KEY")]
        public_key: Option<String>,

        /// Key identifier
        #[arg(long, env = "IOPROOF_KEY_ID", default_value = selftest::DEFAULT_TEST_KEY_ID)]
        key_id: String,
    },

    /// Sign a request/response pair and print the result as JSON
    Sign {
        /// Settings TOML file holding the signing key
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Hex-encoded private key seed (when no --config is given)
        #[arg(long)]
        private_key: Option<String>,

        /// Key identifier (when no --config is given)
        #[arg(long)]
        key_id: Option<String>,

        /// File holding the request body (default: empty body)
        #[arg(long)]
        request: Option<PathBuf>,

        /// File holding the response body (default: empty body)
        #[arg(long)]
        response: Option<PathBuf>,

        /// Timestamp to sign instead of the current time
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Verify a signature over a canonical message
    Verify {
        /// Hex-encoded public key
        #[arg(long)]
        public_key: String,

        /// Canonical message (`ioproof:v1:<req>|<res>|<timestamp>`)
        #[arg(long)]
        message: String,

        /// Base64-encoded signature
        #[arg(long)]
        signature: String,
    },

    /// Print the .well-known/ioproof.json discovery document
    WellKnown {
        /// Settings TOML file
        #[arg(long, short)]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = init_logger(level) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Keygen { key_id } => {
            keys::keygen(key_id);
            Ok(())
        }
        Commands::Init { key_id, output } => keys::init(key_id, output.as_deref()),
        Commands::Test {
            private_key,
            public_key,
            key_id,
        } => selftest::test(private_key.as_deref(), public_key.as_deref(), &key_id),
        Commands::Sign {
            config,
            private_key,
            key_id,
            request,
            response,
            timestamp,
        } => {
            let source = KeySource::from_args(config, private_key, key_id)?;
            sign::sign(
                &source,
                request.as_deref(),
                response.as_deref(),
                timestamp.as_deref(),
            )
        }
        Commands::Verify {
            public_key,
            message,
            signature,
        } => sign::verify(&public_key, &message, &signature),
        Commands::WellKnown { config } => sign::well_known(&config),
    }
}
