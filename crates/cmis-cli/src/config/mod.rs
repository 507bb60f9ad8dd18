//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── connection: ConnectionArgs   # Endpoint, credentials, binding, repository
//! ├── atompub: AtomPubConfig       # HTTP timeout, user agent, page size
//! ├── timeout                      # Per-operation deadline
//! └── command: Command             # Subcommand to run
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod connection;

use std::process;
use std::time::Duration;

use clap::Parser;
use cmis_atompub::AtomPubConfig;
use cmis_client::{OperationContext, SessionFactory};
pub use connection::ConnectionArgs;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::commands::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "cmis")]
#[command(about = "Exercise a CMIS repository over the AtomPub binding")]
#[command(version)]
pub struct Cli {
    /// Repository endpoint and credentials.
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    /// AtomPub HTTP client configuration.
    #[clap(flatten)]
    pub atompub: AtomPubConfig,

    /// Deadline in seconds applied to every repository operation.
    #[arg(long, env = "CMIS_OPERATION_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is read before clap parses so that its values act as
    /// environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.connection.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            http_timeout_secs = self.atompub.http_timeout,
            user_agent = ?self.atompub.user_agent,
            page_size = self.atompub.page_size,
            operation_timeout_secs = ?self.timeout,
            "AtomPub configuration"
        );
    }

    /// Operation context shared by every session the command opens.
    pub fn context(&self) -> OperationContext {
        let context = OperationContext::new();
        match self.timeout {
            Some(secs) => context.with_timeout(Duration::from_secs(secs)),
            None => context,
        }
    }

    /// Session factory configured from the parsed arguments.
    pub fn factory(&self) -> SessionFactory {
        SessionFactory::new()
            .with_atompub_config(self.atompub.clone())
            .with_context(self.context())
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
