//! Subcommands and their shared helpers.

mod browse;
mod bulk;
mod checkout;
mod repositories;
mod types;

use anyhow::Context;
use clap::Subcommand;
use cmis_client::Session;
use jiff::Timestamp;

pub use self::bulk::BulkUpdateArgs;
pub use self::checkout::CheckoutCycleArgs;
pub use self::types::TypeArgs;
use crate::TRACING_TARGET_COMMAND;
use crate::config::Cli;

/// Operation to run against the repository.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the repositories behind the endpoint.
    Repositories,
    /// Print the root folder and its children.
    Browse,
    /// Print object type definitions.
    Type(TypeArgs),
    /// Create a document, check it out and check in a minor version.
    CheckoutCycle(CheckoutCycleArgs),
    /// Create documents and update their description in one call.
    BulkUpdate(BulkUpdateArgs),
}

impl Command {
    /// Runs the subcommand with the connection described by `cli`.
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match self {
            Self::Repositories => repositories::run(cli).await,
            Self::Browse => browse::run(&open_session(cli).await?).await,
            Self::Type(args) => types::run(&open_session(cli).await?, args).await,
            Self::CheckoutCycle(args) => checkout::run(&open_session(cli).await?, args).await,
            Self::BulkUpdate(args) => bulk::run(&open_session(cli).await?, args).await,
        }
    }
}

/// Opens a session on the configured repository, or the first one listed.
async fn open_session(cli: &Cli) -> anyhow::Result<Session> {
    let session = cli
        .factory()
        .create_session_from_parameters(&cli.connection.to_parameters())
        .await
        .context("failed to open a session")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        repository_id = %session.repository_id(),
        repository_name = %session.repository_info().name,
        "Session opened"
    );

    Ok(session)
}

/// Name with a millisecond suffix, unique enough for scratch folders.
fn scratch_name(prefix: &str) -> String {
    format!("{prefix}{}", Timestamp::now().as_millisecond())
}
