//! Repository connection arguments.

use std::fmt;

use clap::Args;
use cmis_client::{BindingKind, ConnectionParameters};
use url::Url;

use crate::TRACING_TARGET_CONFIG;

/// Where the repository lives and how to authenticate against it.
///
/// # Environment Variables
///
/// - `CMIS_URL` - AtomPub service document URL
/// - `CMIS_USER` - user name (default: admin)
/// - `CMIS_PASSWORD` - password
/// - `CMIS_BINDING` - wire protocol (default: atompub)
/// - `CMIS_REPOSITORY_ID` - repository to bind to (default: first listed)
#[derive(Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct ConnectionArgs {
    /// AtomPub service document URL.
    #[arg(long, env = "CMIS_URL")]
    pub url: Url,

    /// User name for basic authentication.
    #[arg(long, env = "CMIS_USER", default_value = "admin")]
    pub user: String,

    /// Password for basic authentication.
    #[arg(long, env = "CMIS_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Wire protocol: atompub, browser or webservices.
    ///
    /// Only atompub is supported; the others are rejected when connecting.
    #[arg(long, env = "CMIS_BINDING", default_value = "atompub")]
    pub binding: BindingKind,

    /// Repository to bind sessions to.
    ///
    /// When omitted, the first repository the server lists is used.
    #[arg(long, env = "CMIS_REPOSITORY_ID")]
    pub repository_id: Option<String>,
}

impl ConnectionArgs {
    /// Builds the client parameters from the parsed arguments.
    pub fn to_parameters(&self) -> ConnectionParameters {
        let params = ConnectionParameters::new(self.url.clone(), &self.user, &self.password)
            .with_binding(self.binding);

        match &self.repository_id {
            Some(repository_id) => params.with_repository_id(repository_id),
            None => params,
        }
    }

    /// Logs the connection settings without the password.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            url = %self.url,
            user = %self.user,
            binding = %self.binding,
            repository_id = ?self.repository_id,
            "Connection configuration"
        );
    }
}

impl fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionArgs")
            .field("url", &self.url.as_str())
            .field("user", &self.user)
            .field("binding", &self.binding)
            .field("repository_id", &self.repository_id)
            .finish_non_exhaustive()
    }
}
