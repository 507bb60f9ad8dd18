//! Connection parameters for opening sessions.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use url::Url;

/// Wire protocol used to reach the repository.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Atom Publishing Protocol binding.
    #[default]
    AtomPub,
    /// JSON browser binding. Not supported by this client.
    Browser,
    /// SOAP web services binding. Not supported by this client.
    WebServices,
}

/// Immutable bundle of everything needed to reach a repository.
///
/// The password is kept as a [`SecretString`] and never shows up in
/// `Debug` output. Builder methods return a new value; a session created
/// from the parameters keeps the repository it was bound to.
#[derive(Clone)]
pub struct ConnectionParameters {
    endpoint: Url,
    username: String,
    password: SecretString,
    binding: BindingKind,
    repository_id: Option<String>,
}

impl ConnectionParameters {
    /// Creates AtomPub parameters without a preselected repository.
    pub fn new(endpoint: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password: SecretString::from(password.into()),
            binding: BindingKind::default(),
            repository_id: None,
        }
    }

    /// Selects the wire protocol.
    pub fn with_binding(mut self, binding: BindingKind) -> Self {
        self.binding = binding;
        self
    }

    /// Preselects the repository sessions will bind to.
    pub fn with_repository_id(mut self, repository_id: impl Into<String>) -> Self {
        self.repository_id = Some(repository_id.into());
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn binding(&self) -> BindingKind {
        self.binding
    }

    pub fn repository_id(&self) -> Option<&str> {
        self.repository_id.as_deref()
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username)
            .field("binding", &self.binding)
            .field("repository_id", &self.repository_id)
            .finish_non_exhaustive()
    }
}
