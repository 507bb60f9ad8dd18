//! Repository discovery and session creation.

use std::fmt;
use std::sync::Arc;

use cmis_atompub::{AtomPubClient, AtomPubConfig};
use cmis_core::CmisBinding;
use cmis_core::types::RepositoryDescriptor;

use crate::{
    BindingKind, ConnectionParameters, Error, OperationContext, Result, Session,
    TRACING_TARGET_FACTORY,
};

/// Opens sessions from [`ConnectionParameters`].
///
/// The factory is a plain value: build one, pass it where sessions are
/// needed. By default it talks AtomPub; [`with_binding`](Self::with_binding)
/// substitutes any other [`CmisBinding`], such as the in-memory repository
/// used in tests.
#[derive(Clone, Default)]
pub struct SessionFactory {
    atompub: AtomPubConfig,
    binding: Option<Arc<dyn CmisBinding>>,
    context: OperationContext,
}

impl SessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP settings of AtomPub bindings.
    pub fn with_atompub_config(mut self, config: AtomPubConfig) -> Self {
        self.atompub = config;
        self
    }

    /// Uses `binding` for every connection instead of building one.
    pub fn with_binding(mut self, binding: Arc<dyn CmisBinding>) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Sets the operation context of discovery calls and created sessions.
    pub fn with_context(mut self, context: OperationContext) -> Self {
        self.context = context;
        self
    }

    /// Returns the binding for `params`.
    ///
    /// Only AtomPub is supported; other binding kinds fail with
    /// [`Configuration`](crate::ErrorKind::Configuration).
    pub fn binding(&self, params: &ConnectionParameters) -> Result<Arc<dyn CmisBinding>> {
        if let Some(binding) = &self.binding {
            return Ok(Arc::clone(binding));
        }

        match params.binding() {
            BindingKind::AtomPub => {
                let client = AtomPubClient::new(
                    params.endpoint().clone(),
                    params.username(),
                    params.password().clone(),
                    self.atompub.clone(),
                )?;
                Ok(Arc::new(client))
            }
            kind => Err(Error::configuration()
                .with_message(format!("the {kind} binding is not supported"))),
        }
    }

    /// Lists the repositories behind the endpoint.
    ///
    /// Fails with [`Connectivity`](crate::ErrorKind::Connectivity) if the
    /// endpoint is unreachable and with
    /// [`Authentication`](crate::ErrorKind::Authentication) if the
    /// credentials are rejected. The order of the result carries no meaning.
    pub async fn get_repositories(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Vec<RepositoryDescriptor>> {
        let binding = self.binding(params)?;
        let repositories = self.context.guard(binding.repositories()).await?;

        tracing::debug!(
            target: TRACING_TARGET_FACTORY,
            endpoint = %params.endpoint(),
            count = repositories.len(),
            "Discovered repositories"
        );
        Ok(repositories)
    }

    /// Opens a session on `repository`.
    ///
    /// The repository is looked up again on the server, so a descriptor for
    /// a repository that no longer exists fails with
    /// [`RepositoryNotFound`](crate::ErrorKind::RepositoryNotFound). When
    /// `params` already names a different repository the call fails with
    /// [`Configuration`](crate::ErrorKind::Configuration).
    pub async fn create_session(
        &self,
        params: &ConnectionParameters,
        repository: &RepositoryDescriptor,
    ) -> Result<Session> {
        if let Some(configured) = params.repository_id()
            && configured != repository.id
        {
            return Err(Error::configuration().with_message(format!(
                "parameters name repository '{configured}' but the descriptor is for '{}'",
                repository.id
            )));
        }

        let binding = self.binding(params)?;
        self.bind(binding, &repository.id).await
    }

    /// Opens a session on the repository named in `params`, or on the first
    /// repository the endpoint lists.
    ///
    /// Picking the first repository is an arbitrary choice; endpoints do not
    /// order their repositories. An endpoint without repositories is a
    /// [`Configuration`](crate::ErrorKind::Configuration) error.
    pub async fn create_session_from_parameters(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Session> {
        let binding = self.binding(params)?;

        if let Some(repository_id) = params.repository_id() {
            return self.bind(binding, repository_id).await;
        }

        let repositories = self.context.guard(binding.repositories()).await?;
        let Some(first) = repositories.into_iter().next() else {
            return Err(Error::configuration().with_message(format!(
                "endpoint '{}' exposes no repositories",
                params.endpoint()
            )));
        };

        tracing::info!(
            target: TRACING_TARGET_FACTORY,
            repository_id = %first.id,
            "No repository configured, using the first one listed"
        );
        Ok(Session::new(binding, first, self.context.clone()))
    }

    async fn bind(&self, binding: Arc<dyn CmisBinding>, repository_id: &str) -> Result<Session> {
        let repository = self
            .context
            .guard(binding.repository_info(repository_id))
            .await?;

        tracing::info!(
            target: TRACING_TARGET_FACTORY,
            repository_id = %repository.id,
            repository_name = %repository.name,
            "Session created"
        );
        Ok(Session::new(binding, repository, self.context.clone()))
    }
}

impl fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("atompub", &self.atompub)
            .field("custom_binding", &self.binding.is_some())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::ErrorKind;

    fn params(binding: BindingKind) -> ConnectionParameters {
        let endpoint = Url::parse("http://localhost:8080/alfresco/cmisatom").unwrap();
        ConnectionParameters::new(endpoint, "admin", "admin").with_binding(binding)
    }

    #[test]
    fn only_atompub_is_supported() {
        let factory = SessionFactory::new();
        assert!(factory.binding(&params(BindingKind::AtomPub)).is_ok());

        for kind in [BindingKind::Browser, BindingKind::WebServices] {
            let err = factory.binding(&params(kind)).err().unwrap();
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
    }
}
