//! Reqwest-based HTTP client for the CMIS AtomPub binding.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use url::Url;

use super::AtomPubConfig;
use crate::TRACING_TARGET;
use crate::error::{Error, Result};
use crate::xml::{self, MEDIA_TYPE_ENTRY, Workspace};

/// Inner client that holds the HTTP client, credentials and configuration.
struct AtomPubClientInner {
    http: Client,
    config: AtomPubConfig,
    endpoint: Url,
    username: String,
    password: SecretString,
    workspaces: RwLock<HashMap<String, Workspace>>,
}

/// HTTP client for one AtomPub service endpoint.
///
/// This client implements the [`CmisBinding`] trait. Every request carries
/// basic-auth credentials; the password is kept in a [`SecretString`] and
/// never shows up in `Debug` output or logs.
///
/// # Examples
///
/// ```rust,ignore
/// use cmis_atompub::{AtomPubClient, AtomPubConfig};
/// use cmis_core::CmisBinding;
///
/// let endpoint = Url::parse("http://localhost:8080/alfresco/service/cmis")?;
/// let client = AtomPubClient::new(endpoint, "admin", "admin".into(), AtomPubConfig::default())?;
/// let repositories = client.repositories().await?;
/// ```
///
/// [`CmisBinding`]: cmis_core::CmisBinding
#[derive(Clone)]
pub struct AtomPubClient {
    inner: Arc<AtomPubClientInner>,
}

impl std::fmt::Debug for AtomPubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomPubClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("username", &self.inner.username)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AtomPubClient {
    /// Creates a new client for the service document at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](cmis_core::ErrorKind::Configuration) error
    /// if the HTTP client cannot be created.
    pub fn new(
        endpoint: Url,
        username: impl Into<String>,
        password: SecretString,
        config: AtomPubConfig,
    ) -> cmis_core::Result<Self> {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            timeout_ms = timeout.as_millis(),
            "Creating AtomPub client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(|e| {
                cmis_core::Error::configuration()
                    .with_message("failed to create HTTP client")
                    .with_source(e)
            })?;

        let inner = AtomPubClientInner {
            http,
            config,
            endpoint,
            username: username.into(),
            password,
            workspaces: RwLock::new(HashMap::new()),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &AtomPubConfig {
        &self.inner.config
    }

    /// Gets the service document URL.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(
            &self.inner.username,
            Some(self.inner.password.expose_secret()),
        )
    }

    /// Sends a request and turns non-success statuses into errors.
    async fn send(&self, method: &'static str, url: &Url, request: RequestBuilder) -> Result<Response> {
        tracing::trace!(target: TRACING_TARGET, method, url = %url, "Sending request");

        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            target: TRACING_TARGET,
            method,
            url = %url,
            status = status.as_u16(),
            "Request rejected"
        );

        Err(Error::Status {
            status: status.as_u16(),
            body,
        })
    }

    pub(crate) async fn get_text(&self, url: &Url) -> Result<String> {
        let response = self.send("GET", url, self.inner.http.get(url.clone())).await?;
        Ok(response.text().await?)
    }

    /// Downloads raw bytes together with the response headers.
    pub(crate) async fn get_bytes(&self, url: &Url) -> Result<(HeaderMap, Bytes)> {
        let response = self.send("GET", url, self.inner.http.get(url.clone())).await?;
        let headers = response.headers().clone();
        Ok((headers, response.bytes().await?))
    }

    pub(crate) async fn post_entry(&self, url: &Url, entry: String) -> Result<String> {
        let request = self
            .inner
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, MEDIA_TYPE_ENTRY)
            .body(entry);
        let response = self.send("POST", url, request).await?;
        Ok(response.text().await?)
    }

    pub(crate) async fn put_entry(&self, url: &Url, entry: String) -> Result<String> {
        let request = self
            .inner
            .http
            .put(url.clone())
            .header(CONTENT_TYPE, MEDIA_TYPE_ENTRY)
            .body(entry);
        let response = self.send("PUT", url, request).await?;
        Ok(response.text().await?)
    }

    pub(crate) async fn delete(&self, url: &Url) -> Result<()> {
        self.send("DELETE", url, self.inner.http.delete(url.clone()))
            .await?;
        Ok(())
    }

    /// Fetches and parses the service document, refreshing the cache.
    pub(crate) async fn load_workspaces(&self) -> Result<Vec<Workspace>> {
        let body = self.get_text(&self.inner.endpoint).await?;
        let workspaces = xml::parse_service_document(&body)?;

        let mut cache = self.inner.workspaces.write().await;
        cache.clear();
        for workspace in &workspaces {
            cache.insert(workspace.descriptor.id.clone(), workspace.clone());
        }

        tracing::debug!(
            target: TRACING_TARGET,
            repositories = workspaces.len(),
            "Loaded service document"
        );

        Ok(workspaces)
    }

    /// Returns the workspace of one repository.
    ///
    /// Returns `None` if the service document does not list the repository.
    pub(crate) async fn workspace(&self, repository_id: &str) -> Result<Option<Workspace>> {
        if let Some(workspace) = self.inner.workspaces.read().await.get(repository_id) {
            return Ok(Some(workspace.clone()));
        }

        let workspaces = self.load_workspaces().await?;
        Ok(workspaces
            .into_iter()
            .find(|w| w.descriptor.id == repository_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password() {
        let endpoint = Url::parse("http://localhost:8080/cmis").unwrap();
        let client = AtomPubClient::new(
            endpoint,
            "admin",
            SecretString::from("s3cret".to_owned()),
            AtomPubConfig::default(),
        )
        .unwrap();

        let debug = format!("{client:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }
}
