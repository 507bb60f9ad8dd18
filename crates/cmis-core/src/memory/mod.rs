//! In-memory CMIS repository for testing.
//!
//! [`InMemoryBinding`] implements [`CmisBinding`] against a process-local
//! object store with folders, documents, version series and private working
//! copies. It enforces the same rules a real repository does (unique sibling
//! names, type schemas, check-out state) and is useful for unit and
//! integration testing of code written against the binding contract.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! cmis-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cmis_core::memory::{InMemoryBinding, InMemoryConfig};
//!
//! // Create with defaults
//! let binding = InMemoryBinding::default();
//!
//! // Or with custom configuration
//! let config = InMemoryConfig {
//!     atomic_bulk_update: true,
//!     ..Default::default()
//! };
//! let binding = InMemoryBinding::new(config);
//! ```

mod catalog;
mod store;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use self::store::RepositoryState;
use crate::binding::{BulkUpdateEntry, CmisBinding};
use crate::types::{
    CheckIn, ContentStream, ObjectData, ObjectId, Page, PageRequest, Properties,
    RepositoryDescriptor, TypeDefinition, VersioningState,
};
use crate::{Error, Result, TRACING_TARGET_MEMORY};

/// Configuration for the in-memory binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryConfig {
    /// Id of the repository created up front.
    #[serde(default = "default_repository_id")]
    pub repository_id: String,

    /// Display name of the repository created up front.
    #[serde(default = "default_repository_name")]
    pub repository_name: String,

    /// User recorded as creator and modifier of objects.
    #[serde(default = "default_user")]
    pub user: String,

    /// Apply bulk updates all-or-nothing.
    #[serde(default)]
    pub atomic_bulk_update: bool,

    /// Delay added to every response, after the operation took effect.
    #[serde(default)]
    pub latency: Option<Duration>,
}

fn default_repository_id() -> String {
    "-default-".to_owned()
}

fn default_repository_name() -> String {
    "Main Repository".to_owned()
}

fn default_user() -> String {
    "admin".to_owned()
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            repository_id: default_repository_id(),
            repository_name: default_repository_name(),
            user: default_user(),
            atomic_bulk_update: false,
            latency: None,
        }
    }
}

struct Inner {
    config: InMemoryConfig,
    repositories: Mutex<BTreeMap<String, RepositoryState>>,
    available: AtomicBool,
}

/// Process-local implementation of [`CmisBinding`].
///
/// Cloning is cheap; clones share the same repositories.
#[derive(Clone)]
pub struct InMemoryBinding {
    inner: Arc<Inner>,
}

impl InMemoryBinding {
    /// Creates a binding with one empty repository.
    pub fn new(config: InMemoryConfig) -> Self {
        let state = RepositoryState::new(
            &config.repository_id,
            &config.repository_name,
            &config.user,
            catalog::default_types(),
        );

        let repositories = BTreeMap::from([(config.repository_id.clone(), state)]);
        Self {
            inner: Arc::new(Inner {
                config,
                repositories: Mutex::new(repositories),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Adds another empty repository.
    #[must_use]
    pub fn with_repository(self, id: &str, name: &str) -> Self {
        if let Ok(mut repositories) = self.inner.repositories.lock() {
            let state = RepositoryState::new(id, name, &self.inner.config.user, catalog::default_types());
            repositories.insert(id.to_owned(), state);
        }
        self
    }

    /// Registers a type in every repository.
    #[must_use]
    pub fn with_type(self, definition: TypeDefinition) -> Self {
        if let Ok(mut repositories) = self.inner.repositories.lock() {
            for state in repositories.values_mut() {
                state.register_type(definition.clone());
            }
        }
        self
    }

    /// Simulates the endpoint going offline or coming back.
    ///
    /// While unavailable every call fails with
    /// [`Connectivity`](crate::ErrorKind::Connectivity).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub fn config(&self) -> &InMemoryConfig {
        &self.inner.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, RepositoryState>>> {
        if !self.inner.available.load(Ordering::SeqCst) {
            return Err(Error::connectivity().with_message("in-memory endpoint is offline"));
        }

        self.inner
            .repositories
            .lock()
            .map_err(|_| Error::runtime().with_message("in-memory repository lock poisoned"))
    }

    /// Runs `f` against one repository's state.
    fn with_state<T>(
        &self,
        repository_id: &str,
        f: impl FnOnce(&mut RepositoryState) -> Result<T>,
    ) -> Result<T> {
        let mut repositories = self.lock()?;
        let state = repositories.get_mut(repository_id).ok_or_else(|| {
            Error::repository_not_found()
                .with_message(format!("repository '{repository_id}' does not exist"))
        })?;
        f(state)
    }

    async fn respond<T>(&self, result: Result<T>) -> Result<T> {
        if let Some(latency) = self.inner.config.latency {
            tokio::time::sleep(latency).await;
        }
        result
    }
}

impl Default for InMemoryBinding {
    fn default() -> Self {
        Self::new(InMemoryConfig::default())
    }
}

impl std::fmt::Debug for InMemoryBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBinding")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl CmisBinding for InMemoryBinding {
    async fn repositories(&self) -> Result<Vec<RepositoryDescriptor>> {
        let result = self
            .lock()
            .map(|repositories| repositories.values().map(|s| s.descriptor().clone()).collect());
        self.respond(result).await
    }

    async fn type_definition(&self, repository_id: &str, type_id: &str) -> Result<TypeDefinition> {
        let result = self.with_state(repository_id, |state| state.type_definition(type_id));
        self.respond(result).await
    }

    async fn object(&self, repository_id: &str, object_id: &ObjectId) -> Result<ObjectData> {
        let result = self.with_state(repository_id, |state| state.object(object_id));
        self.respond(result).await
    }

    async fn children(
        &self,
        repository_id: &str,
        folder_id: &ObjectId,
        page: PageRequest,
    ) -> Result<Page<ObjectData>> {
        let result = self.with_state(repository_id, |state| state.children(folder_id, page));
        self.respond(result).await
    }

    async fn create_folder(
        &self,
        repository_id: &str,
        parent_id: &ObjectId,
        properties: Properties,
    ) -> Result<ObjectId> {
        let result = self.with_state(repository_id, |state| state.create_folder(parent_id, properties));
        if let Ok(id) = &result {
            tracing::debug!(target: TRACING_TARGET_MEMORY, %parent_id, folder_id = %id, "created folder");
        }
        self.respond(result).await
    }

    async fn create_document(
        &self,
        repository_id: &str,
        parent_id: &ObjectId,
        properties: Properties,
        content: Option<ContentStream>,
        versioning_state: VersioningState,
    ) -> Result<ObjectId> {
        let result = self.with_state(repository_id, |state| {
            state.create_document(parent_id, properties, content, versioning_state)
        });
        if let Ok(id) = &result {
            tracing::debug!(
                target: TRACING_TARGET_MEMORY,
                %parent_id,
                document_id = %id,
                versioning_state = %versioning_state,
                "created document"
            );
        }
        self.respond(result).await
    }

    async fn delete_object(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
        all_versions: bool,
    ) -> Result<()> {
        let result = self.with_state(repository_id, |state| state.delete_object(object_id, all_versions));
        self.respond(result).await
    }

    async fn delete_tree(&self, repository_id: &str, folder_id: &ObjectId) -> Result<()> {
        let result = self.with_state(repository_id, |state| state.delete_tree(folder_id));
        if result.is_ok() {
            tracing::debug!(target: TRACING_TARGET_MEMORY, %folder_id, "deleted folder tree");
        }
        self.respond(result).await
    }

    async fn content_stream(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<Option<ContentStream>> {
        let result = self.with_state(repository_id, |state| state.content_stream(object_id));
        self.respond(result).await
    }

    async fn update_properties(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
        properties: Properties,
    ) -> Result<ObjectId> {
        let result = self.with_state(repository_id, |state| state.update_properties(object_id, properties));
        self.respond(result).await
    }

    async fn check_out(&self, repository_id: &str, object_id: &ObjectId) -> Result<ObjectId> {
        let result = self.with_state(repository_id, |state| state.check_out(object_id));
        if let Ok(pwc_id) = &result {
            tracing::debug!(target: TRACING_TARGET_MEMORY, %object_id, %pwc_id, "checked out");
        }
        self.respond(result).await
    }

    async fn cancel_check_out(&self, repository_id: &str, pwc_id: &ObjectId) -> Result<()> {
        let result = self.with_state(repository_id, |state| state.cancel_check_out(pwc_id));
        self.respond(result).await
    }

    async fn check_in(
        &self,
        repository_id: &str,
        pwc_id: &ObjectId,
        check_in: CheckIn,
    ) -> Result<ObjectId> {
        let major = check_in.major;
        let result = self.with_state(repository_id, |state| state.check_in(pwc_id, check_in));
        if let Ok(version_id) = &result {
            tracing::debug!(target: TRACING_TARGET_MEMORY, %pwc_id, %version_id, major, "checked in");
        }
        self.respond(result).await
    }

    async fn all_versions(&self, repository_id: &str, object_id: &ObjectId) -> Result<Vec<ObjectData>> {
        let result = self.with_state(repository_id, |state| state.all_versions(object_id));
        self.respond(result).await
    }

    async fn checked_out_documents(
        &self,
        repository_id: &str,
        page: PageRequest,
    ) -> Result<Page<ObjectData>> {
        let result = self.with_state(repository_id, |state| Ok(state.checked_out_documents(page)));
        self.respond(result).await
    }

    fn supports_atomic_bulk_update(&self) -> bool {
        self.inner.config.atomic_bulk_update
    }

    async fn bulk_update_properties(
        &self,
        repository_id: &str,
        object_ids: &[ObjectId],
        properties: &Properties,
        add_secondary_types: &[String],
        remove_secondary_types: &[String],
    ) -> Result<Vec<BulkUpdateEntry>> {
        let atomic = self.supports_atomic_bulk_update();

        let result = self.with_state(repository_id, |state| {
            // Atomic mode works on a scratch copy and commits only on full success.
            let mut scratch = atomic.then(|| state.clone());
            let target = scratch.as_mut().unwrap_or(&mut *state);

            let entries: Vec<BulkUpdateEntry> = object_ids
                .iter()
                .map(|id| BulkUpdateEntry {
                    id: id.clone(),
                    outcome: target.update_with_secondary(
                        id,
                        properties,
                        add_secondary_types,
                        remove_secondary_types,
                    ),
                })
                .collect();

            let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
            match scratch {
                Some(scratch) if failed == 0 => *state = scratch,
                Some(_) => {
                    tracing::debug!(
                        target: TRACING_TARGET_MEMORY,
                        failed,
                        "atomic bulk update rolled back"
                    );
                }
                None => {}
            }

            Ok(entries)
        });

        self.respond(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::types::{PropertyValue, property_ids};

    const REPO: &str = "-default-";

    async fn root(binding: &InMemoryBinding) -> ObjectId {
        binding.repository_info(REPO).await.unwrap().root_folder_id
    }

    async fn text_document(binding: &InMemoryBinding, parent: &ObjectId, name: &str) -> ObjectId {
        let content = ContentStream::from_bytes(name, "text/plain", "hello").unwrap();
        binding
            .create_document(
                REPO,
                parent,
                Properties::for_create("cmis:document", name),
                Some(content),
                VersioningState::Major,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn lists_repositories() {
        let binding = InMemoryBinding::default().with_repository("second", "Second");
        let repos = binding.repositories().await.unwrap();
        assert_eq!(repos.len(), 2);

        let err = binding.repository_info("missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RepositoryNotFound);
    }

    #[tokio::test]
    async fn sibling_names_are_unique() {
        let binding = InMemoryBinding::default();
        let root = root(&binding).await;

        binding
            .create_folder(REPO, &root, Properties::for_create("cmis:folder", "A"))
            .await
            .unwrap();
        let err = binding
            .create_folder(REPO, &root, Properties::for_create("cmis:folder", "A"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameConflict);
    }

    #[tokio::test]
    async fn rejects_unknown_and_wrong_base_types() {
        let binding = InMemoryBinding::default();
        let root = root(&binding).await;

        let err = binding
            .create_folder(REPO, &root, Properties::for_create("cmis:document", "A"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidProperty);

        let err = binding
            .create_folder(REPO, &root, Properties::for_create("my:unknown", "A"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidProperty);
    }

    #[tokio::test]
    async fn version_series_lifecycle() {
        let binding = InMemoryBinding::default();
        let root = root(&binding).await;
        let doc = text_document(&binding, &root, "test.txt").await;

        let pwc = binding.check_out(REPO, &doc).await.unwrap();
        let err = binding.check_out(REPO, &doc).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyCheckedOut);

        let pwc_data = binding.object(REPO, &pwc).await.unwrap();
        assert!(pwc_data.is_private_working_copy());

        let version = binding
            .check_in(REPO, &pwc, CheckIn::new(false, "v1.1"))
            .await
            .unwrap();
        let data = binding.object(REPO, &version).await.unwrap();
        assert_eq!(data.properties.string(property_ids::VERSION_LABEL), Some("1.1"));
        assert_eq!(data.properties.string(property_ids::CHECKIN_COMMENT), Some("v1.1"));

        let err = binding.object(REPO, &pwc).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let versions = binding.all_versions(REPO, &doc).await.unwrap();
        let labels: Vec<_> = versions
            .iter()
            .filter_map(|v| v.properties.string(property_ids::VERSION_LABEL))
            .collect();
        assert_eq!(labels, ["1.1", "1.0"]);

        let err = binding.cancel_check_out(REPO, &version).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotCheckedOut);
    }

    #[tokio::test]
    async fn listing_shows_latest_version_once() {
        let binding = InMemoryBinding::default();
        let root = root(&binding).await;
        let doc = text_document(&binding, &root, "a.txt").await;
        let pwc = binding.check_out(REPO, &doc).await.unwrap();

        let page = binding.children(REPO, &root, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id().unwrap(), doc);

        binding.cancel_check_out(REPO, &pwc).await.unwrap();
        let checked_out = binding
            .checked_out_documents(REPO, PageRequest::default())
            .await
            .unwrap();
        assert!(checked_out.items.is_empty());
    }

    #[tokio::test]
    async fn delete_tree_removes_everything() {
        let binding = InMemoryBinding::default();
        let root = root(&binding).await;
        let folder = binding
            .create_folder(REPO, &root, Properties::for_create("cmis:folder", "F"))
            .await
            .unwrap();
        let doc = text_document(&binding, &folder, "x.txt").await;

        let err = binding.delete_object(REPO, &folder, false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotEmpty);

        binding.delete_tree(REPO, &folder).await.unwrap();
        assert_eq!(binding.object(REPO, &doc).await.unwrap_err().kind, ErrorKind::NotFound);
        let page = binding.children(REPO, &root, PageRequest::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn atomic_bulk_update_rolls_back() {
        let binding = InMemoryBinding::new(InMemoryConfig {
            atomic_bulk_update: true,
            ..Default::default()
        });
        let root = root(&binding).await;
        let doc = text_document(&binding, &root, "a.txt").await;
        let missing = ObjectId::from("missing");

        let diff = Properties::new().with(property_ids::DESCRIPTION, "changed");
        let entries = binding
            .bulk_update_properties(REPO, &[doc.clone(), missing], &diff, &[], &[])
            .await
            .unwrap();
        assert!(entries[0].outcome.is_ok());
        assert!(entries[1].outcome.is_err());

        let data = binding.object(REPO, &doc).await.unwrap();
        assert_eq!(data.properties.string(property_ids::DESCRIPTION), None);
    }

    #[tokio::test]
    async fn bulk_update_attaches_secondary_types() {
        let binding = InMemoryBinding::default();
        let root = root(&binding).await;
        let doc = text_document(&binding, &root, "a.jpg").await;

        let diff = Properties::new().with("exif:model", "Canon");
        let entries = binding
            .bulk_update_properties(REPO, &[doc.clone()], &diff, &["P:exif:exif".to_owned()], &[])
            .await
            .unwrap();
        assert!(entries[0].outcome.is_ok());

        let data = binding.object(REPO, &doc).await.unwrap();
        assert_eq!(data.properties.secondary_type_ids(), vec!["P:exif:exif".to_owned()]);
        assert_eq!(
            data.properties.get("exif:model"),
            Some(&PropertyValue::String("Canon".into()))
        );
    }

    #[tokio::test]
    async fn offline_endpoint_fails_with_connectivity() {
        let binding = InMemoryBinding::default();
        binding.set_available(false);
        let err = binding.repositories().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Connectivity);
        assert!(err.is_retryable());
    }
}
