//! Sessions bound to one repository.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use cmis_core::types::{
    BaseTypeId, ObjectId, Page, Properties, RepositoryDescriptor, TypeDefinition, WriteMode,
};
use cmis_core::{CmisBinding, ErrorKind, PartialFailure};

use crate::object::{AsObjectId, CmisObject, Document, Folder, ObjectFactory};
use crate::{Error, ItemIterable, OperationContext, Result, TRACING_TARGET};

struct SessionInner {
    binding: Arc<dyn CmisBinding>,
    repository: RepositoryDescriptor,
}

/// Handle to one repository.
///
/// A session holds no connection and no mutable state: every call is an
/// independent request through the binding, and clones are cheap and may be
/// used from any number of tasks at once. The repository a session is bound
/// to never changes.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
    context: OperationContext,
}

impl Session {
    pub(crate) fn new(
        binding: Arc<dyn CmisBinding>,
        repository: RepositoryDescriptor,
        context: OperationContext,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                binding,
                repository,
            }),
            context,
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.inner.repository.id
    }

    pub fn repository_info(&self) -> &RepositoryDescriptor {
        &self.inner.repository
    }

    pub fn root_folder_id(&self) -> &ObjectId {
        &self.inner.repository.root_folder_id
    }

    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    /// Returns a session on the same repository running under `context`.
    ///
    /// Objects fetched through the returned session inherit the new context.
    pub fn with_context(&self, context: OperationContext) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            context,
        }
    }

    /// Returns the factory for values handed to create and check-in calls.
    pub fn object_factory(&self) -> ObjectFactory {
        ObjectFactory::new()
    }

    pub(crate) fn binding(&self) -> &dyn CmisBinding {
        self.inner.binding.as_ref()
    }

    /// Number of items requested per page by listings of this session.
    pub(crate) fn page_size(&self) -> u32 {
        self.context
            .page_size()
            .unwrap_or_else(|| self.binding().preferred_page_size())
    }

    /// Runs one binding call under the operation context.
    ///
    /// Timeouts and cancellations of mutating calls are reported as
    /// indeterminate.
    pub(crate) async fn run<T, F>(&self, operation: &'static str, mutating: bool, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        tracing::debug!(
            target: TRACING_TARGET,
            operation,
            repository_id = self.repository_id(),
            "Starting operation"
        );

        match self.context.guard(call).await {
            Ok(value) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    operation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Operation completed"
                );
                Ok(value)
            }
            Err(err) => {
                let err = if mutating && err.kind.is_interruption() {
                    err.into_indeterminate()
                } else {
                    err
                };

                tracing::warn!(
                    target: TRACING_TARGET,
                    operation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    indeterminate = err.indeterminate,
                    "Operation failed"
                );
                Err(err)
            }
        }
    }

    /// Fetches the repository's root folder.
    pub async fn root_folder(&self) -> Result<Folder> {
        self.folder(self.root_folder_id()).await
    }

    /// Fetches any object by id.
    ///
    /// Fails with [`NotFound`](crate::ErrorKind::NotFound) when the id is
    /// stale, for example a working copy id after its check-out was cancelled.
    pub async fn object(&self, id: &ObjectId) -> Result<CmisObject> {
        let data = self
            .run("get_object", false, self.binding().object(self.repository_id(), id))
            .await?;
        CmisObject::from_data(self.clone(), data)
    }

    /// Re-reads the object a mutation just produced.
    ///
    /// The mutation has already taken effect, so a failure here never means
    /// "did not happen" and is reported as indeterminate.
    pub(crate) async fn object_after(&self, operation: &'static str, id: &ObjectId) -> Result<CmisObject> {
        self.object(id).await.map_err(|err| {
            err.into_indeterminate()
                .with_context(format!("{operation} applied, re-reading '{id}' failed"))
        })
    }

    /// Fetches an object that must be a folder.
    pub async fn folder(&self, id: &ObjectId) -> Result<Folder> {
        self.object(id).await?.into_folder()
    }

    /// Fetches an object that must be a document.
    pub async fn document(&self, id: &ObjectId) -> Result<Document> {
        self.object(id).await?.into_document()
    }

    /// Fetches a type definition, including secondary (aspect) types.
    pub async fn type_definition(&self, type_id: &str) -> Result<TypeDefinition> {
        self.run(
            "get_type_definition",
            false,
            self.binding().type_definition(self.repository_id(), type_id),
        )
        .await
    }

    /// Lists the private working copies of the repository.
    pub fn checked_out_documents(&self) -> ItemIterable<Document> {
        let session = self.clone();

        ItemIterable::new(self.page_size(), move |request| {
            let session = session.clone();
            async move {
                let page = session
                    .run(
                        "get_checked_out_docs",
                        false,
                        session
                            .binding()
                            .checked_out_documents(session.repository_id(), request),
                    )
                    .await?;

                let items = page
                    .items
                    .into_iter()
                    .map(|data| CmisObject::from_data(session.clone(), data)?.into_document())
                    .collect::<Result<Vec<_>>>()?;
                Ok(Page::new(items, page.has_more_items, page.num_items))
            }
        })
    }

    /// Deletes one object. Folders must be empty.
    pub async fn delete_object(&self, id: &ObjectId, all_versions: bool) -> Result<()> {
        self.run(
            "delete_object",
            true,
            self.binding()
                .delete_object(self.repository_id(), id, all_versions),
        )
        .await
    }

    /// Applies the same property diff to every object in `objects`.
    ///
    /// If the binding applies bulk updates atomically, a failure means no
    /// object was changed and the first failure is returned. Otherwise any
    /// failure yields a [`PartialFailure`](crate::ErrorKind::PartialFailure)
    /// error naming exactly the objects that were not updated.
    pub async fn bulk_update_properties<T: AsObjectId>(
        &self,
        objects: &[T],
        properties: &Properties,
        add_secondary_types: &[String],
        remove_secondary_types: &[String],
    ) -> Result<()> {
        let ids: Vec<ObjectId> = objects.iter().map(|o| o.object_id().clone()).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let entries = self
            .run(
                "bulk_update_properties",
                true,
                self.binding().bulk_update_properties(
                    self.repository_id(),
                    &ids,
                    properties,
                    add_secondary_types,
                    remove_secondary_types,
                ),
            )
            .await?;

        let mut outcome = PartialFailure::default();
        for entry in entries {
            match entry.outcome {
                Ok(_) => {
                    outcome.succeeded.insert(entry.id);
                }
                Err(err) => {
                    outcome.failed.insert(entry.id, err);
                }
            }
        }

        if outcome.is_complete() {
            tracing::debug!(
                target: TRACING_TARGET,
                updated = outcome.succeeded.len(),
                "Bulk update applied"
            );
            return Ok(());
        }

        if self.binding().supports_atomic_bulk_update() {
            let failed = outcome.failed.len();
            if let Some((id, err)) = outcome.failed.pop_first() {
                return Err(err.with_context(format!(
                    "bulk update rolled back, {failed} of {} objects failed, first at '{id}'",
                    ids.len()
                )));
            }
        }

        tracing::warn!(
            target: TRACING_TARGET,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk update partially applied"
        );
        Err(Error::partial_failure(outcome))
    }

    /// Checks a property bag for a new object of `base` type.
    ///
    /// An unregistered or wrongly based type is an
    /// [`InvalidProperty`](crate::ErrorKind::InvalidProperty) error.
    pub(crate) async fn validate_for_create(
        &self,
        properties: &Properties,
        base: BaseTypeId,
    ) -> Result<()> {
        let type_id = properties.object_type_id().ok_or_else(|| {
            Error::invalid_property().with_message("cmis:objectTypeId is required")
        })?;

        let primary = match self.type_definition(type_id).await {
            Ok(primary) => primary,
            Err(err) if err.kind == ErrorKind::UnknownType => {
                return Err(Error::invalid_property()
                    .with_message(format!("type '{type_id}' is not registered"))
                    .with_source(err));
            }
            Err(err) => return Err(err),
        };

        if primary.base_type != base {
            return Err(Error::invalid_property()
                .with_message(format!("type '{type_id}' does not derive from {base}")));
        }

        let secondary = self
            .secondary_definitions(&properties.secondary_type_ids())
            .await?;
        properties.validate(&primary, &secondary, WriteMode::Create)
    }

    /// Checks a property diff against an existing object's types.
    pub(crate) async fn validate_for_update(
        &self,
        properties: &Properties,
        type_id: &str,
        secondary_type_ids: &[String],
        mode: WriteMode,
    ) -> Result<()> {
        let primary = self.type_definition(type_id).await?;
        let secondary = self.secondary_definitions(secondary_type_ids).await?;
        properties.validate(&primary, &secondary, mode)
    }

    async fn secondary_definitions(&self, ids: &[String]) -> Result<Vec<TypeDefinition>> {
        let mut definitions = Vec::with_capacity(ids.len());
        for id in ids {
            definitions.push(self.type_definition(id).await?);
        }
        Ok(definitions)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("repository_id", &self.inner.repository.id)
            .field("root_folder_id", &self.inner.repository.root_folder_id)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
