//! Transport-neutral binding contract.

use crate::types::{
    CheckIn, ContentStream, DEFAULT_PAGE_SIZE, ObjectData, ObjectId, Page, PageRequest,
    Properties, PropertyValue, RepositoryDescriptor, TypeDefinition, VersioningState,
    property_ids,
};
use crate::{Error, Result};

/// Outcome of a bulk update for one object.
#[derive(Debug)]
pub struct BulkUpdateEntry {
    /// The object the update was addressed to.
    pub id: ObjectId,
    /// The id of the updated object, or why the update failed.
    pub outcome: Result<ObjectId>,
}

/// Core trait for talking to one CMIS service endpoint.
///
/// A binding is stateless per request and may be shared between threads.
/// Implement this trait to add a wire protocol; the client crate builds the
/// session, folder and document model on top of it.
#[async_trait::async_trait]
pub trait CmisBinding: Send + Sync {
    /// Lists the repositories exposed by the service endpoint.
    async fn repositories(&self) -> Result<Vec<RepositoryDescriptor>>;

    /// Fetches the descriptor of a single repository.
    ///
    /// Fails with [`RepositoryNotFound`](crate::ErrorKind::RepositoryNotFound)
    /// if the id is unknown.
    async fn repository_info(&self, repository_id: &str) -> Result<RepositoryDescriptor> {
        self.repositories()
            .await?
            .into_iter()
            .find(|repo| repo.id == repository_id)
            .ok_or_else(|| {
                Error::repository_not_found()
                    .with_message(format!("repository '{repository_id}' does not exist"))
            })
    }

    /// Fetches a type definition by id.
    async fn type_definition(&self, repository_id: &str, type_id: &str) -> Result<TypeDefinition>;

    /// Fetches an object by id.
    async fn object(&self, repository_id: &str, object_id: &ObjectId) -> Result<ObjectData>;

    /// Fetches one page of a folder's children.
    async fn children(
        &self,
        repository_id: &str,
        folder_id: &ObjectId,
        page: PageRequest,
    ) -> Result<Page<ObjectData>>;

    /// Creates a folder under `parent_id` and returns its id.
    async fn create_folder(
        &self,
        repository_id: &str,
        parent_id: &ObjectId,
        properties: Properties,
    ) -> Result<ObjectId>;

    /// Creates a document under `parent_id` and returns its id.
    async fn create_document(
        &self,
        repository_id: &str,
        parent_id: &ObjectId,
        properties: Properties,
        content: Option<ContentStream>,
        versioning_state: VersioningState,
    ) -> Result<ObjectId>;

    /// Deletes a single object. Folders must be empty.
    async fn delete_object(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
        all_versions: bool,
    ) -> Result<()>;

    /// Deletes a folder and everything below it.
    async fn delete_tree(&self, repository_id: &str, folder_id: &ObjectId) -> Result<()>;

    /// Downloads a document's content.
    async fn content_stream(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
    ) -> Result<Option<ContentStream>>;

    /// Replaces properties of an object and returns its (possibly new) id.
    async fn update_properties(
        &self,
        repository_id: &str,
        object_id: &ObjectId,
        properties: Properties,
    ) -> Result<ObjectId>;

    /// Checks a document out and returns the id of the private working copy.
    async fn check_out(&self, repository_id: &str, object_id: &ObjectId) -> Result<ObjectId>;

    /// Discards a private working copy.
    async fn cancel_check_out(&self, repository_id: &str, pwc_id: &ObjectId) -> Result<()>;

    /// Checks a private working copy in and returns the new version's id.
    async fn check_in(
        &self,
        repository_id: &str,
        pwc_id: &ObjectId,
        check_in: CheckIn,
    ) -> Result<ObjectId>;

    /// Lists every checked-in version of the series `object_id` belongs to,
    /// newest first.
    async fn all_versions(&self, repository_id: &str, object_id: &ObjectId) -> Result<Vec<ObjectData>>;

    /// Fetches one page of the repository's private working copies.
    async fn checked_out_documents(
        &self,
        repository_id: &str,
        page: PageRequest,
    ) -> Result<Page<ObjectData>>;

    /// Number of items to request per page when the caller does not say.
    fn preferred_page_size(&self) -> u32 {
        DEFAULT_PAGE_SIZE
    }

    /// Returns true if [`bulk_update_properties`](Self::bulk_update_properties)
    /// applies all updates or none.
    fn supports_atomic_bulk_update(&self) -> bool {
        false
    }

    /// Applies the same property diff to several objects.
    ///
    /// The default implementation updates objects one after another and
    /// reports every outcome; it is not atomic. Secondary type changes are
    /// folded into `cmis:secondaryObjectTypeIds` per object.
    async fn bulk_update_properties(
        &self,
        repository_id: &str,
        object_ids: &[ObjectId],
        properties: &Properties,
        add_secondary_types: &[String],
        remove_secondary_types: &[String],
    ) -> Result<Vec<BulkUpdateEntry>> {
        let mut entries = Vec::with_capacity(object_ids.len());

        for id in object_ids {
            let outcome = async {
                let mut diff = properties.clone();
                if !add_secondary_types.is_empty() || !remove_secondary_types.is_empty() {
                    let current = self.object(repository_id, id).await?;
                    let merged = merge_secondary_types(
                        current.properties.secondary_type_ids(),
                        add_secondary_types,
                        remove_secondary_types,
                    );
                    diff.insert(
                        property_ids::SECONDARY_OBJECT_TYPE_IDS,
                        PropertyValue::id_list(merged),
                    );
                }
                self.update_properties(repository_id, id, diff).await
            }
            .await;

            entries.push(BulkUpdateEntry {
                id: id.clone(),
                outcome,
            });
        }

        Ok(entries)
    }
}

/// Applies secondary type additions and removals to an existing list.
///
/// Keeps the existing order, appends new ids once, and lets removals win
/// over additions.
pub fn merge_secondary_types(
    current: Vec<String>,
    add: &[String],
    remove: &[String],
) -> Vec<String> {
    let mut merged = current;
    for id in add {
        if !merged.contains(id) {
            merged.push(id.clone());
        }
    }
    merged.retain(|id| !remove.contains(id));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_order_and_applies_removals() {
        let merged = merge_secondary_types(
            vec!["P:a".into(), "P:b".into()],
            &["P:c".into(), "P:a".into()],
            &["P:b".into()],
        );
        assert_eq!(merged, vec!["P:a".to_owned(), "P:c".to_owned()]);
    }

    #[test]
    fn removal_wins_over_addition() {
        let merged = merge_secondary_types(Vec::new(), &["P:x".into()], &["P:x".into()]);
        assert!(merged.is_empty());
    }
}
