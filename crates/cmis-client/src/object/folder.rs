use cmis_core::types::{
    BaseTypeId, ContentStream, ObjectId, Page, Properties, VersioningState, property_ids,
};
use derive_more::Deref;

use super::{AsObjectId, CmisObject, Document, ObjectHandle};
use crate::{ItemIterable, Result, TRACING_TARGET};

/// A folder and the operations on its children.
#[derive(Debug, Clone, Deref)]
pub struct Folder(ObjectHandle);

impl From<ObjectHandle> for Folder {
    fn from(handle: ObjectHandle) -> Self {
        Self(handle)
    }
}

impl AsObjectId for Folder {
    fn object_id(&self) -> &ObjectId {
        self.id()
    }
}

impl Folder {
    pub fn parent_id(&self) -> Option<&str> {
        self.properties().string(property_ids::PARENT_ID)
    }

    pub fn path(&self) -> Option<&str> {
        self.properties().string(property_ids::PATH)
    }

    pub fn is_root(&self) -> bool {
        self.id() == self.session().root_folder_id()
    }

    /// Lists the folder's children.
    ///
    /// Each document version series appears once, as its latest version.
    /// The listing is fetched lazily and can be iterated repeatedly.
    pub fn children(&self) -> ItemIterable<CmisObject> {
        let session = self.session().clone();
        let folder_id = self.id().clone();

        ItemIterable::new(session.page_size(), move |request| {
            let session = session.clone();
            let folder_id = folder_id.clone();
            async move {
                let page = session
                    .run(
                        "get_children",
                        false,
                        session
                            .binding()
                            .children(session.repository_id(), &folder_id, request),
                    )
                    .await?;

                let items = page
                    .items
                    .into_iter()
                    .map(|data| CmisObject::from_data(session.clone(), data))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Page::new(items, page.has_more_items, page.num_items))
            }
        })
    }

    /// Creates a subfolder.
    ///
    /// Fails with [`NameConflict`](crate::ErrorKind::NameConflict) if a
    /// sibling already has the name, and with
    /// [`InvalidProperty`](crate::ErrorKind::InvalidProperty) if the object
    /// type is not a folder type or the properties do not fit it.
    pub async fn create_folder(&self, properties: Properties) -> Result<Folder> {
        let session = self.session();
        session
            .validate_for_create(&properties, BaseTypeId::Folder)
            .await?;

        let id = session
            .run(
                "create_folder",
                true,
                session
                    .binding()
                    .create_folder(session.repository_id(), self.id(), properties),
            )
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            parent_id = %self.id(),
            folder_id = %id,
            "Folder created"
        );
        session.object_after("create_folder", &id).await?.into_folder()
    }

    /// Creates a document in this folder.
    ///
    /// With [`VersioningState::CheckedOut`] the returned document is itself a
    /// private working copy and must be checked in or cancelled before it can
    /// be checked out again.
    pub async fn create_document(
        &self,
        properties: Properties,
        content: Option<ContentStream>,
        versioning_state: VersioningState,
    ) -> Result<Document> {
        let session = self.session();
        session
            .validate_for_create(&properties, BaseTypeId::Document)
            .await?;

        let id = session
            .run(
                "create_document",
                true,
                session.binding().create_document(
                    session.repository_id(),
                    self.id(),
                    properties,
                    content,
                    versioning_state,
                ),
            )
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            parent_id = %self.id(),
            document_id = %id,
            versioning_state = %versioning_state,
            "Document created"
        );
        session
            .object_after("create_document", &id)
            .await?
            .into_document()
    }

    /// Deletes the folder.
    ///
    /// Without `delete_all_children` a non-empty folder fails with
    /// [`NotEmpty`](crate::ErrorKind::NotEmpty); with it, the folder and every
    /// object below it are removed, all versions included.
    pub async fn delete(&self, delete_all_children: bool) -> Result<()> {
        let session = self.session();

        if delete_all_children {
            session
                .run(
                    "delete_tree",
                    true,
                    session
                        .binding()
                        .delete_tree(session.repository_id(), self.id()),
                )
                .await
        } else {
            session.delete_object(self.id(), true).await
        }
    }

    /// Re-reads the folder from the repository.
    pub async fn refresh(&self) -> Result<Folder> {
        self.session().folder(self.id()).await
    }
}
