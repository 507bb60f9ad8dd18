use cmis_core::types::{CheckIn, ContentStream, ObjectId, Properties, WriteMode, property_ids};
use derive_more::Deref;

use super::{AsObjectId, ObjectHandle};
use crate::{Error, Result, TRACING_TARGET};

/// A document version or private working copy.
#[derive(Debug, Clone, Deref)]
pub struct Document(ObjectHandle);

impl From<ObjectHandle> for Document {
    fn from(handle: ObjectHandle) -> Self {
        Self(handle)
    }
}

impl AsObjectId for Document {
    fn object_id(&self) -> &ObjectId {
        self.id()
    }
}

impl Document {
    pub fn version_series_id(&self) -> Option<&str> {
        self.data().version_series_id()
    }

    pub fn version_label(&self) -> Option<&str> {
        self.properties().string(property_ids::VERSION_LABEL)
    }

    pub fn checkin_comment(&self) -> Option<&str> {
        self.properties().string(property_ids::CHECKIN_COMMENT)
    }

    pub fn is_private_working_copy(&self) -> bool {
        self.data().is_private_working_copy()
    }

    pub fn is_latest_version(&self) -> bool {
        self.properties()
            .boolean(property_ids::IS_LATEST_VERSION)
            .unwrap_or(false)
    }

    pub fn is_major_version(&self) -> bool {
        self.properties()
            .boolean(property_ids::IS_MAJOR_VERSION)
            .unwrap_or(false)
    }

    /// Returns true if the series had a working copy when this snapshot was taken.
    pub fn is_version_series_checked_out(&self) -> bool {
        self.data().is_version_series_checked_out()
    }

    pub fn version_series_checked_out_id(&self) -> Option<ObjectId> {
        self.properties()
            .string(property_ids::VERSION_SERIES_CHECKED_OUT_ID)
            .map(ObjectId::from)
    }

    pub fn content_stream_length(&self) -> Option<u64> {
        self.properties()
            .integer(property_ids::CONTENT_STREAM_LENGTH)
            .and_then(|length| u64::try_from(length).ok())
    }

    pub fn content_stream_mime_type(&self) -> Option<&str> {
        self.properties()
            .string(property_ids::CONTENT_STREAM_MIME_TYPE)
    }

    pub fn content_stream_file_name(&self) -> Option<&str> {
        self.properties()
            .string(property_ids::CONTENT_STREAM_FILE_NAME)
    }

    /// Downloads the document's content, if it has any.
    pub async fn content_stream(&self) -> Result<Option<ContentStream>> {
        let session = self.session();
        session
            .run(
                "get_content_stream",
                false,
                session
                    .binding()
                    .content_stream(session.repository_id(), self.id()),
            )
            .await
    }

    /// Checks the document out and returns the id of the private working copy.
    ///
    /// Fails with [`AlreadyCheckedOut`](crate::ErrorKind::AlreadyCheckedOut)
    /// while the series has a working copy.
    pub async fn check_out(&self) -> Result<ObjectId> {
        let session = self.session();
        let pwc_id = session
            .run(
                "check_out",
                true,
                session
                    .binding()
                    .check_out(session.repository_id(), self.id()),
            )
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            document_id = %self.id(),
            %pwc_id,
            "Document checked out"
        );
        Ok(pwc_id)
    }

    /// Checks this working copy in and returns the new version.
    ///
    /// Fails with [`NotCheckedOut`](crate::ErrorKind::NotCheckedOut) unless
    /// this document is a private working copy.
    pub async fn check_in(&self, check_in: CheckIn) -> Result<Document> {
        self.require_working_copy()?;

        let session = self.session();
        if let Some(properties) = &check_in.properties {
            session
                .validate_for_update(
                    properties,
                    self.object_type_id(),
                    &self.secondary_types_after(properties),
                    WriteMode::UpdateCheckedOut,
                )
                .await?;
        }

        let major = check_in.major;
        let version_id = session
            .run(
                "check_in",
                true,
                session
                    .binding()
                    .check_in(session.repository_id(), self.id(), check_in),
            )
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            pwc_id = %self.id(),
            %version_id,
            major,
            "Document checked in"
        );
        session
            .object_after("check_in", &version_id)
            .await?
            .into_document()
    }

    /// Discards this working copy without creating a version.
    pub async fn cancel_check_out(&self) -> Result<()> {
        self.require_working_copy()?;

        let session = self.session();
        session
            .run(
                "cancel_check_out",
                true,
                session
                    .binding()
                    .cancel_check_out(session.repository_id(), self.id()),
            )
            .await?;

        tracing::info!(target: TRACING_TARGET, pwc_id = %self.id(), "Check-out cancelled");
        Ok(())
    }

    /// Lists every checked-in version of the series, newest first.
    ///
    /// The working copy of a checked-out series is not a version and is not
    /// listed.
    pub async fn all_versions(&self) -> Result<Vec<Document>> {
        let session = self.session();
        let versions = session
            .run(
                "get_all_versions",
                false,
                session
                    .binding()
                    .all_versions(session.repository_id(), self.id()),
            )
            .await?;

        versions
            .into_iter()
            .map(|data| Ok(Document::from(ObjectHandle::new(session.clone(), data)?)))
            .collect()
    }

    /// Writes properties and returns the updated document.
    pub async fn update_properties(&self, properties: Properties) -> Result<Document> {
        let session = self.session();
        let mode = if self.is_private_working_copy() {
            WriteMode::UpdateCheckedOut
        } else {
            WriteMode::Update
        };

        session
            .validate_for_update(
                &properties,
                self.object_type_id(),
                &self.secondary_types_after(&properties),
                mode,
            )
            .await?;

        let id = session
            .run(
                "update_properties",
                true,
                session
                    .binding()
                    .update_properties(session.repository_id(), self.id(), properties),
            )
            .await?;
        session
            .object_after("update_properties", &id)
            .await?
            .into_document()
    }

    /// Deletes this version, or the whole series with `all_versions`.
    pub async fn delete(&self, all_versions: bool) -> Result<()> {
        self.session().delete_object(self.id(), all_versions).await
    }

    /// Re-reads the document from the repository.
    pub async fn refresh(&self) -> Result<Document> {
        self.session().document(self.id()).await
    }

    fn require_working_copy(&self) -> Result<()> {
        if self.is_private_working_copy() {
            Ok(())
        } else {
            Err(Error::not_checked_out()
                .with_message(format!("document '{}' is not a private working copy", self.id())))
        }
    }

    /// Secondary types the object will have once `properties` are written.
    fn secondary_types_after(&self, properties: &Properties) -> Vec<String> {
        if properties.contains(property_ids::SECONDARY_OBJECT_TYPE_IDS) {
            properties.secondary_type_ids()
        } else {
            self.secondary_type_ids()
        }
    }
}
