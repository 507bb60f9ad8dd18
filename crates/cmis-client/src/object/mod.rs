//! Typed handles over repository objects.
//!
//! Every handle carries the snapshot it was fetched with and the session it
//! was fetched through. Snapshots are never updated in place: operations
//! that change an object return a freshly fetched handle, and
//! [`CmisObject::refresh`] re-reads the current state.

mod document;
mod factory;
mod folder;

use std::fmt;

use cmis_core::types::{BaseTypeId, ObjectData, ObjectId, Properties, PropertyValue, property_ids};

pub use self::document::Document;
pub use self::factory::ObjectFactory;
pub use self::folder::Folder;
use crate::{Error, Result, Session};

/// Anything that names a repository object.
pub trait AsObjectId {
    fn object_id(&self) -> &ObjectId;
}

impl AsObjectId for ObjectId {
    fn object_id(&self) -> &ObjectId {
        self
    }
}

/// Snapshot of one object together with the session it belongs to.
#[derive(Clone)]
pub struct ObjectHandle {
    session: Session,
    id: ObjectId,
    data: ObjectData,
}

impl ObjectHandle {
    pub(crate) fn new(session: Session, data: ObjectData) -> Result<Self> {
        let id = data.id()?;
        Ok(Self { session, id, data })
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Returns `cmis:name`, or an empty string if the server sent none.
    pub fn name(&self) -> &str {
        self.data.name().unwrap_or_default()
    }

    pub fn object_type_id(&self) -> &str {
        self.data.object_type_id().unwrap_or_default()
    }

    /// Returns the base type, falling back to the object type for base-typed objects.
    pub fn base_type(&self) -> Option<BaseTypeId> {
        self.data
            .base_type()
            .or_else(|| self.object_type_id().parse().ok())
    }

    pub fn description(&self) -> Option<&str> {
        self.data.properties.string(property_ids::DESCRIPTION)
    }

    pub fn secondary_type_ids(&self) -> Vec<String> {
        self.data.properties.secondary_type_ids()
    }

    pub fn property(&self, id: &str) -> Option<&PropertyValue> {
        self.data.properties.get(id)
    }

    pub fn properties(&self) -> &Properties {
        &self.data.properties
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    /// Returns the session this object was fetched through.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl AsObjectId for ObjectHandle {
    fn object_id(&self) -> &ObjectId {
        &self.id
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("object_type_id", &self.object_type_id())
            .finish_non_exhaustive()
    }
}

/// Any repository object, dispatched on its base type.
#[derive(Debug, Clone)]
pub enum CmisObject {
    Folder(Folder),
    Document(Document),
    /// Relationships, policies and items; exposed with their properties only.
    Other(ObjectHandle),
}

impl CmisObject {
    pub(crate) fn from_data(session: Session, data: ObjectData) -> Result<Self> {
        let handle = ObjectHandle::new(session, data)?;
        Ok(match handle.base_type() {
            Some(BaseTypeId::Folder) => Self::Folder(Folder::from(handle)),
            Some(BaseTypeId::Document) => Self::Document(Document::from(handle)),
            _ => Self::Other(handle),
        })
    }

    pub fn handle(&self) -> &ObjectHandle {
        match self {
            Self::Folder(folder) => &**folder,
            Self::Document(document) => &**document,
            Self::Other(handle) => handle,
        }
    }

    pub fn id(&self) -> &ObjectId {
        self.handle().id()
    }

    pub fn name(&self) -> &str {
        self.handle().name()
    }

    pub fn object_type_id(&self) -> &str {
        self.handle().object_type_id()
    }

    pub fn properties(&self) -> &Properties {
        self.handle().properties()
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Self::Folder(folder) => Some(folder),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    /// Fails with [`InvalidArgument`](crate::ErrorKind::InvalidArgument) if
    /// the object is not a folder.
    pub fn into_folder(self) -> Result<Folder> {
        match self {
            Self::Folder(folder) => Ok(folder),
            other => Err(Error::invalid_argument()
                .with_message(format!("object '{}' is not a folder", other.id()))),
        }
    }

    /// Fails with [`InvalidArgument`](crate::ErrorKind::InvalidArgument) if
    /// the object is not a document.
    pub fn into_document(self) -> Result<Document> {
        match self {
            Self::Document(document) => Ok(document),
            other => Err(Error::invalid_argument()
                .with_message(format!("object '{}' is not a document", other.id()))),
        }
    }

    /// Re-reads the object from the repository.
    pub async fn refresh(&self) -> Result<CmisObject> {
        self.handle().session().object(self.id()).await
    }
}

impl AsObjectId for CmisObject {
    fn object_id(&self) -> &ObjectId {
        self.id()
    }
}
