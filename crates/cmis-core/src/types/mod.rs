//! Data model shared by bindings and the client.

mod content_stream;
mod object_data;
mod object_id;
mod paging;
mod properties;
mod property;
mod repository;
mod type_definition;
mod versioning;

pub use content_stream::{ContentStream, DEFAULT_MIME_TYPE};
pub use object_data::ObjectData;
pub use object_id::ObjectId;
pub use paging::{DEFAULT_PAGE_SIZE, Page, PageRequest};
pub use properties::{Properties, WriteMode};
pub use property::{
    Cardinality, PropertyDefinition, PropertyType, PropertyValue, Updatability, property_ids,
};
pub use repository::{RepositoryCapabilities, RepositoryDescriptor};
pub use type_definition::{BaseTypeId, TypeDefinition};
pub use versioning::{CheckIn, VersioningState};
