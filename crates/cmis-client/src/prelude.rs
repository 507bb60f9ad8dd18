//! Commonly used items from cmis-client.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cmis_client::prelude::*;
//! ```

pub use cmis_core::types::{
    BaseTypeId, CheckIn, ContentStream, ObjectId, Properties, PropertyValue, RepositoryDescriptor,
    TypeDefinition, VersioningState, property_ids,
};

pub use crate::{
    AsObjectId, BindingKind, CmisObject, ConnectionParameters, Document, Error, ErrorKind, Folder,
    ItemIterable, OperationContext, Result, Session, SessionFactory,
};
