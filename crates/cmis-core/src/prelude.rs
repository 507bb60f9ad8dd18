//! Commonly used items from cmis-core.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cmis_core::prelude::*;
//! ```

// In-memory repository (test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::memory::{InMemoryBinding, InMemoryConfig};
// Data model
pub use crate::types::{
    BaseTypeId, CheckIn, ContentStream, ObjectData, ObjectId, Page, PageRequest, Properties,
    PropertyValue, RepositoryDescriptor, TypeDefinition, VersioningState, property_ids,
};
pub use crate::{BoxedError, BulkUpdateEntry, CmisBinding, Error, ErrorKind, Result};
