//! Binding-level object snapshots.

use serde::{Deserialize, Serialize};

use super::{BaseTypeId, ObjectId, Properties, property_ids};
use crate::{Error, Result};

/// Snapshot of a server-side object as returned by a binding.
///
/// Typed wrappers in the client crate are built on top of this value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    /// All properties the server returned.
    pub properties: Properties,
}

impl ObjectData {
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }

    /// Returns the object id.
    ///
    /// Fails with [`Protocol`](crate::ErrorKind::Protocol) when the server
    /// omitted `cmis:objectId`.
    pub fn id(&self) -> Result<ObjectId> {
        self.properties
            .object_id()
            .map(ObjectId::from)
            .ok_or_else(|| Error::protocol().with_message("object without cmis:objectId"))
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.name()
    }

    pub fn object_type_id(&self) -> Option<&str> {
        self.properties.object_type_id()
    }

    /// Returns the base type, if the server reported a known one.
    pub fn base_type(&self) -> Option<BaseTypeId> {
        self.properties.base_type_id()?.parse().ok()
    }

    pub fn version_series_id(&self) -> Option<&str> {
        self.properties.string(property_ids::VERSION_SERIES_ID)
    }

    /// Returns true if this object is a private working copy.
    ///
    /// CMIS 1.0 servers may omit `cmis:isPrivateWorkingCopy`; the object is
    /// then a PWC when its id is the series' checked-out id.
    pub fn is_private_working_copy(&self) -> bool {
        if let Some(flag) = self.properties.boolean(property_ids::IS_PRIVATE_WORKING_COPY) {
            return flag;
        }

        let checked_out_id = self
            .properties
            .string(property_ids::VERSION_SERIES_CHECKED_OUT_ID);
        checked_out_id.is_some() && checked_out_id == self.properties.object_id()
    }

    pub fn is_version_series_checked_out(&self) -> bool {
        self.properties
            .boolean(property_ids::IS_VERSION_SERIES_CHECKED_OUT)
            .unwrap_or(false)
    }
}
