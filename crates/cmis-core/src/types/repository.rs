//! Repository descriptors produced by catalog discovery.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Optional features a repository advertises.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCapabilities {
    /// `getDescendants` is supported.
    pub get_descendants: bool,
    /// Private working copies accept property and content updates.
    pub pwc_updatable: bool,
    /// Non-latest versions show up in queries.
    pub all_versions_searchable: bool,
    /// One of `none`, `anytime`, `pwconly`.
    pub content_stream_updatability: Option<String>,
}

/// Read-only description of one repository behind a service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Id of the folder every navigation starts from.
    pub root_folder_id: ObjectId,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    /// CMIS version the repository speaks, e.g. `1.0`.
    pub cmis_version: Option<String>,
    pub capabilities: RepositoryCapabilities,
}

impl RepositoryDescriptor {
    /// Creates a descriptor with only the mandatory fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, root_folder_id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            root_folder_id: root_folder_id.into(),
            product_name: None,
            product_version: None,
            cmis_version: None,
            capabilities: RepositoryCapabilities::default(),
        }
    }
}
