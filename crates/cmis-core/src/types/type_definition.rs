//! Object type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::property::PropertyDefinition;

/// The six CMIS base types every object type derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
pub enum BaseTypeId {
    #[strum(serialize = "cmis:document")]
    #[serde(rename = "cmis:document")]
    Document,
    #[strum(serialize = "cmis:folder")]
    #[serde(rename = "cmis:folder")]
    Folder,
    #[strum(serialize = "cmis:relationship")]
    #[serde(rename = "cmis:relationship")]
    Relationship,
    #[strum(serialize = "cmis:policy")]
    #[serde(rename = "cmis:policy")]
    Policy,
    #[strum(serialize = "cmis:item")]
    #[serde(rename = "cmis:item")]
    Item,
    #[strum(serialize = "cmis:secondary")]
    #[serde(rename = "cmis:secondary")]
    Secondary,
}

/// Description of an object type, including its property schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type id, e.g. `cmis:document` or `P:exif:exif`.
    pub id: String,
    pub local_name: String,
    pub query_name: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Base type this type derives from.
    pub base_type: BaseTypeId,
    /// Parent type id; `None` for base types.
    pub parent_type_id: Option<String>,
    /// Whether objects of this type can be created.
    pub creatable: bool,
    /// Whether objects of this type can be filed in folders.
    pub fileable: bool,
    /// Whether documents of this type keep a version series.
    pub versionable: bool,
    /// Whether documents of this type may carry content.
    pub content_stream_allowed: bool,
    /// Property schema keyed by property id, inherited definitions included.
    pub property_definitions: BTreeMap<String, PropertyDefinition>,
}

impl TypeDefinition {
    /// Creates a creatable, fileable type with no property definitions.
    pub fn new(id: impl Into<String>, base_type: BaseTypeId) -> Self {
        let id = id.into();
        Self {
            local_name: id.clone(),
            query_name: id.clone(),
            display_name: id.clone(),
            id,
            description: None,
            base_type,
            parent_type_id: None,
            creatable: true,
            fileable: !matches!(base_type, BaseTypeId::Secondary | BaseTypeId::Relationship),
            versionable: false,
            content_stream_allowed: matches!(base_type, BaseTypeId::Document),
            property_definitions: BTreeMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the parent type id.
    #[must_use]
    pub fn with_parent(mut self, parent_type_id: impl Into<String>) -> Self {
        self.parent_type_id = Some(parent_type_id.into());
        self
    }

    /// Sets whether documents of this type are versionable.
    #[must_use]
    pub fn with_versionable(mut self, versionable: bool) -> Self {
        self.versionable = versionable;
        self
    }

    /// Adds a property definition.
    #[must_use]
    pub fn with_property(mut self, definition: PropertyDefinition) -> Self {
        self.property_definitions
            .insert(definition.id.clone(), definition);
        self
    }

    /// Adds several property definitions.
    #[must_use]
    pub fn with_properties(mut self, definitions: impl IntoIterator<Item = PropertyDefinition>) -> Self {
        for definition in definitions {
            self.property_definitions
                .insert(definition.id.clone(), definition);
        }
        self
    }

    /// Looks up a property definition by id.
    pub fn property(&self, id: &str) -> Option<&PropertyDefinition> {
        self.property_definitions.get(id)
    }

    pub fn is_document(&self) -> bool {
        self.base_type == BaseTypeId::Document
    }

    pub fn is_folder(&self) -> bool {
        self.base_type == BaseTypeId::Folder
    }

    pub fn is_secondary(&self) -> bool {
        self.base_type == BaseTypeId::Secondary
    }
}
