//! Type registry of the in-memory repository.

use std::collections::BTreeMap;

use crate::types::{
    BaseTypeId, Cardinality, PropertyDefinition, PropertyType, TypeDefinition, Updatability,
    property_ids as ids,
};

fn read_only(id: &str, property_type: PropertyType) -> PropertyDefinition {
    PropertyDefinition::new(id, property_type).with_updatability(Updatability::ReadOnly)
}

/// Properties every object type carries.
fn object_properties() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::new(ids::NAME, PropertyType::String)
            .with_display_name("Name")
            .required(),
        PropertyDefinition::new(ids::DESCRIPTION, PropertyType::String)
            .with_display_name("Description"),
        PropertyDefinition::new(ids::OBJECT_TYPE_ID, PropertyType::Id)
            .with_display_name("Object Type Id")
            .with_updatability(Updatability::OnCreate)
            .required(),
        PropertyDefinition::new(ids::SECONDARY_OBJECT_TYPE_IDS, PropertyType::Id)
            .with_display_name("Secondary Object Type Ids")
            .with_cardinality(Cardinality::Multi),
        read_only(ids::OBJECT_ID, PropertyType::Id),
        read_only(ids::BASE_TYPE_ID, PropertyType::Id),
        read_only(ids::CREATED_BY, PropertyType::String),
        read_only(ids::CREATION_DATE, PropertyType::DateTime),
        read_only(ids::LAST_MODIFIED_BY, PropertyType::String),
        read_only(ids::LAST_MODIFICATION_DATE, PropertyType::DateTime),
        read_only(ids::CHANGE_TOKEN, PropertyType::String),
    ]
}

fn document_type() -> TypeDefinition {
    TypeDefinition::new(BaseTypeId::Document.as_ref(), BaseTypeId::Document)
        .with_display_name("Document")
        .with_versionable(true)
        .with_properties(object_properties())
        .with_properties([
            read_only(ids::IS_IMMUTABLE, PropertyType::Boolean),
            read_only(ids::IS_LATEST_VERSION, PropertyType::Boolean),
            read_only(ids::IS_MAJOR_VERSION, PropertyType::Boolean),
            read_only(ids::IS_LATEST_MAJOR_VERSION, PropertyType::Boolean),
            read_only(ids::IS_PRIVATE_WORKING_COPY, PropertyType::Boolean),
            read_only(ids::VERSION_LABEL, PropertyType::String),
            read_only(ids::VERSION_SERIES_ID, PropertyType::Id),
            read_only(ids::IS_VERSION_SERIES_CHECKED_OUT, PropertyType::Boolean),
            read_only(ids::VERSION_SERIES_CHECKED_OUT_BY, PropertyType::String),
            read_only(ids::VERSION_SERIES_CHECKED_OUT_ID, PropertyType::Id),
            read_only(ids::CHECKIN_COMMENT, PropertyType::String),
            read_only(ids::CONTENT_STREAM_LENGTH, PropertyType::Integer),
            read_only(ids::CONTENT_STREAM_MIME_TYPE, PropertyType::String),
            read_only(ids::CONTENT_STREAM_FILE_NAME, PropertyType::String),
            read_only(ids::CONTENT_STREAM_ID, PropertyType::Id),
        ])
}

fn folder_type() -> TypeDefinition {
    TypeDefinition::new(BaseTypeId::Folder.as_ref(), BaseTypeId::Folder)
        .with_display_name("Folder")
        .with_properties(object_properties())
        .with_properties([
            read_only(ids::PARENT_ID, PropertyType::Id),
            read_only(ids::PATH, PropertyType::String),
        ])
}

fn secondary_type() -> TypeDefinition {
    let mut definition = TypeDefinition::new(BaseTypeId::Secondary.as_ref(), BaseTypeId::Secondary)
        .with_display_name("Secondary Type");
    definition.creatable = false;
    definition
}

fn aspect(id: &str, display_name: &str, properties: Vec<PropertyDefinition>) -> TypeDefinition {
    let mut definition = TypeDefinition::new(id, BaseTypeId::Secondary)
        .with_display_name(display_name)
        .with_parent(BaseTypeId::Secondary.as_ref())
        .with_properties(properties);
    definition.creatable = false;
    definition
}

/// Builds the types every in-memory repository starts with.
pub(crate) fn default_types() -> BTreeMap<String, TypeDefinition> {
    let types = [
        document_type(),
        folder_type(),
        secondary_type(),
        aspect(
            "P:exif:exif",
            "EXIF",
            vec![
                PropertyDefinition::new("exif:manufacturer", PropertyType::String),
                PropertyDefinition::new("exif:model", PropertyType::String),
                PropertyDefinition::new("exif:pixelXDimension", PropertyType::Integer),
                PropertyDefinition::new("exif:pixelYDimension", PropertyType::Integer),
                PropertyDefinition::new("exif:dateTimeOriginal", PropertyType::DateTime),
            ],
        ),
        aspect(
            "P:cm:titled",
            "Titled",
            vec![
                PropertyDefinition::new("cm:title", PropertyType::String),
                PropertyDefinition::new("cm:description", PropertyType::String),
            ],
        ),
    ];

    types.into_iter().map(|t| (t.id.clone(), t)).collect()
}
