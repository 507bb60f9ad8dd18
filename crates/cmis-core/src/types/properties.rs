//! Schema-validated property bag.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use super::property::{Cardinality, PropertyDefinition, PropertyValue, Updatability, property_ids};
use super::type_definition::TypeDefinition;
use crate::{Error, Result};

/// What a property bag is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Creating a new object.
    Create,
    /// Updating an object that is not a private working copy.
    Update,
    /// Updating or checking in a private working copy.
    UpdateCheckedOut,
}

/// Ordered map of property id to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    /// Creates an empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, replacing any previous value.
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(id, value);
        self
    }

    /// Adds the `cmis:objectTypeId` and `cmis:name` pair every create call needs.
    pub fn for_create(object_type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new()
            .with(property_ids::OBJECT_TYPE_ID, PropertyValue::Id(object_type_id.into()))
            .with(property_ids::NAME, PropertyValue::String(name.into()))
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(id.into(), value.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<PropertyValue> {
        self.0.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&PropertyValue> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropertyValue> {
        self.0.iter()
    }

    /// Overwrites properties with those of `other`.
    pub fn merge(&mut self, other: &Properties) {
        for (id, value) in other.iter() {
            self.0.insert(id.clone(), value.clone());
        }
    }

    /// Returns a string-like scalar.
    pub fn string(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(PropertyValue::as_str)
    }

    /// Returns a boolean scalar.
    pub fn boolean(&self, id: &str) -> Option<bool> {
        self.get(id).and_then(PropertyValue::as_bool)
    }

    /// Returns an integer scalar.
    pub fn integer(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(PropertyValue::as_i64)
    }

    /// Returns every string-like value of a (possibly multi-valued) property.
    pub fn strings(&self, id: &str) -> Vec<String> {
        self.get(id)
            .map(|value| {
                value
                    .values()
                    .iter()
                    .filter_map(PropertyValue::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn object_id(&self) -> Option<&str> {
        self.string(property_ids::OBJECT_ID)
    }

    pub fn name(&self) -> Option<&str> {
        self.string(property_ids::NAME)
    }

    pub fn object_type_id(&self) -> Option<&str> {
        self.string(property_ids::OBJECT_TYPE_ID)
    }

    pub fn base_type_id(&self) -> Option<&str> {
        self.string(property_ids::BASE_TYPE_ID)
    }

    pub fn secondary_type_ids(&self) -> Vec<String> {
        self.strings(property_ids::SECONDARY_OBJECT_TYPE_IDS)
    }

    /// Checks the bag against the schema of its primary and secondary types.
    ///
    /// Every property must be defined by one of the types, carry the declared
    /// value type and cardinality, and be writable in `mode`. On create, every
    /// required property of the primary type must be present.
    pub fn validate(
        &self,
        primary: &TypeDefinition,
        secondary: &[TypeDefinition],
        mode: WriteMode,
    ) -> Result<()> {
        for (id, value) in self.iter() {
            let definition = primary
                .property(id)
                .or_else(|| secondary.iter().find_map(|t| t.property(id)))
                .ok_or_else(|| {
                    Error::invalid_property().with_message(format!(
                        "property '{id}' is not defined by type '{}'",
                        primary.id
                    ))
                })?;

            check_value(definition, value)?;
            check_updatability(definition, mode)?;
        }

        if mode == WriteMode::Create {
            let missing = primary
                .property_definitions
                .values()
                .filter(|d| d.required && d.updatability != Updatability::ReadOnly)
                .find(|d| !self.contains(&d.id));

            if let Some(definition) = missing {
                return Err(Error::invalid_property()
                    .with_message(format!("required property '{}' is missing", definition.id)));
            }
        }

        Ok(())
    }
}

fn check_value(definition: &PropertyDefinition, value: &PropertyValue) -> Result<()> {
    let id = &definition.id;

    if value.is_list() && definition.cardinality == Cardinality::Single {
        return Err(Error::invalid_property()
            .with_message(format!("property '{id}' is single-valued")));
    }

    for scalar in value.values() {
        if scalar.is_list() {
            return Err(Error::invalid_property()
                .with_message(format!("property '{id}' contains a nested list")));
        }

        if scalar.property_type() != Some(definition.property_type) {
            return Err(Error::invalid_property().with_message(format!(
                "property '{id}' expects {} values",
                definition.property_type
            )));
        }
    }

    Ok(())
}

fn check_updatability(definition: &PropertyDefinition, mode: WriteMode) -> Result<()> {
    let writable = match definition.updatability {
        Updatability::ReadOnly => false,
        Updatability::ReadWrite => true,
        Updatability::OnCreate => mode == WriteMode::Create,
        Updatability::WhenCheckedOut => {
            matches!(mode, WriteMode::Create | WriteMode::UpdateCheckedOut)
        }
    };

    // The type id is read-only on the wire yet names the type on create.
    let object_type_on_create =
        definition.id == property_ids::OBJECT_TYPE_ID && mode == WriteMode::Create;

    if writable || object_type_on_create {
        Ok(())
    } else {
        Err(Error::invalid_property().with_message(format!(
            "property '{}' is {} and cannot be written here",
            definition.id, definition.updatability
        )))
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Properties {
    type IntoIter = btree_map::IntoIter<String, PropertyValue>;
    type Item = (String, PropertyValue);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Properties {
    type IntoIter = btree_map::Iter<'a, String, PropertyValue>;
    type Item = (&'a String, &'a PropertyValue);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::types::{BaseTypeId, PropertyType};

    fn document_type() -> TypeDefinition {
        TypeDefinition::new("cmis:document", BaseTypeId::Document).with_properties([
            PropertyDefinition::new(property_ids::NAME, PropertyType::String).required(),
            PropertyDefinition::new(property_ids::OBJECT_TYPE_ID, PropertyType::Id)
                .with_updatability(Updatability::OnCreate)
                .required(),
            PropertyDefinition::new(property_ids::DESCRIPTION, PropertyType::String),
            PropertyDefinition::new(property_ids::OBJECT_ID, PropertyType::Id)
                .with_updatability(Updatability::ReadOnly),
            PropertyDefinition::new(property_ids::SECONDARY_OBJECT_TYPE_IDS, PropertyType::Id)
                .with_cardinality(Cardinality::Multi),
            PropertyDefinition::new(property_ids::CHECKIN_COMMENT, PropertyType::String)
                .with_updatability(Updatability::WhenCheckedOut),
        ])
    }

    fn exif_type() -> TypeDefinition {
        TypeDefinition::new("P:exif:exif", BaseTypeId::Secondary)
            .with_property(PropertyDefinition::new("exif:model", PropertyType::String))
    }

    #[test]
    fn accepts_valid_create() {
        let props = Properties::for_create("cmis:document", "test.txt")
            .with(property_ids::DESCRIPTION, "hello");
        props
            .validate(&document_type(), &[], WriteMode::Create)
            .unwrap();
    }

    #[test]
    fn rejects_missing_required() {
        let props = Properties::new().with(property_ids::OBJECT_TYPE_ID, PropertyValue::Id("cmis:document".into()));
        let err = props
            .validate(&document_type(), &[], WriteMode::Create)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidProperty);
        assert!(err.message.unwrap().contains("cmis:name"));
    }

    #[test]
    fn rejects_undefined_property_unless_secondary_defines_it() {
        let props = Properties::new().with("exif:model", "Canon");
        let err = props
            .validate(&document_type(), &[], WriteMode::Update)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidProperty);

        props
            .validate(&document_type(), &[exif_type()], WriteMode::Update)
            .unwrap();
    }

    #[test]
    fn rejects_type_and_cardinality_mismatch() {
        let wrong_type = Properties::new().with(property_ids::DESCRIPTION, 42_i64);
        assert!(wrong_type
            .validate(&document_type(), &[], WriteMode::Update)
            .is_err());

        let wrong_cardinality =
            Properties::new().with(property_ids::DESCRIPTION, vec!["a", "b"]);
        assert!(wrong_cardinality
            .validate(&document_type(), &[], WriteMode::Update)
            .is_err());

        let multi = Properties::new().with(
            property_ids::SECONDARY_OBJECT_TYPE_IDS,
            PropertyValue::id_list(["P:exif:exif"]),
        );
        multi
            .validate(&document_type(), &[], WriteMode::Update)
            .unwrap();
    }

    #[test]
    fn enforces_updatability() {
        let read_only = Properties::new().with(property_ids::OBJECT_ID, PropertyValue::Id("x".into()));
        assert!(read_only
            .validate(&document_type(), &[], WriteMode::Update)
            .is_err());

        let on_create = Properties::new().with(property_ids::OBJECT_TYPE_ID, PropertyValue::Id("cmis:document".into()));
        assert!(on_create
            .validate(&document_type(), &[], WriteMode::Update)
            .is_err());

        let comment = Properties::new().with(property_ids::CHECKIN_COMMENT, "v1.1");
        assert!(comment
            .validate(&document_type(), &[], WriteMode::Update)
            .is_err());
        comment
            .validate(&document_type(), &[], WriteMode::UpdateCheckedOut)
            .unwrap();
    }

    #[test]
    fn typed_accessors() {
        let props = Properties::for_create("cmis:folder", "F").with(
            property_ids::SECONDARY_OBJECT_TYPE_IDS,
            PropertyValue::id_list(["P:a", "P:b"]),
        );
        assert_eq!(props.name(), Some("F"));
        assert_eq!(props.object_type_id(), Some("cmis:folder"));
        assert_eq!(props.secondary_type_ids(), vec!["P:a".to_owned(), "P:b".to_owned()]);
        assert_eq!(props.len(), 3);
    }
}
