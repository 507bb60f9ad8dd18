//! Type definition entries.

use cmis_core::types::{
    BaseTypeId, Cardinality, PropertyDefinition, PropertyType, TypeDefinition, Updatability,
};

use super::Element;
use crate::error::{Error, Result};

/// Parses an entry carrying a `cmisra:type` element.
pub(crate) fn parse_type_entry(xml: &str) -> Result<TypeDefinition> {
    let root = Element::parse(xml)?;
    let element = root
        .descendant("type")
        .filter(|t| t.child("id").is_some())
        .ok_or_else(|| Error::malformed("entry without cmisra:type"))?;

    let id = element
        .child_text("id")
        .ok_or_else(|| Error::malformed("type without id"))?;
    let base_type: BaseTypeId = element
        .child_text("baseId")
        .and_then(|b| b.parse().ok())
        .ok_or_else(|| Error::malformed(format!("type '{id}' without a known baseId")))?;

    let mut definition = TypeDefinition::new(id, base_type);
    if let Some(local_name) = element.child_text("localName") {
        definition.local_name = local_name.to_owned();
    }
    if let Some(query_name) = element.child_text("queryName") {
        definition.query_name = query_name.to_owned();
    }
    if let Some(display_name) = element.child_text("displayName") {
        definition.display_name = display_name.to_owned();
    }
    definition.description = element
        .child_text("description")
        .filter(|d| !d.is_empty())
        .map(str::to_owned);
    definition.parent_type_id = element
        .child_text("parentId")
        .filter(|p| !p.is_empty())
        .map(str::to_owned);
    definition.creatable = element.child_bool("creatable").unwrap_or(definition.creatable);
    definition.fileable = element.child_bool("fileable").unwrap_or(definition.fileable);
    definition.versionable = element.child_bool("versionable").unwrap_or(false);
    if let Some(allowed) = element.child_text("contentStreamAllowed") {
        definition.content_stream_allowed = allowed != "notallowed";
    }

    let properties = element
        .children
        .iter()
        .filter(|c| c.name.starts_with("property") && c.name.ends_with("Definition"))
        .filter_map(parse_property_definition);

    Ok(definition.with_properties(properties))
}

fn parse_property_definition(element: &Element) -> Option<PropertyDefinition> {
    let id = element.child_text("id")?;
    let property_type: PropertyType = element.child_text("propertyType")?.parse().ok()?;

    let mut definition = PropertyDefinition::new(id, property_type);
    if let Some(display_name) = element.child_text("displayName") {
        definition = definition.with_display_name(display_name);
    }
    if let Some(cardinality) = element
        .child_text("cardinality")
        .and_then(|c| c.parse::<Cardinality>().ok())
    {
        definition = definition.with_cardinality(cardinality);
    }
    if let Some(updatability) = element
        .child_text("updatability")
        .and_then(|u| u.parse::<Updatability>().ok())
    {
        definition = definition.with_updatability(updatability);
    }
    if element.child_bool("required").unwrap_or(false) {
        definition = definition.required();
    }
    Some(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXIF_TYPE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<atom:entry xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
    xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <atom:title>EXIF</atom:title>
  <cmisra:type xsi:type="cmis:cmisTypeSecondaryDefinitionType">
    <cmis:id>P:exif:exif</cmis:id>
    <cmis:localName>exif</cmis:localName>
    <cmis:queryName>exif:exif</cmis:queryName>
    <cmis:displayName>EXIF</cmis:displayName>
    <cmis:baseId>cmis:secondary</cmis:baseId>
    <cmis:parentId>cmis:secondary</cmis:parentId>
    <cmis:creatable>false</cmis:creatable>
    <cmis:fileable>false</cmis:fileable>
    <cmis:propertyStringDefinition>
      <cmis:id>exif:model</cmis:id>
      <cmis:displayName>Camera Model</cmis:displayName>
      <cmis:propertyType>string</cmis:propertyType>
      <cmis:cardinality>single</cmis:cardinality>
      <cmis:updatability>readwrite</cmis:updatability>
      <cmis:required>false</cmis:required>
    </cmis:propertyStringDefinition>
    <cmis:propertyIntegerDefinition>
      <cmis:id>exif:pixelXDimension</cmis:id>
      <cmis:propertyType>integer</cmis:propertyType>
      <cmis:cardinality>single</cmis:cardinality>
      <cmis:updatability>readwrite</cmis:updatability>
    </cmis:propertyIntegerDefinition>
  </cmisra:type>
</atom:entry>"#;

    #[test]
    fn parses_secondary_type() {
        let definition = parse_type_entry(EXIF_TYPE).unwrap();
        assert_eq!(definition.id, "P:exif:exif");
        assert_eq!(definition.display_name, "EXIF");
        assert!(definition.is_secondary());
        assert!(!definition.creatable);
        assert_eq!(definition.parent_type_id.as_deref(), Some("cmis:secondary"));

        let model = definition.property("exif:model").unwrap();
        assert_eq!(model.property_type, PropertyType::String);
        assert_eq!(model.display_name, "Camera Model");
        assert_eq!(
            definition.property("exif:pixelXDimension").unwrap().property_type,
            PropertyType::Integer
        );
    }

    #[test]
    fn rejects_entries_without_type() {
        assert!(parse_type_entry("<entry><title>x</title></entry>").is_err());
    }
}
