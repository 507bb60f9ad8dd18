//! Atom entries and feeds carrying CMIS objects.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cmis_core::types::{
    ContentStream, ObjectData, Properties, PropertyType, PropertyValue, property_ids,
};
use jiff::Timestamp;
use url::Url;
use uuid::Uuid;

use super::{Element, NS_ATOM, NS_CMIS, NS_CMISRA, escape};
use crate::error::{Error, Result};

/// Link relations used by the binding.
pub(crate) mod rel {
    pub const SELF: &str = "self";
    pub const EDIT: &str = "edit";
    pub const EDIT_MEDIA: &str = "edit-media";
    pub const DOWN: &str = "down";
    pub const NEXT: &str = "next";
    pub const VERSION_HISTORY: &str = "version-history";
    pub const FOLDER_TREE: &str = "http://docs.oasis-open.org/ns/cmis/link/200908/foldertree";
}

/// Properties that are multi-valued even when the server sends one value.
const MULTI_VALUED: &[&str] = &[property_ids::SECONDARY_OBJECT_TYPE_IDS];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Link {
    rel: String,
    href: String,
    media_type: Option<String>,
}

/// An Atom entry wrapping one CMIS object.
#[derive(Debug, Clone)]
pub(crate) struct AtomEntry {
    pub data: ObjectData,
    links: Vec<Link>,
    content_src: Option<String>,
}

impl AtomEntry {
    /// Parses a document whose root is an `atom:entry`.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse(xml)?;
        if root.name != "entry" {
            return Err(Error::malformed(format!("expected an entry, got <{}>", root.name)));
        }
        Self::from_element(&root)
    }

    fn from_element(entry: &Element) -> Result<Self> {
        let properties = entry
            .child("object")
            .and_then(|object| object.child("properties"))
            .ok_or_else(|| Error::malformed("entry without cmisra:object properties"))?;

        let links = entry
            .children_named("link")
            .filter_map(|link| {
                Some(Link {
                    rel: link.attr("rel")?.to_owned(),
                    href: link.attr("href")?.to_owned(),
                    media_type: link.attr("type").map(str::to_owned),
                })
            })
            .collect();

        let content_src = entry
            .child("content")
            .and_then(|content| content.attr("src"))
            .map(str::to_owned);

        Ok(Self {
            data: ObjectData::new(parse_properties(properties)),
            links,
            content_src,
        })
    }

    fn find_link(&self, rel: &str, media_type: Option<&str>) -> Option<&Link> {
        self.links.iter().find(|link| {
            link.rel == rel
                && media_type.is_none_or(|wanted| {
                    link.media_type
                        .as_deref()
                        .is_some_and(|actual| actual.contains(wanted))
                })
        })
    }

    /// Returns the URL behind a link relation.
    pub fn link(&self, rel: &str) -> Result<Url> {
        let link = self
            .find_link(rel, None)
            .ok_or_else(|| self.missing_link(rel))?;
        Ok(Url::parse(&link.href)?)
    }

    /// Returns the feed of a folder's children.
    pub fn children_link(&self) -> Result<Url> {
        let link = self
            .find_link(rel::DOWN, Some("atom+xml"))
            .ok_or_else(|| self.missing_link("down"))?;
        Ok(Url::parse(&link.href)?)
    }

    /// Returns the link used to modify or delete the object.
    pub fn edit_link(&self) -> Result<Url> {
        self.link(rel::EDIT).or_else(|_| self.link(rel::SELF))
    }

    /// Returns the URL of the object's content, if it has any.
    pub fn content_url(&self) -> Option<Result<Url>> {
        self.content_src
            .as_deref()
            .or_else(|| self.find_link(rel::EDIT_MEDIA, None).map(|l| l.href.as_str()))
            .map(|href| Url::parse(href).map_err(Error::from))
    }

    fn missing_link(&self, rel: &str) -> Error {
        Error::malformed(format!(
            "object '{}' has no '{rel}' link",
            self.data.properties.object_id().unwrap_or("?")
        ))
    }
}

/// An Atom feed of CMIS objects, one page of a listing.
#[derive(Debug, Clone)]
pub(crate) struct AtomFeed {
    pub entries: Vec<AtomEntry>,
    pub num_items: Option<u64>,
    pub has_more_items: bool,
}

impl AtomFeed {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse(xml)?;
        if root.name != "feed" {
            return Err(Error::malformed(format!("expected a feed, got <{}>", root.name)));
        }

        let entries = root
            .children_named("entry")
            .map(AtomEntry::from_element)
            .collect::<Result<Vec<_>>>()?;

        let num_items = root.child_text("numItems").and_then(|n| n.parse().ok());
        let has_more_items = root
            .children_named("link")
            .any(|link| link.attr("rel") == Some(rel::NEXT))
            || root.child_bool("hasMoreItems").unwrap_or(false);

        Ok(Self {
            entries,
            num_items,
            has_more_items,
        })
    }
}

fn property_type(element: &str) -> Option<PropertyType> {
    let property_type = match element {
        "propertyString" => PropertyType::String,
        "propertyId" => PropertyType::Id,
        "propertyInteger" => PropertyType::Integer,
        "propertyDecimal" => PropertyType::Decimal,
        "propertyBoolean" => PropertyType::Boolean,
        "propertyDateTime" => PropertyType::DateTime,
        "propertyUri" => PropertyType::Uri,
        "propertyHtml" => PropertyType::Html,
        _ => return None,
    };
    Some(property_type)
}

fn element_name(property_type: PropertyType) -> &'static str {
    match property_type {
        PropertyType::String => "propertyString",
        PropertyType::Id => "propertyId",
        PropertyType::Integer => "propertyInteger",
        PropertyType::Decimal => "propertyDecimal",
        PropertyType::Boolean => "propertyBoolean",
        PropertyType::DateTime => "propertyDateTime",
        PropertyType::Uri => "propertyUri",
        PropertyType::Html => "propertyHtml",
    }
}

fn parse_properties(element: &Element) -> Properties {
    let mut properties = Properties::new();

    for property in &element.children {
        let Some(property_type) = property_type(&property.name) else {
            continue;
        };
        let Some(id) = property.attr("propertyDefinitionId") else {
            continue;
        };

        let mut values: Vec<PropertyValue> = property
            .children_named("value")
            .filter_map(|v| PropertyValue::parse_scalar(property_type, &v.text))
            .collect();

        let value = if values.len() == 1 && !MULTI_VALUED.contains(&id) {
            values.remove(0)
        } else if values.is_empty() && !MULTI_VALUED.contains(&id) {
            continue;
        } else {
            PropertyValue::List(values)
        };
        properties.insert(id, value);
    }

    properties
}

fn write_properties(out: &mut String, properties: &Properties) {
    out.push_str("<cmisra:object><cmis:properties>");
    for (id, value) in properties {
        let property_type = value.property_type().unwrap_or(PropertyType::Id);
        let element = element_name(property_type);
        out.push_str(&format!(
            "<cmis:{element} propertyDefinitionId=\"{}\">",
            escape(id)
        ));
        for scalar in value.values() {
            out.push_str(&format!(
                "<cmis:value>{}</cmis:value>",
                escape(&scalar.to_wire_string())
            ));
        }
        out.push_str(&format!("</cmis:{element}>"));
    }
    out.push_str("</cmis:properties></cmisra:object>");
}

/// Writes the entry sent by create, update, check-out and check-in calls.
pub(crate) fn write_entry(properties: &Properties, content: Option<&ContentStream>) -> String {
    let title = properties.name().unwrap_or_default();

    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str(&format!(
        r#"<atom:entry xmlns:atom="{NS_ATOM}" xmlns:cmis="{NS_CMIS}" xmlns:cmisra="{NS_CMISRA}">"#
    ));
    out.push_str(&format!("<atom:id>urn:uuid:{}</atom:id>", Uuid::new_v4()));
    out.push_str(&format!("<atom:title>{}</atom:title>", escape(title)));
    out.push_str(&format!("<atom:updated>{}</atom:updated>", Timestamp::now()));

    if let Some(content) = content {
        out.push_str(&format!(
            "<cmisra:content><cmisra:mediatype>{}</cmisra:mediatype><cmisra:base64>{}</cmisra:base64></cmisra:content>",
            escape(content.mime_type()),
            STANDARD.encode(content.as_bytes())
        ));
    }

    write_properties(&mut out, properties);
    out.push_str("</atom:entry>");
    out
}
