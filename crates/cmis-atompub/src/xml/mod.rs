//! AtomPub document model.
//!
//! Responses are parsed into a small element tree keyed on local names, so
//! servers are free to choose their own namespace prefixes. Request entries
//! are written with the fixed prefixes below.

mod entry;
mod service;
mod types;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

pub(crate) use self::entry::{AtomEntry, AtomFeed, rel, write_entry};
pub(crate) use self::service::{Workspace, collection, parse_service_document, template};
pub(crate) use self::types::parse_type_entry;
use crate::error::{Error, Result};

pub(crate) const NS_ATOM: &str = "http://www.w3.org/2005/Atom";
pub(crate) const NS_CMIS: &str = "http://docs.oasis-open.org/ns/cmis/core/200908/";
pub(crate) const NS_CMISRA: &str = "http://docs.oasis-open.org/ns/cmis/restatom/200908/";

/// Media type of a single Atom entry.
pub(crate) const MEDIA_TYPE_ENTRY: &str = "application/atom+xml;type=entry";

/// One XML element with its attributes, children and text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// Parses a document and returns its root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::open(&start)?),
                Event::Empty(start) => {
                    let element = Self::open(&start)?;
                    Self::close(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::malformed("unbalanced end tag"))?;
                    Self::close(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.ok_or_else(|| Error::malformed("document has no root element"))
    }

    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn close(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => *root = Some(element),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the trimmed text of a direct child.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// Parses a direct child's text as a boolean.
    pub fn child_bool(&self, name: &str) -> Option<bool> {
        self.child_text(name).and_then(|t| t.parse().ok())
    }

    /// Finds the first element with `name` in depth-first order, self included.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.descendant(name))
    }
}

/// Escapes text for element content and attribute values.
pub(crate) fn escape(raw: &str) -> String {
    quick_xml::escape::escape(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_documents_by_local_name() {
        let xml = r#"<?xml version="1.0"?>
            <atom:feed xmlns:atom="http://www.w3.org/2005/Atom" xmlns:x="urn:x">
                <atom:title>Children &amp; more</atom:title>
                <atom:link rel="next" href="http://h/next"/>
                <x:numItems>3</x:numItems>
            </atom:feed>"#;

        let root = Element::parse(xml).unwrap();
        assert_eq!(root.name, "feed");
        assert_eq!(root.child_text("title"), Some("Children & more"));
        assert_eq!(root.child("link").and_then(|l| l.attr("rel")), Some("next"));
        assert_eq!(root.child_text("numItems"), Some("3"));
    }

    #[test]
    fn rejects_empty_documents() {
        assert!(Element::parse("").is_err());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
