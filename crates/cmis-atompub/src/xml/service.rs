//! Service document parsing.

use std::collections::HashMap;

use cmis_core::types::{ObjectId, RepositoryCapabilities, RepositoryDescriptor};
use url::Url;

use super::Element;
use crate::error::{Error, Result};

/// Collection types a workspace advertises.
pub(crate) mod collection {
    pub const CHECKED_OUT: &str = "checkedout";
}

/// URI templates a workspace advertises.
pub(crate) mod template {
    pub const OBJECT_BY_ID: &str = "objectbyid";
    pub const TYPE_BY_ID: &str = "typebyid";
}

/// One repository as described by the service document.
#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    pub descriptor: RepositoryDescriptor,
    collections: HashMap<String, String>,
    templates: HashMap<String, String>,
}

impl Workspace {
    /// Returns the URL of a collection by its `cmisra:collectionType`.
    pub fn collection(&self, kind: &str) -> Result<Url> {
        let href = self.collections.get(kind).ok_or_else(|| {
            Error::malformed(format!(
                "repository '{}' has no '{kind}' collection",
                self.descriptor.id
            ))
        })?;
        Ok(Url::parse(href)?)
    }

    /// Expands a URI template, substituting `{id}` and blanking every other
    /// parameter.
    pub fn expand(&self, kind: &str, id: &str) -> Result<Url> {
        let template = self.templates.get(kind).ok_or_else(|| {
            Error::malformed(format!(
                "repository '{}' has no '{kind}' URI template",
                self.descriptor.id
            ))
        })?;

        let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        let mut expanded = String::with_capacity(template.len() + encoded.len());
        let mut rest = template.as_str();

        while let Some(start) = rest.find('{') {
            expanded.push_str(&rest[..start]);
            let Some(len) = rest[start..].find('}') else {
                rest = &rest[start..];
                break;
            };
            if &rest[start + 1..start + len] == "id" {
                expanded.push_str(&encoded);
            }
            rest = &rest[start + len + 1..];
        }
        expanded.push_str(rest);

        Ok(Url::parse(&expanded)?)
    }
}

/// Parses every workspace of an AtomPub service document.
pub(crate) fn parse_service_document(xml: &str) -> Result<Vec<Workspace>> {
    let root = Element::parse(xml)?;
    if root.name != "service" {
        return Err(Error::malformed(format!(
            "expected a service document, got <{}>",
            root.name
        )));
    }

    root.children_named("workspace").map(parse_workspace).collect()
}

fn parse_workspace(workspace: &Element) -> Result<Workspace> {
    let info = workspace
        .child("repositoryInfo")
        .ok_or_else(|| Error::malformed("workspace without repositoryInfo"))?;

    let id = info
        .child_text("repositoryId")
        .ok_or_else(|| Error::malformed("repositoryInfo without repositoryId"))?;
    let root_folder_id = info
        .child_text("rootFolderId")
        .ok_or_else(|| Error::malformed(format!("repository '{id}' without rootFolderId")))?;
    let name = info.child_text("repositoryName").unwrap_or(id);

    let mut descriptor = RepositoryDescriptor::new(id, name, ObjectId::from(root_folder_id));
    descriptor.description = non_empty(info.child_text("repositoryDescription"));
    descriptor.product_name = non_empty(info.child_text("productName"));
    descriptor.product_version = non_empty(info.child_text("productVersion"));
    descriptor.cmis_version = non_empty(info.child_text("cmisVersionSupported"));

    if let Some(caps) = info.child("capabilities") {
        descriptor.capabilities = RepositoryCapabilities {
            get_descendants: caps.child_bool("capabilityGetDescendants").unwrap_or(false),
            pwc_updatable: caps.child_bool("capabilityPWCUpdatable").unwrap_or(false),
            all_versions_searchable: caps
                .child_bool("capabilityAllVersionsSearchable")
                .unwrap_or(false),
            content_stream_updatability: non_empty(
                caps.child_text("capabilityContentStreamUpdatability"),
            ),
        };
    }

    let collections = workspace
        .children_named("collection")
        .filter_map(|c| {
            let kind = c.child_text("collectionType")?;
            let href = c.attr("href")?;
            Some((kind.to_owned(), href.to_owned()))
        })
        .collect();

    let templates = workspace
        .children_named("uritemplate")
        .filter_map(|t| {
            let kind = t.child_text("type")?;
            let template = t.child_text("template")?;
            Some((kind.to_owned(), template.to_owned()))
        })
        .collect();

    Ok(Workspace {
        descriptor,
        collections,
        templates,
    })
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_owned)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SERVICE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<app:service xmlns:app="http://www.w3.org/2007/app" xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
    xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
  <app:workspace>
    <atom:title>Main Repository</atom:title>
    <cmisra:repositoryInfo>
      <cmis:repositoryId>abc-123</cmis:repositoryId>
      <cmis:repositoryName>Main Repository</cmis:repositoryName>
      <cmis:repositoryDescription></cmis:repositoryDescription>
      <cmis:productName>Alfresco Repository</cmis:productName>
      <cmis:productVersion>4.0.0</cmis:productVersion>
      <cmis:rootFolderId>root-1</cmis:rootFolderId>
      <cmis:capabilities>
        <cmis:capabilityGetDescendants>true</cmis:capabilityGetDescendants>
        <cmis:capabilityPWCUpdatable>true</cmis:capabilityPWCUpdatable>
        <cmis:capabilityContentStreamUpdatability>anytime</cmis:capabilityContentStreamUpdatability>
      </cmis:capabilities>
      <cmis:cmisVersionSupported>1.0</cmis:cmisVersionSupported>
    </cmisra:repositoryInfo>
    <app:collection href="http://h/cmis/children?id=root-1">
      <cmisra:collectionType>root</cmisra:collectionType>
    </app:collection>
    <app:collection href="http://h/cmis/checkedout">
      <cmisra:collectionType>checkedout</cmisra:collectionType>
    </app:collection>
    <cmisra:uritemplate>
      <cmisra:template>http://h/cmis/entry?id={id}&amp;filter={filter}&amp;includeACL={includeACL}</cmisra:template>
      <cmisra:type>objectbyid</cmisra:type>
      <cmisra:mediatype>application/atom+xml;type=entry</cmisra:mediatype>
    </cmisra:uritemplate>
    <cmisra:uritemplate>
      <cmisra:template>http://h/cmis/type?id={id}</cmisra:template>
      <cmisra:type>typebyid</cmisra:type>
    </cmisra:uritemplate>
  </app:workspace>
</app:service>"#;

    #[test]
    fn parses_repository_info() {
        let workspaces = parse_service_document(SERVICE_DOCUMENT).unwrap();
        assert_eq!(workspaces.len(), 1);

        let repo = &workspaces[0].descriptor;
        assert_eq!(repo.id, "abc-123");
        assert_eq!(repo.root_folder_id.as_str(), "root-1");
        assert_eq!(repo.description, None);
        assert_eq!(repo.cmis_version.as_deref(), Some("1.0"));
        assert!(repo.capabilities.get_descendants);
        assert!(!repo.capabilities.all_versions_searchable);
    }

    #[test]
    fn resolves_collections_and_templates() {
        let workspace = parse_service_document(SERVICE_DOCUMENT).unwrap().remove(0);
        assert_eq!(
            workspace.collection(collection::CHECKED_OUT).unwrap().as_str(),
            "http://h/cmis/checkedout"
        );
        assert!(workspace.collection("query").is_err());

        let url = workspace.expand(template::OBJECT_BY_ID, "workspace://SpacesStore/a b").unwrap();
        assert_eq!(
            url.as_str(),
            "http://h/cmis/entry?id=workspace%3A%2F%2FSpacesStore%2Fa+b&filter=&includeACL="
        );
    }

    #[test]
    fn rejects_other_documents() {
        assert!(parse_service_document("<feed/>").is_err());
    }
}
