//! AtomPub binding tests against a mocked service endpoint.

use cmis_atompub::{AtomPubClient, AtomPubConfig};
use cmis_core::types::{
    CheckIn, ContentStream, ObjectId, PageRequest, Properties, VersioningState, property_ids,
};
use cmis_core::{CmisBinding, ErrorKind};
use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "abc-123";

fn service_document(base: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<app:service xmlns:app="http://www.w3.org/2007/app" xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
    xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
  <app:workspace>
    <cmisra:repositoryInfo>
      <cmis:repositoryId>{REPO}</cmis:repositoryId>
      <cmis:repositoryName>Main Repository</cmis:repositoryName>
      <cmis:rootFolderId>root-1</cmis:rootFolderId>
    </cmisra:repositoryInfo>
    <app:collection href="{base}/cmis/checkedout">
      <cmisra:collectionType>checkedout</cmisra:collectionType>
    </app:collection>
    <cmisra:uritemplate>
      <cmisra:template>{base}/cmis/entry?id={{id}}&amp;filter={{filter}}</cmisra:template>
      <cmisra:type>objectbyid</cmisra:type>
    </cmisra:uritemplate>
    <cmisra:uritemplate>
      <cmisra:template>{base}/cmis/type?id={{id}}</cmisra:template>
      <cmisra:type>typebyid</cmisra:type>
    </cmisra:uritemplate>
  </app:workspace>
</app:service>"#
    )
}

fn property(kind: &str, id: &str, value: &str) -> String {
    format!(
        r#"<cmis:property{kind} propertyDefinitionId="{id}"><cmis:value>{value}</cmis:value></cmis:property{kind}>"#
    )
}

fn entry(base: &str, id: &str, name: &str, type_id: &str, extra: &str) -> String {
    format!(
        r#"<atom:entry xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
    xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
  <atom:title>{name}</atom:title>
  <atom:link rel="self" href="{base}/cmis/entry?id={id}"/>
  <atom:link rel="down" type="application/atom+xml;type=feed" href="{base}/cmis/children?id={id}"/>
  <atom:link rel="version-history" href="{base}/cmis/versions?id={id}"/>
  <cmisra:object><cmis:properties>{}{}{}{extra}</cmis:properties></cmisra:object>
</atom:entry>"#,
        property("Id", "cmis:objectId", id),
        property("String", "cmis:name", name),
        property("Id", "cmis:objectTypeId", type_id),
    )
}

fn feed(entries: &[String], num_items: usize, next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<atom:link rel="next" href="{href}"/>"#))
        .unwrap_or_default();
    let entries: String = entries
        .iter()
        .map(|e| e.replace(r#"<atom:entry xmlns:atom="http://www.w3.org/2005/Atom""#, "<atom:entry"))
        .collect();
    format!(
        r#"<atom:feed xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
    xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
  <cmisra:numItems>{num_items}</cmisra:numItems>{next}{entries}</atom:feed>"#
    )
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/atom+xml")
        .set_body_string(body)
}

async fn setup() -> (MockServer, AtomPubClient) {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/cmis"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(xml(service_document(&base)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "root-1"))
        .respond_with(xml(entry(&base, "root-1", "Company Home", "cmis:folder", "")))
        .mount(&server)
        .await;

    let endpoint = Url::parse(&format!("{base}/cmis")).unwrap();
    let client = AtomPubClient::new(
        endpoint,
        "admin",
        SecretString::from("admin".to_owned()),
        AtomPubConfig::default().with_page_size(2),
    )
    .unwrap();

    (server, client)
}

#[tokio::test]
async fn discovers_repositories() {
    let (_server, client) = setup().await;

    let repositories = client.repositories().await.unwrap();
    assert_eq!(repositories.len(), 1);
    assert_eq!(repositories[0].id, REPO);
    assert_eq!(repositories[0].root_folder_id.as_str(), "root-1");

    let err = client.repository_info("missing").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RepositoryNotFound);
}

#[tokio::test]
async fn rejected_credentials_map_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cmis"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let endpoint = Url::parse(&format!("{}/cmis", server.uri())).unwrap();
    let client = AtomPubClient::new(
        endpoint,
        "admin",
        SecretString::from("wrong".to_owned()),
        AtomPubConfig::default(),
    )
    .unwrap();

    let err = client.repositories().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn unreachable_endpoint_is_connectivity_error() {
    let endpoint = Url::parse("http://127.0.0.1:9/cmis").unwrap();
    let client = AtomPubClient::new(
        endpoint,
        "admin",
        SecretString::from("admin".to_owned()),
        AtomPubConfig::default(),
    )
    .unwrap();

    let err = client.repositories().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Connectivity);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn lists_children_with_paging() {
    let (server, client) = setup().await;
    let base = server.uri();

    let children = vec![
        entry(&base, "f-1", "Sites", "cmis:folder", ""),
        entry(&base, "f-2", "Data Dictionary", "cmis:folder", ""),
    ];
    Mock::given(method("GET"))
        .and(path("/cmis/children"))
        .and(query_param("id", "root-1"))
        .and(query_param("maxItems", "2"))
        .and(query_param("skipCount", "0"))
        .respond_with(xml(feed(&children, 3, Some("http://next"))))
        .expect(1)
        .mount(&server)
        .await;

    let root = ObjectId::from("root-1");
    let page = client
        .children(REPO, &root, PageRequest::new(0, 0))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.num_items, Some(3));
    assert!(page.has_more_items);
    assert_eq!(page.items[1].name(), Some("Data Dictionary"));
}

#[tokio::test]
async fn creates_documents_with_versioning_state() {
    let (server, client) = setup().await;
    let base = server.uri();

    Mock::given(method("POST"))
        .and(path("/cmis/children"))
        .and(query_param("versioningState", "major"))
        .and(header("content-type", "application/atom+xml;type=entry"))
        .and(body_string_contains("<cmis:value>test.txt</cmis:value>"))
        .and(body_string_contains("<cmisra:base64>"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(entry(&base, "doc-1", "test.txt", "cmis:document", "")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let content = ContentStream::new("test.txt", 5, "text/plain; charset=UTF-8", "hello").unwrap();
    let id = client
        .create_document(
            REPO,
            &ObjectId::from("root-1"),
            Properties::for_create("cmis:document", "test.txt"),
            Some(content),
            VersioningState::Major,
        )
        .await
        .unwrap();

    assert_eq!(id.as_str(), "doc-1");
}

#[tokio::test]
async fn name_conflicts_are_typed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cmis/children"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_string("<!--exception-->nameConstraintViolation<!--/exception-->"),
        )
        .mount(&server)
        .await;

    let err = client
        .create_folder(
            REPO,
            &ObjectId::from("root-1"),
            Properties::for_create("cmis:folder", "Sites"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameConflict);
}

#[tokio::test]
async fn versioning_round_trip() {
    let (server, client) = setup().await;
    let base = server.uri();

    let pwc_flags = format!(
        "{}{}",
        property("Boolean", "cmis:isVersionSeriesCheckedOut", "true"),
        property("Id", "cmis:versionSeriesCheckedOutId", "pwc-1"),
    );

    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "doc-1"))
        .respond_with(xml(entry(&base, "doc-1", "test.txt", "cmis:document", "")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "pwc-1"))
        .respond_with(xml(entry(&base, "pwc-1", "test.txt", "cmis:document", &pwc_flags)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cmis/checkedout"))
        .and(body_string_contains("<cmis:value>doc-1</cmis:value>"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(entry(&base, "pwc-1", "test.txt", "cmis:document", &pwc_flags)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "pwc-1"))
        .and(query_param("checkin", "true"))
        .and(query_param("major", "false"))
        .and(query_param("checkinComment", "v1.1"))
        .respond_with(xml(entry(&base, "doc-2", "test.txt", "cmis:document", "")))
        .expect(1)
        .mount(&server)
        .await;

    let versions = vec![
        entry(&base, "doc-2", "test.txt", "cmis:document", ""),
        entry(&base, "doc-1", "test.txt", "cmis:document", ""),
    ];
    Mock::given(method("GET"))
        .and(path("/cmis/versions"))
        .respond_with(xml(feed(&versions, 2, None)))
        .mount(&server)
        .await;

    let doc = ObjectId::from("doc-1");
    let pwc = client.check_out(REPO, &doc).await.unwrap();
    assert_eq!(pwc.as_str(), "pwc-1");

    let content = ContentStream::from_bytes("test.txt", "text/plain", "updated").unwrap();
    let version = client
        .check_in(REPO, &pwc, CheckIn::new(false, "v1.1").with_content(content))
        .await
        .unwrap();
    assert_eq!(version.as_str(), "doc-2");

    let all = client.all_versions(REPO, &version).await.unwrap();
    let ids: Vec<_> = all.iter().filter_map(|v| v.properties.object_id()).collect();
    assert_eq!(ids, ["doc-2", "doc-1"]);
}

#[tokio::test]
async fn cancel_on_released_document_is_rejected_locally() {
    let (server, client) = setup().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "doc-1"))
        .respond_with(xml(entry(&base, "doc-1", "test.txt", "cmis:document", "")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .cancel_check_out(REPO, &ObjectId::from("doc-1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotCheckedOut);
}

#[tokio::test]
async fn versioning_exceptions_map_by_operation() {
    let (server, client) = setup().await;
    let base = server.uri();

    let pwc_flags = property("Boolean", "cmis:isPrivateWorkingCopy", "true");
    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "pwc-1"))
        .respond_with(xml(entry(&base, "pwc-1", "test.txt", "cmis:document", &pwc_flags)))
        .mount(&server)
        .await;

    let versioning = "<!--exception-->versioning<!--/exception-->\
        <!--message-->Checkout failed: a working copy exists for this version series<!--/message-->";
    Mock::given(method("POST"))
        .and(path("/cmis/checkedout"))
        .respond_with(ResponseTemplate::new(409).set_body_string(versioning))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "pwc-1"))
        .respond_with(ResponseTemplate::new(409).set_body_string(versioning))
        .mount(&server)
        .await;

    let err = client.check_out(REPO, &ObjectId::from("doc-1")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyCheckedOut);

    let err = client
        .check_in(REPO, &ObjectId::from("pwc-1"), CheckIn::new(true, "late"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotCheckedOut);
}

#[tokio::test]
async fn missing_types_are_unknown() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/cmis/type"))
        .respond_with(ResponseTemplate::new(404).set_body_string("objectNotFound"))
        .mount(&server)
        .await;

    let err = client.type_definition(REPO, "P:nope:nope").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownType);
}

#[tokio::test]
async fn bulk_update_reports_each_object() {
    let (server, client) = setup().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "doc-1"))
        .respond_with(xml(entry(&base, "doc-1", "a.txt", "cmis:document", "")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cmis/entry"))
        .and(query_param("id", "gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/cmis/entry"))
        .and(body_string_contains("Bulk update description"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.supports_atomic_bulk_update());

    let diff = Properties::new().with(property_ids::DESCRIPTION, "Bulk update description");
    let entries = client
        .bulk_update_properties(
            REPO,
            &[ObjectId::from("doc-1"), ObjectId::from("gone")],
            &diff,
            &[],
            &[],
        )
        .await
        .unwrap();

    assert_eq!(entries[0].outcome.as_ref().unwrap().as_str(), "doc-1");
    assert_eq!(
        entries[1].outcome.as_ref().unwrap_err().kind,
        ErrorKind::NotFound
    );
}
