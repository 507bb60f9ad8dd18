#![allow(dead_code)]

use std::sync::Arc;

use cmis_client::prelude::*;
use cmis_core::memory::{InMemoryBinding, InMemoryConfig};
use url::Url;

pub fn params() -> ConnectionParameters {
    let endpoint = Url::parse("http://localhost:8080/alfresco/api/-default-/public/cmis/versions/1.1/atom")
        .unwrap();
    ConnectionParameters::new(endpoint, "admin", "admin")
}

pub fn factory(binding: &InMemoryBinding) -> SessionFactory {
    SessionFactory::new().with_binding(Arc::new(binding.clone()))
}

pub async fn connect(binding: &InMemoryBinding) -> Session {
    factory(binding)
        .create_session_from_parameters(&params())
        .await
        .unwrap()
}

pub async fn session() -> (InMemoryBinding, Session) {
    session_with(InMemoryConfig::default()).await
}

pub async fn session_with(config: InMemoryConfig) -> (InMemoryBinding, Session) {
    let binding = InMemoryBinding::new(config);
    let session = connect(&binding).await;
    (binding, session)
}

pub async fn test_folder(session: &Session, name: &str) -> Folder {
    session
        .root_folder()
        .await
        .unwrap()
        .create_folder(Properties::for_create("cmis:folder", name))
        .await
        .unwrap()
}

pub fn text(session: &Session, name: &str, body: &str) -> ContentStream {
    session
        .object_factory()
        .create_content_stream(name, body.len() as u64, "text/plain; charset=UTF-8", body.to_owned())
        .unwrap()
}

pub async fn text_document(folder: &Folder, name: &str, body: &str) -> Document {
    let content = text(folder.session(), name, body);
    folder
        .create_document(
            Properties::for_create("cmis:document", name),
            Some(content),
            VersioningState::Major,
        )
        .await
        .unwrap()
}
