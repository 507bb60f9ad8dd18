//! Multi-object property updates.

mod common;

use cmis_client::prelude::*;
use cmis_core::memory::InMemoryConfig;

use crate::common::{session, session_with, test_folder, text_document};

const DESCRIPTION: &str = "Bulk update description";

async fn documents(folder: &Folder, count: usize) -> Vec<Document> {
    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        documents.push(text_document(folder, &format!("bulk-{i}.txt"), "x").await);
    }
    documents
}

fn diff() -> Properties {
    Properties::new().with(property_ids::DESCRIPTION, DESCRIPTION)
}

#[tokio::test]
async fn every_object_receives_the_diff() {
    let (_binding, session) = session().await;
    let folder = test_folder(&session, "bulk").await;
    let documents = documents(&folder, 5).await;

    session
        .bulk_update_properties(&documents, &diff(), &[], &[])
        .await
        .unwrap();

    for document in &documents {
        let refreshed = document.refresh().await.unwrap();
        assert_eq!(refreshed.description(), Some(DESCRIPTION));
    }
}

#[tokio::test]
async fn partial_failure_names_exactly_the_failed_objects() {
    let (_binding, session) = session().await;
    let folder = test_folder(&session, "partial").await;
    let documents = documents(&folder, 5).await;

    let gone = documents[2].id().clone();
    documents[2].delete(true).await.unwrap();

    let err = session
        .bulk_update_properties(&documents, &diff(), &[], &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PartialFailure);

    let outcome = err.partial_failure_details().unwrap();
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[&gone].kind, ErrorKind::NotFound);
    assert_eq!(outcome.succeeded.len(), 4);
    assert!(!outcome.succeeded.contains(&gone));

    for id in &outcome.succeeded {
        let refreshed = session.document(id).await.unwrap();
        assert_eq!(refreshed.description(), Some(DESCRIPTION));
    }
}

#[tokio::test]
async fn atomic_bindings_apply_nothing_on_failure() {
    let config = InMemoryConfig {
        atomic_bulk_update: true,
        ..Default::default()
    };
    let (_binding, session) = session_with(config).await;
    let folder = test_folder(&session, "atomic").await;
    let documents = documents(&folder, 3).await;

    let mut targets: Vec<ObjectId> = documents.iter().map(|d| d.id().clone()).collect();
    targets.push(ObjectId::from("does-not-exist"));

    let err = session
        .bulk_update_properties(&targets, &diff(), &[], &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.partial_failure_details().is_none());

    for document in &documents {
        assert_eq!(document.refresh().await.unwrap().description(), None);
    }

    targets.pop();
    session
        .bulk_update_properties(&targets, &diff(), &[], &[])
        .await
        .unwrap();
    for document in &documents {
        assert_eq!(document.refresh().await.unwrap().description(), Some(DESCRIPTION));
    }
}

#[tokio::test]
async fn secondary_types_are_attached_and_detached() {
    let (_binding, session) = session().await;
    let folder = test_folder(&session, "aspects").await;
    let documents = documents(&folder, 2).await;

    let titled = Properties::new().with("cm:title", "Quarterly report");
    session
        .bulk_update_properties(&documents, &titled, &["P:cm:titled".to_owned()], &[])
        .await
        .unwrap();

    for document in &documents {
        let refreshed = document.refresh().await.unwrap();
        assert_eq!(refreshed.secondary_type_ids(), vec!["P:cm:titled".to_owned()]);
        assert_eq!(refreshed.properties().string("cm:title"), Some("Quarterly report"));
    }

    session
        .bulk_update_properties(&documents, &Properties::new(), &[], &["P:cm:titled".to_owned()])
        .await
        .unwrap();

    for document in &documents {
        assert!(document.refresh().await.unwrap().secondary_type_ids().is_empty());
    }
}

#[tokio::test]
async fn empty_object_list_is_a_no_op() {
    let (_binding, session) = session().await;
    let none: [ObjectId; 0] = [];
    session
        .bulk_update_properties(&none, &diff(), &[], &[])
        .await
        .unwrap();
}
