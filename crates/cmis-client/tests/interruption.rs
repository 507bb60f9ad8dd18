//! Timeouts, cancellation and indeterminate outcomes.

mod common;

use std::time::Duration;

use cmis_client::prelude::*;
use cmis_core::memory::InMemoryConfig;
use tokio_util::sync::CancellationToken;

use crate::common::{session, session_with, test_folder, text_document};

#[tokio::test]
async fn interrupted_mutation_is_indeterminate() {
    let config = InMemoryConfig {
        latency: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let (_binding, session) = session_with(config).await;
    let folder = test_folder(&session, "slow").await;

    let hurried = session.with_context(OperationContext::new().with_timeout(Duration::from_millis(20)));
    let err = hurried.delete_object(folder.id(), true).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(err.is_indeterminate());

    // The delete took effect before the response was lost.
    let err = session.object(folder.id()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn interrupted_read_is_not_indeterminate() {
    let config = InMemoryConfig {
        latency: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let (_binding, session) = session_with(config).await;

    let hurried = session.with_context(OperationContext::new().with_timeout(Duration::from_millis(20)));
    let err = hurried.root_folder().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(!err.is_indeterminate());
    assert!(err.is_retryable());
}

#[tokio::test]
async fn cancelled_sessions_stop_issuing_calls() {
    let (_binding, session) = session().await;
    let folder = test_folder(&session, "cancel").await;
    let document = text_document(&folder, "test.txt", "x").await;

    let token = CancellationToken::new();
    let cancellable = session.with_context(OperationContext::new().with_cancellation(token.clone()));
    let document = cancellable.document(document.id()).await.unwrap();

    token.cancel();

    let err = document.check_out().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert!(err.is_indeterminate());

    let err = cancellable.root_folder().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert!(!err.is_indeterminate());

    // The unscoped session is unaffected and the document was never checked out.
    let refreshed = session.document(document.id()).await.unwrap();
    assert!(!refreshed.is_version_series_checked_out());
}

#[tokio::test]
async fn objects_inherit_the_session_context() {
    let (_binding, session) = session().await;
    let context = OperationContext::new()
        .with_timeout(Duration::from_secs(5))
        .with_page_size(7);
    let scoped = session.with_context(context);

    let root = scoped.root_folder().await.unwrap();
    assert_eq!(root.session().context().timeout(), Some(Duration::from_secs(5)));
    assert_eq!(root.children().page_size(), 7);
    assert_eq!(session.root_folder().await.unwrap().session().context().timeout(), None);
}

fn cancel_after(token: &CancellationToken, delay: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
}

#[tokio::test]
async fn interrupted_re_read_after_create_is_indeterminate() {
    let config = InMemoryConfig {
        latency: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let (_binding, session) = session_with(config).await;
    let folder = test_folder(&session, "late-create").await;

    let token = CancellationToken::new();
    let cancellable = session.with_context(OperationContext::new().with_cancellation(token.clone()));
    let folder = cancellable.folder(folder.id()).await.unwrap();

    // Type lookup, create and re-read take one latency step each; the
    // cancellation lands while the created document is being re-read.
    cancel_after(&token, Duration::from_millis(500));
    let err = folder
        .create_document(
            Properties::for_create("cmis:document", "late.txt"),
            None,
            VersioningState::Major,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert!(err.is_indeterminate());

    let children = session
        .folder(folder.id())
        .await
        .unwrap()
        .children()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name(), "late.txt");
}

#[tokio::test]
async fn interrupted_re_read_after_check_in_is_indeterminate() {
    let config = InMemoryConfig {
        latency: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let (_binding, session) = session_with(config).await;
    let folder = test_folder(&session, "late-check-in").await;
    let document = text_document(&folder, "test.txt", "x").await;
    let pwc_id = document.check_out().await.unwrap();

    let token = CancellationToken::new();
    let cancellable = session.with_context(OperationContext::new().with_cancellation(token.clone()));
    let pwc = cancellable.document(&pwc_id).await.unwrap();

    cancel_after(&token, Duration::from_millis(300));
    let err = pwc
        .check_in(CheckIn::new(false, "v1.1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert!(err.is_indeterminate());

    // The version was created even though the caller never saw it.
    assert_eq!(document.all_versions().await.unwrap().len(), 2);
    assert!(!document.refresh().await.unwrap().is_version_series_checked_out());
}
