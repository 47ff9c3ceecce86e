mod common;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use case_desk::api::ApiClient;
use case_desk::documents::{DocumentAccess, DocumentError, TempFileViewer, ViewOutcome};
use case_desk::types::RecordId;
use common::{FakeBackend, DOC_PASSWORD};

fn viewer_dir() -> PathBuf {
    std::env::temp_dir().join(format!("casedesk-it-{}", uuid::Uuid::new_v4().simple()))
}

async fn loaded_access(
    backend: &FakeBackend,
    dir: &PathBuf,
) -> Result<DocumentAccess<ApiClient, TempFileViewer>> {
    common::init_tracing();
    let mut access = DocumentAccess::new(
        backend.client()?,
        TempFileViewer::new(dir, Duration::from_secs(60)),
    );
    let count = access.load().await?;
    assert_eq!(count, 4);
    Ok(access)
}

#[tokio::test]
async fn open_document_downloads_without_token() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;

    let outcome = access.view_by_id(&RecordId::Int(1)).await?;
    let Some(ViewOutcome::Opened(file)) = outcome else {
        panic!("expected document to open");
    };
    assert_eq!(std::fs::read(&file.path)?, b"%PDF document 1");
    assert!(access.challenge().is_none());

    let downloads = backend.recorded(|r| r.downloads.clone());
    assert_eq!(downloads, vec![("1".to_string(), None)]);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn protected_document_opens_after_correct_password() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;
    let doc_id = RecordId::Int(2);

    // No token yet: the challenge opens and nothing is fetched
    let outcome = access.view_by_id(&doc_id).await?;
    assert_eq!(outcome, Some(ViewOutcome::PasswordRequired));
    assert_eq!(access.challenge().map(|c| c.document.doc_id.clone()), Some(doc_id.clone()));
    assert!(backend.recorded(|r| r.downloads.is_empty()));

    // Wrong password keeps the challenge open with an inline message
    let err = access.submit_password("letmein").await.unwrap_err();
    assert!(matches!(err, DocumentError::InvalidPassword));
    let challenge = access.challenge().expect("challenge stays open");
    assert_eq!(challenge.error.as_deref(), Some("Invalid password"));
    assert!(!access.tokens().contains(&doc_id));

    // Correct password stores the token and retrieves with it
    let ViewOutcome::Opened(file) = access.submit_password(DOC_PASSWORD).await? else {
        panic!("expected document to open");
    };
    assert_eq!(std::fs::read(&file.path)?, b"%PDF document 2");
    assert!(access.challenge().is_none());
    assert!(access.tokens().contains(&doc_id));

    let token = backend.recorded(|r| r.issued_tokens[0].clone());
    let downloads = backend.recorded(|r| r.downloads.clone());
    assert_eq!(downloads, vec![("2".to_string(), Some(token.clone()))]);

    // A second view reuses the cached token without asking again
    let outcome = access.view_by_id(&doc_id).await?;
    assert!(matches!(outcome, Some(ViewOutcome::Opened(_))));
    assert_eq!(backend.recorded(|r| r.verify_attempts.len()), 2);
    assert_eq!(
        backend.recorded(|r| r.downloads.last().cloned()),
        Some(("2".to_string(), Some(token)))
    );

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn revoked_token_reopens_the_challenge() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;
    let doc_id = RecordId::Int(2);

    access.view_by_id(&doc_id).await?;
    access.submit_password(DOC_PASSWORD).await?;
    assert!(access.tokens().contains(&doc_id));

    backend.revoke_tokens();

    let outcome = access.view_by_id(&doc_id).await?;
    assert_eq!(outcome, Some(ViewOutcome::PasswordRequired));
    assert!(!access.tokens().contains(&doc_id));
    assert!(access.challenge().is_some());

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn document_no_longer_protected_falls_back_to_plain_download() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;
    let doc_id = RecordId::Int(3);

    // Listed as protected, so the client asks first
    let outcome = access.view_by_id(&doc_id).await?;
    assert_eq!(outcome, Some(ViewOutcome::PasswordRequired));

    // The backend answers 400: close the challenge and fetch once without a token
    let outcome = access.submit_password("anything").await?;
    assert!(matches!(outcome, ViewOutcome::Opened(_)));
    assert!(access.challenge().is_none());
    assert!(access.tokens().is_empty());

    let downloads = backend.recorded(|r| r.downloads.clone());
    assert_eq!(downloads, vec![("3".to_string(), None)]);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn cancelled_challenge_sends_nothing() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;

    access.view_by_id(&RecordId::Int(2)).await?;
    access.cancel_challenge();
    assert!(access.challenge().is_none());

    let err = access.submit_password(DOC_PASSWORD).await.unwrap_err();
    assert!(matches!(err, DocumentError::NoChallenge));
    assert!(backend.recorded(|r| r.verify_attempts.is_empty() && r.downloads.is_empty()));

    Ok(())
}

#[tokio::test]
async fn unknown_document_is_not_found() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;

    assert_eq!(access.view_by_id(&RecordId::Int(99)).await?, None);
    assert!(backend.recorded(|r| r.downloads.is_empty()));
    Ok(())
}

#[tokio::test]
async fn listing_hides_documents_without_files() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let dir = viewer_dir();
    let mut access = loaded_access(&backend, &dir).await?;

    let names: Vec<&str> = access
        .documents()
        .page_items()
        .into_iter()
        .map(|d| d.display_name())
        .collect();
    assert_eq!(names, vec!["Complaint", "Retainer Agreement", "Old Memo"]);

    access.documents_mut().set_search("PLEADING");
    let names: Vec<&str> = access
        .documents()
        .page_items()
        .into_iter()
        .map(|d| d.display_name())
        .collect();
    assert_eq!(names, vec!["Complaint"]);
    Ok(())
}
