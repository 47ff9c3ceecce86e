use thiserror::Error;

use crate::api::DocumentApi;
use crate::documents::list::DocumentList;
use crate::documents::tokens::{fingerprint, TokenCache};
use crate::documents::viewer::{FileViewer, OpenedFile};
use crate::error::ApiError;
use crate::types::{Document, RecordId};

pub const INVALID_PASSWORD: &str = "Invalid password";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to load documents: {0}")]
    Load(#[source] ApiError),

    /// Retrieval failed for a reason unrelated to password protection
    #[error("Failed to download document: {0}")]
    Download(#[source] ApiError),

    #[error("Failed to open document: {0}")]
    Open(#[from] std::io::Error),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("No password challenge is open")]
    NoChallenge,
}

/// Open password prompt for one document
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordChallenge {
    pub document: Document,
    /// Inline message from the last failed attempt
    pub error: Option<String>,
}

/// What a view request led to
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Opened(OpenedFile),
    /// A password challenge is now open; see [`DocumentAccess::challenge`]
    PasswordRequired,
}

/// Gates document retrieval behind per-user, per-document passwords.
///
/// Owns the document list, the token cache and the (single) open challenge;
/// all of it is mutated only through `&mut self`.
pub struct DocumentAccess<A, V> {
    api: A,
    viewer: V,
    documents: DocumentList,
    tokens: TokenCache,
    challenge: Option<PasswordChallenge>,
}

impl<A: DocumentApi, V: FileViewer> DocumentAccess<A, V> {
    pub fn new(api: A, viewer: V) -> Self {
        Self::with_list(api, viewer, DocumentList::default())
    }

    pub fn with_list(api: A, viewer: V, documents: DocumentList) -> Self {
        Self {
            api,
            viewer,
            documents,
            tokens: TokenCache::new(),
            challenge: None,
        }
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut DocumentList {
        &mut self.documents
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub fn challenge(&self) -> Option<&PasswordChallenge> {
        self.challenge.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Reload the list from the backend; on failure the list is emptied.
    pub async fn load(&mut self) -> Result<usize, DocumentError> {
        match self.api.list_documents().await {
            Ok(documents) => {
                let count = documents.len();
                self.documents.replace(documents);
                tracing::debug!("Loaded {} documents", count);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("Failed to load documents: {}", e);
                self.documents.clear();
                Err(DocumentError::Load(e))
            }
        }
    }

    /// Latest protection flag the server reported for this document. The
    /// cached list copy wins over the caller's copy, which may be older.
    fn requires_password(&self, doc: &Document) -> bool {
        self.documents
            .find(&doc.doc_id)
            .map(|d| d.requires_password_for_current_user)
            .unwrap_or(doc.requires_password_for_current_user)
    }

    fn open_challenge(&mut self, doc: &Document) {
        tracing::debug!("Password challenge opened for document {}", doc.doc_id);
        self.challenge = Some(PasswordChallenge {
            document: doc.clone(),
            error: None,
        });
    }

    pub fn cancel_challenge(&mut self) {
        self.challenge = None;
    }

    /// View or download a document.
    ///
    /// Unprotected documents are fetched directly. Protected ones use the
    /// cached token when there is one; otherwise a challenge is opened and
    /// nothing is sent.
    pub async fn view(&mut self, doc: &Document) -> Result<ViewOutcome, DocumentError> {
        if !self.requires_password(doc) {
            return self.retrieve(doc, None).await;
        }

        match self.tokens.live_token(&doc.doc_id) {
            Some(token) => self.retrieve(doc, Some(token.as_str())).await,
            None => {
                self.open_challenge(doc);
                Ok(ViewOutcome::PasswordRequired)
            }
        }
    }

    /// [`DocumentAccess::view`] by id, looked up in the cached list
    pub async fn view_by_id(&mut self, doc_id: &RecordId) -> Result<Option<ViewOutcome>, DocumentError> {
        let Some(doc) = self.documents.find(doc_id).cloned() else {
            return Ok(None);
        };
        self.view(&doc).await.map(Some)
    }

    async fn retrieve(&mut self, doc: &Document, token: Option<&str>) -> Result<ViewOutcome, DocumentError> {
        match self.api.download_document(&doc.doc_id, token).await {
            Ok(bytes) => {
                let opened = self.viewer.open(doc, bytes)?;
                Ok(ViewOutcome::Opened(opened))
            }
            Err(e) if e.is_unauthorized() && self.requires_password(doc) => {
                if let Some(stale) = token {
                    tracing::info!(
                        "Token {} rejected for document {}",
                        fingerprint(stale),
                        doc.doc_id
                    );
                    self.tokens.remove(&doc.doc_id);
                }
                self.open_challenge(doc);
                Ok(ViewOutcome::PasswordRequired)
            }
            Err(e) => {
                tracing::warn!("Download of document {} failed: {}", doc.doc_id, e);
                Err(DocumentError::Download(e))
            }
        }
    }

    /// Answer the open challenge with `password`.
    ///
    /// A wrong password keeps the challenge open with an inline message. A
    /// 400 means the document no longer needs a password, so the challenge
    /// closes and one plain retrieval is attempted.
    pub async fn submit_password(&mut self, password: &str) -> Result<ViewOutcome, DocumentError> {
        let doc = match &self.challenge {
            Some(challenge) => challenge.document.clone(),
            None => return Err(DocumentError::NoChallenge),
        };

        match self.api.verify_document_password(&doc.doc_id, password).await {
            Ok(verification) => match verification.token.filter(|t| !t.is_empty()) {
                Some(token) => {
                    self.tokens.insert(doc.doc_id.clone(), token.clone());
                    self.challenge = None;
                    self.retrieve(&doc, Some(token.as_str())).await
                }
                None => Err(self.fail_challenge("No token returned".to_string())),
            },
            Err(e) if e.is_bad_request() => {
                tracing::debug!("Document {} does not need a password", doc.doc_id);
                self.challenge = None;
                self.retrieve(&doc, None).await
            }
            Err(e) if e.is_unauthorized() => {
                self.set_challenge_error(INVALID_PASSWORD.to_string());
                Err(DocumentError::InvalidPassword)
            }
            Err(e) => {
                tracing::warn!("Password verification for document {} failed: {}", doc.doc_id, e);
                let message = match e.status_code() {
                    Some(status) => format!("Verify failed ({})", status),
                    None => e.message(),
                };
                Err(self.fail_challenge(message))
            }
        }
    }

    fn set_challenge_error(&mut self, message: String) {
        if let Some(challenge) = self.challenge.as_mut() {
            challenge.error = Some(message);
        }
    }

    fn fail_challenge(&mut self, message: String) -> DocumentError {
        self.set_challenge_error(message.clone());
        DocumentError::VerificationFailed(message)
    }
}
