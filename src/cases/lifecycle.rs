use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::ApiError;
use crate::types::{Case, CaseStatus, Document, User};

pub const UNRESOLVED_DOCUMENTS_MESSAGE: &str =
    "You still have pending or in-progress documents. Complete them before closing the case.";

/// Terminal disposition actions on a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseAction {
    Close,
    Dismiss,
    Archive,
}

impl CaseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseAction::Close => "close",
            CaseAction::Dismiss => "dismiss",
            CaseAction::Archive => "archive",
        }
    }

    /// Progress text shown while the update is in flight
    pub fn progress_message(&self) -> &'static str {
        match self {
            CaseAction::Close => "Closing case...",
            CaseAction::Dismiss => "Dismissing case...",
            CaseAction::Archive => "Archiving case...",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            CaseAction::Close => "Case closed successfully!",
            CaseAction::Dismiss => "Case dismissed successfully!",
            CaseAction::Archive => "Case archived successfully!",
        }
    }
}

impl fmt::Display for CaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CaseActionError {
    #[error("Cannot {action} a case that is {status}")]
    NotAvailable { action: CaseAction, status: CaseStatus },

    #[error("Only administrators can {action} cases")]
    Forbidden { action: CaseAction },

    #[error("{}", UNRESOLVED_DOCUMENTS_MESSAGE)]
    UnresolvedDocuments { count: usize },

    /// The case's documents have never loaded, so the close precondition
    /// cannot be checked
    #[error("Could not load this case's documents. Please try again.")]
    DocumentsUnavailable,

    #[error("Failed to update case status. Please try again.")]
    Update(#[source] ApiError),
}

/// Actions offered for a case in `status` to `user`.
///
/// | status              | actions          |
/// |---------------------|------------------|
/// | Processing          | Close, Dismiss   |
/// | Completed/Dismissed | Archive (admins) |
/// | anything else       | none             |
pub fn available_actions(status: &CaseStatus, user: &User) -> Vec<CaseAction> {
    match status {
        CaseStatus::Processing => vec![CaseAction::Close, CaseAction::Dismiss],
        CaseStatus::Completed | CaseStatus::Dismissed if user.is_admin() => vec![CaseAction::Archive],
        _ => Vec::new(),
    }
}

/// Status a case moves to when `action` is applied from `current`
pub fn target_status(action: CaseAction, current: &CaseStatus) -> CaseStatus {
    match action {
        CaseAction::Close => CaseStatus::Completed,
        CaseAction::Dismiss => CaseStatus::Dismissed,
        CaseAction::Archive => match current {
            CaseStatus::Completed => CaseStatus::ArchivedCompleted,
            _ => CaseStatus::ArchivedDismissed,
        },
    }
}

/// Validate `action` against the case, the acting user and the case's
/// documents, returning the status to submit. Runs before any request.
pub fn check_action(
    action: CaseAction,
    case: &Case,
    user: &User,
    documents: &[Document],
) -> Result<CaseStatus, CaseActionError> {
    let status = &case.case_status;
    let allowed = match action {
        CaseAction::Close | CaseAction::Dismiss => matches!(status, CaseStatus::Processing),
        CaseAction::Archive => matches!(status, CaseStatus::Completed | CaseStatus::Dismissed),
    };
    if !allowed {
        return Err(CaseActionError::NotAvailable {
            action,
            status: status.clone(),
        });
    }

    if action == CaseAction::Archive && !user.is_admin() {
        return Err(CaseActionError::Forbidden { action });
    }

    if action == CaseAction::Close {
        let count = documents.iter().filter(|d| d.is_unresolved()).count();
        if count > 0 {
            return Err(CaseActionError::UnresolvedDocuments { count });
        }
    }

    Ok(target_status(action, status))
}
