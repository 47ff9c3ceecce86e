use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::format::{format_optional_currency, person_name, titled_name};
use crate::api::CaseApi;
use crate::cases::lifecycle::{self, CaseAction, CaseActionError};
use crate::cases::stage::{self, StageBadge, Step, CASE_STAGES};
use crate::error::ApiError;
use crate::types::{Case, CaseStatus, DocType, DocStatus, Document, Payment, RecordId, User};

/// Fee, amount paid and balance for a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub total_fee: Option<Decimal>,
    pub total_paid: Option<Decimal>,
    pub remaining: Option<Decimal>,
}

impl PaymentSummary {
    pub fn for_case(case: &Case) -> Self {
        let total_paid = match (case.case_fee, case.case_balance) {
            (Some(fee), Some(balance)) => Some(fee - balance),
            _ => None,
        };
        Self {
            total_fee: case.case_fee,
            total_paid,
            remaining: case.case_balance,
        }
    }

    pub fn formatted(&self) -> [(&'static str, String); 3] {
        [
            ("Total Fee", format_optional_currency(self.total_fee)),
            ("Total Paid", format_optional_currency(self.total_paid)),
            ("Remaining", format_optional_currency(self.remaining)),
        ]
    }
}

/// One open case as seen by one user, with the supporting data the viewer
/// shows next to it. Caches are replaced wholesale on refresh.
pub struct CaseView<A> {
    api: A,
    case: Case,
    user: User,
    documents: Vec<Document>,
    documents_loaded: bool,
    payments: Vec<Payment>,
    users: Vec<User>,
}

impl<A: CaseApi> CaseView<A> {
    pub fn new(api: A, case: Case, user: User) -> Self {
        Self {
            api,
            case,
            user,
            documents: Vec::new(),
            documents_loaded: false,
            payments: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Whether a document list has been read from the backend at least once
    pub fn documents_loaded(&self) -> bool {
        self.documents_loaded
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Documents for this case. A failed read is logged and keeps the
    /// previous list.
    pub async fn refresh_documents(&mut self) {
        let result = self.api.case_documents(&self.case.case_id).await;
        self.apply_documents(result);
    }

    fn apply_documents(&mut self, result: Result<Vec<Document>, ApiError>) {
        match result {
            Ok(documents) => {
                self.documents = documents;
                self.documents_loaded = true;
            }
            Err(e) => tracing::error!("Error fetching documents: {}", e),
        }
    }

    pub async fn refresh_payments(&mut self) {
        match self.api.case_payments(&self.case.case_id).await {
            Ok(payments) => self.payments = payments,
            Err(e) => tracing::error!("Error fetching payments: {}", e),
        }
    }

    pub async fn refresh_users(&mut self) {
        match self.api.list_users().await {
            Ok(users) => self.users = users,
            Err(e) => tracing::error!("Error fetching users: {}", e),
        }
    }

    /// Documents and users load together when the view opens
    pub async fn open(&mut self) {
        let (documents, users) = futures::join!(
            self.api.case_documents(&self.case.case_id),
            self.api.list_users()
        );
        self.apply_documents(documents);
        match users {
            Ok(users) => self.users = users,
            Err(e) => tracing::error!("Error fetching users: {}", e),
        }
    }

    pub fn stage_badge(&self) -> StageBadge {
        stage::stage_badge(self.case.case_stage.as_deref())
    }

    pub fn stepper(&self) -> Vec<Step> {
        stage::stepper(&CASE_STAGES, self.case.case_stage.as_deref())
    }

    pub fn available_actions(&self) -> Vec<CaseAction> {
        lifecycle::available_actions(&self.case.case_status, &self.user)
    }

    /// Document edits (add, edit, reject, delete) are only offered while
    /// the case is being worked.
    pub fn documents_editable(&self) -> bool {
        matches!(self.case.case_status, CaseStatus::Processing)
    }

    /// Completed task documents can be sent back; supporting ones cannot.
    pub fn can_reject(&self, doc: &Document) -> bool {
        self.documents_editable()
            && doc.doc_type.as_ref() != Some(&DocType::Support)
            && doc.doc_status.as_ref() == Some(&DocStatus::Done)
    }

    /// Apply a disposition action.
    ///
    /// Preconditions are checked locally first; a rejected action never
    /// reaches the backend. Closing also needs a document list that actually
    /// loaded, since an empty cache proves nothing. On success the local case takes the new status
    /// and `on_updated` runs so the caller can refresh its case list. On
    /// failure the case is left exactly as it was.
    pub async fn perform<F: FnOnce()>(
        &mut self,
        action: CaseAction,
        on_updated: F,
    ) -> Result<&Case, CaseActionError> {
        let checked = lifecycle::check_action(action, &self.case, &self.user, &self.documents)
            .and_then(|status| match action {
                CaseAction::Close if !self.documents_loaded => Err(CaseActionError::DocumentsUnavailable),
                _ => Ok(status),
            });
        let next_status = match checked {
            Ok(status) => status,
            Err(e) => {
                tracing::info!("Rejected {} on case {}: {}", action, self.case.case_id, e);
                return Err(e);
            }
        };

        tracing::info!("{} ({})", action.progress_message(), self.case.case_id);
        let mut updated = self.case.clone();
        updated.case_status = next_status;
        updated.last_updated_by = Some(self.user.user_id.clone());

        if let Err(e) = self.api.update_case(&updated).await {
            tracing::error!("Error updating case status: {}", e);
            return Err(CaseActionError::Update(e));
        }

        self.case = updated;
        on_updated();
        Ok(&self.case)
    }

    pub fn payment_summary(&self) -> PaymentSummary {
        PaymentSummary::for_case(&self.case)
    }

    fn find_user(&self, id: &RecordId) -> Option<&User> {
        self.users.iter().find(|u| &u.user_id == id)
    }

    /// Who assigned the lawyer (or created the case)
    pub fn assigner_name(&self, id: &RecordId) -> String {
        match self.find_user(id) {
            Some(user) => format!("Atty. {}", person_name(user)),
            None => "Unknown".to_string(),
        }
    }

    pub fn submitter_name(&self, id: Option<&RecordId>) -> String {
        match id.and_then(|id| self.find_user(id)) {
            Some(user) => titled_name(user),
            None => "-".to_string(),
        }
    }

    /// "Unassigned" with no lawyer on the case; a lawyer id missing from the
    /// user list still carries the title
    pub fn lawyer_name(&self) -> String {
        match self.case.user_id.as_ref() {
            Some(id) => match self.find_user(id) {
                Some(user) => format!("Atty. {}", person_name(user)),
                None => "Atty. Unassigned".to_string(),
            },
            None => "Unassigned".to_string(),
        }
    }

    /// "Assigned by" once a lawyer is on the case, "Created by" before that
    pub fn assignment_note(&self) -> Option<String> {
        let assigned_by = self.case.assigned_by.as_ref()?;
        let name = self.assigner_name(assigned_by);
        Some(if self.case.user_id.is_some() {
            format!("Assigned by: {}", name)
        } else {
            format!("Created by: {}", name)
        })
    }
}
