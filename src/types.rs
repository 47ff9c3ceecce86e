//! Shared record types exchanged with the case management backend

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend identifiers arrive as either JSON numbers or strings; keep whichever
/// form the server used so PUT bodies round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(id.to_string()),
        }
    }
}

/// Generates a string-backed enum with a catch-all variant so unknown server
/// values survive deserialization and are sent back as-is.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Task board column a document sits in
    DocStatus {
        Todo => "todo",
        InProgress => "in_progress",
        Done => "done",
    }
}

impl DocStatus {
    /// Documents in these columns block closing their case.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, DocStatus::Todo | DocStatus::InProgress | DocStatus::Done)
    }
}

string_enum! {
    /// Document tag: task-assigned work product vs. supporting material
    DocType {
        Task => "Task",
        Support => "Support",
    }
}

string_enum! {
    /// Administrative disposition of a case
    CaseStatus {
        Pending => "Pending",
        Processing => "Processing",
        Completed => "Completed",
        Dismissed => "Dismissed",
        ArchivedCompleted => "Archived (Completed)",
        ArchivedDismissed => "Archived (Dismissed)",
    }
}

string_enum! {
    Role {
        Admin => "Admin",
        Lawyer => "Lawyer",
        Staff => "Staff",
        Paralegal => "Paralegal",
    }
}

/// Accepts the flag shapes the backend emits: booleans, null, and 0/1
/// integers from tinyint columns
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Float(f)) => f != 0.0,
        Some(Flag::Text(s)) => !matches!(s.trim(), "" | "0" | "false"),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: RecordId,
    #[serde(default)]
    pub doc_name: Option<String>,
    #[serde(default)]
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub doc_status: Option<DocStatus>,
    #[serde(default)]
    pub doc_tag: Option<String>,
    #[serde(default)]
    pub case_id: Option<RecordId>,
    #[serde(default)]
    pub doc_file: Option<String>,
    /// Computed by the server for the session's user; never derived locally.
    #[serde(default, deserialize_with = "truthy")]
    pub requires_password_for_current_user: bool,
    #[serde(default)]
    pub doc_due_date: Option<String>,
    #[serde(default)]
    pub doc_submitted_by: Option<RecordId>,
    #[serde(default)]
    pub doc_tasked_by: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn display_name(&self) -> &str {
        match self.doc_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Untitled",
        }
    }

    pub fn has_file(&self) -> bool {
        self.doc_file.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub fn is_unresolved(&self) -> bool {
        self.doc_status.as_ref().is_some_and(DocStatus::is_unresolved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: RecordId,
    #[serde(default)]
    pub case_stage: Option<String>,
    pub case_status: CaseStatus,
    #[serde(default)]
    pub case_fee: Option<Decimal>,
    #[serde(default)]
    pub case_balance: Option<Decimal>,
    #[serde(default)]
    pub case_verdict: Option<String>,
    #[serde(default)]
    pub ct_name: Option<String>,
    #[serde(default)]
    pub cc_name: Option<String>,
    #[serde(default)]
    pub client_fullname: Option<String>,
    /// Assigned lawyer
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default)]
    pub assigned_by: Option<RecordId>,
    #[serde(default)]
    pub case_remarks: Option<String>,
    #[serde(default)]
    pub case_cabinet: Option<Value>,
    #[serde(default)]
    pub case_drawer: Option<Value>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub case_date_filed: Option<String>,
    #[serde(default)]
    pub case_last_updated: Option<String>,
    #[serde(default)]
    pub last_updated_by: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Case {
    /// Verdict is only meaningful once the case is completed.
    pub fn visible_verdict(&self) -> Option<&str> {
        match (&self.case_status, self.case_verdict.as_deref()) {
            (CaseStatus::Completed, Some(v)) if !v.is_empty() => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: RecordId,
    #[serde(default)]
    pub user_fname: Option<String>,
    #[serde(default)]
    pub user_mname: Option<String>,
    #[serde(default)]
    pub user_lname: Option<String>,
    #[serde(default)]
    pub user_role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.user_role, Some(Role::Admin))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: RecordId,
    #[serde(default)]
    pub case_id: Option<RecordId>,
    #[serde(default)]
    pub ct_name: Option<String>,
    #[serde(default)]
    pub payment_amount: Option<Decimal>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub payment_added_by: Option<RecordId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_defaults_protection_flag_to_false() {
        let doc: Document = serde_json::from_value(json!({
            "doc_id": 7,
            "doc_name": "Complaint.pdf",
            "doc_status": "in_progress",
            "case_id": "C-12"
        }))
        .unwrap();

        assert!(!doc.requires_password_for_current_user);
        assert_eq!(doc.doc_status, Some(DocStatus::InProgress));
        assert_eq!(doc.case_id, Some(RecordId::Text("C-12".into())));
        assert!(doc.is_unresolved());
    }

    #[test]
    fn test_protection_flag_accepts_null_and_integers() {
        let flag = |value: Value| -> bool {
            let doc: Document = serde_json::from_value(json!({
                "doc_id": 7,
                "requires_password_for_current_user": value
            }))
            .unwrap();
            doc.requires_password_for_current_user
        };

        assert!(!flag(Value::Null));
        assert!(!flag(json!(0)));
        assert!(flag(json!(1)));
        assert!(flag(json!(true)));
        assert!(!flag(json!(false)));
        assert!(!flag(json!("0")));
    }

    #[test]
    fn test_document_list_with_tinyint_flags() {
        let docs: Vec<Document> = serde_json::from_value(json!([
            { "doc_id": 1, "requires_password_for_current_user": 1 },
            { "doc_id": 2, "requires_password_for_current_user": null },
            { "doc_id": 3, "requires_password_for_current_user": 0, "doc_file": "/uploads/a.pdf" }
        ]))
        .unwrap();

        let protected: Vec<bool> = docs.iter().map(|d| d.requires_password_for_current_user).collect();
        assert_eq!(protected, vec![true, false, false]);
        assert_eq!(docs[2].doc_file.as_deref(), Some("/uploads/a.pdf"));
    }

    #[test]
    fn test_unknown_status_survives_round_trip() {
        let status: CaseStatus = serde_json::from_value(json!("Reopened")).unwrap();
        assert_eq!(status, CaseStatus::Other("Reopened".into()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Reopened"));

        let archived: CaseStatus = serde_json::from_value(json!("Archived (Dismissed)")).unwrap();
        assert_eq!(archived, CaseStatus::ArchivedDismissed);
    }

    #[test]
    fn test_rejected_document_is_not_unresolved() {
        assert!(!DocStatus::from("rejected").is_unresolved());
        assert!(DocStatus::Done.is_unresolved());
    }

    #[test]
    fn test_case_keeps_unknown_fields() {
        let case: Case = serde_json::from_value(json!({
            "case_id": 3,
            "case_status": "Completed",
            "case_fee": "15000.00",
            "case_balance": 2500,
            "case_verdict": "Acquitted",
            "court_room": "B-4"
        }))
        .unwrap();

        assert_eq!(case.visible_verdict(), Some("Acquitted"));
        assert_eq!(case.extra.get("court_room"), Some(&json!("B-4")));
        assert_eq!(case.case_balance, Some(Decimal::from(2500)));
    }
}
