use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{Case, Document, Payment, RecordId, User};

/// Body of a successful `POST /documents/{id}/verify-password`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordVerification {
    #[serde(default)]
    pub token: Option<String>,
}

/// Document endpoints used by the access controller
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError>;

    async fn download_document(
        &self,
        doc_id: &RecordId,
        bearer: Option<&str>,
    ) -> Result<Vec<u8>, ApiError>;

    async fn verify_document_password(
        &self,
        doc_id: &RecordId,
        password: &str,
    ) -> Result<PasswordVerification, ApiError>;
}

/// Case endpoints used by the case viewer
#[async_trait]
pub trait CaseApi: Send + Sync {
    async fn list_cases(&self) -> Result<Vec<Case>, ApiError>;

    /// Submit the full case body; the response is whatever the server echoes.
    async fn update_case(&self, case: &Case) -> Result<Value, ApiError>;

    async fn case_documents(&self, case_id: &RecordId) -> Result<Vec<Document>, ApiError>;

    async fn case_payments(&self, case_id: &RecordId) -> Result<Vec<Payment>, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
}

/// Session endpoints; the session itself lives in a cookie
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Current user for the session, or `None` when the session is gone
    async fn verify_session(&self) -> Result<Option<User>, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    user: Option<User>,
}

/// Lists come back as bare arrays; anything else reads as empty.
fn array_or_empty<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(Vec::new()),
    }
}

#[async_trait]
impl DocumentApi for ApiClient {
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        array_or_empty(self.get::<Value>("/documents").await?)
    }

    async fn download_document(
        &self,
        doc_id: &RecordId,
        bearer: Option<&str>,
    ) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/documents/{}/download", doc_id), bearer).await
    }

    async fn verify_document_password(
        &self,
        doc_id: &RecordId,
        password: &str,
    ) -> Result<PasswordVerification, ApiError> {
        let body = serde_json::json!({ "password": password });
        let value: Value = self
            .post(&format!("/documents/{}/verify-password", doc_id), &body)
            .await?;
        if value.is_null() {
            return Ok(PasswordVerification::default());
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl CaseApi for ApiClient {
    async fn list_cases(&self) -> Result<Vec<Case>, ApiError> {
        array_or_empty(self.get::<Value>("/cases").await?)
    }

    async fn update_case(&self, case: &Case) -> Result<Value, ApiError> {
        self.put(&format!("/cases/{}", case.case_id), case).await
    }

    async fn case_documents(&self, case_id: &RecordId) -> Result<Vec<Document>, ApiError> {
        array_or_empty(self.get::<Value>(&format!("/case/documents/{}", case_id)).await?)
    }

    async fn case_payments(&self, case_id: &RecordId) -> Result<Vec<Payment>, ApiError> {
        array_or_empty(self.get::<Value>(&format!("/payments/case/{}", case_id)).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        array_or_empty(self.get::<Value>("/users").await?)
    }
}

#[async_trait]
impl SessionApi for ApiClient {
    async fn verify_session(&self) -> Result<Option<User>, ApiError> {
        let value: Value = self.get("/verify").await?;
        if value.is_null() {
            return Ok(None);
        }
        let response: VerifyResponse = serde_json::from_value(value)?;
        Ok(response.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let _: Value = self.post("/logout", &Value::Null).await?;
        Ok(())
    }
}
