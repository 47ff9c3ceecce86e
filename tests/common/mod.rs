#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use case_desk::api::ApiClient;

pub const DOC_PASSWORD: &str = "hunter2";
pub const ADMIN_COOKIE: &str = "sid=admin";
pub const LAWYER_COOKIE: &str = "sid=lawyer";

/// Everything the fake backend has seen, for assertions
#[derive(Default)]
pub struct Recorded {
    /// (document id, bearer token) per download request
    pub downloads: Vec<(String, Option<String>)>,
    pub verify_attempts: Vec<(String, String)>,
    pub issued_tokens: Vec<String>,
    pub case_updates: Vec<Value>,
    pub case_list_requests: u32,
    pub logouts: u32,
}

#[derive(Default)]
struct Backend {
    documents: Vec<Value>,
    case_documents: HashMap<String, Vec<Value>>,
    cases: Vec<Value>,
    users: Vec<Value>,
    payments: HashMap<String, Vec<Value>>,
    /// Documents whose verify endpoint says no password is needed
    unprotected: Vec<String>,
    fail_updates: bool,
    fail_case_documents: bool,
    recorded: Recorded,
}

type Shared = Arc<Mutex<Backend>>;

/// In-process stand-in for the case management backend, serving under `/api`
pub struct FakeBackend {
    pub port: u16,
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let state: Shared = Arc::new(Mutex::new(seed()));

        let app = Router::new()
            .route("/api/documents", get(list_documents))
            .route("/api/documents/:id/download", get(download_document))
            .route("/api/documents/:id/verify-password", post(verify_password))
            .route("/api/cases", get(list_cases))
            .route("/api/cases/:id", put(update_case))
            .route("/api/case/documents/:id", get(case_documents))
            .route("/api/payments/case/:id", get(case_payments))
            .route("/api/users", get(list_users))
            .route("/api/verify", get(verify_session))
            .route("/api/logout", post(logout))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}/api", port),
            state,
        })
    }

    pub fn client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(&self.base_url)?)
    }

    pub fn client_with_cookie(&self, cookie: &str) -> Result<ApiClient> {
        Ok(self.client()?.with_session_cookie(cookie))
    }

    /// Inspect what the backend has recorded so far
    pub fn recorded<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.state.lock().unwrap().recorded)
    }

    /// Make `PUT /cases/{id}` fail with a 500
    pub fn fail_updates(&self) {
        self.state.lock().unwrap().fail_updates = true;
    }

    /// Make `GET /case/documents/{id}` fail with a 503
    pub fn fail_case_documents(&self) {
        self.state.lock().unwrap().fail_case_documents = true;
    }

    /// Revoke every issued document token
    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().recorded.issued_tokens.clear();
    }

    pub fn set_case_documents(&self, case_id: &str, documents: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .case_documents
            .insert(case_id.to_string(), documents);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fixture data:
/// - doc 1 is open, doc 2 is password protected, doc 3 is flagged as
///   protected but the backend no longer requires a password, doc 4 has
///   no file
/// - case 100 is processing with two documents still open, case 101 is
///   processing with its only document approved, case 102 is completed
fn seed() -> Backend {
    let documents = vec![
        json!({
            "doc_id": 1, "doc_name": "Complaint", "doc_type": "Task", "doc_status": "done",
            "doc_tag": "pleading", "case_id": 100, "doc_file": "/uploads/complaint.pdf",
            "requires_password_for_current_user": false, "doc_submitted_by": 2, "doc_tasked_by": 1
        }),
        json!({
            "doc_id": 2, "doc_name": "Retainer Agreement", "doc_type": "Support",
            "case_id": 100, "doc_file": "/uploads/retainer.pdf",
            "requires_password_for_current_user": true, "doc_submitted_by": 1
        }),
        json!({
            "doc_id": 3, "doc_name": "Old Memo", "doc_type": "Task", "doc_status": "todo",
            "case_id": 101, "doc_file": "/uploads/memo.pdf",
            "requires_password_for_current_user": true
        }),
        json!({
            "doc_id": 4, "doc_name": "Draft Notes", "doc_type": "Task", "doc_status": "in_progress",
            "case_id": 100, "doc_file": null
        }),
    ];

    let mut case_documents = HashMap::new();
    case_documents.insert(
        "100".to_string(),
        vec![documents[0].clone(), documents[3].clone()],
    );
    case_documents.insert(
        "101".to_string(),
        vec![json!({
            "doc_id": 5, "doc_name": "Signed Affidavit", "doc_type": "Task", "doc_status": "approved",
            "case_id": 101, "doc_file": "/uploads/affidavit.pdf"
        })],
    );

    let cases = vec![
        json!({
            "case_id": 100, "ct_name": "Civil", "cc_name": "Collection of Sum of Money",
            "client_fullname": "Ana Lopez", "case_status": "Processing", "case_stage": "discovery",
            "case_fee": "50000.00", "case_balance": "12500.50", "user_id": 2, "assigned_by": 1,
            "branch_name": "Makati"
        }),
        json!({
            "case_id": 101, "ct_name": "Criminal", "client_fullname": "Ben Cruz",
            "case_status": "Processing", "case_stage": "trial", "case_fee": 30000, "case_balance": 0,
            "user_id": 2, "assigned_by": 1
        }),
        json!({
            "case_id": 102, "ct_name": "Labor", "client_fullname": "Carla Diaz",
            "case_status": "Completed", "case_verdict": "Granted", "case_stage": "closed"
        }),
    ];

    let users = vec![
        json!({ "user_id": 1, "user_fname": "Maria", "user_mname": "Santos", "user_lname": "Cruz", "user_role": "Admin" }),
        json!({ "user_id": 2, "user_fname": "Jose", "user_lname": "Reyes", "user_role": "Lawyer" }),
    ];

    let mut payments = HashMap::new();
    payments.insert(
        "100".to_string(),
        vec![
            json!({ "payment_id": 7, "case_id": 100, "payment_amount": 20000, "payment_type": "Cash", "payment_date": "2024-03-01T09:00:00Z" }),
            json!({ "payment_id": 8, "case_id": 100, "payment_amount": "17499.50", "payment_type": "Cheque", "payment_date": "2024-04-01T09:00:00Z" }),
        ],
    );

    Backend {
        documents,
        case_documents,
        cases,
        users,
        payments,
        unprotected: vec!["3".to_string()],
        ..Backend::default()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn list_documents(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().documents.clone()))
}

async fn download_document(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut backend = state.lock().unwrap();
    let token = bearer(&headers);
    backend.recorded.downloads.push((id.clone(), token.clone()));

    let Some(doc) = backend
        .documents
        .iter()
        .find(|d| d["doc_id"].to_string() == id)
        .cloned()
    else {
        return error(StatusCode::NOT_FOUND, "Document not found");
    };

    let protected = doc["requires_password_for_current_user"] == json!(true)
        && !backend.unprotected.contains(&id);
    if protected {
        let valid = token
            .as_ref()
            .is_some_and(|t| backend.recorded.issued_tokens.contains(t));
        if !valid {
            return error(StatusCode::UNAUTHORIZED, "Password required");
        }
    }

    (
        [(header::CONTENT_TYPE, "application/pdf")],
        format!("%PDF document {}", id).into_bytes(),
    )
        .into_response()
}

async fn verify_password(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    backend.recorded.verify_attempts.push((id.clone(), password.clone()));

    if backend.unprotected.contains(&id) {
        return error(StatusCode::BAD_REQUEST, "Document is not password protected");
    }
    if password != DOC_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid password");
    }

    let token = format!("doc-{}-token-{}", id, backend.recorded.issued_tokens.len() + 1);
    backend.recorded.issued_tokens.push(token.clone());
    Json(json!({ "token": token })).into_response()
}

async fn list_cases(State(state): State<Shared>) -> Json<Value> {
    let mut backend = state.lock().unwrap();
    backend.recorded.case_list_requests += 1;
    Json(Value::Array(backend.cases.clone()))
}

async fn update_case(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.fail_updates {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }

    backend.recorded.case_updates.push(body.clone());
    match backend.cases.iter_mut().find(|c| c["case_id"].to_string() == id) {
        Some(case) => {
            *case = body.clone();
            Json(body).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Case not found"),
    }
}

async fn case_documents(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let backend = state.lock().unwrap();
    if backend.fail_case_documents {
        return error(StatusCode::SERVICE_UNAVAILABLE, "Documents unavailable");
    }
    Json(Value::Array(backend.case_documents.get(&id).cloned().unwrap_or_default())).into_response()
}

async fn case_payments(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let backend = state.lock().unwrap();
    Json(Value::Array(backend.payments.get(&id).cloned().unwrap_or_default()))
}

async fn list_users(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().users.clone()))
}

async fn verify_session(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let user_id = if cookie.contains(ADMIN_COOKIE) {
        1
    } else if cookie.contains(LAWYER_COOKIE) {
        2
    } else {
        return error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    let backend = state.lock().unwrap();
    let user = backend
        .users
        .iter()
        .find(|u| u["user_id"] == json!(user_id))
        .cloned();
    Json(json!({ "user": user })).into_response()
}

async fn logout(State(state): State<Shared>) -> Json<Value> {
    state.lock().unwrap().recorded.logouts += 1;
    Json(json!({ "message": "Logged out" }))
}
