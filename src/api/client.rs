use std::time::Duration;

use reqwest::header::{ACCEPT, COOKIE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// JSON-over-HTTPS client for the case management backend.
///
/// Every call shares one cookie store so the backend session set at login is
/// replayed automatically; a session cookie obtained elsewhere (e.g. saved by
/// the CLI) can be pinned with [`ApiClient::with_session_cookie`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
    log_requests: bool,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(base_url.into(), Duration::from_secs(30), false)
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::build(
            config.base_url.clone(),
            config.request_timeout(),
            config.enable_request_logging,
        )
    }

    fn build(base_url: String, timeout: Duration, log_requests: bool) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            session_cookie: None,
            log_requests,
        })
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        self.session_cookie = if cookie.trim().is_empty() { None } else { Some(cookie) };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an API path against the base URL. The base usually carries a
    /// path prefix such as `/api`, so this appends rather than `Url::join`s.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Ok(Url::parse(&url)?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        bearer: Option<&str>,
        accept: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path)?;
        if self.log_requests {
            tracing::debug!("{} {}", method, url.path());
        }

        let mut request = self.http.request(method.clone(), url).header(ACCEPT, accept);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body.filter(|b| !b.is_null()) {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are best-effort JSON; anything else is ignored
        let body = response
            .bytes()
            .await
            .ok()
            .and_then(|b| serde_json::from_slice::<Value>(&b).ok());
        tracing::debug!("{} {} failed with {}", method, path, status);
        Err(ApiError::from_status(status.as_u16(), body))
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body, None, "application/json").await?;
        let bytes = response.bytes().await?;

        // An empty or non-JSON success body reads as null
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.request_json(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.request_json(Method::PUT, path, Some(body)).await
    }

    /// Fetch raw bytes, optionally presenting a bearer credential
    pub async fn get_bytes(&self, path: &str, bearer: Option<&str>) -> Result<Vec<u8>, ApiError> {
        let response = self.send(Method::GET, path, None, bearer, "*/*").await?;
        Ok(response.bytes().await?.to_vec())
    }
}
