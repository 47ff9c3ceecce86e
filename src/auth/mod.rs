use crate::api::SessionApi;
use crate::error::ApiError;
use crate::types::User;

/// The signed-in user for a cookie-backed backend session.
///
/// The backend owns the session; this only mirrors who it belongs to.
pub struct Session<A> {
    api: A,
    user: Option<User>,
}

impl<A: SessionApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self { api, user: None }
    }

    /// Start from a previously remembered user (e.g. the CLI profile)
    pub fn with_user(api: A, user: Option<User>) -> Self {
        Self { api, user }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Ask the backend who the session belongs to. Any failure, or a
    /// response without a user, ends the local session.
    pub async fn restore(&mut self) -> Option<&User> {
        match self.api.verify_session().await {
            Ok(Some(user)) => {
                tracing::debug!("Session verified for user {}", user.user_id);
                self.user = Some(user);
            }
            Ok(None) => {
                tracing::info!("Session is no longer valid");
                self.logout().await;
            }
            Err(e) => {
                tracing::error!("Auth check failed: {}", e);
                self.logout().await;
            }
        }
        self.user.as_ref()
    }

    /// End the session. The local user is cleared even if the backend call
    /// fails; the failure is returned for reporting.
    pub async fn logout(&mut self) -> Option<ApiError> {
        let result = self.api.logout().await;
        self.user = None;
        match result {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("Logout failed: {}", e);
                Some(e)
            }
        }
    }
}
