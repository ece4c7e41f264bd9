//! Auth store: the client's belief about the current identity.
//!
//! Login persists the bearer token and role through the session manager;
//! logout tears both down locally. Refreshing the user object does not
//! rewrite the persisted role key, matching the backend contract as
//! deployed (the role can go stale until the next login).

use crate::services::AuthService;
use crate::session::SessionManager;
use crate::types::{ApiError, LoginRequest, RegisterRequest, Result, UserProfile};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Default)]
struct AuthState {
    user: Option<UserProfile>,
    loading: bool,
    error: Option<String>,
}

pub struct AuthStore {
    service: AuthService,
    session: SessionManager,
    state: Mutex<AuthState>,
}

impl AuthStore {
    pub fn new(service: AuthService, session: SessionManager) -> Self {
        Self {
            service,
            session,
            state: Mutex::new(AuthState::default()),
        }
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.lock().user.clone()
    }

    // ============= Getters =============

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user_role(&self) -> Option<String> {
        self.state.lock().user.as_ref().map(|u| u.role.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    pub fn is_teacher(&self) -> bool {
        self.has_role("teacher")
    }

    pub fn is_technical_staff(&self) -> bool {
        self.has_role("technical")
    }

    fn has_role(&self, role: &str) -> bool {
        self.state
            .lock()
            .user
            .as_ref()
            .map(|u| u.role == role)
            .unwrap_or(false)
    }

    // ============= Actions =============

    /// Authenticate and persist the session. The login envelope is
    /// `{ token, user }`; both the token and the user's role are written to
    /// durable storage so the router guard can check them synchronously.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile> {
        self.begin();

        let outcome = async {
            let body = self.service.login(credentials).await?.into_result()?;
            let token = body
                .get("token")
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::MalformedResponse("login: missing token".to_string()))?
                .to_string();
            let user: UserProfile = serde_json::from_value(
                body.get("user").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| ApiError::MalformedResponse(format!("login: bad user object: {e}")))?;
            Ok::<_, ApiError>((token, user))
        }
        .await;

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok((token, user)) => {
                self.session.establish(&token, &user.role);
                state.user = Some(user.clone());
                debug!(role = %user.role, "login succeeded");
                Ok(user)
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Register a new account; returns the server's confirmation message.
    pub async fn register(&self, user_data: &RegisterRequest) -> Result<String> {
        self.begin();

        let outcome = async {
            let body = self.service.register(user_data).await?.into_result()?;
            Ok::<_, ApiError>(message_of(&body))
        }
        .await;

        self.finish(outcome)
    }

    /// Request a password-reset email; returns the confirmation message.
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        self.begin();

        let outcome = async {
            let body = self.service.forgot_password(email).await?.into_result()?;
            Ok::<_, ApiError>(message_of(&body))
        }
        .await;

        self.finish(outcome)
    }

    /// Complete a password reset with the emailed token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        self.begin();

        let outcome = async {
            let body = self
                .service
                .reset_password(token, new_password)
                .await?
                .into_result()?;
            Ok::<_, ApiError>(message_of(&body))
        }
        .await;

        self.finish(outcome)
    }

    /// Refresh the user object from `/auth/me`. Without a persisted token
    /// this resolves to `None` without a network call. Any failure tears the
    /// session down before propagating.
    ///
    /// Note: a successful refresh does not rewrite the persisted role key.
    pub async fn fetch_current_user(&self) -> Result<Option<UserProfile>> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }

        self.state.lock().loading = true;

        let outcome = async {
            let body = self.service.current_user().await?.into_result()?;
            serde_json::from_value::<UserProfile>(body)
                .map_err(|e| ApiError::MalformedResponse(format!("bad user object: {e}")))
        }
        .await;

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(user) => {
                state.user = Some(user.clone());
                Ok(Some(user))
            }
            Err(err) => {
                warn!(%err, "failed to refresh current user, logging out");
                state.user = None;
                drop(state);
                self.session.clear();
                Err(err)
            }
        }
    }

    /// Update the profile; the server's response replaces the cached user.
    pub async fn update_profile(&self, user_data: &Value) -> Result<UserProfile> {
        let body = self.service.update_profile(user_data).await?.into_result()?;
        let user: UserProfile = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse(format!("bad user object: {e}")))?;

        self.state.lock().user = Some(user.clone());
        Ok(user)
    }

    /// Local logout: drop the cached user and clear the persisted session.
    /// No server call is made.
    pub fn logout(&self) {
        self.state.lock().user = None;
        self.session.clear();
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.loading = true;
        state.error = None;
    }

    fn finish(&self, outcome: Result<String>) -> Result<String> {
        let mut state = self.state.lock();
        state.loading = false;
        if let Err(err) = &outcome {
            state.error = Some(err.to_string());
        }
        outcome
    }
}

/// The server wraps confirmations as `{ "message": ... }`.
fn message_of(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpClient;
    use crate::session::{MemoryStorage, SessionManager};
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> AuthStore {
        let session = SessionManager::new(Arc::new(MemoryStorage::new()));
        let http =
            HttpClient::new(&ClientConfig::new("http://localhost:5000/api"), session.clone())
                .expect("client");
        AuthStore::new(AuthService::new(http), session)
    }

    #[test]
    fn test_role_getters_track_cached_user() {
        let store = store();
        assert!(!store.is_admin());
        assert!(store.user_role().is_none());

        store.state.lock().user = Some(
            serde_json::from_value(json!({ "id": 1, "role": "admin" })).unwrap(),
        );
        assert!(store.is_admin());
        assert!(!store.is_teacher());
        assert_eq!(store.user_role().as_deref(), Some("admin"));
    }

    #[test]
    fn test_logout_clears_user_and_session() {
        let store = store();
        store.session.establish("tok", "teacher");
        store.state.lock().user = Some(
            serde_json::from_value(json!({ "id": 1, "role": "teacher" })).unwrap(),
        );

        store.logout();
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_fetch_current_user_without_token_skips_network() {
        // The configured backend does not exist; reaching it would fail, so
        // an Ok(None) here proves no request was made.
        let store = store();
        let user = store.fetch_current_user().await.unwrap();
        assert!(user.is_none());
    }
}
