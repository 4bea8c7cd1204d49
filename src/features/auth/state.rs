//! Auth session state and the operations that move it.
//!
//! [`AuthSession`] is an explicit, injectable object: construct one per
//! process (or per test), call [`AuthSession::init`] to hydrate it from stored
//! tokens, and [`AuthSession::shutdown`] on teardown. State is published through
//! a `watch` channel so guards and views can observe transitions.
//!
//! Flow Overview:
//! 1. A new session starts in `Validating`.
//! 2. `check_auth` hydrates from the stored token: valid token plus a profile
//!    fetch gives `Authenticated`; anything else clears storage and gives
//!    `Unauthenticated`. It never returns an error.
//! 3. `login`/`register` are user-initiated and return errors to the caller.
//! 4. While `Authenticated`, one background task re-checks the token on a fixed
//!    interval and signs out once it is no longer valid. The task is aborted on
//!    every transition out of `Authenticated`.
//! 5. A 401/403 from any request made through the shared [`ApiClient`] signs
//!    out immediately: readers see `Unauthenticated` on their next call, and
//!    the background task publishes the transition to subscribers.
//!
//! Concurrent `check_auth` and `login` calls are allowed; the last write wins.
//! Both paths converge on the same invariant: no valid token means
//! `Unauthenticated`.

use crate::api::{ApiClient, ApiError, ClientConfig};
use crate::features::auth::roles::Role;
use crate::features::auth::types::{
    Identity, LoginRequest, RefreshRequest, RegisterPayload, UserProfile,
};
use crate::features::auth::{client, token};
use crate::storage::StorageError;
use parking_lot::Mutex;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum AuthState {
    Validating,
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
    /// The server answered, but without an access token.
    #[error("invalid login response: no access token")]
    InvalidLoginResponse,
    #[error("invalid refresh response: no access token")]
    InvalidRefreshResponse,
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("{0}")]
    InvalidInput(String),
}

impl AuthError {
    /// True when the API rejected the credentials (401/403).
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::Api(err) if err.is_auth_failure())
    }
}

/// Account creation input. The password stays wrapped until the request body
/// is built.
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Option<Role>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<AuthState>,
    validation_interval: Duration,
    refresh_buffer_minutes: i64,
    monitor: Mutex<Option<JoinHandle<()>>>,
    rejections: Mutex<watch::Receiver<u64>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.monitor.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.inner.state.borrow().is_authenticated())
            .field("validation_interval", &self.inner.validation_interval)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Creates a session in the `Validating` state. Nothing runs until
    /// [`AuthSession::init`] or another operation is called.
    #[must_use]
    pub fn new(api: ApiClient, config: &ClientConfig) -> Self {
        let (state, _) = watch::channel(AuthState::Validating);
        let rejections = Mutex::new(api.rejections());

        Self {
            inner: Arc::new(Inner {
                api,
                state,
                validation_interval: config.validation_interval,
                refresh_buffer_minutes: config.refresh_buffer_minutes,
                monitor: Mutex::new(None),
                rejections,
            }),
        }
    }

    /// Lifecycle hook: hydrate from stored tokens.
    pub async fn init(&self) -> AuthState {
        self.check_auth().await;
        self.state()
    }

    /// Lifecycle hook: stop background validation. The stored session is kept.
    pub fn shutdown(&self) {
        self.stop_monitor();
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.observe_rejections();
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.observe_rejections();
        self.inner.state.borrow().identity().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.observe_rejections();
        self.inner.state.borrow().is_authenticated()
    }

    /// True while the periodic validation task is alive.
    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.inner
            .monitor
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Re-validates the stored token and refreshes the identity. Failures are
    /// never returned; they end in `Unauthenticated` with storage cleared.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) {
        let store = self.inner.api.session();

        let Some(token) = store.token() else {
            debug!("No stored session token");
            self.clear_local();
            return;
        };

        if token::is_expired(token.expose_secret()) {
            info!("Stored session token is expired or malformed");
            self.clear_local();
            return;
        }

        match client::fetch_profile(&self.inner.api).await {
            Ok(profile) => {
                let identity = self.identity_for(token.expose_secret(), profile);
                if let Err(err) = store.set_roles(identity.roles()) {
                    warn!("Failed to persist role fallback: {err}");
                }
                debug!(user_id = identity.id(), "Session validated");
                self.set_state(AuthState::Authenticated(identity));
            }
            Err(err) => {
                warn!("Session validation failed: {err}");
                self.clear_local();
            }
        }
    }

    /// Signs in. Tokens are persisted before the profile is fetched.
    ///
    /// # Errors
    /// Propagates request failures unchanged (state untouched), returns
    /// `InvalidLoginResponse` when the server omits the access token (storage
    /// untouched), and clears the fresh tokens if the profile fetch fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let request = LoginRequest {
            email: email.trim(),
            password: password.expose_secret(),
        };
        let response = client::login(&self.inner.api, &request).await?;

        let Some(access) = response.access() else {
            warn!("Login response did not include an access token");
            return Err(AuthError::InvalidLoginResponse);
        };

        let store = self.inner.api.session();
        store.set_tokens(access, response.refresh())?;

        let profile = match client::fetch_profile(&self.inner.api).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!("Profile fetch after login failed: {err}");
                self.clear_local();
                return Err(err.into());
            }
        };

        let identity = self.identity_for(access, profile);
        store.set_roles(identity.roles())?;

        info!(user_id = identity.id(), "Signed in");
        self.set_state(AuthState::Authenticated(identity.clone()));

        Ok(identity)
    }

    /// Creates an account, then signs in with the same credentials.
    ///
    /// # Errors
    /// Returns `InvalidInput` for malformed input, or any error from the
    /// registration or the follow-up login.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Identity, AuthError> {
        let email = request.email.trim();
        if !valid_email(email) {
            return Err(AuthError::InvalidInput(format!("Invalid email address: {email}")));
        }
        if request.password.expose_secret().is_empty() {
            return Err(AuthError::InvalidInput("Password is required.".to_string()));
        }

        let payload = RegisterPayload {
            first_name: request.first_name.trim(),
            last_name: request.last_name.trim(),
            email,
            password: request.password.expose_secret(),
            role: request.role.map(Role::as_str),
        };
        client::register(&self.inner.api, &payload).await?;
        info!("Account created; signing in");

        self.login(email, &request.password).await
    }

    /// Best-effort server sign-out, then unconditional local cleanup.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(err) = client::logout(&self.inner.api).await {
            warn!("Server sign-out failed: {err}");
        }
        self.clear_local();
        info!("Signed out");
    }

    /// Exchanges the stored refresh token and re-validates. Any failure signs
    /// out. Returns whether the session is authenticated afterwards.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> bool {
        match self.exchange_refresh_token().await {
            Ok(()) => {
                self.check_auth().await;
                self.is_authenticated()
            }
            Err(err) => {
                warn!("Token refresh failed: {err}");
                self.logout().await;
                false
            }
        }
    }

    async fn exchange_refresh_token(&self) -> Result<(), AuthError> {
        let store = self.inner.api.session();
        let refresh = store
            .refresh_token()
            .ok_or(AuthError::MissingRefreshToken)?;

        let request = RefreshRequest {
            refresh_token: refresh.expose_secret(),
        };
        let response = client::refresh(&self.inner.api, &request).await?;
        let access = response.access().ok_or(AuthError::InvalidRefreshResponse)?;
        store.set_tokens(access, response.refresh())?;

        debug!("Session tokens refreshed");
        Ok(())
    }

    /// One tick of background validation. Returns false once the task should stop.
    async fn validate_once(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        let store = self.inner.api.session();
        let due = store.token().map_or(true, |token| {
            token::should_refresh(token.expose_secret(), self.inner.refresh_buffer_minutes)
        });

        if due && store.refresh_token().is_some() {
            match self.exchange_refresh_token().await {
                Ok(()) => {
                    self.check_auth().await;
                    return self.is_authenticated();
                }
                Err(err) => warn!("Background token refresh failed: {err}"),
            }
        }

        let valid = store
            .token()
            .is_some_and(|token| !token::is_expired(token.expose_secret()));
        if !valid {
            info!("Session token no longer valid; signing out");
            self.logout().await;
            return false;
        }

        true
    }

    fn identity_for(&self, token: &str, profile: UserProfile) -> Identity {
        let claims = token::decode(token).unwrap_or_default();
        let stored = self.inner.api.session().stored_roles();
        Identity::new(profile, claims, stored.as_deref())
    }

    /// Signs out if the API rejected the token since the last look.
    fn observe_rejections(&self) {
        let rejected = {
            let mut rejections = self.inner.rejections.lock();
            let changed = rejections.has_changed().unwrap_or(false);
            if changed {
                rejections.borrow_and_update();
            }
            changed
        };

        let authenticated = self.inner.state.borrow().is_authenticated();
        if rejected && authenticated {
            info!("API rejected the session token; signing out");
            self.clear_local();
        }
    }

    fn clear_local(&self) {
        if let Err(err) = self.inner.api.session().clear_tokens() {
            warn!("Failed to clear stored session: {err}");
        }
        self.set_state(AuthState::Unauthenticated);
    }

    fn set_state(&self, state: AuthState) {
        let authenticated = state.is_authenticated();
        if authenticated {
            // Rejections before this point belong to an earlier token.
            self.inner.rejections.lock().borrow_and_update();
        }
        self.inner.state.send_replace(state);

        if authenticated {
            self.start_monitor();
        } else {
            self.stop_monitor();
        }
    }

    fn start_monitor(&self) {
        let mut monitor = self.inner.monitor.lock();
        if monitor.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.validation_interval;
        let mut rejections = self.inner.api.rejections();
        debug!(interval = ?period, "Starting session validation");

        *monitor = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let rejected = tokio::select! {
                    _ = ticker.tick() => false,
                    changed = rejections.changed() => changed.is_ok(),
                };

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let session = AuthSession { inner };
                if rejected {
                    session.observe_rejections();
                    break;
                }
                if !session.validate_once().await {
                    break;
                }
            }
        }));
    }

    fn stop_monitor(&self) {
        if let Some(handle) = self.inner.monitor.lock().take() {
            debug!("Stopping session validation");
            handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::auth::store::SessionStore;
    use crate::features::auth::token::unsigned_token;
    use crate::storage::MemoryStore;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fresh_token(ttl_secs: i64) -> String {
        unsigned_token(&json!({
            "sub": "7",
            "email": "ada@example.test",
            "exp": chrono::Utc::now().timestamp() + ttl_secs,
            "role": "ROLE_STUDENT"
        }))
    }

    fn session_for(server: &MockServer, interval: Duration) -> AuthSession {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        let config = ClientConfig::default()
            .with_api_base_url(server.uri())
            .with_validation_interval(interval);
        let api = ApiClient::new(&config, store).unwrap();
        AuthSession::new(api, &config)
    }

    fn password() -> SecretString {
        SecretString::from("correct horse battery staple")
    }

    async fn mount_profile(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.test",
                "roles": ["ROLE_TEACHER"]
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn valid_email_accepts_and_rejects() {
        assert!(valid_email("ada@example.test"));
        assert!(!valid_email("ada@localhost"));
        assert!(!valid_email("ada example@test.io"));
        assert!(!valid_email(""));
    }

    #[tokio::test]
    async fn new_session_starts_validating() {
        let server = MockServer::start().await;
        let session = session_for(&server, Duration::from_secs(60));
        assert_eq!(session.state(), AuthState::Validating);
        assert!(!session.is_monitoring());
    }

    #[tokio::test]
    async fn login_persists_tokens_then_loads_identity() {
        let server = MockServer::start().await;
        let token = fresh_token(3600);
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({
                "email": "ada@example.test",
                "password": "correct horse battery staple"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": token,
                "refreshToken": "refresh-1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_profile(&server).await;

        let session = session_for(&server, Duration::from_secs(60));
        let identity = session
            .login(" ada@example.test ", &password())
            .await
            .unwrap();

        assert_eq!(identity.id(), "7");
        assert_eq!(identity.display_name(), "Ada Lovelace");
        assert!(identity.has_role(Role::Teacher));
        assert_eq!(session.identity(), Some(identity));

        let store = session.api().session();
        assert_eq!(store.token().unwrap().expose_secret(), token);
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "refresh-1");
        assert_eq!(store.stored_roles().as_deref(), Some(r#"["ROLE_TEACHER"]"#));
        assert!(session.is_monitoring());

        session.shutdown();
        assert!(!session.is_monitoring());
    }

    #[tokio::test]
    async fn login_without_access_token_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "check your inbox"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        let result = session.login("ada@example.test", &password()).await;

        assert!(matches!(result, Err(AuthError::InvalidLoginResponse)));
        assert!(session.api().session().token().is_none());
        assert!(session.api().session().refresh_token().is_none());
        assert_eq!(session.state(), AuthState::Validating);
    }

    #[tokio::test]
    async fn login_failure_propagates_and_keeps_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "database unavailable"
            })))
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        let result = session.login("ada@example.test", &password()).await;

        match result {
            Err(AuthError::Api(ApiError::Http { status, message })) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(session.state(), AuthState::Validating);
    }

    #[tokio::test]
    async fn login_rolls_back_tokens_when_profile_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": fresh_token(3600)
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        let result = session.login("ada@example.test", &password()).await;

        assert!(matches!(result, Err(AuthError::Api(ApiError::Http { status: 502, .. }))));
        assert!(session.api().session().token().is_none());
        assert_eq!(session.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), Some("refresh"))
            .unwrap();

        session.logout().await;

        assert!(session.api().session().token().is_none());
        assert!(session.api().session().refresh_token().is_none());
        assert_eq!(session.identity(), None);
        assert_eq!(session.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn check_auth_without_token_is_unauthenticated() {
        let server = MockServer::start().await;
        let session = session_for(&server, Duration::from_secs(60));

        assert_eq!(session.init().await, AuthState::Unauthenticated);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_auth_with_expired_token_clears_without_network() {
        let server = MockServer::start().await;
        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens("header.eyJleHAiOjB9.sig", Some("refresh"))
            .unwrap();

        session.check_auth().await;

        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(session.api().session().token().is_none());
        assert!(session.api().session().refresh_token().is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_auth_with_valid_token_hydrates_identity() {
        let server = MockServer::start().await;
        mount_profile(&server).await;

        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), None)
            .unwrap();

        let state = session.init().await;
        let identity = state.identity().cloned().unwrap();
        assert_eq!(identity.email(), "ada@example.test");
        assert_eq!(identity.claims.sub.as_deref(), Some("7"));
        assert!(session.is_monitoring());
    }

    #[tokio::test]
    async fn check_auth_on_rejected_token_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), Some("refresh"))
            .unwrap();

        session.check_auth().await;

        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(session.api().session().token().is_none());
    }

    async fn authenticated_session(server: &MockServer) -> AuthSession {
        mount_profile(server).await;
        let session = session_for(server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), Some("refresh"))
            .unwrap();
        session.check_auth().await;
        assert!(session.is_authenticated());
        session
    }

    #[tokio::test]
    async fn rejected_request_signs_out_immediately() {
        let server = MockServer::start().await;
        let session = authenticated_session(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/courses/1"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = session
            .api()
            .get_json::<serde_json::Value>("/api/courses/1")
            .await;

        assert!(matches!(
            result,
            Err(ApiError::Unauthorized { status: 403, .. })
        ));
        assert!(!session.is_authenticated());
        assert_eq!(session.identity(), None);
        assert!(session.api().session().token().is_none());
        assert!(!session.is_monitoring());
    }

    #[tokio::test]
    async fn rejected_request_is_published_to_subscribers() {
        let server = MockServer::start().await;
        let session = authenticated_session(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/wishlist"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut states = session.subscribe();
        let _ = session
            .api()
            .get_json::<serde_json::Value>("/api/wishlist")
            .await;

        let signed_out = tokio::time::timeout(
            Duration::from_secs(2),
            states.wait_for(|state| *state == AuthState::Unauthenticated),
        )
        .await
        .is_ok_and(|changed| changed.is_ok());
        assert!(signed_out);
    }

    #[tokio::test]
    async fn rejection_before_login_does_not_sign_out_new_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/payments/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let session = session_for(&server, Duration::from_secs(60));
        let _ = session
            .api()
            .get_json::<serde_json::Value>("/api/payments/me")
            .await;

        mount_profile(&server).await;
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), None)
            .unwrap();
        session.check_auth().await;

        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), None)
            .unwrap();

        assert!(!session.refresh_token().await);
        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(session.api().session().token().is_none());
    }

    #[tokio::test]
    async fn refresh_persists_new_tokens_and_revalidates() {
        let server = MockServer::start().await;
        let renewed = fresh_token(7200);
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({ "refreshToken": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": renewed,
                "refreshToken": "refresh-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_profile(&server).await;

        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens("header.eyJleHAiOjB9.sig", Some("refresh-1"))
            .unwrap();

        assert!(session.refresh_token().await);

        let store = session.api().session();
        assert_eq!(store.token().unwrap().expose_secret(), renewed);
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "refresh-2");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_with_bad_response_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), Some("refresh-1"))
            .unwrap();

        assert!(!session.refresh_token().await);
        assert_eq!(session.state(), AuthState::Unauthenticated);
        assert!(session.api().session().refresh_token().is_none());
    }

    #[tokio::test]
    async fn register_chains_into_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.test",
                "password": "correct horse battery staple",
                "role": "teacher"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": fresh_token(3600)
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_profile(&server).await;

        let session = session_for(&server, Duration::from_secs(60));
        let request = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.test".to_string(),
            password: password(),
            role: Some(Role::Teacher),
        };

        let identity = session.register(&request).await.unwrap();
        assert_eq!(identity.id(), "7");
        assert!(session.is_authenticated());
        assert!(!format!("{request:?}").contains("battery"));
    }

    #[tokio::test]
    async fn register_rejects_bad_email_locally() {
        let server = MockServer::start().await;
        let session = session_for(&server, Duration::from_secs(60));
        let request = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "not-an-email".to_string(),
            password: password(),
            role: None,
        };

        let result = session.register(&request).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_failure_skips_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Email already registered"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_secs(60));
        let request = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.test".to_string(),
            password: password(),
            role: None,
        };

        let result = session.register(&request).await;
        assert!(matches!(
            result,
            Err(AuthError::Api(ApiError::Http { status: 409, .. }))
        ));
    }

    #[tokio::test]
    async fn periodic_validation_signs_out_after_expiry() {
        let server = MockServer::start().await;
        mount_profile(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let session = session_for(&server, Duration::from_millis(100));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(2), None)
            .unwrap();
        session.check_auth().await;
        assert!(session.is_authenticated());

        let mut rx = session.subscribe();
        let signed_out = tokio::time::timeout(
            Duration::from_secs(10),
            rx.wait_for(|state| *state == AuthState::Unauthenticated),
        )
        .await
        .is_ok_and(|changed| changed.is_ok());

        assert!(signed_out, "validator did not sign out in time");
        assert!(session.api().session().token().is_none());

        // Give the aborted task a moment to wind down.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!session.is_monitoring());
    }

    #[tokio::test]
    async fn periodic_validation_keeps_valid_session() {
        let server = MockServer::start().await;
        mount_profile(&server).await;

        let session = session_for(&server, Duration::from_millis(50));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), None)
            .unwrap();
        session.check_auth().await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(session.is_authenticated());
        assert!(session.is_monitoring());
        session.shutdown();
    }

    #[tokio::test]
    async fn dropping_last_handle_stops_validation() {
        let server = MockServer::start().await;
        mount_profile(&server).await;

        let session = session_for(&server, Duration::from_millis(50));
        session
            .api()
            .session()
            .set_tokens(&fresh_token(3600), None)
            .unwrap();
        session.check_auth().await;

        let weak = Arc::downgrade(&session.inner);
        drop(session);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(weak.upgrade().is_none());
    }
}
