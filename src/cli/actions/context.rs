//! Per-invocation wiring: session file, API client and auth session.

use crate::api::ApiClient;
use crate::cli::globals::GlobalArgs;
use crate::features::auth::{
    guards::{self, Access},
    AuthSession, AuthState, Identity, Role, SessionStore,
};
use crate::features::teachers::TeacherInfoCache;
use crate::storage::FileStore;
use anyhow::{anyhow, Context as _, Result};
use std::sync::Arc;
use tracing::debug;

pub struct Context {
    pub session: AuthSession,
    pub teachers: TeacherInfoCache,
}

impl Context {
    /// # Errors
    /// Returns an error if the session file is unreadable or the API URL is invalid.
    pub fn open(globals: &GlobalArgs) -> Result<Self> {
        let config = globals.client_config();
        let path = config
            .state_file
            .clone()
            .unwrap_or_else(FileStore::default_path);

        let store = FileStore::open(&path)
            .with_context(|| format!("failed to open session file {}", path.display()))?;
        debug!(path = %store.path().display(), "using session file");

        let api = ApiClient::new(&config, SessionStore::new(Arc::new(store)))
            .context("failed to build API client")?;

        Ok(Self {
            session: AuthSession::new(api.clone(), &config),
            teachers: TeacherInfoCache::new(api),
        })
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Hydrates from the stored token and requires a signed-in user.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in.
    pub async fn signed_in(&self) -> Result<Identity> {
        match self.session.init().await {
            AuthState::Authenticated(identity) => Ok(identity),
            _ => Err(anyhow!("not signed in; run `coursemart login` first")),
        }
    }

    /// Like [`Context::signed_in`], but also applies the role guard.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in or the role is missing.
    pub async fn require(&self, role: Role) -> Result<Identity> {
        let identity = self.session.init().await.identity().cloned();

        match guards::require_role(identity.as_ref(), role) {
            Access::Granted => identity.ok_or_else(|| anyhow!("not signed in")),
            Access::Redirect(path) => Err(anyhow!(
                "{role} role required (redirected to {path}); sign in with a {role} account"
            )),
        }
    }

    pub fn close(&self) {
        self.session.shutdown();
    }
}
