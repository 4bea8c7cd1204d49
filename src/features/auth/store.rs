//! Token persistence on top of a [`KeyValueStore`].
//!
//! Purely mechanical: no validation happens here. Tokens come back wrapped in
//! `SecretString` so they do not end up in `Debug` output or logs by accident.

use crate::features::auth::roles::RoleSet;
use crate::storage::{KeyValueStore, StorageError};
use secrecy::SecretString;
use std::sync::Arc;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const AUTH_ROLES_KEY: &str = "auth_roles";

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.storage.get(AUTH_TOKEN_KEY).is_some())
            .field(
                "has_refresh_token",
                &self.storage.get(REFRESH_TOKEN_KEY).is_some(),
            )
            .finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Persists the access token, and the refresh token only when provided.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be written.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), StorageError> {
        self.storage.set(AUTH_TOKEN_KEY, access)?;
        if let Some(refresh) = refresh {
            self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    /// Removes both tokens and the role fallback.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be written.
    pub fn clear_tokens(&self) -> Result<(), StorageError> {
        self.storage.remove(AUTH_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        self.storage.remove(AUTH_ROLES_KEY)?;
        Ok(())
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.storage.get(AUTH_TOKEN_KEY).map(SecretString::from)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.storage.get(REFRESH_TOKEN_KEY).map(SecretString::from)
    }

    /// Stores the JSON-encoded role fallback.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be written.
    pub fn set_roles(&self, roles: &RoleSet) -> Result<(), StorageError> {
        if roles.is_empty() {
            return self.storage.remove(AUTH_ROLES_KEY);
        }
        self.storage.set(AUTH_ROLES_KEY, &roles.to_json())
    }

    /// Raw JSON of the role fallback, if any.
    #[must_use]
    pub fn stored_roles(&self) -> Option<String> {
        self.storage.get(AUTH_ROLES_KEY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use secrecy::ExposeSecret;

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let backing = Arc::new(MemoryStore::new());
        let session = SessionStore::new(backing.clone());
        (backing, session)
    }

    #[test]
    fn set_tokens_without_refresh_keeps_previous_refresh() {
        let (backing, session) = store();
        session.set_tokens("access-1", Some("refresh-1")).unwrap();
        session.set_tokens("access-2", None).unwrap();

        assert_eq!(session.token().unwrap().expose_secret(), "access-2");
        assert_eq!(session.refresh_token().unwrap().expose_secret(), "refresh-1");
        assert_eq!(backing.get(AUTH_TOKEN_KEY), Some("access-2".to_string()));
    }

    #[test]
    fn clear_tokens_removes_everything() {
        let (backing, session) = store();
        session.set_tokens("access", Some("refresh")).unwrap();
        session.set_roles(&RoleSet::new(["ROLE_ADMIN"])).unwrap();

        session.clear_tokens().unwrap();

        assert!(session.token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(session.stored_roles().is_none());
        assert_eq!(backing.get(AUTH_ROLES_KEY), None);
    }

    #[test]
    fn accessors_return_none_when_absent() {
        let (_, session) = store();
        assert!(session.token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(session.stored_roles().is_none());
    }

    #[test]
    fn roles_fallback_is_json() {
        let (backing, session) = store();
        session
            .set_roles(&RoleSet::new(["ROLE_STUDENT", "ROLE_USER"]))
            .unwrap();
        assert_eq!(
            backing.get(AUTH_ROLES_KEY),
            Some(r#"["ROLE_STUDENT","ROLE_USER"]"#.to_string())
        );

        session.set_roles(&RoleSet::default()).unwrap();
        assert_eq!(backing.get(AUTH_ROLES_KEY), None);
    }

    #[test]
    fn debug_hides_token_values() {
        let (_, session) = store();
        session.set_tokens("super-secret", None).unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_token: true"));
    }
}
