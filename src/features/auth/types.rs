//! Request and response types for auth endpoints, plus the in-memory
//! [`Identity`]. Request payloads borrow credentials for the duration of a
//! call and deliberately do not implement `Debug`.

use crate::features::auth::roles::{Role, RoleFields, RoleSet};
use crate::features::auth::token::TokenClaims;
use crate::features::wire;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Tokens returned by login and refresh. Either field may be missing on a
/// malformed response; callers decide what that means.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(default, alias = "token", alias = "access_token")]
    pub access_token: Option<String>,
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// The access token, if present and non-blank.
    #[must_use]
    pub fn access(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    #[must_use]
    pub fn refresh(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &self.access().map(|_| "***"))
            .field("refresh_token", &self.refresh().map(|_| "***"))
            .finish()
    }
}

/// Profile returned by `GET /api/users/me`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub role_fields: RoleFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Who is signed in: decoded claims, the fetched profile, and roles
/// normalized once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub profile: UserProfile,
    pub claims: TokenClaims,
    roles: RoleSet,
}

impl Identity {
    /// The profile's role fields win over token claims as a whole; claims are
    /// used only when the profile carries no role at all, and the stored JSON
    /// fallback only when neither does.
    #[must_use]
    pub fn new(profile: UserProfile, claims: TokenClaims, stored_roles: Option<&str>) -> Self {
        let fields = profile
            .role_fields
            .clone()
            .or(claims.role_fields.clone());
        let roles = RoleSet::resolve(&fields, stored_roles);

        Self {
            profile,
            claims,
            roles,
        }
    }

    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        if self.profile.email.is_empty() {
            self.claims.email.as_deref().unwrap_or_default()
        } else {
            &self.profile.email
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.profile.first_name, self.profile.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email().to_string()
        } else {
            name.to_string()
        }
    }
}
