//! Client wrappers for auth endpoints. These keep endpoint paths in one place;
//! state transitions live in [`super::state`]. Payloads carry credentials and
//! must never be logged.

use crate::api::{ApiClient, ApiError};
use crate::features::auth::types::{
    LoginRequest, RefreshRequest, RegisterPayload, TokenResponse, UserProfile,
};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const PROFILE_PATH: &str = "/api/users/me";

/// Exchanges credentials for tokens.
pub async fn login(api: &ApiClient, request: &LoginRequest<'_>) -> Result<TokenResponse, ApiError> {
    api.post_json_response(LOGIN_PATH, request).await
}

/// Creates an account. The response body is ignored.
pub async fn register(api: &ApiClient, request: &RegisterPayload<'_>) -> Result<(), ApiError> {
    api.post_json(REGISTER_PATH, request).await
}

/// Invalidates the session server-side.
pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.post_empty(LOGOUT_PATH).await
}

/// Trades a refresh token for a new token pair.
pub async fn refresh(
    api: &ApiClient,
    request: &RefreshRequest<'_>,
) -> Result<TokenResponse, ApiError> {
    api.post_json_response(REFRESH_PATH, request).await
}

/// Fetches the signed-in user's profile.
pub async fn fetch_profile(api: &ApiClient) -> Result<UserProfile, ApiError> {
    api.get_json(PROFILE_PATH).await
}
