//! Client helpers for admin endpoints. These functions keep endpoint paths
//! centralized and assume the backend enforces authorization.

use crate::api::{path_id, ApiClient, ApiError};
use crate::features::admin::types::{StatusUpdate, UserStatus, UserSummary};
use tracing::instrument;

pub async fn list_users(api: &ApiClient) -> Result<Vec<UserSummary>, ApiError> {
    api.get_json("/api/admin/users").await
}

#[instrument(skip(api))]
pub async fn set_user_status(
    api: &ApiClient,
    user_id: &str,
    status: UserStatus,
) -> Result<UserSummary, ApiError> {
    let user_id = path_id(user_id, "User")?;
    api.put_json_response(
        &format!("/api/admin/users/{user_id}/status"),
        &StatusUpdate { status },
    )
    .await
}
