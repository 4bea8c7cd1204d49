//! Client helper for the public teacher endpoint.

use crate::api::{path_id, ApiClient, ApiError};
use crate::features::teachers::types::TeacherInfo;

/// Fetches a teacher's public profile by id.
pub async fn fetch_teacher(api: &ApiClient, id: &str) -> Result<TeacherInfo, ApiError> {
    let id = path_id(id, "Teacher")?;
    api.get_json(&format!("/api/teachers/{id}")).await
}
