//! Client helpers for comment endpoints. Deleting is limited server-side to
//! the author and admins.

use crate::api::{path_id, ApiClient, ApiError};
use crate::features::comments::types::{Comment, NewComment};
use tracing::instrument;

pub async fn list_comments(api: &ApiClient, course_id: &str) -> Result<Vec<Comment>, ApiError> {
    let course_id = path_id(course_id, "Course")?;
    api.get_json(&format!("/api/courses/{course_id}/comments"))
        .await
}

/// Posts a comment. Blank content is rejected before any request.
#[instrument(skip(api, content))]
pub async fn post_comment(
    api: &ApiClient,
    course_id: &str,
    content: &str,
) -> Result<Comment, ApiError> {
    let course_id = path_id(course_id, "Course")?;
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::Config("Comment cannot be empty.".to_string()));
    }

    api.post_json_response(
        &format!("/api/courses/{course_id}/comments"),
        &NewComment { content },
    )
    .await
}

#[instrument(skip(api))]
pub async fn delete_comment(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    let id = path_id(id, "Comment")?;
    api.delete(&format!("/api/comments/{id}")).await
}
