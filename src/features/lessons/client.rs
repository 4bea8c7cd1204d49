use crate::api::{path_id, ApiClient, ApiError};
use crate::features::lessons::types::Lesson;

/// Lessons of a course, ordered by `position` (lessons without one go last).
pub async fn list_lessons(api: &ApiClient, course_id: &str) -> Result<Vec<Lesson>, ApiError> {
    let course_id = path_id(course_id, "Course")?;
    let mut lessons: Vec<Lesson> = api
        .get_json(&format!("/api/courses/{course_id}/lessons"))
        .await?;
    lessons.sort_by_key(|lesson| lesson.position.unwrap_or(u32::MAX));
    Ok(lessons)
}
