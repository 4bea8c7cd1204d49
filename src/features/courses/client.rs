//! Client helpers for course endpoints. Paths stay centralized here and the
//! backend enforces who may enroll or publish.

use crate::api::{path_id, ApiClient, ApiError};
use crate::features::courses::types::{Course, CoursePage, CourseQuery, Enrollment, NewCourse};
use tracing::instrument;

const COURSES_PATH: &str = "/api/courses";

/// Lists catalog courses matching `query`.
#[instrument(skip(api))]
pub async fn list_courses(api: &ApiClient, query: &CourseQuery) -> Result<Vec<Course>, ApiError> {
    let pairs = query.pairs();
    let path = if pairs.is_empty() {
        COURSES_PATH.to_string()
    } else {
        let mut url = url::Url::parse("http://query.invalid/")
            .map_err(|err| ApiError::Config(format!("Failed to build query: {err}")))?;
        url.query_pairs_mut().extend_pairs(pairs);
        format!("{COURSES_PATH}?{}", url.query().unwrap_or_default())
    };

    let page: CoursePage = api.get_json(&path).await?;
    Ok(page.into_courses())
}

pub async fn get_course(api: &ApiClient, id: &str) -> Result<Course, ApiError> {
    let id = path_id(id, "Course")?;
    api.get_json(&format!("{COURSES_PATH}/{id}")).await
}

/// Enrolls the signed-in student.
#[instrument(skip(api))]
pub async fn enroll(api: &ApiClient, course_id: &str) -> Result<Enrollment, ApiError> {
    let course_id = path_id(course_id, "Course")?;
    api.post_json_response(
        &format!("{COURSES_PATH}/{course_id}/enroll"),
        &serde_json::json!({}),
    )
    .await
}

pub async fn my_enrollments(api: &ApiClient) -> Result<Vec<Enrollment>, ApiError> {
    api.get_json("/api/enrollments/me").await
}

/// Courses owned by the signed-in teacher.
pub async fn teacher_courses(api: &ApiClient) -> Result<Vec<Course>, ApiError> {
    api.get_json("/api/teacher/courses").await
}

#[instrument(skip(api, course), fields(title = %course.title))]
pub async fn create_course(api: &ApiClient, course: &NewCourse) -> Result<Course, ApiError> {
    if course.title.trim().is_empty() {
        return Err(ApiError::Config("Course title is required.".to_string()));
    }
    api.post_json_response(COURSES_PATH, course).await
}
