//! Course catalog, enrollment, and teacher-owned course management.

pub mod client;
pub mod types;

pub use client::{
    create_course, enroll, get_course, list_courses, my_enrollments, teacher_courses,
};
pub use types::{Course, CourseQuery, Enrollment, NewCourse};
