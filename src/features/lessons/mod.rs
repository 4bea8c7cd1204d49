//! Course lessons.

pub mod client;
pub mod types;

pub use client::list_lessons;
pub use types::Lesson;
