//! Course discussion threads.

pub mod client;
pub mod types;

pub use client::{delete_comment, list_comments, post_comment};
pub use types::Comment;
