//! Admin user management. Callers gate these with `Role::Admin`; the API
//! enforces it regardless.

pub mod client;
pub mod types;

pub use client::{list_users, set_user_status};
pub use types::{UserStatus, UserSummary};
