//! Domain-level features (auth, catalog, teachers) and their shared logic. The
//! CLI imports these modules to keep command handling focused while keeping
//! security and API handling in dedicated feature areas.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod courses;
pub mod lessons;
pub mod payments;
pub mod teachers;
pub mod wishlist;

mod wire;
