//! # Coursemart (Course Marketplace Client)
//!
//! `coursemart` is the client side of an online course marketplace. It talks to
//! the marketplace REST API for catalog browsing, enrollment, comments,
//! wishlists and payment status, and keeps only short-lived state locally.
//!
//! ## Sessions
//!
//! The API issues a compact three-segment session token. The client decodes its
//! payload (without verifying the signature) to decide expiry and to read role
//! claims, persists it through a [`storage::KeyValueStore`], and re-validates
//! it on a fixed interval while signed in. See [`features::auth`].
//!
//! ## Authorization
//!
//! Roles are normalized once at the boundary into a [`features::auth::roles::RoleSet`].
//! Route guards are UX-only; the API remains the source of truth for access control.
//!
//! ## Caching
//!
//! Teacher names are looked up through a process-lifetime cache that coalesces
//! concurrent requests for the same teacher into one network call.

pub mod api;
pub mod cli;
pub mod features;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
