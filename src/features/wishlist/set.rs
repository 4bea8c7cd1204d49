//! Advisory mirror of the server wishlist for constant-time membership checks.
//! The server stays authoritative: a full refresh replaces the set wholesale.

use crate::api::{ApiClient, ApiError};
use crate::features::wishlist::client;
use std::collections::HashSet;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct WishlistSet {
    ids: HashSet<String>,
}

impl WishlistSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the set from the server. On failure the previous set is kept.
    ///
    /// # Errors
    /// Returns the fetch error.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let items = client::fetch_wishlist(api).await?;
        self.ids = items.into_iter().map(|item| item.course_id).collect();
        debug!(count = self.ids.len(), "Wishlist refreshed");
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, course_id: &str) -> bool {
        self.ids.contains(course_id.trim())
    }

    /// Adds or removes `course_id` on the server, then mirrors the change.
    /// Returns whether the course is wishlisted afterwards.
    ///
    /// # Errors
    /// Returns the mutation error; the local set is left as it was.
    pub async fn toggle(&mut self, api: &ApiClient, course_id: &str) -> Result<bool, ApiError> {
        let course_id = course_id.trim();
        if self.contains(course_id) {
            client::remove(api, course_id).await?;
            self.ids.remove(course_id);
            Ok(false)
        } else {
            client::add(api, course_id).await?;
            self.ids.insert(course_id.to_string());
            Ok(true)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
