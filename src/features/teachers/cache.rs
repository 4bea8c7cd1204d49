//! Request-coalescing teacher cache.
//!
//! Concurrent `get` calls for one id share a single in-flight request through
//! moka's per-key initializer. Successful lookups are kept until
//! [`TeacherInfoCache::invalidate_all`]; failures are never stored, so the next
//! call retries.

use crate::api::{ApiClient, ApiError};
use crate::features::teachers::{client, types::TeacherInfo};
use moka::future::Cache;
use tracing::{debug, instrument, warn};

pub const UNKNOWN_TEACHER: &str = "Unknown teacher";

#[derive(Clone)]
pub struct TeacherInfoCache {
    api: ApiClient,
    cache: Cache<String, TeacherInfo>,
}

impl std::fmt::Debug for TeacherInfoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeacherInfoCache")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl TeacherInfoCache {
    /// Unbounded, no TTL: teacher names do not change within a session.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Cache::builder().build(),
        }
    }

    /// Returns the cached teacher or joins/starts the single lookup for `id`.
    ///
    /// # Errors
    /// Returns the lookup's `ApiError`; every waiter on that lookup sees the same error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<TeacherInfo, ApiError> {
        let key = id.trim().to_string();
        let api = self.api.clone();
        let lookup = key.clone();

        self.cache
            .try_get_with(key, async move {
                debug!(teacher_id = %lookup, "Fetching teacher info");
                client::fetch_teacher(&api, &lookup).await
            })
            .await
            .map_err(|err| (*err).clone())
    }

    /// Display name for a teacher, never failing.
    pub async fn display_name(&self, id: &str) -> String {
        match self.get(id).await {
            Ok(info) if !info.full_name().is_empty() => info.full_name(),
            Ok(_) => UNKNOWN_TEACHER.to_string(),
            Err(err) => {
                warn!(teacher_id = %id, "Teacher lookup failed: {err}");
                UNKNOWN_TEACHER.to_string()
            }
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.cache.contains_key(id.trim())
    }

    /// Number of cached teachers after pending maintenance has run.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
