//! Displayed cart counts, keyed per visitor.

use std::time::Duration;

use moka::future::Cache;

use crate::models::SessionToken;

/// Upper bound on tracked visitors.
const MAX_VISITORS: u64 = 10_000;

/// Counts idle for this long are dropped and re-fetched on next display.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// In-memory cart counts for the navigation badge.
///
/// Keyed by [`SessionToken::fingerprint`], so raw tokens never sit in the
/// cache. Nothing here is persisted.
#[derive(Clone)]
pub struct CartCounts {
    cache: Cache<String, u32>,
}

impl CartCounts {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_VISITORS)
                .time_to_idle(IDLE_TIMEOUT)
                .build(),
        }
    }

    /// Last confirmed count for this visitor, if known.
    pub async fn get(&self, token: &SessionToken) -> Option<u32> {
        self.cache.get(&token.fingerprint()).await
    }

    /// Record a server-confirmed count.
    pub async fn set(&self, token: &SessionToken, count: u32) {
        self.cache.insert(token.fingerprint(), count).await;
    }

    /// Forget the visitor's count.
    pub async fn invalidate(&self, token: &SessionToken) {
        self.cache.invalidate(&token.fingerprint()).await;
    }
}

impl Default for CartCounts {
    fn default() -> Self {
        Self::new()
    }
}
