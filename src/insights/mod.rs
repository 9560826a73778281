// Aggregate operations over the GitHub API.
// `GitHubInsights` owns the client, cache, and clock, and serves each aggregate cache-first.

pub mod activity;
pub mod calendar;
pub mod repo;
pub mod stats;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::{CacheStats, CacheStore, MemoryCache, read_cached, write_cached};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{InsightsError, Result};
use crate::github::{GitHubClient, RateLimitInfo};
use crate::http::{HttpTransport, ReqwestTransport};

pub use activity::{
    ActivityItem, ActivityKind, CommitRecord, IssueRecord, PullRequestRecord, UserActivity,
};
pub use calendar::{ContributionData, ContributionDay, ContributionWeek};
pub use repo::{LanguageShare, RepoData};
pub use stats::Stats;

/// Cached GitHub aggregates for repositories and users.
///
/// Every aggregate is looked up in the cache first. On a miss its sub-requests
/// run concurrently and fail fast: the first error drops the remaining
/// requests and nothing is cached.
pub struct GitHubInsights {
    client: GitHubClient,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    default_username: Option<String>,
}

impl GitHubInsights {
    /// Create an instance talking to api.github.com with an in-memory cache.
    pub fn new(token: &str, default_username: Option<String>) -> Result<Self> {
        Self::from_config(&Config {
            token: token.to_string(),
            default_username,
            ..Config::default()
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.request_timeout)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));

        let insights = Self::with_parts(
            &config.token,
            config.default_username.clone(),
            Arc::new(transport),
            cache,
            clock,
        );
        Ok(insights.with_base_url(&config.api_base_url))
    }

    /// Assemble from explicit collaborators.
    pub fn with_parts(
        token: &str,
        default_username: Option<String>,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let client = GitHubClient::new(token, transport, clock.now());
        let default_username = default_username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Self {
            client,
            cache,
            clock,
            default_username,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    pub fn rate_limit_info(&self) -> RateLimitInfo {
        self.client.rate_limit()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Cache cleared");
    }

    /// The explicit username, else the default one.
    fn resolve_username(&self, username: Option<&str>) -> Result<String> {
        username
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_username.clone())
            .ok_or(InsightsError::MissingUsername)
    }

    /// Serve `key` from the cache, or run `fetch` and cache its result for `ttl`.
    async fn cached_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        operation: &'static str,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = read_cached::<T>(self.cache.as_ref(), key) {
            tracing::debug!(key, "Cache hit");
            return Ok(cached);
        }
        tracing::debug!(key, "Cache miss");

        let data = fetch().await.map_err(|e| {
            tracing::warn!(key, error = %e, "Failed to fetch {}", operation);
            InsightsError::aggregate(operation, e)
        })?;

        write_cached(self.cache.as_ref(), key, &data, ttl)?;
        tracing::info!(key, ttl_secs = ttl.as_secs(), "Fetched {}", operation);
        Ok(data)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::harness;
    use super::*;

    #[test]
    fn test_resolve_username_prefers_explicit() {
        let h = harness(Some("fallback"));
        assert_eq!(h.insights.resolve_username(Some("octo")).unwrap(), "octo");
        assert_eq!(h.insights.resolve_username(None).unwrap(), "fallback");
        assert_eq!(h.insights.resolve_username(Some("  ")).unwrap(), "fallback");
    }

    #[test]
    fn test_resolve_username_requires_one() {
        let h = harness(None);
        assert!(matches!(
            h.insights.resolve_username(None),
            Err(InsightsError::MissingUsername)
        ));
    }

    #[test]
    fn test_introspection_before_any_request() {
        let h = harness(None);
        let info = h.insights.rate_limit_info();
        assert_eq!(info.limit, 5000);
        assert_eq!(info.remaining, 5000);
        assert_eq!(h.insights.cache_stats().size, 0);
    }
}
