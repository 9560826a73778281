//! Cached GitHub REST aggregates.
//!
//! [`GitHubInsights`] exposes four aggregate operations, each served from an
//! in-memory TTL cache when possible:
//!
//! - [`GitHubInsights::get_repo_data`]: metadata, commits, contributors, languages, releases.
//! - [`GitHubInsights::get_user_activity`]: classified recent public events and stars.
//! - [`GitHubInsights::get_contribution_data`]: a 365-day contribution calendar with streaks.
//! - [`GitHubInsights::get_github_stats`]: star/fork/language rollups over a user's repositories.
//!
//! ```no_run
//! # async fn run() -> octopulse::Result<()> {
//! let insights = octopulse::GitHubInsights::new("ghp_token", Some("octocat".to_string()))?;
//! let calendar = insights.get_contribution_data(None).await?;
//! println!("{} contributions", calendar.total_contributions);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod github;
pub mod http;
pub mod insights;

pub use cache::{CacheStats, CacheStore, MemoryCache};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{InsightsError, Result};
pub use github::RateLimitInfo;
pub use http::{HttpTransport, ReqwestTransport};
pub use insights::{
    ActivityItem, ActivityKind, ContributionData, ContributionDay, ContributionWeek,
    GitHubInsights, RepoData, Stats, UserActivity,
};
