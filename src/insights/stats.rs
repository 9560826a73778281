// Profile statistics aggregate.
// Rolls up stars, forks, languages, and top/recent repositories from a user's repository list.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{keys, minutes};
use crate::error::Result;
use crate::github::{Repository, User};

use super::GitHubInsights;

pub const STATS_TTL: Duration = minutes(60);

const REPO_LIMIT: u32 = 100;
const TOP_LIMIT: usize = 10;

/// Assumed commits per active repository for [`Stats::estimated_commits`].
pub const COMMITS_PER_REPO_ESTIMATE: u64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub username: String,
    pub profile: User,
    /// Repositories left after dropping archived and disabled ones.
    pub active_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    /// Primary language to number of repositories using it.
    pub languages: BTreeMap<String, u32>,
    /// Most starred first.
    pub top_repositories: Vec<Repository>,
    /// Most recently updated first.
    pub recent_activity: Vec<Repository>,
    /// Rough guess of `active_repos * 15`, not a real commit count. Counting
    /// commits would cost one request per repository.
    pub estimated_commits: u64,
    pub fetched_at: DateTime<Utc>,
}

/// Rollups over a repository list, excluding the profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoSummary {
    pub active_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub languages: BTreeMap<String, u32>,
    pub top_repositories: Vec<Repository>,
    pub recent_activity: Vec<Repository>,
    pub estimated_commits: u64,
}

/// Summarize repositories, ignoring archived and disabled ones.
///
/// Sorting is stable, so ties keep the API's order.
pub fn summarize_repositories(repos: Vec<Repository>) -> RepoSummary {
    let active: Vec<Repository> = repos
        .into_iter()
        .filter(|r| !r.archived && !r.disabled)
        .collect();

    let mut languages: BTreeMap<String, u32> = BTreeMap::new();
    for language in active.iter().filter_map(|r| r.language.as_deref()) {
        *languages.entry(language.to_string()).or_default() += 1;
    }

    let mut top_repositories = active.clone();
    top_repositories.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    top_repositories.truncate(TOP_LIMIT);

    let mut recent_activity = active.clone();
    recent_activity.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent_activity.truncate(TOP_LIMIT);

    RepoSummary {
        active_repos: active.len(),
        total_stars: active.iter().map(|r| r.stargazers_count).sum(),
        total_forks: active.iter().map(|r| r.forks_count).sum(),
        languages,
        top_repositories,
        recent_activity,
        estimated_commits: active.len() as u64 * COMMITS_PER_REPO_ESTIMATE,
    }
}

impl GitHubInsights {
    /// Get profile statistics for `username` (or the default user), cached for an hour.
    pub async fn get_github_stats(&self, username: Option<&str>) -> Result<Stats> {
        let username = self.resolve_username(username)?;
        let key = keys::stats_key(&username);
        self.cached_or_fetch(&key, STATS_TTL, "GitHub stats", || {
            self.fetch_github_stats(&username)
        })
        .await
    }

    async fn fetch_github_stats(&self, username: &str) -> Result<Stats> {
        let (profile, repos) = tokio::try_join!(
            self.client.get_user(username),
            self.client.get_user_repos(username, REPO_LIMIT),
        )?;

        let summary = summarize_repositories(repos);
        Ok(Stats {
            username: username.to_string(),
            profile,
            active_repos: summary.active_repos,
            total_stars: summary.total_stars,
            total_forks: summary.total_forks,
            languages: summary.languages,
            top_repositories: summary.top_repositories,
            recent_activity: summary.recent_activity,
            estimated_commits: summary.estimated_commits,
            fetched_at: self.clock.now(),
        })
    }
}
