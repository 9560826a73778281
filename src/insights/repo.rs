// Repository aggregate.
// Composes metadata, commits, contributors, languages, and releases for one repository.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{keys, minutes};
use crate::error::Result;
use crate::github::{Commit, Contributor, Languages, Release, Repository};

use super::GitHubInsights;

pub const REPO_TTL: Duration = minutes(60);

const COMMIT_LIMIT: u32 = 100;
const CONTRIBUTOR_LIMIT: u32 = 100;
const RELEASE_LIMIT: u32 = 20;

/// Everything known about one repository, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoData {
    pub repository: Repository,
    pub commits: Vec<Commit>,
    pub contributors: Vec<Contributor>,
    pub languages: Languages,
    pub releases: Vec<Release>,
    pub fetched_at: DateTime<Utc>,
}

/// A language's portion of a repository's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    /// 0.0 to 100.0.
    pub percent: f64,
}

impl RepoData {
    pub fn total_language_bytes(&self) -> u64 {
        self.languages.values().sum()
    }

    /// Languages by share of bytes, largest first.
    pub fn language_shares(&self) -> Vec<LanguageShare> {
        let total = self.total_language_bytes();
        let mut shares: Vec<LanguageShare> = self
            .languages
            .iter()
            .map(|(language, &bytes)| LanguageShare {
                language: language.clone(),
                bytes,
                percent: if total == 0 {
                    0.0
                } else {
                    bytes as f64 * 100.0 / total as f64
                },
            })
            .collect();
        shares.sort_by(|a, b| b.bytes.cmp(&a.bytes));
        shares
    }
}

impl GitHubInsights {
    /// Get composed data for `owner/name`, cached for an hour.
    pub async fn get_repo_data(&self, full_name: &str) -> Result<RepoData> {
        let key = keys::repo_key(full_name);
        self.cached_or_fetch(&key, REPO_TTL, "repository data", || {
            self.fetch_repo_data(full_name)
        })
        .await
    }

    async fn fetch_repo_data(&self, full_name: &str) -> Result<RepoData> {
        let (repository, commits, contributors, languages, releases) = tokio::try_join!(
            self.client.get_repository(full_name),
            self.client.get_commits(full_name, COMMIT_LIMIT),
            self.client.get_contributors(full_name, CONTRIBUTOR_LIMIT),
            self.client.get_languages(full_name),
            self.client.get_releases(full_name, RELEASE_LIMIT),
        )?;

        Ok(RepoData {
            repository,
            commits,
            contributors,
            languages,
            releases,
            fetched_at: self.clock.now(),
        })
    }
}
