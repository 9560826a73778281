// GitHub API endpoint functions.
// Typed methods for every REST v3 endpoint the aggregates consume.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Commit, Contributor, Event, Languages, Release, Repository, User};

/// GitHub never returns more than this many items per page.
pub const MAX_PER_PAGE: u32 = 100;

fn per_page(n: u32) -> (&'static str, String) {
    ("per_page", n.min(MAX_PER_PAGE).to_string())
}

impl GitHubClient {
    /// Get a repository by `owner/name`.
    pub async fn get_repository(&self, full_name: &str) -> Result<Repository> {
        self.get(&format!("/repos/{}", full_name)).await
    }

    /// Get the most recent commits on the default branch.
    pub async fn get_commits(&self, full_name: &str, limit: u32) -> Result<Vec<Commit>> {
        self.get_with_params(&format!("/repos/{}/commits", full_name), &[per_page(limit)])
            .await
    }

    /// Get contributors ordered by commit count.
    pub async fn get_contributors(&self, full_name: &str, limit: u32) -> Result<Vec<Contributor>> {
        // Empty repositories answer 204 with no body.
        let contributors: Option<Vec<Contributor>> = self
            .get_with_params(
                &format!("/repos/{}/contributors", full_name),
                &[per_page(limit)],
            )
            .await?;
        Ok(contributors.unwrap_or_default())
    }

    /// Get bytes of code per language.
    pub async fn get_languages(&self, full_name: &str) -> Result<Languages> {
        self.get(&format!("/repos/{}/languages", full_name)).await
    }

    /// Get the most recent releases.
    pub async fn get_releases(&self, full_name: &str, limit: u32) -> Result<Vec<Release>> {
        self.get_with_params(&format!("/repos/{}/releases", full_name), &[per_page(limit)])
            .await
    }

    /// Get a user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<User> {
        self.get(&format!("/users/{}", username)).await
    }

    /// Get a user's public repositories, most recently updated first.
    pub async fn get_user_repos(&self, username: &str, limit: u32) -> Result<Vec<Repository>> {
        let params = [
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
            per_page(limit),
        ];
        self.get_with_params(&format!("/users/{}/repos", username), &params)
            .await
    }

    /// Get one page of a user's public events, newest first.
    pub async fn get_user_events(
        &self,
        username: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Event>> {
        let params = [per_page(limit), ("page", page.to_string())];
        self.get_with_params(&format!("/users/{}/events", username), &params)
            .await
    }

    /// Get repositories a user has starred.
    pub async fn get_starred(&self, username: &str, limit: u32) -> Result<Vec<Repository>> {
        self.get_with_params(&format!("/users/{}/starred", username), &[per_page(limit)])
            .await
    }
}
