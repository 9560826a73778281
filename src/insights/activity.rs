// User activity aggregate.
// Classifies a user's public event stream into commits, pull requests, issues, and a feed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{keys, minutes};
use crate::error::Result;
use crate::github::{Event, EventKind, Repository};

use super::GitHubInsights;

pub const ACTIVITY_TTL: Duration = minutes(30);

const EVENT_LIMIT: u32 = 100;
const STARRED_LIMIT: u32 = 50;
/// Commits taken from a single push.
const COMMITS_PER_PUSH: usize = 3;
const RECORD_LIMIT: usize = 20;
const FEED_LIMIT: usize = 50;

/// Kind of an activity feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Commit,
    Pr,
    Issue,
    Star,
    Fork,
    Create,
}

/// One line of a user's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub date: DateTime<Utc>,
    /// `owner/repo`.
    pub repository: String,
    pub title: String,
    pub url: String,
    pub details: Option<String>,
}

/// A commit taken from a push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub html_url: String,
    pub repository: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    /// Event action, e.g. "opened" or "closed".
    pub action: String,
    pub html_url: String,
    pub owner: String,
    /// Bare repository name, without the owner.
    pub repository: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub action: String,
    pub html_url: String,
    pub owner: String,
    /// Bare repository name, without the owner.
    pub repository: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Classified recent activity of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    pub username: String,
    pub recent_commits: Vec<CommitRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
    pub issues: Vec<IssueRecord>,
    pub starred_repos: Vec<Repository>,
    pub activity_feed: Vec<ActivityItem>,
    pub fetched_at: DateTime<Utc>,
}

/// Output of [`classify_events`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedEvents {
    pub recent_commits: Vec<CommitRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
    pub issues: Vec<IssueRecord>,
    pub activity_feed: Vec<ActivityItem>,
}

/// Classify events in stream order, then keep the first 20 records of each
/// kind and the first 50 feed items.
pub fn classify_events(events: &[Event]) -> ClassifiedEvents {
    let mut out = ClassifiedEvents::default();

    for event in events {
        let repo = event.repo.name.as_str();
        let item = |kind: ActivityKind, title: String, url: String, details: Option<String>| {
            ActivityItem {
                kind,
                date: event.created_at,
                repository: repo.to_string(),
                title,
                url,
                details,
            }
        };

        match event.kind() {
            EventKind::Push(push) => {
                for commit in push.commits.iter().take(COMMITS_PER_PUSH) {
                    out.recent_commits.push(CommitRecord {
                        sha: commit.sha.clone(),
                        message: commit.message.clone(),
                        author_name: commit.author.name.clone(),
                        author_email: commit.author.email.clone(),
                        html_url: format!("{}/commit/{}", repo_url(repo), commit.sha),
                        repository: repo.to_string(),
                        date: event.created_at,
                    });
                }
                out.activity_feed.push(item(
                    ActivityKind::Commit,
                    format!("Pushed to {}", repo),
                    repo_url(repo),
                    Some(commit_count(push.commits.len())),
                ));
            }
            EventKind::PullRequest(payload) => {
                if let Some(pr) = payload.pull_request {
                    let (owner, name) = split_full_name(repo);
                    out.activity_feed.push(item(
                        ActivityKind::Pr,
                        format!("{} pull request in {}", payload.action, repo),
                        pr.html_url.clone(),
                        Some(pr.title.clone()),
                    ));
                    out.pull_requests.push(PullRequestRecord {
                        id: pr.id,
                        number: pr.number,
                        title: pr.title,
                        state: pr.state,
                        action: payload.action,
                        html_url: pr.html_url,
                        owner: owner.to_string(),
                        repository: name.to_string(),
                        created_at: pr.created_at,
                        updated_at: pr.updated_at,
                        merged_at: pr.merged_at,
                    });
                }
            }
            EventKind::Issues(payload) => {
                if let Some(issue) = payload.issue {
                    let (owner, name) = split_full_name(repo);
                    out.activity_feed.push(item(
                        ActivityKind::Issue,
                        format!("{} issue in {}", payload.action, repo),
                        issue.html_url.clone(),
                        Some(issue.title.clone()),
                    ));
                    out.issues.push(IssueRecord {
                        id: issue.id,
                        number: issue.number,
                        title: issue.title,
                        state: issue.state,
                        action: payload.action,
                        html_url: issue.html_url,
                        owner: owner.to_string(),
                        repository: name.to_string(),
                        created_at: issue.created_at,
                        updated_at: issue.updated_at,
                    });
                }
            }
            EventKind::Watch => {
                out.activity_feed.push(item(
                    ActivityKind::Star,
                    format!("Starred {}", repo),
                    repo_url(repo),
                    None,
                ));
            }
            EventKind::Fork(payload) => {
                let (url, details) = match payload.forkee {
                    Some(forkee) => (forkee.html_url, Some(forkee.full_name)),
                    None => (repo_url(repo), None),
                };
                out.activity_feed.push(item(
                    ActivityKind::Fork,
                    format!("Forked {}", repo),
                    url,
                    details,
                ));
            }
            EventKind::Create(payload) => {
                let ref_type = payload.ref_type.as_deref().unwrap_or("repository");
                out.activity_feed.push(item(
                    ActivityKind::Create,
                    format!("Created {} in {}", ref_type, repo),
                    repo_url(repo),
                    payload.ref_name,
                ));
            }
            EventKind::Ignored(_) => {}
        }
    }

    out.recent_commits.truncate(RECORD_LIMIT);
    out.pull_requests.truncate(RECORD_LIMIT);
    out.issues.truncate(RECORD_LIMIT);
    out.activity_feed.truncate(FEED_LIMIT);
    out
}

fn repo_url(full_name: &str) -> String {
    format!("https://github.com/{}", full_name)
}

/// Split `owner/repo`; a name without a slash is all repo.
fn split_full_name(full_name: &str) -> (&str, &str) {
    full_name.split_once('/').unwrap_or(("", full_name))
}

fn commit_count(n: usize) -> String {
    if n == 1 {
        "1 commit".to_string()
    } else {
        format!("{} commits", n)
    }
}

impl GitHubInsights {
    /// Get recent activity for `username` (or the default user), cached for 30 minutes.
    pub async fn get_user_activity(&self, username: Option<&str>) -> Result<UserActivity> {
        let username = self.resolve_username(username)?;
        let key = keys::activity_key(&username);
        self.cached_or_fetch(&key, ACTIVITY_TTL, "user activity", || {
            self.fetch_user_activity(&username)
        })
        .await
    }

    async fn fetch_user_activity(&self, username: &str) -> Result<UserActivity> {
        let (events, starred_repos) = tokio::try_join!(
            self.client.get_user_events(username, 1, EVENT_LIMIT),
            self.client.get_starred(username, STARRED_LIMIT),
        )?;

        let classified = classify_events(&events);
        Ok(UserActivity {
            username: username.to_string(),
            recent_commits: classified.recent_commits,
            pull_requests: classified.pull_requests,
            issues: classified.issues,
            starred_repos,
            activity_feed: classified.activity_feed,
            fetched_at: self.clock.now(),
        })
    }
}
