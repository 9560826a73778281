// GitHub API response types.
// Defines structs for deserializing GitHub REST v3 responses, plus a typed view over event payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Owner type discriminator (user or organization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OwnerType {
    #[default]
    User,
    Organization,
    Bot,
    #[serde(other)]
    Unknown,
}

/// GitHub user or organization as embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
    #[serde(rename = "type", default)]
    pub owner_type: OwnerType,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// Full user profile from `/users/{user}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// GitHub repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub private: bool,
    pub description: Option<String>,
    pub html_url: String,
    /// Primary language as detected by GitHub.
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Name/email/date triple attached to a git commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitSignature {
    pub name: String,
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

/// Git-level commit data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<GitSignature>,
    pub committer: Option<GitSignature>,
}

/// Commit from `/repos/{full_name}/commits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitDetail,
    /// GitHub account of the author, when the email is linked to one.
    pub author: Option<Owner>,
}

/// Contributor from `/repos/{full_name}/contributors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: u64,
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub contributions: u64,
}

/// Release from `/repos/{full_name}/releases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Language name to byte count, from `/repos/{full_name}/languages`.
pub type Languages = BTreeMap<String, u64>;

/// Pull request as carried in a `PullRequestEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub user: Option<Owner>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Issue as carried in an `IssuesEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub user: Option<Owner>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository reference on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRepo {
    pub id: Option<u64>,
    /// `owner/repo`.
    pub name: String,
}

/// Account that triggered an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventActor {
    pub id: u64,
    pub login: String,
}

/// Entry of `/users/{user}/events`.
///
/// The payload is kept raw; [`Event::kind`] decodes it according to `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub actor: Option<EventActor>,
    pub repo: EventRepo,
    #[serde(default)]
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushAuthor {
    pub name: String,
    pub email: String,
}

/// Commit summary inside a push payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushCommit {
    pub sha: String,
    pub message: String,
    pub author: PushAuthor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub action: String,
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuesPayload {
    #[serde(default)]
    pub action: String,
    pub issue: Option<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forkee {
    pub full_name: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForkPayload {
    pub forkee: Option<Forkee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePayload {
    pub ref_type: Option<String>,
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
}

/// Event payload decoded by event type.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Push(PushPayload),
    PullRequest(PullRequestPayload),
    Issues(IssuesPayload),
    Watch,
    Fork(ForkPayload),
    Create(CreatePayload),
    /// Any other event type, or a known type whose payload did not decode.
    Ignored(String),
}

impl Event {
    /// Decode the payload according to the event type.
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "PushEvent" => self.decode(EventKind::Push),
            "PullRequestEvent" => self.decode(EventKind::PullRequest),
            "IssuesEvent" => self.decode(EventKind::Issues),
            "WatchEvent" => EventKind::Watch,
            "ForkEvent" => self.decode(EventKind::Fork),
            "CreateEvent" => self.decode(EventKind::Create),
            other => EventKind::Ignored(other.to_string()),
        }
    }

    /// Number of commits carried by a push event; zero for every other type.
    pub fn push_commit_count(&self) -> usize {
        match self.kind() {
            EventKind::Push(push) => push.commits.len(),
            _ => 0,
        }
    }

    fn decode<P: DeserializeOwned + Default>(&self, wrap: fn(P) -> EventKind) -> EventKind {
        let payload = if self.payload.is_null() {
            Ok(P::default())
        } else {
            P::deserialize(&self.payload)
        };

        match payload {
            Ok(payload) => wrap(payload),
            Err(e) => {
                tracing::warn!(
                    event_id = %self.id,
                    event_type = %self.event_type,
                    error = %e,
                    "Ignoring event with undecodable payload"
                );
                EventKind::Ignored(self.event_type.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, payload: Value) -> Event {
        serde_json::from_value(json!({
            "id": "1",
            "type": event_type,
            "repo": {"id": 9, "name": "octo/demo"},
            "payload": payload,
            "created_at": "2024-06-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_push_event_decodes_commits() {
        let e = event(
            "PushEvent",
            json!({
                "ref": "refs/heads/main",
                "commits": [
                    {"sha": "abc", "message": "one", "author": {"name": "A", "email": "a@x"}},
                    {"sha": "def", "message": "two", "author": {"name": "B", "email": "b@x"}}
                ]
            }),
        );
        match e.kind() {
            EventKind::Push(p) => {
                assert_eq!(p.commits.len(), 2);
                assert_eq!(p.ref_name.as_deref(), Some("refs/heads/main"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        assert_eq!(e.push_commit_count(), 2);
    }

    #[test]
    fn test_push_without_commits_counts_zero() {
        let e = event("PushEvent", json!({"ref": "refs/heads/main"}));
        assert_eq!(e.push_commit_count(), 0);
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let e = event("GollumEvent", json!({"pages": []}));
        assert_eq!(e.kind(), EventKind::Ignored("GollumEvent".to_string()));
        assert_eq!(e.push_commit_count(), 0);
    }

    #[test]
    fn test_bad_payload_is_ignored() {
        let e = event("PushEvent", json!({"commits": "nope"}));
        assert_eq!(e.kind(), EventKind::Ignored("PushEvent".to_string()));
    }

    #[test]
    fn test_watch_and_create() {
        assert_eq!(event("WatchEvent", json!({"action": "started"})).kind(), EventKind::Watch);
        match event("CreateEvent", json!({"ref_type": "branch", "ref": "dev"})).kind() {
            EventKind::Create(c) => {
                assert_eq!(c.ref_type.as_deref(), Some("branch"));
                assert_eq!(c.ref_name.as_deref(), Some("dev"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_repository_defaults() {
        let repo: Repository = serde_json::from_value(json!({
            "id": 1,
            "name": "demo",
            "full_name": "octo/demo",
            "owner": {"id": 2, "login": "octo", "type": "User"},
            "description": null,
            "html_url": "https://github.com/octo/demo",
            "language": null,
            "updated_at": "2024-06-01T10:00:00Z",
            "pushed_at": null
        }))
        .unwrap();
        assert!(!repo.archived);
        assert_eq!(repo.stargazers_count, 0);
        assert_eq!(repo.owner.owner_type, OwnerType::User);
    }
}
