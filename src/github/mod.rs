// GitHub API module.
// Provides the REST client, rate limit tracking, and response types.

pub mod client;
pub mod endpoints;
pub mod rate_limit;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use rate_limit::{RateLimitInfo, RateLimitTracker};
pub use types::*;
