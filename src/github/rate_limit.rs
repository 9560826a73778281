// Rate limit tracking.
// Records the remaining quota and reset time reported by the most recent response headers.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::HttpResponse;

/// Hourly quota for authenticated requests.
pub const AUTHENTICATED_LIMIT: u64 = 5000;
/// Hourly quota for anonymous requests.
pub const ANONYMOUS_LIMIT: u64 = 60;

/// Rate limit snapshot for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub remaining: u64,
    pub reset: DateTime<Utc>,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy)]
struct RateLimitState {
    remaining: u64,
    reset_at: DateTime<Utc>,
}

/// Tracks quota from `X-RateLimit-*` headers.
///
/// Purely informational: requests are never delayed or refused based on it.
#[derive(Debug)]
pub struct RateLimitTracker {
    limit: u64,
    state: Mutex<RateLimitState>,
}

impl RateLimitTracker {
    /// Start with a full quota that resets at `now`.
    pub fn new(authenticated: bool, now: DateTime<Utc>) -> Self {
        let limit = if authenticated {
            AUTHENTICATED_LIMIT
        } else {
            ANONYMOUS_LIMIT
        };

        Self {
            limit,
            state: Mutex::new(RateLimitState {
                remaining: limit,
                reset_at: now,
            }),
        }
    }

    pub fn info(&self) -> RateLimitInfo {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        RateLimitInfo {
            remaining: state.remaining,
            reset: state.reset_at,
            limit: self.limit,
        }
    }

    /// Update from response headers. Missing or malformed headers leave state unchanged.
    pub fn update(&self, response: &HttpResponse) {
        let remaining = parse_header::<u64>(response, "x-ratelimit-remaining");
        let reset_at = parse_header::<i64>(response, "x-ratelimit-reset")
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(remaining) = remaining {
            state.remaining = remaining;
        }
        if let Some(reset_at) = reset_at {
            state.reset_at = reset_at;
        }
    }
}

fn parse_header<T: std::str::FromStr>(response: &HttpResponse, name: &str) -> Option<T> {
    let raw = response.header(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(header = name, value = raw, "Unparseable rate limit header");
            None
        }
    }
}
