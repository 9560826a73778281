// GitHub API HTTP client.
// Handles authentication headers, rate limit tracking, and status/JSON processing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::{InsightsError, Result};
use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport};

use super::rate_limit::{RateLimitInfo, RateLimitTracker};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "octopulse";

/// GitHub API client with authentication and rate limit tracking.
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    headers: HttpHeaders,
    rate_limit: RateLimitTracker,
}

impl GitHubClient {
    /// Create a client that sends requests through `transport`.
    ///
    /// An empty token produces anonymous requests (no `Authorization` header).
    pub fn new(token: &str, transport: Arc<dyn HttpTransport>, now: DateTime<Utc>) -> Self {
        let token = token.trim();
        let mut headers: HttpHeaders = vec![
            ("Accept".to_string(), GITHUB_MEDIA_TYPE.to_string()),
            (
                "X-GitHub-Api-Version".to_string(),
                GITHUB_API_VERSION.to_string(),
            ),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if !token.is_empty() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        Self {
            transport,
            base_url: GITHUB_API_BASE.to_string(),
            headers,
            rate_limit: RateLimitTracker::new(!token.is_empty(), now),
        }
    }

    /// Point the client at a different API root (GitHub Enterprise, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> RateLimitInfo {
        self.rate_limit.info()
    }

    /// Make a GET request to the GitHub API and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.get_with_params(endpoint, &[]).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(endpoint, params)?;
        let response = self.send(url).await?;
        let body: &[u8] = if response.body.is_empty() {
            b"null"
        } else {
            &response.body
        };
        let data = serde_json::from_slice(body)?;
        Ok(data)
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String> {
        let raw = format!("{}{}", self.base_url, endpoint);
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| InsightsError::Other(format!("Invalid URL {}: {}", raw, e)))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.into())
    }

    async fn send(&self, url: String) -> Result<HttpResponse> {
        let mut request = HttpRequest::get(url);
        request.headers = self.headers.clone();

        tracing::debug!(url = %request.url, "GitHub request");
        let response = self.transport.send(request).await?;

        self.rate_limit.update(&response);
        check_response(response)
    }
}

/// Convert non-2xx responses into API errors.
fn check_response(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(InsightsError::Api {
            status: response.status,
            status_text: response.status_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use chrono::TimeZone;
    use serde_json::json;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_attaches_headers() {
        let transport = MockTransport::new();
        transport.respond_json("/users/octo", json!({"login": "octo"}));
        let client = GitHubClient::new("secret", Arc::new(transport.clone()), start());

        let _: serde_json::Value = client.get("/users/octo").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.url, "https://api.github.com/users/octo");
        assert_eq!(req.header("authorization"), Some("Bearer secret"));
        assert_eq!(req.header("accept"), Some("application/vnd.github.v3+json"));
        assert_eq!(req.header("user-agent"), Some("octopulse"));
    }

    #[tokio::test]
    async fn test_anonymous_client_sends_no_authorization() {
        let transport = MockTransport::new();
        transport.respond_json("/users/octo", json!({}));
        let client = GitHubClient::new("", Arc::new(transport.clone()), start());

        let _: serde_json::Value = client.get("/users/octo").await.unwrap();

        assert_eq!(transport.requests()[0].header("authorization"), None);
        assert_eq!(client.rate_limit().limit, 60);
    }

    #[tokio::test]
    async fn test_query_params_are_encoded() {
        let transport = MockTransport::new();
        transport.respond_json("/api/v3/users/octo/repos", json!([]));
        let client = GitHubClient::new("t", Arc::new(transport.clone()), start())
            .with_base_url("https://ghe.example.com/api/v3/");

        let _: Vec<serde_json::Value> = client
            .get_with_params(
                "/users/octo/repos",
                &[("sort", "updated".to_string()), ("per_page", "100".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].url,
            "https://ghe.example.com/api/v3/users/octo/repos?sort=updated&per_page=100"
        );
    }

    #[tokio::test]
    async fn test_error_status_still_updates_rate_limit() {
        let transport = MockTransport::new();
        transport.respond(
            "/repos/octo/missing",
            HttpResponse {
                status: 404,
                status_text: "Not Found".to_string(),
                headers: vec![
                    ("X-RateLimit-Remaining".to_string(), "41".to_string()),
                    ("X-RateLimit-Reset".to_string(), "1717250000".to_string()),
                ],
                body: Vec::new(),
            },
        );
        let client = GitHubClient::new("t", Arc::new(transport), start());

        let err = client
            .get::<serde_json::Value>("/repos/octo/missing")
            .await
            .unwrap_err();

        match err {
            InsightsError::Api {
                status,
                status_text,
            } => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.rate_limit().remaining, 41);
        assert_eq!(client.rate_limit().reset.timestamp(), 1717250000);
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let transport = MockTransport::new();
        transport.respond(
            "/users/octo",
            HttpResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: Vec::new(),
                body: b"<html>".to_vec(),
            },
        );
        let client = GitHubClient::new("t", Arc::new(transport), start());

        let err = client.get::<serde_json::Value>("/users/octo").await.unwrap_err();
        assert!(matches!(err, InsightsError::Json(_)));
    }
}
