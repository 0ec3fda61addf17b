//! GitHub REST implementation of the [`IssueTracker`] contract.
//!
//! Bridges the trait abstraction to the real tracker API for the CLI binary.
//! All lookups use the id-addressed endpoints (`/repositories/{id}/...`) so a
//! repository rename between selection and export cannot break a request.
//!
//! Construct [`GithubTracker`] from the environment (`GITHUB_TOKEN`); all
//! transport and status mapping is encapsulated here, callers only see
//! [`TrackerError`] variants.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::contract::{Issue, IssueComment, IssueTracker, RepositorySummary, User};
use crate::error::TrackerError;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "issues-exporter";

pub struct GithubTracker {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubTracker {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Builds a tracker client from the environment, loading `.env` first.
    ///
    /// An absent `GITHUB_TOKEN` is allowed (anonymous access, heavily
    /// rate-limited) but logged.
    pub fn new_from_env() -> Self {
        dotenvy::dotenv().ok();
        let token = std::env::var("GITHUB_TOKEN").ok();
        match &token {
            Some(_) => info!("Initialized GithubTracker with token from environment"),
            None => warn!("GITHUB_TOKEN not set, tracker requests are unauthenticated"),
        }
        Self::new(token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        context: &str,
    ) -> Result<T, TrackerError> {
        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let rate_limit_exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v.as_bytes() == b"0");
            let message = response.text().await.unwrap_or_default();
            return Err(map_status(
                status.as_u16(),
                rate_limit_exhausted,
                context,
                message,
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| TrackerError::Transport(e.to_string()))
    }
}

/// A 403 only counts as rate limiting when the tracker reports an exhausted
/// quota; any other 403 keeps its own status.
fn map_status(
    status: u16,
    rate_limit_exhausted: bool,
    context: &str,
    message: String,
) -> TrackerError {
    match status {
        401 => TrackerError::Unauthorized,
        404 => TrackerError::NotFound(context.to_string()),
        429 => TrackerError::RateLimited,
        403 if rate_limit_exhausted => TrackerError::RateLimited,
        _ => TrackerError::Api { status, message },
    }
}

#[async_trait]
impl IssueTracker for GithubTracker {
    async fn current_user(&self) -> Result<User, TrackerError> {
        self.get_json(format!("{}/user", self.base_url), "current user")
            .await
    }

    async fn get_issue(
        &self,
        repository_id: i64,
        issue_number: i64,
    ) -> Result<Issue, TrackerError> {
        self.get_json(
            format!(
                "{}/repositories/{}/issues/{}",
                self.base_url, repository_id, issue_number
            ),
            &format!("issue {repository_id}#{issue_number}"),
        )
        .await
    }

    async fn get_comments(
        &self,
        repository_id: i64,
        issue_number: i64,
    ) -> Result<Vec<IssueComment>, TrackerError> {
        self.get_json(
            format!(
                "{}/repositories/{}/issues/{}/comments",
                self.base_url, repository_id, issue_number
            ),
            &format!("comments of {repository_id}#{issue_number}"),
        )
        .await
    }

    async fn get_repository(&self, repository_id: i64) -> Result<RepositorySummary, TrackerError> {
        self.get_json(
            format!("{}/repositories/{}", self.base_url, repository_id),
            &format!("repository {repository_id}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_and_missing_resources_map_to_their_own_variants() {
        assert!(matches!(
            map_status(401, false, "current user", String::new()),
            TrackerError::Unauthorized
        ));
        assert!(matches!(
            map_status(404, false, "issue 1#2", String::new()),
            TrackerError::NotFound(_)
        ));
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        let err = map_status(429, false, "repository 1", String::new());
        assert!(matches!(err, TrackerError::RateLimited));
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn forbidden_with_exhausted_quota_maps_to_rate_limited() {
        let err = map_status(403, true, "repository 1", String::new());
        assert!(matches!(err, TrackerError::RateLimited));
    }

    #[test]
    fn plain_forbidden_keeps_its_status() {
        let err = map_status(403, false, "repository 1", "forbidden".to_string());
        assert!(matches!(err, TrackerError::Api { status: 403, .. }));
        assert_eq!(err.status_code(), 403);
    }
}
