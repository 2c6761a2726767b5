pub mod types;

pub use types::{Commit, Repository};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;

const USER_AGENT: &str = "patchfinder";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

impl GitHubError {
    /// Transport failures, server errors and rate limiting may succeed on
    /// a later attempt. Everything else is final.
    fn is_retryable(&self) -> bool {
        match self {
            GitHubError::Request(_) => true,
            GitHubError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// The three upstream calls the collector depends on.
/// Any service honoring these endpoints (including a mock) can stand in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /users/{username}/repos`
    async fn list_repositories(&self, username: &str) -> Result<Vec<Repository>, GitHubError>;

    /// `GET /repos/{owner}/{repo}/commits`
    async fn list_commits(&self, owner: &str, repo: &str) -> Result<Vec<Commit>, GitHubError>;

    /// `GET {commit_url}.patch`, returning the raw patch text.
    async fn fetch_patch(&self, commit_url: &str) -> Result<String, GitHubError>;
}

/// reqwest-backed GitHub client. Built once per run; every request
/// carries the auth and versioning headers and is retried on
/// transient failures.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GitHubClient {
    pub fn new(token: &str, config: &Config) -> Result<Self, GitHubError> {
        let api_url = Url::parse(&config.github.api_url)
            .map_err(|_| GitHubError::InvalidUrl(config.github.api_url.clone()))?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(config.github.api_url.clone()));
        }

        let http = reqwest::Client::builder()
            .default_headers(default_headers(token)?)
            .user_agent(USER_AGENT)
            .timeout(config.http.timeout())
            .connect_timeout(config.http.connect_timeout())
            .build()?;

        Ok(Self {
            http,
            api_url,
            max_retries: config.http.max_retries,
            retry_backoff: config.http.retry_backoff(),
        })
    }

    /// Append path segments to the API base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GitHubError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET, retrying retryable failures with exponential backoff.
    /// Returns the last error once `max_retries` extra attempts are spent.
    async fn get(&self, url: &Url) -> Result<reqwest::Response, GitHubError> {
        let mut attempt = 0;
        loop {
            let error = match self.http.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => GitHubError::Status {
                    url: url.to_string(),
                    status: response.status(),
                },
                Err(e) => GitHubError::Request(e),
            };

            if attempt >= self.max_retries || !error.is_retryable() {
                return Err(error);
            }

            let delay = backoff_delay(self.retry_backoff, attempt);
            attempt += 1;
            warn!(%url, attempt, delay_ms = delay.as_millis() as u64, %error, "request failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, GitHubError> {
        let body = self.get(url).await?.text().await?;
        serde_json::from_str(&body).map_err(|source| GitHubError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self))]
    async fn list_repositories(&self, username: &str) -> Result<Vec<Repository>, GitHubError> {
        let url = self.endpoint(&["users", username, "repos"])?;
        debug!(%url, "listing public repositories");
        let repos: Vec<Repository> = self.get_json(&url).await?;
        debug!(count = repos.len(), "received repositories");
        Ok(repos)
    }

    #[instrument(skip(self))]
    async fn list_commits(&self, owner: &str, repo: &str) -> Result<Vec<Commit>, GitHubError> {
        let url = self.endpoint(&["repos", owner, repo, "commits"])?;
        debug!(%url, "listing commits");
        let commits: Vec<Commit> = self.get_json(&url).await?;
        debug!(count = commits.len(), "received commits");
        Ok(commits)
    }

    #[instrument(skip(self))]
    async fn fetch_patch(&self, commit_url: &str) -> Result<String, GitHubError> {
        let url = patch_url(commit_url)?;
        let text = self.get(&url).await?.text().await?;
        debug!(patch_bytes = text.len(), "received patch");
        Ok(text)
    }
}

fn default_headers(token: &str) -> Result<HeaderMap, GitHubError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| GitHubError::InvalidToken)?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

fn patch_url(commit_url: &str) -> Result<Url, GitHubError> {
    let raw = format!("{}.patch", commit_url);
    Url::parse(&raw).map_err(|_| GitHubError::InvalidUrl(raw))
}

/// `base * 2^attempt`, capped.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}
