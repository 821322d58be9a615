//! Blocking GitHub REST client.
//!
//! Every remote call the session, publish and reader modules make goes
//! through [`GitHubClient`]. Errors are returned as [`ApiError`] so callers
//! can tell a transport failure from an HTTP status from a malformed body.

pub mod types;

use std::time::Duration;

use reqwest::{StatusCode, Url};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::error::ObError;

pub use types::{
    ContentFile, DirEntry, GitHubUser, GitRef, PullRequest, RepoRef, RepoSummary, Repository,
};
use types::{CreatePullRequest, CreateRefRequest, DeleteContentRequest, PutContentRequest};

const USER_AGENT: &str = "openbadge-cli";
const ACCEPT: &str = "application/vnd.github+json";

/// Hosts that receive the token on downloads besides the API endpoint.
const TRUSTED_HOSTS: [&str; 3] = ["github.com", "api.github.com", "raw.githubusercontent.com"];

/// Failure of a single GitHub request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Schema(String),
}

impl ApiError {
    /// Upstream HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<ApiError> for ObError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status {
                status: 401 | 403, ..
            } => Self::AuthError(err.to_string()),
            ApiError::Schema(message) => Self::Http(format!("unexpected response: {message}")),
            other => Self::Http(other.to_string()),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("build http client: {err}")))?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Same endpoint and HTTP client, different credential.
    #[must_use]
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn get_user(&self) -> ApiResult<GitHubUser> {
        let response = self.get(&self.endpoint("/user"))?;
        parse_json_response(response, "user")
    }

    pub fn list_user_repos(&self) -> ApiResult<Vec<RepoSummary>> {
        let response = self.get(&self.endpoint("/user/repos?per_page=100&sort=updated"))?;
        parse_json_response(response, "repository list")
    }

    pub fn get_repo(&self, repo: &RepoRef) -> ApiResult<Repository> {
        let response = self.get(&self.repo_endpoint(repo, ""))?;
        parse_json_response(response, "repository")
    }

    pub fn get_branch_ref(&self, repo: &RepoRef, branch: &str) -> ApiResult<GitRef> {
        let response = self.get(&self.repo_endpoint(repo, &format!("/git/refs/heads/{branch}")))?;
        parse_json_response(response, "git ref")
    }

    pub fn create_branch(&self, repo: &RepoRef, branch: &str, sha: &str) -> ApiResult<GitRef> {
        let full_ref = format!("refs/heads/{branch}");
        let response = self.post_json(
            &self.repo_endpoint(repo, "/git/refs"),
            &CreateRefRequest {
                name: &full_ref,
                sha,
            },
        )?;
        parse_json_response(response, "create ref")
    }

    pub fn delete_branch(&self, repo: &RepoRef, branch: &str) -> ApiResult<()> {
        let response = self.send(
            self.client
                .delete(self.repo_endpoint(repo, &format!("/git/refs/heads/{branch}"))),
        )?;
        check_status(response).map(drop)
    }

    /// Read file metadata on the default branch.
    pub fn get_content(&self, repo: &RepoRef, path: &str) -> ApiResult<ContentFile> {
        let response = self.get(&self.repo_endpoint(repo, &format!("/contents/{path}")))?;
        parse_json_response(response, "content")
    }

    /// List a directory; `None` when it does not exist.
    pub fn list_dir(&self, repo: &RepoRef, path: &str) -> ApiResult<Option<Vec<DirEntry>>> {
        let response = self.get(&self.repo_endpoint(repo, &format!("/contents/{path}")))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_json_response(response, "directory listing").map(Some)
    }

    pub fn put_content(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
        message: &str,
        content_b64: &str,
    ) -> ApiResult<()> {
        let response = self.send(
            self.client
                .put(self.repo_endpoint(repo, &format!("/contents/{path}")))
                .json(&PutContentRequest {
                    message,
                    content: content_b64,
                    branch,
                    sha: None,
                }),
        )?;
        check_status(response).map(drop)
    }

    pub fn delete_content(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
        message: &str,
        sha: &str,
    ) -> ApiResult<()> {
        let response = self.send(
            self.client
                .delete(self.repo_endpoint(repo, &format!("/contents/{path}")))
                .json(&DeleteContentRequest {
                    message,
                    sha,
                    branch,
                }),
        )?;
        check_status(response).map(drop)
    }

    pub fn create_pull(
        &self,
        repo: &RepoRef,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> ApiResult<PullRequest> {
        let response = self.post_json(
            &self.repo_endpoint(repo, "/pulls"),
            &CreatePullRequest {
                title,
                head,
                base,
                body,
            },
        )?;
        parse_json_response(response, "pull request")
    }

    /// Fetch a JSON document from an arbitrary URL (e.g. a `download_url`).
    ///
    /// The token is only attached when the URL belongs to GitHub or to the
    /// configured API endpoint.
    pub fn download_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let mut request = self.client.get(url).header("User-Agent", USER_AGENT);
        if self.is_trusted_url(url) {
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
        }
        debug!(url, "download");
        let response = request
            .send()
            .map_err(|err| ApiError::Transport(format!("download {url}: {err}")))?;
        parse_json_response(response, url)
    }

    /// Compares parsed origins, so `api.github.com.evil.example` never
    /// matches `api.github.com`.
    fn is_trusted_url(&self, url: &str) -> bool {
        let Ok(target) = Url::parse(url) else {
            return false;
        };

        if let Ok(api) = Url::parse(&self.api_url) {
            let api_path = api.path().trim_end_matches('/');
            if target.scheme() == api.scheme()
                && target.host_str() == api.host_str()
                && target.port_or_known_default() == api.port_or_known_default()
                && (target.path() == api_path
                    || target.path().starts_with(&format!("{api_path}/")))
            {
                return true;
            }
        }

        target.scheme() == "https"
            && target.port_or_known_default() == Some(443)
            && target.host_str().is_some_and(|host| {
                TRUSTED_HOSTS
                    .iter()
                    .any(|trusted| host.eq_ignore_ascii_case(trusted))
            })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn repo_endpoint(&self, repo: &RepoRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{suffix}",
            self.api_url, repo.owner, repo.repo
        )
    }

    fn get(&self, url: &str) -> ApiResult<Response> {
        self.send(self.client.get(url))
    }

    fn post_json<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> ApiResult<Response> {
        self.send(self.client.post(url).json(payload))
    }

    fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let mut request = request
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|err| ApiError::Transport(format!("github request failed: {err}")))?;
        debug!(
            url = %response.url(),
            status = response.status().as_u16(),
            "github response"
        );
        Ok(response)
    }
}

fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

fn parse_json_response<T: DeserializeOwned>(response: Response, context: &str) -> ApiResult<T> {
    let response = check_status(response)?;
    let body = response
        .text()
        .map_err(|err| ApiError::Transport(format!("read {context} response: {err}")))?;
    serde_json::from_str(&body).map_err(|err| ApiError::Schema(format!("{context}: {err}")))
}

/// GitHub error bodies look like `{"message": "...", "documentation_url": ...}`.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
