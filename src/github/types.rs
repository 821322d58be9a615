//! Typed request and response bodies for the GitHub REST endpoints we call.
//!
//! Only the fields openbadge reads are declared; anything else GitHub sends
//! is ignored. A missing required field is a schema error, not a default.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ObError, Result};

/// `owner/repo` pair selecting the repository badges are published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse `owner/repo`, `github.com/owner/repo` or a full GitHub URL.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        for prefix in ["https://github.com/", "http://github.com/", "github.com/"] {
            if let Some(stripped) = input.strip_prefix(prefix) {
                return Self::parse(stripped);
            }
        }

        let invalid = || ObError::ValidationFailed(format!("invalid repo reference: {input}"));

        let mut parts = input.split('/');
        let owner = parts.next().unwrap_or("").trim();
        let repo = parts.next().unwrap_or("").trim();
        if owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }
        if parts.any(|part| !part.trim().is_empty()) {
            return Err(invalid());
        }

        let repo = repo.trim_end_matches(".git");
        if repo.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(owner, repo))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Authenticated user returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub default_branch: String,
}

/// Entry of `GET /user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub full_name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// File metadata from `GET /repos/{o}/{r}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Entry of a directory listing from the contents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub html_url: String,
    pub number: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    pub name: &'a str,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PutContentRequest<'a> {
    pub message: &'a str,
    /// Base64-encoded file body.
    pub content: &'a str,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteContentRequest<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePullRequest<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: &'a str,
    pub body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_repo_forms() {
        let expected = RepoRef::new("acme", "badges");
        for input in [
            "acme/badges",
            "acme/badges.git",
            "github.com/acme/badges",
            "https://github.com/acme/badges",
            "https://github.com/acme/badges/",
            " acme/badges ",
        ] {
            assert_eq!(RepoRef::parse(input).unwrap(), expected, "input {input:?}");
        }
    }

    #[test]
    fn parse_repo_rejects_malformed() {
        for input in ["", "acme", "acme/", "/badges", "acme/badges/extra", "acme/.git"] {
            assert!(RepoRef::parse(input).is_err(), "input {input:?}");
        }
    }

    #[test]
    fn repo_ref_display() {
        assert_eq!(RepoRef::new("acme", "badges").to_string(), "acme/badges");
    }

    #[test]
    fn user_requires_login() {
        let err = serde_json::from_str::<GitHubUser>(r#"{"id": 1, "avatar_url": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn dir_entry_type_field() {
        let entry: DirEntry = serde_json::from_str(
            r#"{"name":"a.json","path":"public/badges/a.json","type":"file","download_url":null}"#,
        )
        .unwrap();
        assert!(entry.is_file());
        assert!(entry.download_url.is_none());
    }

    #[test]
    fn create_ref_serializes_ref_key() {
        let body = serde_json::to_value(CreateRefRequest {
            name: "refs/heads/badge/x-1",
            sha: "abc",
        })
        .unwrap();
        assert_eq!(body["ref"], "refs/heads/badge/x-1");
        assert_eq!(body["sha"], "abc");
    }
}
