//! Land or remove a badge file through a GitHub pull request.
//!
//! Issue: repo metadata, base ref, new branch, file write, pull request.
//! Revoke: repo metadata, file sha, base ref, new branch, file delete, pull
//! request. Each step is one HTTP call and the first failure aborts. Once
//! the working branch exists, a later failure deletes it again unless
//! cleanup is disabled; the caller always sees the original step error.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assertion::Assertion;
use crate::clock::Clock;
use crate::config::DEFAULT_BADGES_PATH;
use crate::error::{ObError, Result};
use crate::github::{ApiError, GitHubClient, RepoRef};
use crate::session::SessionContext;

const FOOTER: &str = "*This PR was automatically generated by OpenBadge Issuer.*";

/// Workflow step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStep {
    Precondition,
    RepoFetch,
    RefFetch,
    FileRead,
    BranchCreate,
    FileWrite,
    PrCreate,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Precondition => "precondition",
            Self::RepoFetch => "repo_fetch",
            Self::RefFetch => "ref_fetch",
            Self::FileRead => "file_read",
            Self::BranchCreate => "branch_create",
            Self::FileWrite => "file_write",
            Self::PrCreate => "pr_create",
        };
        f.write_str(name)
    }
}

/// What went wrong in a remote step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Upstream HTTP status, absent for transport and schema failures.
    pub status: Option<u16>,
    pub message: String,
    /// Working branch left behind in the repository.
    pub orphaned_branch: Option<String>,
    /// Working branch was created and then deleted again.
    pub branch_cleaned: bool,
}

impl StepFailure {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            orphaned_branch: None,
            branch_cleaned: false,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            orphaned_branch: None,
            branch_cleaned: false,
        }
    }
}

impl From<ApiError> for StepFailure {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => Self::status(status, message),
            other => Self::transport(other.to_string()),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message)?,
            None => f.write_str(&self.message)?,
        }
        if let Some(branch) = &self.orphaned_branch {
            write!(f, " (branch {branch} left behind)")?;
        } else if self.branch_cleaned {
            f.write_str(" (working branch deleted)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Cannot publish: {0}")]
    Precondition(String),

    #[error("Failed to fetch repo info: {0}")]
    RepoFetch(StepFailure),

    #[error("Failed to get branch ref: {0}")]
    RefFetch(StepFailure),

    #[error("Failed to read badge file: {0}")]
    FileRead(StepFailure),

    #[error("Failed to create branch: {0}")]
    BranchCreate(StepFailure),

    #[error("Failed to write badge file: {0}")]
    FileWrite(StepFailure),

    #[error("Failed to create PR: {0}")]
    PrCreate(StepFailure),
}

impl PublishError {
    #[must_use]
    pub const fn step(&self) -> PublishStep {
        match self {
            Self::Precondition(_) => PublishStep::Precondition,
            Self::RepoFetch(_) => PublishStep::RepoFetch,
            Self::RefFetch(_) => PublishStep::RefFetch,
            Self::FileRead(_) => PublishStep::FileRead,
            Self::BranchCreate(_) => PublishStep::BranchCreate,
            Self::FileWrite(_) => PublishStep::FileWrite,
            Self::PrCreate(_) => PublishStep::PrCreate,
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&StepFailure> {
        match self {
            Self::Precondition(_) => None,
            Self::RepoFetch(f)
            | Self::RefFetch(f)
            | Self::FileRead(f)
            | Self::BranchCreate(f)
            | Self::FileWrite(f)
            | Self::PrCreate(f) => Some(f),
        }
    }

    pub const fn failure_mut(&mut self) -> Option<&mut StepFailure> {
        match self {
            Self::Precondition(_) => None,
            Self::RepoFetch(f)
            | Self::RefFetch(f)
            | Self::FileRead(f)
            | Self::BranchCreate(f)
            | Self::FileWrite(f)
            | Self::PrCreate(f) => Some(f),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.failure().and_then(|f| f.status)
    }

    /// The file changed between read and write (HTTP 409).
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::FileWrite(f) if f.status == Some(409))
    }
}

/// Result of a successful issue or revoke.
#[derive(Debug, Clone, Serialize)]
pub struct PrOutcome {
    pub pr_url: String,
    pub number: u64,
    pub branch: String,
    pub path: String,
    pub repo: String,
}

/// Names shown in commit messages and pull request text.
#[derive(Debug, Clone)]
pub struct RevokeRequest {
    pub filename: String,
    pub badge_name: String,
    pub recipient_name: String,
}

#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Repository directory holding badge files.
    pub badges_path: String,
    pub cleanup_on_failure: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            badges_path: DEFAULT_BADGES_PATH.to_string(),
            cleanup_on_failure: true,
        }
    }
}

pub struct Publisher<'a> {
    session: &'a SessionContext,
    github: &'a GitHubClient,
    clock: &'a dyn Clock,
    options: PublishOptions,
}

struct Target {
    client: GitHubClient,
    repo: RepoRef,
}

impl<'a> Publisher<'a> {
    pub fn new(
        session: &'a SessionContext,
        github: &'a GitHubClient,
        clock: &'a dyn Clock,
        options: PublishOptions,
    ) -> Self {
        Self {
            session,
            github,
            clock,
            options,
        }
    }

    /// Open a pull request adding `filename` with the assertion's JSON.
    pub fn issue(&self, assertion: &Assertion, filename: &str) -> Result<PrOutcome> {
        let filename = badge_filename(filename)?;
        let badge = assertion.badge.name.as_str();
        let recipient = assertion.recipient_name.as_deref().unwrap_or("recipient");

        let target = self.target()?;
        let content = BASE64.encode(assertion.to_pretty_json()?);
        let path = self.file_path(&filename);

        let repo_info = target
            .client
            .get_repo(&target.repo)
            .map_err(|e| PublishError::RepoFetch(e.into()))?;
        debug!(repo = %target.repo, default_branch = %repo_info.default_branch, "repo fetched");

        let base = target
            .client
            .get_branch_ref(&target.repo, &repo_info.default_branch)
            .map_err(|e| PublishError::RefFetch(e.into()))?;

        let branch = self.branch_name("badge", &filename);
        target
            .client
            .create_branch(&target.repo, &branch, &base.object.sha)
            .map_err(|e| PublishError::BranchCreate(e.into()))?;
        debug!(%branch, base_sha = %base.object.sha, "branch created");

        let message = format!("🏅 Issue badge: {badge} to {recipient}");
        if let Err(err) = target
            .client
            .put_content(&target.repo, &path, &branch, &message, &content)
        {
            return Err(self
                .compensate(&target, &branch, PublishError::FileWrite(err.into()))
                .into());
        }
        debug!(%path, "badge file written");

        let title = format!("🏅 Issue Badge: {badge} to {recipient}");
        let body = pr_body("New Badge Issuance", badge, recipient);
        let pr = match target.client.create_pull(
            &target.repo,
            &title,
            &branch,
            &repo_info.default_branch,
            &body,
        ) {
            Ok(pr) => pr,
            Err(err) => {
                return Err(self
                    .compensate(&target, &branch, PublishError::PrCreate(err.into()))
                    .into());
            }
        };

        info!(repo = %target.repo, pr = pr.number, %branch, "badge issue PR opened");
        Ok(PrOutcome {
            pr_url: pr.html_url,
            number: pr.number,
            branch,
            path,
            repo: target.repo.to_string(),
        })
    }

    /// Open a pull request deleting a published badge file.
    pub fn revoke(&self, request: &RevokeRequest) -> Result<PrOutcome> {
        let filename = badge_filename(&request.filename)?;
        let badge = request.badge_name.trim();
        let recipient = request.recipient_name.trim();

        let target = self.target()?;
        let path = self.file_path(&filename);

        let repo_info = target
            .client
            .get_repo(&target.repo)
            .map_err(|e| PublishError::RepoFetch(e.into()))?;

        let file = target
            .client
            .get_content(&target.repo, &path)
            .map_err(|e| PublishError::FileRead(e.into()))?;
        debug!(%path, sha = %file.sha, "badge file read");

        let base = target
            .client
            .get_branch_ref(&target.repo, &repo_info.default_branch)
            .map_err(|e| PublishError::RefFetch(e.into()))?;

        let branch = self.branch_name("revoke", &filename);
        target
            .client
            .create_branch(&target.repo, &branch, &base.object.sha)
            .map_err(|e| PublishError::BranchCreate(e.into()))?;

        let message = format!("🚫 Revoke badge: {badge} from {recipient}");
        if let Err(err) =
            target
                .client
                .delete_content(&target.repo, &path, &branch, &message, &file.sha)
        {
            return Err(self
                .compensate(&target, &branch, PublishError::FileWrite(err.into()))
                .into());
        }

        let title = format!("🚫 Revoke Badge: {badge} from {recipient}");
        let body = pr_body("Badge Revocation", badge, recipient);
        let pr = match target.client.create_pull(
            &target.repo,
            &title,
            &branch,
            &repo_info.default_branch,
            &body,
        ) {
            Ok(pr) => pr,
            Err(err) => {
                return Err(self
                    .compensate(&target, &branch, PublishError::PrCreate(err.into()))
                    .into());
            }
        };

        info!(repo = %target.repo, pr = pr.number, %branch, "badge revoke PR opened");
        Ok(PrOutcome {
            pr_url: pr.html_url,
            number: pr.number,
            branch,
            path,
            repo: target.repo.to_string(),
        })
    }

    /// Token and repository selection are in place. No network access.
    pub fn check_preconditions(&self) -> Result<()> {
        self.target()?;
        Ok(())
    }

    fn target(&self) -> std::result::Result<Target, PublishError> {
        let token = self.session.token().ok_or_else(|| {
            PublishError::Precondition("not authenticated; run `ob auth login`".to_string())
        })?;
        let repo = self.session.repo().ok_or_else(|| {
            PublishError::Precondition(
                "no repository selected; run `ob repo select <owner/repo>`".to_string(),
            )
        })?;
        Ok(Target {
            client: self.github.with_token(Some(token)),
            repo,
        })
    }

    fn file_path(&self, filename: &str) -> String {
        format!("{}/{filename}", self.options.badges_path.trim_matches('/'))
    }

    fn branch_name(&self, prefix: &str, filename: &str) -> String {
        let stem = filename.strip_suffix(".json").unwrap_or(filename);
        format!("{prefix}/{stem}-{}", self.clock.now().timestamp_millis())
    }

    /// Delete the working branch after a failed later step.
    fn compensate(&self, target: &Target, branch: &str, mut err: PublishError) -> PublishError {
        let cleanup = self.options.cleanup_on_failure;
        let Some(failure) = err.failure_mut() else {
            return err;
        };

        if !cleanup {
            warn!(%branch, "cleanup disabled, leaving working branch");
            failure.orphaned_branch = Some(branch.to_string());
            return err;
        }

        match target.client.delete_branch(&target.repo, branch) {
            Ok(()) => {
                info!(%branch, "deleted working branch after failure");
                failure.branch_cleaned = true;
            }
            Err(cleanup_err) => {
                warn!(%branch, error = %cleanup_err, "could not delete working branch");
                failure.orphaned_branch = Some(branch.to_string());
            }
        }
        err
    }
}

/// Accept `name`, `name.json` or a path/URL ending in either.
pub fn badge_filename(input: &str) -> Result<String> {
    let last = input
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");
    let stem = last.strip_suffix(".json").unwrap_or(last);
    if stem.trim().is_empty() {
        return Err(ObError::ValidationFailed(format!(
            "no badge filename in {input:?}"
        )));
    }
    Ok(format!("{stem}.json"))
}

fn pr_body(heading: &str, badge: &str, recipient: &str) -> String {
    format!(
        "## {heading}\n\n**Badge:** {badge}\n**Recipient:** {recipient}\n\n---\n\n{FOOTER}"
    )
}
