//! Stored GitHub credential, cached profile and repository selection.
//!
//! Values are read from the [`SessionStore`] at call time; nothing is cached
//! in memory, so two commands in a row always see each other's writes.

pub mod storage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ObError, Result};
use crate::github::{GitHubClient, GitHubUser, RepoRef};

pub use storage::{FileStore, MemoryStore, SessionStore};

pub const TOKEN_KEY: &str = "github_personal_access_token";
pub const USER_KEY: &str = "github_user";
pub const REPO_KEY: &str = "github_repo_config";

pub struct SessionContext {
    store: Box<dyn SessionStore>,
    default_repo: Option<RepoRef>,
}

impl SessionContext {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            default_repo: None,
        }
    }

    /// Repository used when no selection has been stored.
    #[must_use]
    pub fn with_default_repo(mut self, repo: Option<RepoRef>) -> Self {
        self.default_repo = repo;
        self
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    /// Stored token, if any. Blank values count as absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read stored token");
                None
            }
        }
    }

    pub fn clear_token(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.has_token()
    }

    /// Check a token against `GET /user`.
    ///
    /// Any failure, including transport errors, yields `None`.
    #[must_use]
    pub fn validate(&self, github: &GitHubClient, token: &str) -> Option<GitHubUser> {
        match github.with_token(Some(token.to_string())).get_user() {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(error = %err, "token validation failed");
                None
            }
        }
    }

    /// Validate, then store the token and profile.
    pub fn login(&self, github: &GitHubClient, token: &str) -> Result<GitHubUser> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ObError::ValidationFailed("token must not be empty".to_string()));
        }
        let user = self.validate(github, token).ok_or_else(|| {
            ObError::AuthError("GitHub rejected the token or could not be reached".to_string())
        })?;
        self.set_token(token)?;
        self.set_user(&user)?;
        debug!(login = %user.login, "logged in");
        Ok(user)
    }

    #[must_use]
    pub fn user(&self) -> Option<GitHubUser> {
        self.get_json(USER_KEY)
    }

    pub fn set_user(&self, user: &GitHubUser) -> Result<()> {
        self.set_json(USER_KEY, user)
    }

    /// Stored repository selection, else the configured default.
    #[must_use]
    pub fn repo(&self) -> Option<RepoRef> {
        self.get_json(REPO_KEY).or_else(|| self.default_repo.clone())
    }

    /// True when the selection comes from the store rather than config.
    #[must_use]
    pub fn has_stored_repo(&self) -> bool {
        self.get_json::<RepoRef>(REPO_KEY).is_some()
    }

    pub fn set_repo(&self, owner: &str, repo: &str) -> Result<()> {
        self.set_json(REPO_KEY, &RepoRef::new(owner, repo))
    }

    /// Remove token, profile and repository selection.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        self.store.remove(REPO_KEY)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "could not read session value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "ignoring unreadable session value");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)
    }
}
