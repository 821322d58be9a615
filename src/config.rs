use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ObError, Result};

/// Default GitHub REST endpoint.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Site origin used until one is configured.
pub const DEFAULT_SITE_URL: &str = "https://example.github.io";

/// Repository directory badge files are committed to.
pub const DEFAULT_BADGES_PATH: &str = "public/badges";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration: defaults, then the global file (or an explicit
    /// file, which replaces it), then `OB_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("OB_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(ObError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(ObError::Config(
                "http.timeout_secs must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the global config file (`~/.config/openbadge/config.toml`).
    pub fn global_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| ObError::MissingConfig("config directory not found".to_string()))?
            .join("openbadge/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let path = Self::global_path()?;
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| ObError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| ObError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.site {
            self.site.merge(patch);
        }
        if let Some(patch) = patch.github {
            self.github.merge(patch);
        }
        if let Some(patch) = patch.publish {
            self.publish.merge(patch);
        }
        if let Some(patch) = patch.http {
            self.http.merge(patch);
        }
        if let Some(patch) = patch.session {
            self.session.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = env("OB_SITE_URL") {
            self.site.url = value;
        }
        if let Some(value) = env("OB_BASE_PATH") {
            self.site.base_path = value;
        }
        if let Some(value) = env("OB_BASE_URL") {
            self.site.base_url = non_empty(value);
        }

        if let Some(value) = env("OB_GITHUB_API_URL") {
            self.github.api_url = value;
        }
        if let Some(value) = env("OB_REPO_OWNER") {
            self.github.owner = non_empty(value);
        }
        if let Some(value) = env("OB_REPO_NAME") {
            self.github.repo = non_empty(value);
        }

        if let Some(value) = env("OB_CLEANUP_ON_FAILURE") {
            self.publish.cleanup_on_failure = parse_bool(&value);
        }
        if let Some(value) = env("OB_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = value.parse::<u64>().map_err(|err| {
                ObError::Config(format!("invalid OB_HTTP_TIMEOUT_SECS value {value}: {err}"))
            })?;
        }
        if let Some(value) = env("OB_SESSION_PATH") {
            self.session.path = non_empty(value).map(PathBuf::from);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin the badge site is served from, e.g. `https://acme.github.io`.
    #[serde(default)]
    pub url: String,
    /// Path prefix of the deployment, e.g. `/badges-site/`.
    #[serde(default)]
    pub base_path: String,
    /// Explicit base for assertion ids; derived from `url` + `base_path` when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SITE_URL.to_string(),
            base_path: "/".to_string(),
            base_url: None,
        }
    }
}

impl SiteConfig {
    fn merge(&mut self, patch: SitePatch) {
        if let Some(value) = patch.url {
            self.url = value;
        }
        if let Some(value) = patch.base_path {
            self.base_path = value;
        }
        if let Some(value) = patch.base_url {
            self.base_url = non_empty(value);
        }
    }

    /// Origin without trailing slash.
    #[must_use]
    pub fn origin(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Base path with exactly one leading and one trailing slash.
    #[must_use]
    pub fn normalized_base_path(&self) -> String {
        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        }
    }

    /// Base URL embedded in assertion ids, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(explicit) => explicit.trim_end_matches('/').to_string(),
            None => format!("{}{}", self.origin(), self.normalized_base_path())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default)]
    pub api_url: String,
    /// Default repository owner used when no selection is stored.
    #[serde(default)]
    pub owner: Option<String>,
    /// Default repository name used when no selection is stored.
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub badges_path: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API.to_string(),
            owner: None,
            repo: None,
            badges_path: DEFAULT_BADGES_PATH.to_string(),
        }
    }
}

impl GitHubConfig {
    fn merge(&mut self, patch: GitHubPatch) {
        if let Some(value) = patch.api_url {
            self.api_url = value;
        }
        if let Some(value) = patch.owner {
            self.owner = non_empty(value);
        }
        if let Some(value) = patch.repo {
            self.repo = non_empty(value);
        }
        if let Some(value) = patch.badges_path {
            self.badges_path = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Delete the working branch when a later workflow step fails.
    #[serde(default)]
    pub cleanup_on_failure: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            cleanup_on_failure: true,
        }
    }
}

impl PublishConfig {
    fn merge(&mut self, patch: PublishPatch) {
        if let Some(value) = patch.cleanup_on_failure {
            self.cleanup_on_failure = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    fn merge(&mut self, patch: HttpPatch) {
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file; defaults to `<config dir>/openbadge/session.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    fn merge(&mut self, patch: SessionPatch) {
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
    }

    /// Resolve the session file location.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        Ok(dirs::config_dir()
            .ok_or_else(|| ObError::MissingConfig("config directory not found".to_string()))?
            .join("openbadge")
            .join("session.json"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub site: Option<SitePatch>,
    pub github: Option<GitHubPatch>,
    pub publish: Option<PublishPatch>,
    pub http: Option<HttpPatch>,
    pub session: Option<SessionPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SitePatch {
    pub url: Option<String>,
    pub base_path: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GitHubPatch {
    pub api_url: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub badges_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PublishPatch {
    pub cleanup_on_failure: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HttpPatch {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SessionPatch {
    pub path: Option<PathBuf>,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
