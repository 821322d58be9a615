//! Per-invocation application state shared by every command.

use std::time::Duration;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::github::{GitHubClient, RepoRef};
use crate::publish::{PublishOptions, Publisher};
use crate::reader::BadgeReader;
use crate::session::{FileStore, SessionContext, SessionStore};

pub struct AppContext {
    pub config: Config,
    pub session: SessionContext,
    pub github: GitHubClient,
    pub clock: Box<dyn Clock>,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let session_path = config.session.resolved_path()?;
        debug!(path = %session_path.display(), "using session file");
        let mut ctx = Self::with_store(config, FileStore::new(session_path), cli.output_format())?;
        ctx.verbosity = cli.verbose;
        Ok(ctx)
    }

    /// Build a context over an arbitrary session backend.
    pub fn with_store(
        config: Config,
        store: impl SessionStore + 'static,
        output_format: OutputFormat,
    ) -> Result<Self> {
        let session = SessionContext::new(store).with_default_repo(configured_repo(&config));
        let github = GitHubClient::new(
            config.github.api_url.clone(),
            None,
            Duration::from_secs(config.http.timeout_secs),
        )?;
        Ok(Self {
            config,
            session,
            github,
            clock: Box::new(SystemClock),
            output_format,
            verbosity: 0,
        })
    }

    /// Base URL embedded in assertion ids.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.config.site.base_url()
    }

    pub fn reader(&self) -> Result<BadgeReader> {
        BadgeReader::new(
            self.config.site.clone(),
            Duration::from_secs(self.config.http.timeout_secs),
        )
    }

    #[must_use]
    pub fn publisher(&self) -> Publisher<'_> {
        Publisher::new(
            &self.session,
            &self.github,
            self.clock.as_ref(),
            PublishOptions {
                badges_path: self.config.github.badges_path.clone(),
                cleanup_on_failure: self.config.publish.cleanup_on_failure,
            },
        )
    }

    /// GitHub client carrying the stored token, if any.
    #[must_use]
    pub fn authed_github(&self) -> GitHubClient {
        self.github.with_token(self.session.token())
    }
}

fn configured_repo(config: &Config) -> Option<RepoRef> {
    match (&config.github.owner, &config.github.repo) {
        (Some(owner), Some(repo)) => Some(RepoRef::new(owner.clone(), repo.clone())),
        _ => None,
    }
}
