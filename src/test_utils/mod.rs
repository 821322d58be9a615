//! Shared test helpers for openbadge.

pub mod fixtures;

use std::time::Duration;

use httpmock::MockServer;

use crate::config::SiteConfig;
use crate::github::GitHubClient;
use crate::session::{MemoryStore, SessionContext};

/// Site config pointing at a mock server with the given base path.
pub fn site_for(server: &MockServer, base_path: &str) -> SiteConfig {
    SiteConfig {
        url: server.base_url(),
        base_path: base_path.to_string(),
        base_url: None,
    }
}

pub fn github_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(server.base_url(), None, Duration::from_secs(5))
        .unwrap_or_else(|err| panic!("build client: {err}"))
}

/// In-memory session with a token and `acme/badges` selected.
pub fn authed_session() -> SessionContext {
    let session = SessionContext::new(MemoryStore::new());
    session.set_token("tok").unwrap_or_else(|err| panic!("{err}"));
    session
        .set_repo("acme", "badges")
        .unwrap_or_else(|err| panic!("{err}"));
    session
}
