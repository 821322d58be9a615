//! Read published badges back from the site or the repository.
//!
//! Single badges resolve `<site><basePath>badges/<id>.json`, then the
//! unprefixed `<site>/badges/<id>.json`. Listings prefer the
//! `badge-list.json` manifest and fall back to scraping a directory index.
//! Per-file fetches inside a listing run in parallel; a file that fails to
//! load is dropped from the result.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use rayon::prelude::*;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::assertion::Assertion;
use crate::config::SiteConfig;
use crate::error::{ObError, Result};
use crate::github::GitHubClient;
use crate::session::SessionContext;

/// Optional manifest enumerating badge filenames.
pub const MANIFEST_NAME: &str = "badge-list.json";

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap_or_else(|err| panic!("{err}"))
});

#[derive(Debug, Clone, Serialize)]
pub struct FetchedBadge {
    pub assertion: Assertion,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListedBadge {
    pub filename: String,
    pub assertion: Assertion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Manifest,
    DirectoryIndex,
    /// Neither a manifest nor a directory index could be read.
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteListing {
    pub source: ListingSource,
    pub badges: Vec<ListedBadge>,
}

enum Fetch {
    Found(Value),
    /// Served, but the body is not JSON.
    NotJson(String),
    Missing(u16),
    Failed(String),
}

pub struct BadgeReader {
    http: Client,
    site: SiteConfig,
}

impl BadgeReader {
    pub fn new(site: SiteConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("openbadge-cli")
            .build()
            .map_err(|err| ObError::Http(format!("build http client: {err}")))?;
        Ok(Self { http, site })
    }

    /// `<site><basePath>badges/`
    #[must_use]
    pub fn badges_url(&self) -> String {
        format!(
            "{}{}badges/",
            self.site.origin(),
            self.site.normalized_base_path()
        )
    }

    /// Fetch one badge by id, filename or absolute URL.
    pub fn fetch_badge(&self, id_or_url: &str) -> Result<FetchedBadge> {
        let input = id_or_url.trim();
        let candidates = if is_absolute_url(input) {
            vec![input.to_string()]
        } else {
            let id = input.strip_suffix(".json").unwrap_or(input);
            if id.is_empty() || id.contains('/') {
                return Err(ObError::ValidationFailed(format!("invalid badge id: {input:?}")));
            }
            let file = format!("{}.json", urlencoding::encode(id));
            let primary = format!("{}{file}", self.badges_url());
            let fallback = format!("{}/badges/{file}", self.site.origin());
            if primary == fallback {
                vec![primary]
            } else {
                vec![primary, fallback]
            }
        };

        let mut transport_errors = Vec::new();
        for url in &candidates {
            match self.fetch_json(url) {
                Fetch::Found(value) => {
                    let assertion = Assertion::from_value(value).map_err(|reason| {
                        ObError::InvalidBadge {
                            source_url: url.clone(),
                            reason,
                        }
                    })?;
                    return Ok(FetchedBadge {
                        assertion,
                        source_url: url.clone(),
                    });
                }
                Fetch::NotJson(reason) => {
                    return Err(ObError::InvalidBadge {
                        source_url: url.clone(),
                        reason,
                    });
                }
                Fetch::Missing(status) => debug!(%url, status, "badge not at this location"),
                Fetch::Failed(err) => {
                    debug!(%url, error = %err, "badge fetch failed");
                    transport_errors.push(err);
                }
            }
        }

        if transport_errors.len() == candidates.len() {
            return Err(ObError::Http(transport_errors.join("; ")));
        }
        Err(ObError::NotFound(id_or_url.trim().to_string()))
    }

    /// List badges published on the site.
    pub fn list_site_badges(&self) -> Result<SiteListing> {
        let base = self.badges_url();

        let (source, names) = if let Some(names) = self.read_manifest(&base) {
            (ListingSource::Manifest, names)
        } else if let Some(names) = self.read_directory_index(&base) {
            (ListingSource::DirectoryIndex, names)
        } else {
            warn!(url = %base, "no badge manifest or directory index available");
            return Ok(SiteListing {
                source: ListingSource::Unavailable,
                badges: Vec::new(),
            });
        };
        debug!(?source, count = names.len(), "badge listing resolved");

        let badges = names
            .par_iter()
            .map(|name| self.fetch_listed(&base, name))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        Ok(SiteListing { source, badges })
    }

    fn read_manifest(&self, base: &str) -> Option<Vec<String>> {
        let url = format!("{base}{MANIFEST_NAME}");
        let Fetch::Found(value) = self.fetch_json(&url) else {
            return None;
        };
        match serde_json::from_value::<Vec<String>>(value) {
            Ok(names) => Some(
                names
                    .into_iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect(),
            ),
            Err(err) => {
                warn!(%url, error = %err, "ignoring unreadable badge manifest");
                None
            }
        }
    }

    fn read_directory_index(&self, base: &str) -> Option<Vec<String>> {
        let response = match self.http.get(base).send() {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(url = %base, status = response.status().as_u16(), "no directory index");
                return None;
            }
            Err(err) => {
                debug!(url = %base, error = %err, "directory index fetch failed");
                return None;
            }
        };
        let html = response.text().ok()?;
        Some(extract_json_links(&html))
    }

    fn fetch_listed(&self, base: &str, name: &str) -> Option<ListedBadge> {
        let url = format!("{base}{}", urlencoding::encode(name));
        match self.fetch_json(&url) {
            Fetch::Found(value) => match Assertion::from_value(value) {
                Ok(assertion) => Some(ListedBadge {
                    filename: name.to_string(),
                    assertion,
                }),
                Err(reason) => {
                    warn!(%url, %reason, "dropping invalid badge");
                    None
                }
            },
            Fetch::NotJson(reason) => {
                warn!(%url, %reason, "dropping non-JSON badge file");
                None
            }
            Fetch::Missing(status) => {
                warn!(%url, status, "dropping missing badge");
                None
            }
            Fetch::Failed(err) => {
                warn!(%url, error = %err, "dropping unreachable badge");
                None
            }
        }
    }

    fn fetch_json(&self, url: &str) -> Fetch {
        let response = match self.http.get(url).send() {
            Ok(response) => response,
            Err(err) => return Fetch::Failed(err.to_string()),
        };
        let status = response.status();
        if !status.is_success() {
            return Fetch::Missing(status.as_u16());
        }
        match response.text() {
            Ok(body) => match serde_json::from_str(&body) {
                Ok(value) => Fetch::Found(value),
                Err(err) => Fetch::NotJson(err.to_string()),
            },
            Err(err) => Fetch::Failed(err.to_string()),
        }
    }
}

/// List badge files committed to the selected repository.
///
/// A missing badges directory is an empty result. The stored token is sent
/// when present so private repositories can be listed.
pub fn list_repo_badges(
    session: &SessionContext,
    github: &GitHubClient,
    badges_path: &str,
) -> Result<Vec<ListedBadge>> {
    let repo = session.repo().ok_or_else(|| {
        ObError::MissingConfig("repository selection (github.owner / github.repo)".to_string())
    })?;
    let client = github.with_token(session.token());
    let path = badges_path.trim_matches('/');

    let Some(entries) = client.list_dir(&repo, path)? else {
        debug!(%repo, %path, "badges directory does not exist");
        return Ok(Vec::new());
    };

    let files: Vec<_> = entries
        .into_iter()
        .filter(|e| e.is_file() && e.name.ends_with(".json") && e.name != MANIFEST_NAME)
        .collect();

    let badges = files
        .par_iter()
        .map(|entry| {
            let Some(url) = entry.download_url.as_deref() else {
                warn!(file = %entry.name, "dropping badge without download url");
                return None;
            };
            let value = match client.download_json::<Value>(url) {
                Ok(value) => value,
                Err(err) => {
                    warn!(file = %entry.name, error = %err, "dropping unreadable badge");
                    return None;
                }
            };
            match Assertion::from_value(value) {
                Ok(assertion) => Some(ListedBadge {
                    filename: entry.name.clone(),
                    assertion,
                }),
                Err(reason) => {
                    warn!(file = %entry.name, %reason, "dropping invalid badge");
                    None
                }
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    Ok(badges)
}

/// `.json` href targets of an HTML page: final path segment, query and
/// fragment stripped, manifest excluded, first occurrence kept.
#[must_use]
pub fn extract_json_links(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for capture in HREF_RE.captures_iter(html) {
        let href = &capture[1];
        let href = href.split(['?', '#']).next().unwrap_or(href);
        let Some(segment) = href.trim_end_matches('/').rsplit('/').next() else {
            continue;
        };
        let name = urlencoding::decode(segment)
            .map_or_else(|_| segment.to_string(), |decoded| decoded.into_owned());
        if !name.ends_with(".json") || name == MANIFEST_NAME {
            continue;
        }
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    names
}

fn is_absolute_url(input: &str) -> bool {
    reqwest::Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
