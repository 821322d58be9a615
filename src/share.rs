//! Links for sharing a published badge.

use chrono::{DateTime, Datelike};

use crate::assertion::Assertion;
use crate::config::SiteConfig;

const LINKEDIN_ADD_URL: &str = "https://www.linkedin.com/profile/add";

/// `<site><basePath>verify/<id>`
#[must_use]
pub fn verification_url(site: &SiteConfig, id: &str) -> String {
    let id = id.trim().trim_end_matches(".json");
    format!(
        "{}{}verify/{}",
        site.origin(),
        site.normalized_base_path(),
        urlencoding::encode(id)
    )
}

/// LinkedIn "add certification" link for `assertion`, pointing back at
/// `cert_url`. Issue year and month are omitted when `issuedOn` does not
/// parse.
#[must_use]
pub fn linkedin_add_url(assertion: &Assertion, cert_url: &str) -> String {
    let mut params = vec![
        ("startTask", "CERTIFICATION_NAME".to_string()),
        ("name", assertion.badge.name.clone()),
        ("organizationName", assertion.badge.issuer.name.clone()),
    ];
    if let Ok(issued) = DateTime::parse_from_rfc3339(&assertion.issued_on) {
        params.push(("issueYear", issued.year().to_string()));
        params.push(("issueMonth", issued.month().to_string()));
    }
    params.push(("certUrl", cert_url.to_string()));
    params.push(("certId", assertion.short_id().to_string()));

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{LINKEDIN_ADD_URL}?{query}")
}
