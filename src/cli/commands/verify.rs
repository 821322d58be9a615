//! ob verify - Fetch a published badge and show its details and share links

use chrono::{DateTime, Utc};
use clap::Args;

use crate::app::AppContext;
use crate::assertion::Assertion;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::share::{linkedin_add_url, verification_url};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Badge id, filename or absolute URL
    pub badge: String,
}

pub fn run(ctx: &AppContext, args: &VerifyArgs) -> Result<()> {
    let fetched = ctx.reader()?.fetch_badge(&args.badge)?;
    let assertion = &fetched.assertion;

    let verify_url = verification_url(&ctx.config.site, assertion.short_id());
    let linkedin_url = linkedin_add_url(assertion, &verify_url);
    let expired = is_expired(assertion, ctx.clock.now());

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "verified": true,
            "expired": expired,
            "source_url": fetched.source_url,
            "verification_url": verify_url,
            "linkedin_url": linkedin_url,
            "assertion": assertion,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    let status = if expired { "Verified (expired)" } else { "Verified ✓" };
    layout
        .title(&assertion.badge.name)
        .kv("Status", status)
        .kv(
            "Recipient",
            assertion.recipient_name.as_deref().unwrap_or("-"),
        )
        .kv("Issued by", &assertion.badge.issuer.name)
        .kv("Issued on", &assertion.issued_on);
    if let Some(expires) = &assertion.expires_on {
        layout.kv("Expires", expires);
    }
    if !assertion.badge.description.is_empty() {
        layout.kv("Description", &assertion.badge.description);
    }
    if !assertion.badge.criteria.narrative.is_empty() {
        layout.kv("Criteria", &assertion.badge.criteria.narrative);
    }
    if !assertion.skills.is_empty() {
        layout.kv("Skills", &assertion.skills.join(", "));
    }
    layout
        .section("Links")
        .kv("Source", &fetched.source_url)
        .kv("Verify", &verify_url)
        .kv("LinkedIn", &linkedin_url);

    emit_human(layout);
    Ok(())
}

/// Expiry in the past. Unparseable dates count as not expired.
fn is_expired(assertion: &Assertion, now: DateTime<Utc>) -> bool {
    assertion
        .expires_on
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .is_some_and(|expires| expires < now)
}
