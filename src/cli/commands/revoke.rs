//! ob revoke - Open a pull request deleting a published badge

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::publish::{RevokeRequest, badge_filename};

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Badge filename, id or URL
    pub target: String,

    /// Badge name for the commit message and PR (looked up on the site when omitted)
    #[arg(long)]
    pub badge_name: Option<String>,

    /// Recipient name for the commit message and PR (looked up on the site when omitted)
    #[arg(long)]
    pub recipient_name: Option<String>,
}

pub fn run(ctx: &AppContext, args: &RevokeArgs) -> Result<()> {
    let publisher = ctx.publisher();
    publisher.check_preconditions()?;
    let request = resolve_request(ctx, args)?;
    let outcome = publisher.revoke(&request)?;

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "status": "revocation_requested",
            "filename": request.filename,
            "pull_request": outcome,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout
        .title("Revocation Pull Request")
        .kv("Badge", &request.badge_name)
        .kv("Recipient", &request.recipient_name)
        .kv("Repository", &outcome.repo)
        .kv("Branch", &outcome.branch)
        .kv("Path", &outcome.path)
        .kv("URL", &outcome.pr_url);
    emit_human(layout);
    Ok(())
}

/// Fill in names the user left out from the published assertion, falling
/// back to the filename when the site cannot be read.
fn resolve_request(ctx: &AppContext, args: &RevokeArgs) -> Result<RevokeRequest> {
    let filename = badge_filename(&args.target)?;
    let (mut badge_name, mut recipient_name) = (args.badge_name.clone(), args.recipient_name.clone());

    if badge_name.is_none() || recipient_name.is_none() {
        match ctx.reader().and_then(|reader| reader.fetch_badge(&filename)) {
            Ok(fetched) => {
                badge_name.get_or_insert(fetched.assertion.badge.name);
                if let Some(name) = fetched.assertion.recipient_name {
                    recipient_name.get_or_insert(name);
                }
            }
            Err(err) => debug!(%filename, error = %err, "could not look up badge details"),
        }
    }

    let stem = filename.trim_end_matches(".json").to_string();
    Ok(RevokeRequest {
        badge_name: badge_name.unwrap_or_else(|| stem.clone()),
        recipient_name: recipient_name.unwrap_or_else(|| "recipient".to_string()),
        filename,
    })
}
