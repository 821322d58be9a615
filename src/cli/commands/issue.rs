//! ob issue - Build a badge assertion, optionally write it and open a PR

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::assertion::{Assertion, AssertionBuilder, BadgeForm, DEFAULT_BADGE_IMAGE, SkillSet};
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::publish::PrOutcome;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Recipient's full name
    #[arg(long)]
    pub recipient_name: String,

    /// Recipient's email address (the assertion identity)
    #[arg(long)]
    pub recipient_email: String,

    /// Badge name
    #[arg(long)]
    pub badge_name: String,

    /// Badge description
    #[arg(long, default_value = "")]
    pub badge_description: String,

    /// Badge image URL
    #[arg(long, default_value = DEFAULT_BADGE_IMAGE)]
    pub badge_image: String,

    /// Criteria narrative
    #[arg(long, default_value = "")]
    pub criteria: String,

    /// Issuing organization name
    #[arg(long, default_value = "")]
    pub issuer_name: String,

    /// Issuing organization URL
    #[arg(long, default_value = "")]
    pub issuer_url: String,

    /// Issuing organization contact email
    #[arg(long)]
    pub issuer_email: Option<String>,

    /// Issue date (YYYY-MM-DD or RFC 3339, default today)
    #[arg(long)]
    pub issue_date: Option<String>,

    /// Expiry date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub expires: Option<String>,

    /// Skill demonstrated by the badge (repeatable)
    #[arg(long = "skill")]
    pub skills: Vec<String>,

    /// Write the assertion JSON here (a directory receives the derived filename)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Open a pull request adding the badge to the selected repository
    #[arg(long)]
    pub publish: bool,
}

impl IssueArgs {
    fn to_form(&self) -> BadgeForm {
        BadgeForm {
            recipient_name: self.recipient_name.clone(),
            recipient_email: self.recipient_email.clone(),
            badge_name: self.badge_name.clone(),
            badge_description: self.badge_description.clone(),
            badge_image: self.badge_image.clone(),
            criteria_narrative: self.criteria.clone(),
            issuer_name: self.issuer_name.clone(),
            issuer_url: self.issuer_url.clone(),
            issuer_email: self.issuer_email.clone(),
            issue_date: self.issue_date.clone(),
            expires: self.expires.clone(),
            skills: self.skills.iter().collect::<SkillSet>(),
        }
    }
}

#[derive(Serialize)]
struct IssueReport<'a> {
    filename: &'a str,
    assertion: &'a Assertion,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pull_request: Option<PrOutcome>,
}

pub fn run(ctx: &AppContext, args: &IssueArgs) -> Result<()> {
    let base_url = ctx.base_url();
    let built = AssertionBuilder::new(&base_url, ctx.clock.as_ref()).build(&args.to_form())?;

    let written_to = match &args.out {
        Some(out) => Some(write_assertion(out, &built.filename, &built.assertion)?),
        None => None,
    };

    let pull_request = if args.publish {
        Some(ctx.publisher().issue(&built.assertion, &built.filename)?)
    } else {
        None
    };

    if ctx.output_format.is_machine_readable() {
        return emit_json(&IssueReport {
            filename: &built.filename,
            assertion: &built.assertion,
            written_to: written_to.as_ref().map(|p| p.display().to_string()),
            pull_request,
        });
    }

    let assertion = &built.assertion;
    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout
        .title("Badge Preview")
        .kv("Filename", &built.filename)
        .kv("Badge", &assertion.badge.name)
        .kv(
            "Recipient",
            assertion.recipient_name.as_deref().unwrap_or("-"),
        )
        .kv("Email", &assertion.recipient.identity)
        .kv("Issued", &assertion.issued_on)
        .kv("Id", &assertion.id);
    if let Some(expires) = &assertion.expires_on {
        layout.kv("Expires", expires);
    }
    if !assertion.skills.is_empty() {
        layout.kv("Skills", &assertion.skills.join(", "));
    }

    layout.section("Assertion JSON");
    for line in assertion.to_pretty_json()?.lines() {
        layout.push_line(line);
    }

    if let Some(path) = &written_to {
        layout.blank().kv("Written to", &path.display().to_string());
    }
    if let Some(pr) = &pull_request {
        layout
            .section("Pull Request")
            .kv("Repository", &pr.repo)
            .kv("Branch", &pr.branch)
            .kv("Path", &pr.path)
            .kv("URL", &pr.pr_url);
    } else {
        layout
            .blank()
            .bullet("Pass --publish to open a pull request with this badge.");
    }

    emit_human(layout);
    Ok(())
}

fn write_assertion(out: &Path, filename: &str, assertion: &Assertion) -> Result<PathBuf> {
    let path = if out.is_dir() {
        out.join(filename)
    } else {
        out.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut json = assertion.to_pretty_json()?;
    json.push('\n');
    fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "assertion written");
    Ok(path)
}
