//! ob list - List badges published on the site or committed to the repository

use clap::Args;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::reader::{ListedBadge, ListingSource, list_repo_badges};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Read the selected GitHub repository instead of the published site
    #[arg(long)]
    pub remote: bool,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let (origin, badges) = if args.remote {
        let badges = list_repo_badges(&ctx.session, &ctx.github, &ctx.config.github.badges_path)?;
        ("repository", badges)
    } else {
        let listing = ctx.reader()?.list_site_badges()?;
        let origin = match listing.source {
            ListingSource::Manifest => "manifest",
            ListingSource::DirectoryIndex => "directory_index",
            ListingSource::Unavailable => "unavailable",
        };
        (origin, listing.badges)
    };

    match ctx.output_format {
        OutputFormat::Json => emit_json(&serde_json::json!({
            "source": origin,
            "count": badges.len(),
            "badges": badges,
        })),
        OutputFormat::Plain => {
            for badge in &badges {
                println!("{}", plain_line(badge));
            }
            Ok(())
        }
        OutputFormat::Human => {
            let mut layout = HumanLayout::new();
            layout.title(&format!("Badges ({})", badges.len()));
            if badges.is_empty() {
                layout.bullet(if origin == "unavailable" {
                    "No badge manifest or directory index was found."
                } else {
                    "No badges published yet."
                });
            }
            for badge in &badges {
                let assertion = &badge.assertion;
                layout.section(&assertion.badge.name).kv("File", &badge.filename).kv(
                    "Recipient",
                    assertion.recipient_name.as_deref().unwrap_or("-"),
                );
                layout
                    .kv("Issued by", &assertion.badge.issuer.name)
                    .kv("Issued on", &assertion.issued_on);
            }
            emit_human(layout);
            Ok(())
        }
    }
}

fn plain_line(badge: &ListedBadge) -> String {
    let assertion = &badge.assertion;
    format!(
        "{}\t{}\t{}\t{}",
        badge.filename,
        assertion.badge.name,
        assertion.recipient_name.as_deref().unwrap_or("-"),
        assertion.issued_on
    )
}
