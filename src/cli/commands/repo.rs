//! Repository selection commands
//!
//! - `ob repo list`   - Repositories the token can see
//! - `ob repo select` - Store the publication target
//! - `ob repo show`   - Print the current target

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::{ObError, Result};
use crate::github::RepoRef;

#[derive(Args, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommand,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// List repositories accessible with the stored token
    List,
    /// Select the repository badges are published to
    Select(SelectArgs),
    /// Show the selected repository
    Show,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// `owner/repo` or a GitHub URL
    pub repo: String,

    /// Store the selection without checking that the repository exists
    #[arg(long)]
    pub no_verify: bool,
}

pub fn run(ctx: &AppContext, args: &RepoArgs) -> Result<()> {
    match &args.command {
        RepoCommand::List => list(ctx),
        RepoCommand::Select(select_args) => select(ctx, select_args),
        RepoCommand::Show => show(ctx),
    }
}

fn list(ctx: &AppContext) -> Result<()> {
    if !ctx.session.is_authenticated() {
        return Err(ObError::NotAuthenticated(
            "listing repositories needs a stored token".to_string(),
        ));
    }
    let repos = ctx.authed_github().list_user_repos()?;

    if ctx.output_format.is_machine_readable() {
        return emit_json(&repos);
    }

    let selected = ctx.session.repo().map(|r| r.to_string());
    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title(&format!("Repositories ({})", repos.len()));
    for repo in &repos {
        let marker = if selected.as_deref() == Some(repo.full_name.as_str()) {
            " (selected)"
        } else {
            ""
        };
        let visibility = if repo.private { " [private]" } else { "" };
        layout.bullet(&format!("{}{visibility}{marker}", repo.full_name));
    }
    emit_human(layout);
    Ok(())
}

fn select(ctx: &AppContext, args: &SelectArgs) -> Result<()> {
    let repo = RepoRef::parse(&args.repo)?;

    let default_branch = if args.no_verify || !ctx.session.is_authenticated() {
        None
    } else {
        Some(ctx.authed_github().get_repo(&repo)?.default_branch)
    };

    ctx.session.set_repo(&repo.owner, &repo.repo)?;

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "status": "selected",
            "owner": repo.owner,
            "repo": repo.repo,
            "default_branch": default_branch,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Repository selected").kv("Repository", &repo.to_string());
    if let Some(branch) = &default_branch {
        layout.kv("Default branch", branch);
    }
    emit_human(layout);
    Ok(())
}

fn show(ctx: &AppContext) -> Result<()> {
    let repo = ctx.session.repo();
    let source = match (&repo, ctx.session.has_stored_repo()) {
        (None, _) => "none",
        (Some(_), true) => "session",
        (Some(_), false) => "config",
    };

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "owner": repo.as_ref().map(|r| r.owner.clone()),
            "repo": repo.as_ref().map(|r| r.repo.clone()),
            "source": source,
            "badges_path": ctx.config.github.badges_path,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Publication target");
    match &repo {
        Some(repo) => {
            layout
                .kv("Repository", &repo.to_string())
                .kv("Source", source)
                .kv("Badges path", &ctx.config.github.badges_path);
        }
        None => {
            layout
                .kv("Repository", "-")
                .blank()
                .bullet("Run 'ob repo select <owner/repo>' to choose one.");
        }
    }
    emit_human(layout);
    Ok(())
}
