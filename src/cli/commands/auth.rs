//! GitHub token commands
//!
//! - `ob auth login`  - Validate a personal access token and store it
//! - `ob auth status` - Show the stored identity (optionally re-checking it)
//! - `ob auth logout` - Forget token, profile and repository selection

use std::io::{self, BufRead, IsTerminal};

use clap::{Args, Subcommand};
use console::Term;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::{ObError, Result};

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Validate a personal access token against GitHub and store it
    Login(LoginArgs),
    /// Show authentication status
    Status(StatusArgs),
    /// Clear the stored token, profile and repository selection
    Logout,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Personal access token (read from stdin when omitted)
    #[arg(long, env = "OB_GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Re-validate the stored token against GitHub
    #[arg(long)]
    pub check: bool,
}

pub fn run(ctx: &AppContext, args: &AuthArgs) -> Result<()> {
    match &args.command {
        AuthCommand::Login(login_args) => login(ctx, login_args),
        AuthCommand::Status(status_args) => status(ctx, status_args),
        AuthCommand::Logout => logout(ctx),
    }
}

fn login(ctx: &AppContext, args: &LoginArgs) -> Result<()> {
    let token = match &args.token {
        Some(token) => token.clone(),
        None => read_token()?,
    };

    let user = ctx.session.login(&ctx.github, &token)?;

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "status": "authenticated",
            "login": user.login,
            "name": user.name,
            "email": user.email,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout
        .title("Logged in to GitHub")
        .kv("Login", &user.login)
        .kv("Name", user.name.as_deref().unwrap_or("-"));
    if ctx.session.repo().is_none() {
        layout
            .blank()
            .bullet("Run 'ob repo select <owner/repo>' to choose where badges are published.");
    }
    emit_human(layout);
    Ok(())
}

fn read_token() -> Result<String> {
    let stdin = io::stdin();
    let token = if stdin.is_terminal() {
        let term = Term::stderr();
        term.write_str("GitHub personal access token: ")?;
        term.read_secure_line()?
    } else {
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        line
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(ObError::ValidationFailed(
            "no token given; pass --token, set OB_GITHUB_TOKEN or pipe it on stdin".to_string(),
        ));
    }
    Ok(token)
}

fn status(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let authenticated = ctx.session.is_authenticated();
    let user = ctx.session.user();
    let repo = ctx.session.repo();

    let valid = if args.check && authenticated {
        ctx.session
            .token()
            .map(|token| ctx.session.validate(&ctx.github, &token).is_some())
    } else {
        None
    };

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "authenticated": authenticated,
            "login": user.as_ref().map(|u| u.login.clone()),
            "name": user.as_ref().and_then(|u| u.name.clone()),
            "repo": repo.as_ref().map(ToString::to_string),
            "token_valid": valid,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("GitHub Authentication Status");

    if authenticated {
        layout
            .kv("Status", "Authenticated ✓")
            .kv("Login", user.as_ref().map_or("-", |u| u.login.as_str()))
            .kv(
                "Name",
                user.as_ref().and_then(|u| u.name.as_deref()).unwrap_or("-"),
            );
        match valid {
            Some(true) => {
                layout.kv("Token", "valid");
            }
            Some(false) => {
                layout.kv("Token", "rejected by GitHub");
            }
            None => {}
        }
    } else {
        layout
            .kv("Status", "Not authenticated")
            .blank()
            .bullet("Run 'ob auth login --token <token>' to authenticate.");
    }
    layout.kv(
        "Repository",
        &repo.map_or_else(|| "-".to_string(), |r| r.to_string()),
    );

    emit_human(layout);
    Ok(())
}

fn logout(ctx: &AppContext) -> Result<()> {
    let was_authenticated = ctx.session.is_authenticated();
    ctx.session.logout()?;

    if ctx.output_format.is_machine_readable() {
        return emit_json(&serde_json::json!({
            "status": if was_authenticated { "logged_out" } else { "not_authenticated" },
        }));
    }

    if was_authenticated {
        println!("Logged out. Token, profile and repository selection removed.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
