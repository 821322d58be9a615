//! Command handlers, one module per subcommand.

pub mod auth;
pub mod issue;
pub mod list;
pub mod repo;
pub mod revoke;
pub mod verify;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Auth(args) => auth::run(ctx, args),
        Commands::Repo(args) => repo::run(ctx, args),
        Commands::Issue(args) => issue::run(ctx, args),
        Commands::Revoke(args) => revoke::run(ctx, args),
        Commands::Verify(args) => verify::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
    }
}
