pub mod app;
pub mod assertion;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod github;
pub mod publish;
pub mod reader;
pub mod session;
pub mod share;

#[cfg(test)]
pub mod test_utils;

pub use error::{ObError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
