//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Badge errors
//! - 3xx: Config errors
//! - 4xx: Auth errors
//! - 5xx: Network errors
//! - 6xx: Storage errors
//! - 7xx: Publication workflow errors
//! - 8xx: Validation errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for JSON output.
///
/// Each variant maps to a numeric code (e.g., `BadgeNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Badge errors (1xx)
    // ========================================
    /// E101: No badge published under the requested id
    BadgeNotFound,
    /// E102: Document was fetched but is not an Open Badges assertion
    BadgeInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Auth errors (4xx)
    // ========================================
    /// E401: Operation needs a stored token
    AuthRequired,
    /// E402: Token was rejected by GitHub
    AuthFailed,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Cannot reach remote server
    NetworkUnreachable,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E605: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Publication workflow errors (7xx)
    // ========================================
    /// E701: Repository metadata could not be read
    RepoFetchFailed,
    /// E702: Default branch ref could not be read
    RefFetchFailed,
    /// E703: Badge file to revoke could not be read
    FileReadFailed,
    /// E704: Working branch could not be created
    BranchCreateFailed,
    /// E705: Badge file could not be written or deleted
    FileWriteFailed,
    /// E706: Badge file changed since it was read
    FileConflict,
    /// E707: Pull request could not be opened
    PrCreateFailed,
    /// E708: Token or repository selection missing
    PublishPrecondition,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Input validation failed
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal error
    InternalError,
    /// E906: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `BadgeNotFound` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::BadgeNotFound => 101,
            Self::BadgeInvalid => 102,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::AuthRequired => 401,
            Self::AuthFailed => 402,

            Self::NetworkUnreachable => 501,

            Self::SerializationError => 605,

            Self::RepoFetchFailed => 701,
            Self::RefFetchFailed => 702,
            Self::FileReadFailed => 703,
            Self::BranchCreateFailed => 704,
            Self::FileWriteFailed => 705,
            Self::FileConflict => 706,
            Self::PrCreateFailed => 707,
            Self::PublishPrecondition => 708,

            Self::ValidationFailed => 801,

            Self::InternalError => 901,
            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::BadgeNotFound => "Check the badge id. Run `ob list` to see published badges",
            Self::BadgeInvalid => "The file is not an Open Badges assertion. Re-issue it with `ob issue`",

            Self::ConfigInvalid => "Check TOML syntax in the config file and the OB_* environment variables",
            Self::ConfigMissingRequired => "Set the value in config.toml or via its OB_* environment variable",

            Self::AuthRequired => "Run `ob auth login --token <personal access token>` first",
            Self::AuthFailed => "Check that the token is valid and has the `repo` scope",

            Self::NetworkUnreachable => "Check your network connection and the configured URLs",

            Self::SerializationError => "The data format may be corrupted. Check input data for validity",

            Self::RepoFetchFailed => "Check the repository selection with `ob repo show` and that the token can read it",
            Self::RefFetchFailed => "The default branch could not be read. Check that the repository is not empty",
            Self::FileReadFailed => "The badge file does not exist on the default branch. Run `ob list --remote`",
            Self::BranchCreateFailed => "The token needs write access to the repository",
            Self::FileWriteFailed => "The token needs write access to repository contents",
            Self::FileConflict => "The badge file changed since it was read. Run the command again",
            Self::PrCreateFailed => "Check for an existing pull request from the same branch",
            Self::PublishPrecondition => "Run `ob auth login` and `ob repo select <owner/repo>` first",

            Self::ValidationFailed => "Review the reported fields and try again",

            Self::InternalError => "An unexpected error occurred. Please report this issue with full error output",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InternalError | Self::SerializationError)
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "badge",
            3 => "config",
            4 => "auth",
            5 => "network",
            6 => "storage",
            7 => "publish",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::BadgeNotFound,
            Self::BadgeInvalid,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::AuthRequired,
            Self::AuthFailed,
            Self::NetworkUnreachable,
            Self::SerializationError,
            Self::RepoFetchFailed,
            Self::RefFetchFailed,
            Self::FileReadFailed,
            Self::BranchCreateFailed,
            Self::FileWriteFailed,
            Self::FileConflict,
            Self::PrCreateFailed,
            Self::PublishPrecondition,
            Self::ValidationFailed,
            Self::InternalError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
