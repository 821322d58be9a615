//! Error handling for openbadge.
//!
//! This module provides:
//! - [`ObError`]: The main error enum for all openbadge operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::publish::{PublishError, PublishStep};

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for openbadge operations.
#[derive(Error, Debug)]
pub enum ObError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Badge not found: {0}")]
    NotFound(String),

    #[error("Invalid badge document at {source_url}: {reason}")]
    InvalidBadge { source_url: String, reason: String },

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl ObError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::NotAuthenticated(_) => ErrorCode::AuthRequired,
            Self::AuthError(_) => ErrorCode::AuthFailed,
            Self::Http(_) => ErrorCode::NetworkUnreachable,
            Self::NotFound(_) => ErrorCode::BadgeNotFound,
            Self::InvalidBadge { .. } => ErrorCode::BadgeInvalid,
            Self::Publish(err) => publish_code(err),
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::NotFound(id) => Some(serde_json::json!({ "badge_id": id })),
            Self::InvalidBadge { source_url, reason } => {
                Some(serde_json::json!({ "source_url": source_url, "reason": reason }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            Self::Publish(err) => {
                let mut ctx = serde_json::json!({ "step": err.step() });
                if let Some(status) = err.status() {
                    ctx["status"] = Value::from(status);
                }
                if let Some(branch) = err.failure().and_then(|f| f.orphaned_branch.as_deref()) {
                    ctx["orphaned_branch"] = Value::from(branch);
                }
                Some(ctx)
            }
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_ob_error(self)
    }
}

fn publish_code(err: &PublishError) -> ErrorCode {
    if err.is_conflict() {
        return ErrorCode::FileConflict;
    }
    match err.step() {
        PublishStep::Precondition => ErrorCode::PublishPrecondition,
        PublishStep::RepoFetch => ErrorCode::RepoFetchFailed,
        PublishStep::RefFetch => ErrorCode::RefFetchFailed,
        PublishStep::FileRead => ErrorCode::FileReadFailed,
        PublishStep::BranchCreate => ErrorCode::BranchCreateFailed,
        PublishStep::FileWrite => ErrorCode::FileWriteFailed,
        PublishStep::PrCreate => ErrorCode::PrCreateFailed,
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted in JSON output mode so scripts can branch on `code` instead of
/// matching message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "BADGE_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "badge", "publish", "network")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from an `ObError`.
    #[must_use]
    pub fn from_ob_error(err: &ObError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&ObError> for StructuredError {
    fn from(err: &ObError) -> Self {
        Self::from_ob_error(err)
    }
}

/// Result type alias using `ObError`.
pub type Result<T> = std::result::Result<T, ObError>;
