//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! name the badge, branch, or config key involved.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::BadgeNotFound => suggest_badge_not_found(context),
        ErrorCode::ConfigMissingRequired => suggest_config_missing(context),
        ErrorCode::BranchCreateFailed
        | ErrorCode::FileWriteFailed
        | ErrorCode::FileConflict
        | ErrorCode::PrCreateFailed => suggest_orphaned_branch(code, context),
        _ => code.suggestion().to_string(),
    }
}

fn suggest_badge_not_found(context: Option<&Value>) -> String {
    let Some(id) = context
        .and_then(|c| c.get("badge_id"))
        .and_then(Value::as_str)
    else {
        return ErrorCode::BadgeNotFound.suggestion().to_string();
    };

    format!(
        "Badge '{id}' was not found. Try:\n  - `ob list` to see published badges\n  - checking that the pull request that adds {id}.json has been merged"
    )
}

fn suggest_config_missing(context: Option<&Value>) -> String {
    match context
        .and_then(|c| c.get("config_key"))
        .and_then(Value::as_str)
    {
        Some(key) => format!("Set `{key}` in config.toml or through its OB_* environment variable"),
        None => ErrorCode::ConfigMissingRequired.suggestion().to_string(),
    }
}

fn suggest_orphaned_branch(code: ErrorCode, context: Option<&Value>) -> String {
    let base = code.suggestion();
    match context
        .and_then(|c| c.get("orphaned_branch"))
        .and_then(Value::as_str)
    {
        Some(branch) => format!("{base}\nBranch '{branch}' was left behind and can be deleted"),
        None => base.to_string(),
    }
}
