//! E2E test suite entry point.

mod fixture;
mod issue_workflow;
mod list_workflow;
mod session_workflow;
