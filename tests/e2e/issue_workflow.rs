//! E2E Scenario: issue a badge through a pull request, then revoke it
//!
//! Covers:
//! - Full issue saga against a mocked GitHub API
//! - Revocation with names looked up on the published site
//! - Cleanup of the working branch when the pull request cannot be opened

use httpmock::prelude::*;
use serde_json::json;

use super::fixture::{E2EFixture, badge_document};

const BADGE_PATH: &str = "/repos/acme/badges/contents/public/badges/cloud-expert-jane.json";

fn logged_in(fixture: &E2EFixture) {
    let user = fixture.github.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(json!({
            "login": "octo",
            "id": 7,
            "avatar_url": "https://avatars.example/octo.png",
        }));
    });
    let output = fixture.run_ob(&["-m", "auth", "login", "--token", "tok"]);
    fixture.assert_success(&output, "auth login");
    user.assert();

    let output = fixture.run_ob(&["-m", "repo", "select", "acme/badges", "--no-verify"]);
    fixture.assert_success(&output, "repo select");
}

fn mock_repo_and_ref(fixture: &E2EFixture) {
    fixture.github.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/badges")
            .header("authorization", "Bearer tok");
        then.status(200)
            .json_body(json!({ "full_name": "acme/badges", "default_branch": "main" }));
    });
    fixture.github.mock(|when, then| {
        when.method(GET).path("/repos/acme/badges/git/refs/heads/main");
        then.status(200).json_body(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "base-sha" }
        }));
    });
}

const ISSUE_ARGS: [&str; 11] = [
    "-m",
    "issue",
    "--recipient-name",
    "Jane Doe",
    "--recipient-email",
    "jane@x.com",
    "--badge-name",
    "Cloud Expert",
    "--issuer-name",
    "Acme Academy",
    "--publish",
];

#[test]
fn test_issue_and_revoke_workflow() {
    let fixture = E2EFixture::new("issue_and_revoke");

    fixture.log_step("Authenticate and select the repository");
    logged_in(&fixture);
    mock_repo_and_ref(&fixture);

    let create_branch = fixture.github.mock(|when, then| {
        when.method(POST).path("/repos/acme/badges/git/refs");
        then.status(201).json_body(json!({
            "ref": "refs/heads/badge/cloud-expert-jane",
            "object": { "sha": "base-sha" }
        }));
    });
    let write_file = fixture.github.mock(|when, then| {
        when.method(PUT).path(BADGE_PATH);
        then.status(201).json_body(json!({ "content": { "sha": "new-sha" } }));
    });
    let open_pr = fixture.github.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/badges/pulls")
            .body_includes("Issue Badge: Cloud Expert to Jane Doe");
        then.status(201).json_body(json!({
            "html_url": "https://github.com/acme/badges/pull/12",
            "number": 12
        }));
    });

    fixture.log_step("Issue and publish the badge");
    let output = fixture.run_ob(&ISSUE_ARGS);
    fixture.assert_success(&output, "issue --publish");
    let json = output.json();
    assert_eq!(json["filename"], "cloud-expert-jane.json");
    let pr = &json["pull_request"];
    assert_eq!(pr["pr_url"], "https://github.com/acme/badges/pull/12");
    assert_eq!(pr["path"], "public/badges/cloud-expert-jane.json");
    assert!(
        pr["branch"]
            .as_str()
            .unwrap()
            .starts_with("badge/cloud-expert-jane-")
    );
    create_branch.assert();
    write_file.assert();
    open_pr.assert();

    fixture.log_step("Revoke the badge, names looked up on the site");
    let site_badge = fixture.site.mock(|when, then| {
        when.method(GET).path("/badges/cloud-expert-jane.json");
        then.status(200).json_body(badge_document(
            &fixture.site.base_url(),
            "cloud-expert-jane",
            "Cloud Expert",
            "Jane Doe",
        ));
    });
    let read_file = fixture.github.mock(|when, then| {
        when.method(GET).path(BADGE_PATH);
        then.status(200).json_body(json!({
            "path": "public/badges/cloud-expert-jane.json",
            "sha": "file-sha"
        }));
    });
    let delete_file = fixture.github.mock(|when, then| {
        when.method(DELETE)
            .path(BADGE_PATH)
            .body_includes("\"sha\":\"file-sha\"");
        then.status(200).json_body(json!({ "commit": {} }));
    });
    let revoke_pr = fixture.github.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/badges/pulls")
            .body_includes("Revoke Badge: Cloud Expert from Jane Doe");
        then.status(201).json_body(json!({
            "html_url": "https://github.com/acme/badges/pull/13",
            "number": 13
        }));
    });

    let output = fixture.run_ob(&["-m", "revoke", "cloud-expert-jane"]);
    fixture.assert_success(&output, "revoke");
    let json = output.json();
    assert_eq!(json["filename"], "cloud-expert-jane.json");
    assert_eq!(json["pull_request"]["number"], 13);
    site_badge.assert();
    read_file.assert();
    delete_file.assert();
    revoke_pr.assert();

    fixture.generate_report();
}

#[test]
fn test_failed_pr_deletes_working_branch() {
    let fixture = E2EFixture::new("failed_pr_cleanup");
    logged_in(&fixture);
    mock_repo_and_ref(&fixture);

    fixture.github.mock(|when, then| {
        when.method(POST).path("/repos/acme/badges/git/refs");
        then.status(201).json_body(json!({
            "ref": "refs/heads/badge/x",
            "object": { "sha": "base-sha" }
        }));
    });
    fixture.github.mock(|when, then| {
        when.method(PUT).path(BADGE_PATH);
        then.status(201).json_body(json!({}));
    });
    fixture.github.mock(|when, then| {
        when.method(POST).path("/repos/acme/badges/pulls");
        then.status(422)
            .json_body(json!({ "message": "Validation Failed" }));
    });
    let delete_branch = fixture.github.mock(|when, then| {
        when.method(DELETE)
            .path_prefix("/repos/acme/badges/git/refs/heads/badge/cloud-expert-jane-");
        then.status(204);
    });

    let output = fixture.run_ob(&ISSUE_ARGS);
    fixture.assert_failure(&output, "issue --publish");
    let error = &output.json()["error"];
    assert_eq!(error["code"], "PR_CREATE_FAILED");
    assert_eq!(error["context"]["step"], "pr_create");
    assert_eq!(error["context"]["status"], 422);
    assert!(error["context"].get("orphaned_branch").is_none());
    delete_branch.assert();

    fixture.generate_report();
}

#[test]
fn test_repo_fetch_failure_stops_before_branching() {
    let fixture = E2EFixture::new("repo_fetch_failure");
    logged_in(&fixture);

    fixture.github.mock(|when, then| {
        when.method(GET).path("/repos/acme/badges");
        then.status(404).json_body(json!({ "message": "Not Found" }));
    });
    let writes = fixture.github.mock(|when, then| {
        when.method(POST);
        then.status(500);
    });

    let output = fixture.run_ob(&ISSUE_ARGS);
    fixture.assert_failure(&output, "issue --publish");
    assert_eq!(output.json()["error"]["code"], "REPO_FETCH_FAILED");
    writes.assert_calls(0);

    fixture.generate_report();
}
