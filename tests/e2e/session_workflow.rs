//! E2E Scenario: login, repository selection and logout

use httpmock::prelude::*;
use serde_json::json;

use super::fixture::E2EFixture;

fn mock_user<'a>(fixture: &'a E2EFixture, token: &str) -> httpmock::Mock<'a> {
    let auth = format!("Bearer {token}");
    fixture.github.mock(|when, then| {
        when.method(GET).path("/user").header("authorization", auth);
        then.status(200).json_body(json!({
            "login": "octo",
            "id": 7,
            "avatar_url": "https://avatars.example/octo.png",
            "name": "Octo Cat",
        }));
    })
}

#[test]
fn test_login_select_logout() {
    let fixture = E2EFixture::new("login_select_logout");
    let user = mock_user(&fixture, "ghp_good");
    let repo = fixture.github.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/badges")
            .header("authorization", "Bearer ghp_good");
        then.status(200)
            .json_body(json!({ "full_name": "acme/badges", "default_branch": "main" }));
    });

    fixture.log_step("Log in with a valid token");
    let output = fixture.run_ob(&["-m", "auth", "login", "--token", "ghp_good"]);
    fixture.assert_success(&output, "auth login");
    assert_eq!(output.json()["login"], "octo");
    user.assert();

    let session = fixture.session().expect("session file written");
    assert_eq!(session["github_personal_access_token"], "ghp_good");

    fixture.log_step("Select a repository by URL");
    let output = fixture.run_ob(&[
        "-m",
        "repo",
        "select",
        "https://github.com/acme/badges.git",
    ]);
    fixture.assert_success(&output, "repo select");
    let json = output.json();
    assert_eq!(json["owner"], "acme");
    assert_eq!(json["default_branch"], "main");
    repo.assert();

    fixture.log_step("Show the selection");
    let output = fixture.run_ob(&["-m", "repo", "show"]);
    fixture.assert_success(&output, "repo show");
    let json = output.json();
    assert_eq!(json["repo"], "badges");
    assert_eq!(json["source"], "session");

    fixture.log_step("Status reports the stored identity");
    let output = fixture.run_ob(&["-m", "auth", "status"]);
    fixture.assert_success(&output, "auth status");
    let json = output.json();
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["login"], "octo");
    assert_eq!(json["repo"], "acme/badges");

    fixture.log_step("Log out");
    let output = fixture.run_ob(&["-m", "auth", "logout"]);
    fixture.assert_success(&output, "auth logout");
    assert_eq!(output.json()["status"], "logged_out");
    assert!(fixture.session().is_none(), "session file removed");

    fixture.generate_report();
}

#[test]
fn test_rejected_token_is_not_stored() {
    let fixture = E2EFixture::new("rejected_token");
    fixture.github.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(401).json_body(json!({ "message": "Bad credentials" }));
    });

    let output = fixture.run_ob(&["-m", "auth", "login", "--token", "ghp_bad"]);
    fixture.assert_failure(&output, "auth login");
    assert_eq!(output.exit_code, 1);
    assert_eq!(output.json()["error"]["code"], "AUTH_FAILED");
    assert!(fixture.session().is_none());

    fixture.generate_report();
}

#[test]
fn test_token_from_environment() {
    let mut fixture = E2EFixture::new("token_from_env");
    fixture.set_env("OB_GITHUB_TOKEN", "ghp_env");
    let user = mock_user(&fixture, "ghp_env");

    let output = fixture.run_ob(&["-m", "auth", "login"]);
    fixture.assert_success(&output, "auth login from env");
    assert_eq!(output.json()["status"], "authenticated");
    user.assert();

    fixture.generate_report();
}

#[test]
fn test_configured_repo_is_default_selection() {
    let mut fixture = E2EFixture::new("configured_repo");
    fixture.set_env("OB_REPO_OWNER", "acme");
    fixture.set_env("OB_REPO_NAME", "site");

    let output = fixture.run_ob(&["-m", "repo", "show"]);
    fixture.assert_success(&output, "repo show");
    let json = output.json();
    assert_eq!(json["owner"], "acme");
    assert_eq!(json["repo"], "site");
    assert_eq!(json["source"], "config");

    fixture.generate_report();
}
