//! E2E Scenario: listing published badges
//!
//! - Manifest listing keeps manifest order and skips missing files
//! - Directory index fallback when no manifest is published
//! - Remote listing straight from the repository contents API
//! - Plain output, one badge per line

use httpmock::prelude::*;
use serde_json::json;

use super::fixture::{E2EFixture, badge_document};

#[test]
fn test_manifest_listing_skips_missing_files() {
    let fixture = E2EFixture::new("manifest_listing");
    let base = fixture.site.base_url();

    fixture.site.mock(|when, then| {
        when.method(GET).path("/badges/badge-list.json");
        then.status(200)
            .json_body(json!(["b.json", "gone.json", "a.json"]));
    });
    for (stem, name) in [("a", "Alpha"), ("b", "Beta")] {
        let doc = badge_document(&base, stem, name, "Jane Doe");
        fixture.site.mock(|when, then| {
            when.method(GET).path(format!("/badges/{stem}.json"));
            then.status(200).json_body(doc);
        });
    }
    fixture.site.mock(|when, then| {
        when.method(GET).path("/badges/gone.json");
        then.status(404);
    });

    let output = fixture.run_ob(&["-m", "list"]);
    fixture.assert_success(&output, "list");
    let json = output.json();
    assert_eq!(json["source"], "manifest");
    assert_eq!(json["count"], 2);
    assert_eq!(json["badges"][0]["filename"], "b.json");
    assert_eq!(json["badges"][1]["filename"], "a.json");

    fixture.generate_report();
}

#[test]
fn test_directory_index_fallback() {
    let fixture = E2EFixture::new("directory_index");
    let base = fixture.site.base_url();

    fixture.site.mock(|when, then| {
        when.method(GET).path("/badges/badge-list.json");
        then.status(404);
    });
    fixture.site.mock(|when, then| {
        when.method(GET).path("/badges/");
        then.status(200).header("content-type", "text/html").body(
            "<html><body><ul>\
             <li><a href=\"../\">../</a></li>\
             <li><a href=\"a.json\">a.json</a></li>\
             <li><a href=\"b.json\">b.json</a></li>\
             <li><a href=\"badge-list.json\">badge-list.json</a></li>\
             </ul></body></html>",
        );
    });
    for stem in ["a", "b"] {
        let doc = badge_document(&base, stem, "Cloud Expert", "Jane Doe");
        fixture.site.mock(|when, then| {
            when.method(GET).path(format!("/badges/{stem}.json"));
            then.status(200).json_body(doc);
        });
    }

    let output = fixture.run_ob(&["-m", "list"]);
    fixture.assert_success(&output, "list");
    let json = output.json();
    assert_eq!(json["source"], "directory_index");
    assert_eq!(json["count"], 2);

    let output = fixture.run_ob(&["-O", "plain", "list"]);
    fixture.assert_success(&output, "list plain");
    let lines: Vec<_> = output.stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("a.json\tCloud Expert\tJane Doe"));

    fixture.generate_report();
}

#[test]
fn test_no_manifest_and_no_index_is_empty() {
    let fixture = E2EFixture::new("nothing_published");
    fixture.site.mock(|when, then| {
        when.any_request();
        then.status(404);
    });

    let output = fixture.run_ob(&["-m", "list"]);
    fixture.assert_success(&output, "list");
    let json = output.json();
    assert_eq!(json["source"], "unavailable");
    assert_eq!(json["count"], 0);

    fixture.generate_report();
}

#[test]
fn test_remote_listing_reads_repository() {
    let mut fixture = E2EFixture::new("remote_listing");
    fixture.set_env("OB_REPO_OWNER", "acme");
    fixture.set_env("OB_REPO_NAME", "badges");
    let base = fixture.site.base_url();
    fixture.site.mock(|when, then| {
        when.method(GET).path("/raw/a.json");
        then.status(200)
            .json_body(badge_document(&base, "a", "Cloud Expert", "Jane Doe"));
    });
    let raw = fixture.site.url("/raw/a.json");
    let listing = fixture.github.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/badges/contents/public/badges");
        then.status(200).json_body(json!([
            { "name": "a.json", "path": "public/badges/a.json", "type": "file", "download_url": raw },
            { "name": "badge-list.json", "path": "public/badges/badge-list.json", "type": "file", "download_url": raw },
            { "name": "images", "path": "public/badges/images", "type": "dir", "download_url": null }
        ]));
    });

    let output = fixture.run_ob(&["-m", "list", "--remote"]);
    fixture.assert_success(&output, "list --remote");
    let json = output.json();
    assert_eq!(json["source"], "repository");
    assert_eq!(json["count"], 1);
    assert_eq!(json["badges"][0]["filename"], "a.json");
    listing.assert();

    fixture.generate_report();
}

#[test]
fn test_remote_listing_without_selection_fails() {
    let fixture = E2EFixture::new("remote_without_repo");

    let output = fixture.run_ob(&["-m", "list", "--remote"]);
    fixture.assert_failure(&output, "list --remote");
    assert_eq!(
        output.json()["error"]["code"],
        "CONFIG_MISSING_REQUIRED"
    );

    fixture.generate_report();
}
