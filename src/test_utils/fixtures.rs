use serde_json::{Value, json};

/// A published assertion document as it would sit under `badges/`.
pub fn assertion_json(base_url: &str, stem: &str, badge_name: &str) -> Value {
    json!({
        "@context": "https://w3id.org/openbadges/v2",
        "id": format!("{base_url}/badges/{stem}.json"),
        "type": "Assertion",
        "recipient": { "type": "email", "identity": format!("{stem}@example.com"), "hashed": false },
        "recipientName": "Jane Doe",
        "issuedOn": "2024-03-05T00:00:00.000Z",
        "badge": {
            "id": format!("{base_url}/badges/class/{stem}.json"),
            "type": "BadgeClass",
            "name": badge_name,
            "description": "Awarded for testing",
            "image": "https://img.example/badge.png",
            "criteria": { "type": "Criteria", "narrative": "Write tests" },
            "issuer": {
                "id": format!("{base_url}/issuer.json"),
                "type": "Profile",
                "name": "Acme Academy",
                "url": "https://acme.dev"
            }
        },
        "verification": { "type": "HostedBadge" }
    })
}

/// Minimal Apache-style directory index linking to `files`.
pub fn directory_index(files: &[&str]) -> String {
    let links: String = files
        .iter()
        .map(|f| format!("<li><a href=\"{f}\">{f}</a></li>\n"))
        .collect();
    format!("<html><body><h1>Index of /badges</h1><ul>\n<li><a href=\"../\">../</a></li>\n{links}</ul></body></html>")
}
