//! Open Badges v2 document types.
//!
//! Field names serialize to the camelCase keys of the Open Badges vocabulary;
//! optional fields are omitted when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPEN_BADGES_CONTEXT: &str = "https://w3id.org/openbadges/v2";

fn default_context() -> String {
    OPEN_BADGES_CONTEXT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub recipient: Recipient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    pub issued_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
    pub badge: BadgeClass,
    pub verification: Verification,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

impl Assertion {
    /// Parse a fetched document, rejecting anything that is not an assertion.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let assertion: Self = serde_json::from_value(value).map_err(|err| err.to_string())?;
        if assertion.kind != "Assertion" {
            return Err(format!("expected type \"Assertion\", found \"{}\"", assertion.kind));
        }
        if assertion.badge.kind != "BadgeClass" {
            return Err(format!(
                "expected badge type \"BadgeClass\", found \"{}\"",
                assertion.badge.kind
            ));
        }
        Ok(assertion)
    }

    /// Final path segment of the id without the `.json` suffix.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let last = self.id.rsplit('/').next().unwrap_or(&self.id);
        last.strip_suffix(".json").unwrap_or(last)
    }

    /// 2-space indented JSON, the exact bytes committed to the repository.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    pub kind: String,
    pub identity: String,
    pub hashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl Recipient {
    #[must_use]
    pub fn email(identity: impl Into<String>) -> Self {
        Self {
            kind: "email".to_string(),
            identity: identity.into(),
            hashed: false,
            salt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeClass {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: BadgeImage,
    pub criteria: Criteria,
    pub issuer: Profile,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A badge image is either a bare URL or an image object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BadgeImage {
    Url(String),
    Object(ImageObject),
}

impl BadgeImage {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Object(object) => object.id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "criteria_type")]
    pub kind: String,
    #[serde(default)]
    pub narrative: String,
}

fn criteria_type() -> String {
    "Criteria".to_string()
}

/// Issuer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Verification {
    #[must_use]
    pub fn hosted() -> Self {
        Self {
            kind: "HostedBadge".to_string(),
            url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "@context": OPEN_BADGES_CONTEXT,
            "id": "https://acme.github.io/app/badges/cloud-expert-jane.json",
            "type": "Assertion",
            "recipient": { "type": "email", "identity": "jane@x.com", "hashed": false },
            "issuedOn": "2024-01-15T00:00:00.000Z",
            "badge": {
                "id": "https://acme.github.io/app/badges/class/cloud-expert.json",
                "type": "BadgeClass",
                "name": "Cloud Expert",
                "description": "Knows clouds",
                "image": { "id": "https://img.example/b.png", "type": "Image", "caption": "badge" },
                "criteria": { "type": "Criteria", "narrative": "Pass the exam" },
                "issuer": {
                    "id": "https://acme.github.io/app/issuer.json",
                    "type": "Profile",
                    "name": "Acme",
                    "url": "https://acme.dev"
                }
            },
            "verification": { "type": "HostedBadge" }
        })
    }

    #[test]
    fn parses_image_object() {
        let assertion = Assertion::from_value(sample()).unwrap();
        assert_eq!(assertion.badge.image.url(), Some("https://img.example/b.png"));
        assert_eq!(assertion.short_id(), "cloud-expert-jane");
        assert!(assertion.skills.is_empty());
    }

    #[test]
    fn rejects_wrong_type() {
        let mut doc = sample();
        doc["type"] = json!("BadgeClass");
        let reason = Assertion::from_value(doc).unwrap_err();
        assert!(reason.contains("Assertion"));
    }

    #[test]
    fn rejects_missing_recipient() {
        let mut doc = sample();
        doc.as_object_mut().unwrap().remove("recipient");
        assert!(Assertion::from_value(doc).is_err());
    }

    #[test]
    fn optional_fields_are_omitted() {
        let assertion = Assertion::from_value(sample()).unwrap();
        let out = serde_json::to_value(&assertion).unwrap();
        let object = out.as_object().unwrap();
        assert!(!object.contains_key("expiresOn"));
        assert!(!object.contains_key("skills"));
        assert!(!object.contains_key("recipientName"));
        assert_eq!(out["issuedOn"], "2024-01-15T00:00:00.000Z");
        assert_eq!(out["@context"], OPEN_BADGES_CONTEXT);
    }
}
