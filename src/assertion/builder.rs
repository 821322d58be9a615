//! Form payload to Open Badges assertion.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::types::{
    Assertion, BadgeClass, BadgeImage, Criteria, OPEN_BADGES_CONTEXT, Profile, Recipient,
    Verification,
};
use crate::clock::Clock;
use crate::error::{ObError, Result};

/// Placeholder image used when the form leaves the image blank.
pub const DEFAULT_BADGE_IMAGE: &str = "https://placehold.co/400x400?text=Badge";

/// Ordered, duplicate-free skill list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    skills: Vec<String>,
}

impl SkillSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trimmed skill. Returns false for blanks and duplicates.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != skill.trim());
        self.skills.len() != before
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.skills
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for skill in iter {
            set.add_skill(skill.as_ref());
        }
        set
    }
}

/// Everything the issuer types in.
#[derive(Debug, Clone, Default)]
pub struct BadgeForm {
    pub recipient_name: String,
    pub recipient_email: String,
    pub badge_name: String,
    pub badge_description: String,
    pub badge_image: String,
    pub criteria_narrative: String,
    pub issuer_name: String,
    pub issuer_url: String,
    pub issuer_email: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339; today (per the clock) when absent.
    pub issue_date: Option<String>,
    pub expires: Option<String>,
    pub skills: SkillSet,
}

#[derive(Debug, Clone)]
pub struct BuiltBadge {
    pub assertion: Assertion,
    pub filename: String,
}

pub struct AssertionBuilder<'a> {
    base_url: String,
    clock: &'a dyn Clock,
}

impl<'a> AssertionBuilder<'a> {
    pub fn new(base_url: &str, clock: &'a dyn Clock) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            clock,
        }
    }

    pub fn build(&self, form: &BadgeForm) -> Result<BuiltBadge> {
        validate_form(form)?;

        let badge_slug = slugify(&form.badge_name);
        let filename = derive_filename(&form.badge_name, &form.recipient_name)?;

        let issued_on = match form.issue_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_badge_date(raw)?,
            _ => midnight(self.clock.now().date_naive()),
        };
        let expires_on = match form.expires.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(format_badge_date(parse_badge_date(raw)?)),
            _ => None,
        };

        let image = if form.badge_image.trim().is_empty() {
            DEFAULT_BADGE_IMAGE.to_string()
        } else {
            form.badge_image.trim().to_string()
        };
        let skills = form.skills.as_slice().to_vec();
        let base = &self.base_url;

        let assertion = Assertion {
            context: OPEN_BADGES_CONTEXT.to_string(),
            id: format!("{base}/badges/{filename}"),
            kind: "Assertion".to_string(),
            recipient: Recipient::email(form.recipient_email.trim()),
            recipient_name: Some(form.recipient_name.trim().to_string()),
            issued_on: format_badge_date(issued_on),
            expires_on,
            badge: BadgeClass {
                id: format!("{base}/badges/class/{badge_slug}.json"),
                kind: "BadgeClass".to_string(),
                name: form.badge_name.trim().to_string(),
                description: form.badge_description.clone(),
                image: BadgeImage::Url(image),
                criteria: Criteria {
                    id: None,
                    kind: "Criteria".to_string(),
                    narrative: form.criteria_narrative.clone(),
                },
                issuer: Profile {
                    id: format!("{base}/issuer.json"),
                    kind: "Profile".to_string(),
                    name: form.issuer_name.clone(),
                    url: form.issuer_url.clone(),
                    email: form
                        .issuer_email
                        .as_deref()
                        .map(str::trim)
                        .filter(|e| !e.is_empty())
                        .map(String::from),
                    description: None,
                    image: None,
                },
                tags: skills.clone(),
            },
            verification: Verification::hosted(),
            skills,
            narrative: None,
            evidence: Vec::new(),
        };

        Ok(BuiltBadge {
            assertion,
            filename,
        })
    }
}

fn validate_form(form: &BadgeForm) -> Result<()> {
    let mut missing = Vec::new();
    if form.recipient_name.trim().is_empty() {
        missing.push("recipient name");
    }
    if form.recipient_email.trim().is_empty() {
        missing.push("recipient email");
    }
    if form.badge_name.trim().is_empty() {
        missing.push("badge name");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ObError::ValidationFailed(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )))
    }
}

/// Lower-case ASCII, non-alphanumeric runs collapsed to one hyphen, no
/// leading or trailing hyphen.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// `slug(badge) + "-" + slug(first word of recipient) + ".json"`.
pub fn derive_filename(badge_name: &str, recipient_name: &str) -> Result<String> {
    let badge = slugify(badge_name);
    if badge.is_empty() {
        return Err(ObError::ValidationFailed(format!(
            "badge name {badge_name:?} has no letters or digits"
        )));
    }
    let first_name = recipient_name.split_whitespace().next().unwrap_or("");
    let recipient = slugify(first_name);
    if recipient.is_empty() {
        return Err(ObError::ValidationFailed(format!(
            "recipient name {recipient_name:?} must start with a letter or digit"
        )));
    }
    Ok(format!("{badge}-{recipient}.json"))
}

/// Accept `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_badge_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(midnight(date));
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            ObError::ValidationFailed(format!(
                "invalid date {input:?} (expected YYYY-MM-DD or RFC 3339): {err}"
            ))
        })
}

/// `2024-01-15T00:00:00.000Z`
#[must_use]
pub fn format_badge_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
