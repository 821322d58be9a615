//! Open Badges assertion model and builder.

pub mod builder;
pub mod types;

pub use builder::{
    AssertionBuilder, BadgeForm, BuiltBadge, DEFAULT_BADGE_IMAGE, SkillSet, derive_filename,
    format_badge_date, parse_badge_date, slugify,
};
pub use types::{
    Assertion, BadgeClass, BadgeImage, Criteria, Evidence, ImageObject, OPEN_BADGES_CONTEXT,
    Profile, Recipient, Verification,
};
