//! GUID helpers for Dataverse record ids
//!
//! The platform hands out ids in several spellings (`{ABC...}`, `abc...`, mixed case).
//! Everything in this crate works on the lowercase hyphenated form.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\{[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\}|[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})$",
    )
    .expect("GUID pattern is a valid regex")
});

/// Error returned when a string is not a GUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidError {
    pub input: String,
}

impl std::fmt::Display for GuidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a valid GUID", self.input)
    }
}

impl std::error::Error for GuidError {}

/// Check whether a string looks like a GUID (optional braces, any case)
pub fn is_guid(value: &str) -> bool {
    GUID_PATTERN.is_match(value.trim())
}

/// Normalize a GUID to lowercase hyphenated form without braces
///
/// `{0000000A-0000-0000-0000-00000000000B}` becomes `0000000a-0000-0000-0000-00000000000b`.
/// Normalizing an already normalized id returns it unchanged.
pub fn normalize_guid(value: &str) -> Result<String, GuidError> {
    let trimmed = value.trim();
    if !GUID_PATTERN.is_match(trimmed) {
        return Err(GuidError {
            input: value.to_string(),
        });
    }

    let bare = trimmed.trim_start_matches('{').trim_end_matches('}');
    let uuid = Uuid::parse_str(bare).map_err(|_| GuidError {
        input: value.to_string(),
    })?;

    Ok(uuid.hyphenated().to_string())
}

/// Braced uppercase form, as the form engine reports lookup ids
pub fn braced_guid(value: &str) -> Result<String, GuidError> {
    let normalized = normalize_guid(value)?;
    Ok(format!("{{{}}}", normalized.to_uppercase()))
}
