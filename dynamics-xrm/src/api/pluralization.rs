//! Entity set names for Web API URLs
//!
//! The Web API addresses records through entity set names (`accounts(<id>)`), which
//! Dataverse derives from the logical name by English pluralization.

/// Entity set name for a logical name (`account` → `accounts`)
pub fn entity_set_name(logical_name: &str) -> String {
    if logical_name.is_empty() {
        return String::new();
    }
    let (drop, suffix) = plural_suffix(&logical_name.to_lowercase());
    format!("{}{}", &logical_name[..logical_name.len() - drop], suffix)
}

/// Trailing bytes to drop and the ending to append
fn plural_suffix(lower: &str) -> (usize, &'static str) {
    let consonant_before_last = lower
        .chars()
        .rev()
        .nth(1)
        .is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));

    match lower {
        l if ["s", "sh", "ch", "x"].iter().any(|end| l.ends_with(end)) => (0, "es"),
        l if l.ends_with('z') && !l.ends_with("tz") => (0, "zes"),
        l if l.ends_with('y') && consonant_before_last => (1, "ies"),
        l if l.ends_with("fe") => (2, "ves"),
        l if l.ends_with('f') => (1, "ves"),
        l if l.ends_with('o') && consonant_before_last => (0, "es"),
        _ => (0, "s"),
    }
}
