//! Form session wrappers
//!
//! The form engine owns attributes; this module wraps them in [`Field`]s that are
//! looked up once per [`FormSession`] and reused afterwards.

pub mod field;
pub mod session;

pub use field::Field;
pub use session::{FieldRegistry, FormSession};

use serde_json::Value;
use std::sync::Arc;

/// Requirement level of an attribute on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredLevel {
    None,
    Recommended,
    Required,
}

impl RequiredLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredLevel::None => "none",
            RequiredLevel::Recommended => "recommended",
            RequiredLevel::Required => "required",
        }
    }
}

/// When the attribute is sent on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Always,
    Never,
    Dirty,
}

/// A live attribute owned by the form engine
pub trait Attribute: Send + Sync {
    fn name(&self) -> &str;
    fn value(&self) -> Value;
    fn set_value(&self, value: Value);
    fn required_level(&self) -> RequiredLevel;
    fn set_required_level(&self, level: RequiredLevel);
    fn is_dirty(&self) -> bool;
    fn set_submit_mode(&self, mode: SubmitMode);
}

/// The form engine, as seen from a session
pub trait FormHost: Send + Sync {
    /// Attribute by logical name, `None` when the form does not carry it
    fn attribute(&self, name: &str) -> Option<Arc<dyn Attribute>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The form has no attribute with this name
    MissingAttribute { name: String },
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::MissingAttribute { name } => {
                write!(f, "Attribute '{}' does not exist on the form", name)
            }
        }
    }
}

impl std::error::Error for FormError {}
