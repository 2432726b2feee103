//! Typed wrapper over a form attribute

use serde_json::{Value, json};
use std::sync::Arc;

use super::{Attribute, RequiredLevel, SubmitMode};
use crate::api::EntityRef;
use crate::guid::normalize_guid;

/// A form attribute bound for the lifetime of a session
#[derive(Clone)]
pub struct Field {
    attribute: Arc<dyn Attribute>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.attribute.name())
            .finish()
    }
}

impl Field {
    pub(crate) fn new(attribute: Arc<dyn Attribute>) -> Self {
        Self { attribute }
    }

    pub fn name(&self) -> &str {
        self.attribute.name()
    }

    pub fn value(&self) -> Value {
        self.attribute.value()
    }

    pub fn set_value(&self, value: Value) {
        self.attribute.set_value(value);
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_null()
    }

    pub fn required_level(&self) -> RequiredLevel {
        self.attribute.required_level()
    }

    pub fn set_required(&self, required: bool) {
        let level = if required {
            RequiredLevel::Required
        } else {
            RequiredLevel::None
        };
        self.attribute.set_required_level(level);
    }

    pub fn is_dirty(&self) -> bool {
        self.attribute.is_dirty()
    }

    pub fn set_submit_mode(&self, mode: SubmitMode) {
        self.attribute.set_submit_mode(mode);
    }

    /// First record of a lookup value, with its id normalized
    ///
    /// Lookups hold `[{ id, entityType, name }]`; anything else reads as `None`.
    pub fn lookup(&self) -> Option<EntityRef> {
        let value = self.value();
        let first = value.as_array()?.first()?;
        let mut reference = EntityRef::from_json(first)?;
        if let Ok(id) = normalize_guid(&reference.id) {
            reference.id = id;
        }
        Some(reference)
    }

    /// Point a lookup at a single record
    pub fn set_lookup(&self, reference: &EntityRef) {
        self.set_value(json!([reference]));
    }
}
