//! Per-form field registry

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Field, FormError, FormHost};

/// Fields already bound in a session, keyed by attribute name
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Mutex<HashMap<String, Field>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound field for `name`, binding through `host` on first access
    pub fn get_or_bind(&self, host: &dyn FormHost, name: &str) -> Result<Field, FormError> {
        let mut fields = self.fields.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(field) = fields.get(name) {
            return Ok(field.clone());
        }

        let attribute = host
            .attribute(name)
            .ok_or_else(|| FormError::MissingAttribute {
                name: name.to_string(),
            })?;
        debug!("Bound field '{}'", name);

        let field = Field::new(attribute);
        fields.insert(name.to_string(), field.clone());
        Ok(field)
    }

    pub fn len(&self) -> usize {
        self.fields.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One open form and the fields bound on it
pub struct FormSession {
    host: Arc<dyn FormHost>,
    registry: FieldRegistry,
}

impl FormSession {
    pub fn new(host: Arc<dyn FormHost>) -> Self {
        Self {
            host,
            registry: FieldRegistry::new(),
        }
    }

    /// Field by attribute name
    ///
    /// The host is asked once per name; later calls return the same binding.
    pub fn field(&self, name: &str) -> Result<Field, FormError> {
        self.registry.get_or_bind(self.host.as_ref(), name)
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }
}
