//! Parameter values for Web API requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Reference to a single record (`{ id, entityType }` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Record id (GUID)
    pub id: String,
    /// Entity logical name (e.g., "account")
    #[serde(rename = "entityType")]
    pub entity_type: String,
    /// Primary name, when the host supplied one (lookup values carry it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            name: None,
        }
    }

    /// Read `{ id, entityType }` out of a JSON object, if both are present as strings
    pub fn from_json(json: &JsonValue) -> Option<Self> {
        let object = json.as_object()?;
        let id = object.get("id")?.as_str()?;
        let entity_type = object.get("entityType")?.as_str()?;
        Some(Self {
            id: id.to_string(),
            entity_type: entity_type.to_string(),
            name: object
                .get("name")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        })
    }
}

/// Runtime shape of a value, used to check it against a declared kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    String,
    Number,
    Boolean,
    Date,
    Object,
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NativeType::String => "string",
            NativeType::Number => "number",
            NativeType::Boolean => "boolean",
            NativeType::Date => "date",
            NativeType::Object => "object",
        };
        write!(f, "{}", label)
    }
}

/// A request parameter value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterValue {
    #[default]
    Null,
    String(String),
    /// Whole number
    Integer(i64),
    /// Any other number (decimal, float, money)
    Number(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    EntityReference(EntityRef),
    EntityCollection(Vec<EntityRef>),
    /// Array that is not (yet) known to hold entity references
    Array(Vec<ParameterValue>),
    /// Plain object without the `{ id, entityType }` shape
    Object(Map<String, JsonValue>),
}

impl ParameterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entity_ref(&self) -> Option<&EntityRef> {
        match self {
            ParameterValue::EntityReference(r) => Some(r),
            _ => None,
        }
    }

    /// Runtime shape; `None` for null
    pub fn native_type(&self) -> Option<NativeType> {
        match self {
            ParameterValue::Null => None,
            ParameterValue::String(_) => Some(NativeType::String),
            ParameterValue::Integer(_) | ParameterValue::Number(_) => Some(NativeType::Number),
            ParameterValue::Boolean(_) => Some(NativeType::Boolean),
            ParameterValue::DateTime(_) => Some(NativeType::Date),
            ParameterValue::EntityReference(_)
            | ParameterValue::EntityCollection(_)
            | ParameterValue::Array(_)
            | ParameterValue::Object(_) => Some(NativeType::Object),
        }
    }

    /// Interpret a JSON value
    ///
    /// Objects carrying string `id` and `entityType` become entity references.
    /// Arrays stay arrays; validation decides later whether they are collections.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => ParameterValue::Null,
            JsonValue::Bool(b) => ParameterValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ParameterValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    ParameterValue::Number(f)
                } else {
                    ParameterValue::Null
                }
            }
            JsonValue::String(s) => ParameterValue::String(s.clone()),
            JsonValue::Array(items) => {
                ParameterValue::Array(items.iter().map(ParameterValue::from_json).collect())
            }
            JsonValue::Object(map) => match EntityRef::from_json(json) {
                Some(reference) => ParameterValue::EntityReference(reference),
                None => ParameterValue::Object(map.clone()),
            },
        }
    }

    /// JSON form, as the host would see the value
    pub fn to_json(&self) -> JsonValue {
        match self {
            ParameterValue::Null => JsonValue::Null,
            ParameterValue::String(s) => JsonValue::String(s.clone()),
            ParameterValue::Integer(i) => serde_json::json!(*i),
            ParameterValue::Number(n) => serde_json::json!(*n),
            ParameterValue::Boolean(b) => JsonValue::Bool(*b),
            ParameterValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            ParameterValue::EntityReference(r) => serde_json::to_value(r).unwrap_or(JsonValue::Null),
            ParameterValue::EntityCollection(refs) => {
                serde_json::to_value(refs).unwrap_or(JsonValue::Null)
            }
            ParameterValue::Array(items) => {
                JsonValue::Array(items.iter().map(ParameterValue::to_json).collect())
            }
            ParameterValue::Object(map) => JsonValue::Object(map.clone()),
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterValue::Null => write!(f, "null"),
            ParameterValue::String(s) => write!(f, "\"{}\"", s),
            ParameterValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Integer(value as i64)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Number(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for ParameterValue {
    fn from(value: DateTime<Utc>) -> Self {
        ParameterValue::DateTime(value)
    }
}

impl From<EntityRef> for ParameterValue {
    fn from(value: EntityRef) -> Self {
        ParameterValue::EntityReference(value)
    }
}

impl From<Vec<EntityRef>> for ParameterValue {
    fn from(value: Vec<EntityRef>) -> Self {
        ParameterValue::EntityCollection(value)
    }
}

impl From<JsonValue> for ParameterValue {
    fn from(value: JsonValue) -> Self {
        ParameterValue::from_json(&value)
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(ParameterValue::from_json(&json))
    }
}
