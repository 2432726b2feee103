//! Parameter type catalog
//!
//! Maps the closed set of parameter kinds to the OData type name and structural
//! property the Web API execute contract expects. Descriptors are handed out by value,
//! so narrowing one for a request (e.g. `mscrm.account`) never leaks into another.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::RequestError;
use super::value::{NativeType, ParameterValue};
use crate::guid::is_guid;

/// Generic type name for entity-shaped parameters
pub const BASE_ENTITY_TYPE: &str = "mscrm.crmbaseentity";

/// Semantic kind of a request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ParameterKind {
    String,
    Integer,
    Boolean,
    DateTime,
    EntityReference,
    Decimal,
    Entity,
    EntityCollection,
    Float,
    Money,
    Picklist,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 11] = [
        ParameterKind::String,
        ParameterKind::Integer,
        ParameterKind::Boolean,
        ParameterKind::DateTime,
        ParameterKind::EntityReference,
        ParameterKind::Decimal,
        ParameterKind::Entity,
        ParameterKind::EntityCollection,
        ParameterKind::Float,
        ParameterKind::Money,
        ParameterKind::Picklist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "String",
            ParameterKind::Integer => "Integer",
            ParameterKind::Boolean => "Boolean",
            ParameterKind::DateTime => "DateTime",
            ParameterKind::EntityReference => "EntityReference",
            ParameterKind::Decimal => "Decimal",
            ParameterKind::Entity => "Entity",
            ParameterKind::EntityCollection => "EntityCollection",
            ParameterKind::Float => "Float",
            ParameterKind::Money => "Money",
            ParameterKind::Picklist => "Picklist",
        }
    }

    /// OData type name before any per-request narrowing
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::String => "Edm.String",
            ParameterKind::Integer | ParameterKind::Picklist => "Edm.Int32",
            ParameterKind::Boolean => "Edm.Boolean",
            ParameterKind::DateTime => "Edm.DateTimeOffset",
            ParameterKind::Decimal | ParameterKind::Money => "Edm.Decimal",
            ParameterKind::Float => "Edm.Double",
            ParameterKind::EntityReference | ParameterKind::Entity => BASE_ENTITY_TYPE,
            ParameterKind::EntityCollection => "Collection(mscrm.crmbaseentity)",
        }
    }

    pub fn structural_property(&self) -> StructuralProperty {
        match self {
            ParameterKind::EntityReference | ParameterKind::Entity => StructuralProperty::Complex,
            ParameterKind::EntityCollection => StructuralProperty::Collection,
            _ => StructuralProperty::Primitive,
        }
    }

    /// Runtime shape a value of this kind must have
    pub fn native_type(&self) -> NativeType {
        match self {
            ParameterKind::String => NativeType::String,
            ParameterKind::Integer
            | ParameterKind::Decimal
            | ParameterKind::Float
            | ParameterKind::Money
            | ParameterKind::Picklist => NativeType::Number,
            ParameterKind::Boolean => NativeType::Boolean,
            ParameterKind::DateTime => NativeType::Date,
            ParameterKind::EntityReference
            | ParameterKind::Entity
            | ParameterKind::EntityCollection => NativeType::Object,
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RequestError::UnsupportedKind {
                kind: s.to_string(),
            })
    }
}

impl TryFrom<String> for ParameterKind {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// OData structural property code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralProperty {
    Primitive = 1,
    Collection = 4,
    Complex = 5,
}

impl StructuralProperty {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl Serialize for StructuralProperty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for StructuralProperty {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(StructuralProperty::Primitive),
            4 => Ok(StructuralProperty::Collection),
            5 => Ok(StructuralProperty::Complex),
            other => Err(serde::de::Error::custom(format!(
                "unknown structural property {}",
                other
            ))),
        }
    }
}

/// Type information for one parameter, as sent in request metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterTypeDescriptor {
    pub type_name: String,
    pub structural_property: StructuralProperty,
}

impl ParameterTypeDescriptor {
    pub fn new(type_name: impl Into<String>, structural_property: StructuralProperty) -> Self {
        Self {
            type_name: type_name.into(),
            structural_property,
        }
    }

    fn entity(entity_type: &str) -> Self {
        Self::new(format!("mscrm.{}", entity_type), StructuralProperty::Complex)
    }
}

/// Catalog lookup for a declared kind
pub fn resolve(kind: ParameterKind) -> ParameterTypeDescriptor {
    ParameterTypeDescriptor::new(kind.type_name(), kind.structural_property())
}

/// Catalog lookup by kind name
pub fn resolve_name(kind: &str) -> Result<ParameterTypeDescriptor, RequestError> {
    Ok(resolve(kind.parse()?))
}

/// Descriptor for a value without a declared kind
///
/// Never fails: shapes that are not otherwise recognized are treated as entities.
pub fn infer(value: &ParameterValue) -> ParameterTypeDescriptor {
    match value {
        ParameterValue::String(s) if is_guid(s) => {
            ParameterTypeDescriptor::new(BASE_ENTITY_TYPE, StructuralProperty::Complex)
        }
        ParameterValue::String(_) => resolve(ParameterKind::String),
        ParameterValue::Integer(_) => resolve(ParameterKind::Integer),
        ParameterValue::Number(_) => resolve(ParameterKind::Float),
        ParameterValue::Boolean(_) => resolve(ParameterKind::Boolean),
        ParameterValue::DateTime(_) => resolve(ParameterKind::DateTime),
        ParameterValue::EntityReference(reference) => {
            ParameterTypeDescriptor::entity(&reference.entity_type)
        }
        ParameterValue::EntityCollection(_) => resolve(ParameterKind::EntityCollection),
        ParameterValue::Array(items)
            if !items.is_empty()
                && items
                    .iter()
                    .all(|item| matches!(item, ParameterValue::EntityReference(_))) =>
        {
            resolve(ParameterKind::EntityCollection)
        }
        ParameterValue::Array(items) => {
            let element = items
                .first()
                .map(|first| infer(first).type_name)
                .unwrap_or_else(|| ParameterKind::String.type_name().to_string());
            ParameterTypeDescriptor::new(
                format!("Collection({})", element),
                StructuralProperty::Collection,
            )
        }
        ParameterValue::Object(_) | ParameterValue::Null => {
            ParameterTypeDescriptor::new(BASE_ENTITY_TYPE, StructuralProperty::Complex)
        }
    }
}

/// Descriptor narrowed to a concrete entity (`mscrm.<entityType>`)
pub(crate) fn narrowed(entity_type: &str) -> ParameterTypeDescriptor {
    ParameterTypeDescriptor::entity(entity_type)
}
