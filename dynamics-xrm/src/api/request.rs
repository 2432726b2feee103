//! Request construction for the Web API execute contract
//!
//! Turns a list of typed parameters (or a name → value map) into an [`ExecuteRequest`]:
//! the merged parameter values plus the [`RequestMetadata`] the execute endpoint needs
//! to know how to send them. Building is synchronous and performs no I/O.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::catalog::{self, ParameterKind, ParameterTypeDescriptor};
use super::error::RequestError;
use super::value::{EntityRef, ParameterValue};

/// Reserved parameter name for the record an operation is bound to
pub const BOUND_PARAMETER: &str = "entity";

/// What kind of operation a request invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Action = 0,
    Function = 1,
    Crud = 2,
}

impl OperationKind {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Action => "action",
            OperationKind::Function => "function",
            OperationKind::Crud => "crud",
        }
    }
}

impl Serialize for OperationKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(OperationKind::Action),
            1 => Ok(OperationKind::Function),
            2 => Ok(OperationKind::Crud),
            other => Err(serde::de::Error::custom(format!(
                "unknown operation type {}",
                other
            ))),
        }
    }
}

/// One named, typed parameter (`{ Name, Type, Value }`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ParameterKind,
    #[serde(rename = "Value")]
    pub value: ParameterValue,
}

impl RequestParameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }
}

/// Parameters in either calling convention
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    /// Declared kinds; every value is validated against its kind
    List(Vec<RequestParameter>),
    /// No declared kinds; types are inferred from the values
    Map(BTreeMap<String, ParameterValue>),
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::List(Vec::new())
    }
}

impl From<Vec<RequestParameter>> for Parameters {
    fn from(parameters: Vec<RequestParameter>) -> Self {
        Parameters::List(parameters)
    }
}

impl From<BTreeMap<String, ParameterValue>> for Parameters {
    fn from(values: BTreeMap<String, ParameterValue>) -> Self {
        Parameters::Map(values)
    }
}

/// Metadata the execute endpoint reads to send a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    /// `"entity"` when the operation is bound to a record
    pub bound_parameter: Option<String>,
    pub operation_type: OperationKind,
    pub operation_name: String,
    pub parameter_types: HashMap<String, ParameterTypeDescriptor>,
}

/// A request ready to hand to an executor
///
/// Holds the merged parameter values keyed by name. The metadata travels alongside
/// and is never part of the values.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteRequest {
    values: BTreeMap<String, ParameterValue>,
    metadata: RequestMetadata,
}

impl ExecuteRequest {
    pub fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }

    /// Same as [`ExecuteRequest::metadata`], under the host's accessor name
    pub fn get_metadata(&self) -> RequestMetadata {
        self.metadata.clone()
    }

    pub fn values(&self) -> &BTreeMap<String, ParameterValue> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn operation_kind(&self) -> OperationKind {
        self.metadata.operation_type
    }

    pub fn operation_name(&self) -> &str {
        &self.metadata.operation_name
    }

    /// The record this request is bound to, if any
    pub fn bound_entity(&self) -> Option<&EntityRef> {
        self.metadata.bound_parameter.as_ref()?;
        self.values.get(BOUND_PARAMETER)?.as_entity_ref()
    }

    /// Values other than the bound entity
    pub fn payload(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        let bound = self.metadata.bound_parameter.is_some();
        self.values
            .iter()
            .filter(move |(name, _)| !(bound && name.as_str() == BOUND_PARAMETER))
    }

    /// Values as a JSON object, as the host sees them
    pub fn values_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Check one declared parameter against its kind and resolve its descriptor
///
/// `EntityReference` and `Entity` values narrow the type name to `mscrm.<entityType>`
/// on the returned descriptor.
pub fn validate_parameter(
    parameter: &RequestParameter,
) -> Result<ParameterTypeDescriptor, RequestError> {
    let kind = parameter.kind;
    let value = &parameter.value;

    match kind {
        ParameterKind::EntityReference | ParameterKind::Entity => match value {
            ParameterValue::EntityReference(reference) => {
                Ok(catalog::narrowed(&reference.entity_type))
            }
            _ => Err(RequestError::MalformedEntityReference {
                name: parameter.name.clone(),
                value: value.clone(),
                expected: kind,
            }),
        },
        ParameterKind::EntityCollection => {
            let well_formed = match value {
                ParameterValue::EntityCollection(_) => true,
                ParameterValue::Array(items) => items
                    .iter()
                    .all(|item| matches!(item, ParameterValue::EntityReference(_))),
                _ => false,
            };
            if well_formed {
                Ok(catalog::resolve(kind))
            } else {
                Err(RequestError::MalformedEntityCollection {
                    name: parameter.name.clone(),
                    value: value.clone(),
                })
            }
        }
        ParameterKind::DateTime => match value {
            ParameterValue::DateTime(_) => Ok(catalog::resolve(kind)),
            _ => Err(RequestError::InvalidDate {
                name: parameter.name.clone(),
                value: value.clone(),
            }),
        },
        _ => {
            if value.native_type() == Some(kind.native_type()) {
                Ok(catalog::resolve(kind))
            } else {
                Err(RequestError::TypeMismatch {
                    name: parameter.name.clone(),
                    value: value.clone(),
                    expected: kind,
                })
            }
        }
    }
}

/// Arrays that passed `EntityCollection` validation are stored as collections
fn normalize_value(kind: ParameterKind, value: ParameterValue) -> ParameterValue {
    match (kind, value) {
        (ParameterKind::EntityCollection, ParameterValue::Array(items)) => {
            ParameterValue::EntityCollection(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        ParameterValue::EntityReference(reference) => Some(reference),
                        _ => None,
                    })
                    .collect(),
            )
        }
        (_, value) => value,
    }
}

/// One parameter on its way into a request; `kind` is `None` when the type is inferred
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    kind: Option<ParameterKind>,
    value: ParameterValue,
}

impl From<RequestParameter> for Entry {
    fn from(parameter: RequestParameter) -> Self {
        Self {
            name: parameter.name,
            kind: Some(parameter.kind),
            value: parameter.value,
        }
    }
}

/// Build a request for the execute endpoint
///
/// When `bound_entity` is given it becomes the `entity` parameter (kind
/// `EntityReference`) and the metadata's `boundParameter` is set.
pub fn build_request(
    parameters: impl Into<Parameters>,
    operation_kind: OperationKind,
    operation_name: &str,
    bound_entity: Option<EntityRef>,
) -> Result<ExecuteRequest, RequestError> {
    let entries = match parameters.into() {
        Parameters::List(list) => list.into_iter().map(Entry::from).collect(),
        Parameters::Map(map) => map
            .into_iter()
            .map(|(name, value)| Entry {
                name,
                kind: None,
                value,
            })
            .collect(),
    };
    assemble(entries, operation_kind, operation_name, bound_entity)
}

/// Declared entries are validated, the rest are resolved by inference
fn assemble(
    entries: Vec<Entry>,
    operation_kind: OperationKind,
    operation_name: &str,
    bound_entity: Option<EntityRef>,
) -> Result<ExecuteRequest, RequestError> {
    if operation_name.trim().is_empty() {
        return Err(RequestError::MissingOperationName);
    }

    let mut values = BTreeMap::new();
    let mut parameter_types = HashMap::new();
    let mut seen = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.name.clone()) {
            return Err(RequestError::DuplicateParameter { name: entry.name });
        }
        match entry.kind {
            Some(kind) => {
                let parameter = RequestParameter {
                    name: entry.name,
                    kind,
                    value: entry.value,
                };
                let descriptor = validate_parameter(&parameter)?;
                parameter_types.insert(parameter.name.clone(), descriptor);
                values.insert(parameter.name, normalize_value(kind, parameter.value));
            }
            None => {
                parameter_types.insert(entry.name.clone(), catalog::infer(&entry.value));
                values.insert(entry.name, entry.value);
            }
        }
    }

    let bound_parameter = match bound_entity {
        Some(entity) => {
            if values.contains_key(BOUND_PARAMETER) {
                warn!(
                    "Parameter '{}' of {} '{}' replaced by the bound entity",
                    BOUND_PARAMETER,
                    operation_kind.label(),
                    operation_name
                );
            }
            parameter_types.insert(
                BOUND_PARAMETER.to_string(),
                catalog::narrowed(&entity.entity_type),
            );
            values.insert(
                BOUND_PARAMETER.to_string(),
                ParameterValue::EntityReference(entity),
            );
            Some(BOUND_PARAMETER.to_string())
        }
        None => None,
    };

    debug!(
        "Built {} request '{}' with {} parameter(s){}",
        operation_kind.label(),
        operation_name,
        values.len(),
        if bound_parameter.is_some() { " (bound)" } else { "" }
    );

    Ok(ExecuteRequest {
        values,
        metadata: RequestMetadata {
            bound_parameter,
            operation_type: operation_kind,
            operation_name: operation_name.to_string(),
            parameter_types,
        },
    })
}

/// Fluent builder over [`build_request`]
///
/// Declared and inferred parameters can be mixed freely; each keeps its own
/// convention regardless of the order they are added in.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    operation_kind: OperationKind,
    operation_name: String,
    entries: Vec<Entry>,
    bound_entity: Option<EntityRef>,
}

impl RequestBuilder {
    pub fn new(operation_kind: OperationKind, operation_name: impl Into<String>) -> Self {
        Self {
            operation_kind,
            operation_name: operation_name.into(),
            entries: Vec::new(),
            bound_entity: None,
        }
    }

    pub fn action(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Action, name)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Function, name)
    }

    /// CRUD message (`Create`, `Retrieve`, `Update`, `Delete`)
    pub fn crud(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Crud, name)
    }

    /// Add a parameter with a declared kind; its value is validated on build
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        kind: ParameterKind,
        value: impl Into<ParameterValue>,
    ) -> Self {
        self.entries
            .push(RequestParameter::new(name, kind, value).into());
        self
    }

    /// Add a parameter whose type is inferred from the value
    pub fn value(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            kind: None,
            value: value.into(),
        });
        self
    }

    /// Bind the operation to a record
    pub fn bound_to(mut self, entity: EntityRef) -> Self {
        self.bound_entity = Some(entity);
        self
    }

    pub fn build(self) -> Result<ExecuteRequest, RequestError> {
        assemble(
            self.entries,
            self.operation_kind,
            &self.operation_name,
            self.bound_entity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::catalog::StructuralProperty;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000001";

    fn account() -> EntityRef {
        EntityRef::new("account", ACCOUNT_ID)
    }

    #[test]
    fn test_entity_reference_narrows_type_name() {
        let request = build_request(
            vec![RequestParameter::new(
                "acc",
                ParameterKind::EntityReference,
                account(),
            )],
            OperationKind::Action,
            "new_DoThing",
            None,
        )
        .unwrap();

        let descriptor = &request.metadata().parameter_types["acc"];
        assert_eq!(descriptor.type_name, "mscrm.account");
        assert_eq!(descriptor.structural_property, StructuralProperty::Complex);
    }

    #[test]
    fn test_narrowing_is_request_local() {
        let contact = build_request(
            vec![RequestParameter::new(
                "target",
                ParameterKind::Entity,
                EntityRef::new("contact", ACCOUNT_ID),
            )],
            OperationKind::Action,
            "new_A",
            None,
        )
        .unwrap();
        let plain = build_request(
            vec![RequestParameter::new("count", ParameterKind::Integer, 1)],
            OperationKind::Action,
            "new_B",
            None,
        )
        .unwrap();

        assert_eq!(contact.metadata().parameter_types["target"].type_name, "mscrm.contact");
        assert_eq!(
            catalog::resolve(ParameterKind::Entity).type_name,
            catalog::BASE_ENTITY_TYPE
        );
        assert!(!plain.metadata().parameter_types.contains_key("target"));
    }

    #[test]
    fn test_type_mismatch_names_parameter_and_kind() {
        let err = build_request(
            vec![RequestParameter::new("x", ParameterKind::Integer, "not a number")],
            OperationKind::Function,
            "new_Calc",
            None,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("'x'"), "{}", message);
        assert!(message.contains("Integer"), "{}", message);
        assert!(message.contains("not a number"), "{}", message);
    }

    #[test]
    fn test_entity_collection_validation() {
        let ok = build_request(
            vec![RequestParameter::new(
                "coll",
                ParameterKind::EntityCollection,
                json!([{ "id": "1", "entityType": "a" }]),
            )],
            OperationKind::Action,
            "new_Bulk",
            None,
        )
        .unwrap();
        assert_eq!(
            ok.get("coll"),
            Some(&ParameterValue::EntityCollection(vec![EntityRef::new("a", "1")]))
        );

        let err = build_request(
            vec![RequestParameter::new(
                "coll",
                ParameterKind::EntityCollection,
                json!([{ "id": "1" }]),
            )],
            OperationKind::Action,
            "new_Bulk",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::MalformedEntityCollection { ref name, .. } if name == "coll"));
    }

    #[test]
    fn test_empty_entity_collection_is_accepted() {
        let request = build_request(
            vec![RequestParameter::new(
                "coll",
                ParameterKind::EntityCollection,
                ParameterValue::Array(vec![]),
            )],
            OperationKind::Action,
            "new_Bulk",
            None,
        );
        assert!(request.is_ok());
    }

    #[test]
    fn test_entity_reference_requires_id_and_entity_type() {
        let err = build_request(
            vec![RequestParameter::new(
                "acc",
                ParameterKind::EntityReference,
                json!({ "id": ACCOUNT_ID }),
            )],
            OperationKind::Action,
            "new_DoThing",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::MalformedEntityReference { .. }));

        let err = validate_parameter(&RequestParameter::new(
            "acc",
            ParameterKind::Entity,
            ParameterValue::Null,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("Entity"));
    }

    #[test]
    fn test_date_time_requires_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(validate_parameter(&RequestParameter::new("due", ParameterKind::DateTime, date)).is_ok());

        let err = validate_parameter(&RequestParameter::new(
            "due",
            ParameterKind::DateTime,
            "2024-03-01T12:00:00Z",
        ))
        .unwrap_err();
        assert!(matches!(err, RequestError::InvalidDate { .. }));
    }

    #[test]
    fn test_numeric_kinds_accept_numbers() {
        for kind in [
            ParameterKind::Integer,
            ParameterKind::Decimal,
            ParameterKind::Float,
            ParameterKind::Money,
            ParameterKind::Picklist,
        ] {
            assert!(validate_parameter(&RequestParameter::new("n", kind, 3)).is_ok());
            assert!(validate_parameter(&RequestParameter::new("n", kind, 3.5)).is_ok());
            assert!(validate_parameter(&RequestParameter::new("n", kind, true)).is_err());
        }
        assert!(validate_parameter(&RequestParameter::new("b", ParameterKind::Boolean, false)).is_ok());
        assert!(validate_parameter(&RequestParameter::new("s", ParameterKind::String, 1)).is_err());
    }

    #[test]
    fn test_bound_entity_is_injected() {
        let request = build_request(
            vec![RequestParameter::new("Comment", ParameterKind::String, "hi")],
            OperationKind::Action,
            "new_Approve",
            Some(account()),
        )
        .unwrap();

        let metadata = request.get_metadata();
        assert_eq!(metadata.bound_parameter.as_deref(), Some("entity"));
        assert_eq!(metadata.parameter_types["entity"].type_name, "mscrm.account");
        assert_eq!(request.bound_entity(), Some(&account()));
        assert!(request.values().contains_key("entity"));
        let payload: Vec<_> = request.payload().map(|(name, _)| name.as_str()).collect();
        assert_eq!(payload, vec!["Comment"]);
    }

    #[test]
    fn test_bound_entity_with_map_parameters() {
        let mut map = BTreeMap::new();
        map.insert("entity".to_string(), ParameterValue::from("overwritten"));
        let request =
            build_request(map, OperationKind::Function, "new_Score", Some(account())).unwrap();

        assert_eq!(request.get("entity"), Some(&ParameterValue::EntityReference(account())));
        assert_eq!(request.metadata().bound_parameter.as_deref(), Some("entity"));
    }

    #[test]
    fn test_unbound_request_has_no_bound_parameter() {
        let request = build_request(Vec::<RequestParameter>::new(), OperationKind::Function, "WhoAmI", None).unwrap();
        assert_eq!(request.metadata().bound_parameter, None);
        assert!(request.values().is_empty());
        assert!(request.bound_entity().is_none());
    }

    #[test]
    fn test_map_parameters_are_inferred_not_validated() {
        let mut map = BTreeMap::new();
        map.insert("Count".to_string(), ParameterValue::from(3));
        map.insert("Target".to_string(), ParameterValue::from(ACCOUNT_ID));
        map.insert("Tags".to_string(), ParameterValue::Array(vec!["a".into()]));
        let request = build_request(map, OperationKind::Action, "new_Tag", None).unwrap();

        let types = &request.metadata().parameter_types;
        assert_eq!(types["Count"].type_name, "Edm.Int32");
        assert_eq!(types["Target"].type_name, "mscrm.crmbaseentity");
        assert_eq!(types["Tags"].structural_property, StructuralProperty::Collection);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = build_request(
            vec![
                RequestParameter::new("a", ParameterKind::String, "1"),
                RequestParameter::new("a", ParameterKind::String, "2"),
            ],
            OperationKind::Action,
            "new_X",
            None,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::DuplicateParameter { name: "a".to_string() });
    }

    #[test]
    fn test_empty_operation_name_rejected() {
        let err = build_request(Vec::<RequestParameter>::new(), OperationKind::Action, " ", None).unwrap_err();
        assert_eq!(err, RequestError::MissingOperationName);
    }

    #[test]
    fn test_metadata_serializes_in_host_shape() {
        let request = RequestBuilder::function("new_Score")
            .parameter("Threshold", ParameterKind::Integer, 10)
            .bound_to(account())
            .build()
            .unwrap();

        let json = serde_json::to_value(request.metadata()).unwrap();
        assert_eq!(json["boundParameter"], "entity");
        assert_eq!(json["operationType"], 1);
        assert_eq!(json["operationName"], "new_Score");
        assert_eq!(
            json["parameterTypes"]["Threshold"],
            json!({ "typeName": "Edm.Int32", "structuralProperty": 1 })
        );
    }

    #[test]
    fn test_builder_operation_kinds() {
        assert_eq!(
            RequestBuilder::action("a").build().unwrap().operation_kind().code(),
            0
        );
        assert_eq!(
            RequestBuilder::function("f").build().unwrap().operation_kind().code(),
            1
        );
        assert_eq!(
            RequestBuilder::crud("Create").build().unwrap().operation_kind().code(),
            2
        );
    }

    #[test]
    fn test_builder_mixes_conventions() {
        let request = RequestBuilder::action("new_Mix")
            .value("Note", "free text")
            .parameter("Priority", ParameterKind::Picklist, 2)
            .build()
            .unwrap();

        let types = &request.metadata().parameter_types;
        assert_eq!(types["Note"].type_name, "Edm.String");
        assert_eq!(types["Priority"].type_name, "Edm.Int32");
    }

    #[test]
    fn test_builder_infers_values_after_declared_parameters() {
        let request = RequestBuilder::action("new_Tag")
            .parameter("Count", ParameterKind::Integer, 1)
            .value("Tags", ParameterValue::Array(vec!["a".into(), "b".into()]))
            .value("Target", ACCOUNT_ID)
            .value("Extra", json!({ "name": "x" }))
            .build()
            .unwrap();

        let types = &request.metadata().parameter_types;
        assert_eq!(types["Count"].type_name, "Edm.Int32");
        assert_eq!(types["Tags"].type_name, "Collection(Edm.String)");
        assert_eq!(types["Target"].type_name, "mscrm.crmbaseentity");
        assert_eq!(types["Target"].structural_property, StructuralProperty::Complex);
        assert_eq!(types["Extra"].structural_property, StructuralProperty::Complex);
        assert_eq!(request.get("Target"), Some(&ParameterValue::from(ACCOUNT_ID)));
    }

    #[test]
    fn test_builder_order_does_not_change_types() {
        let tags = ParameterValue::Array(vec!["a".into(), "b".into()]);
        let declared_first = RequestBuilder::action("new_Tag")
            .parameter("Count", ParameterKind::Integer, 1)
            .value("Tags", tags.clone())
            .value("Target", ACCOUNT_ID)
            .build()
            .unwrap();
        let inferred_first = RequestBuilder::action("new_Tag")
            .value("Tags", tags)
            .value("Target", ACCOUNT_ID)
            .parameter("Count", ParameterKind::Integer, 1)
            .build()
            .unwrap();

        assert_eq!(declared_first, inferred_first);
    }

    #[test]
    fn test_builder_still_validates_declared_parameters() {
        let err = RequestBuilder::action("new_Tag")
            .value("Tags", ParameterValue::Array(vec!["a".into()]))
            .parameter("Count", ParameterKind::Integer, "one")
            .build()
            .unwrap_err();
        assert!(matches!(err, RequestError::TypeMismatch { ref name, .. } if name == "Count"));
    }

    #[test]
    fn test_builder_rejects_duplicate_names() {
        let err = RequestBuilder::action("new_X")
            .parameter("a", ParameterKind::String, "1")
            .value("a", "2")
            .build()
            .unwrap_err();
        assert_eq!(err, RequestError::DuplicateParameter { name: "a".to_string() });
    }

    #[test]
    fn test_map_entity_array_resolves_to_entity_collection() {
        let mut map = BTreeMap::new();
        map.insert(
            "Targets".to_string(),
            ParameterValue::from_json(&json!([{ "id": "1", "entityType": "account" }])),
        );
        let request = build_request(map, OperationKind::Action, "new_Bulk", None).unwrap();

        let descriptor = &request.metadata().parameter_types["Targets"];
        assert_eq!(descriptor.type_name, "Collection(mscrm.crmbaseentity)");
        assert_eq!(descriptor.structural_property, StructuralProperty::Collection);
    }

    #[test]
    fn test_unknown_kind_in_host_shape_is_unsupported() {
        let err = serde_json::from_value::<RequestParameter>(json!({
            "Name": "x",
            "Type": "Currency",
            "Value": 1
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unsupported kind"), "{}", err);
    }

    #[test]
    fn test_request_parameter_deserializes_from_host_shape() {
        let parameter: RequestParameter = serde_json::from_value(json!({
            "Name": "acc",
            "Type": "EntityReference",
            "Value": { "id": ACCOUNT_ID, "entityType": "account" }
        }))
        .unwrap();
        assert_eq!(parameter.kind, ParameterKind::EntityReference);
        assert_eq!(validate_parameter(&parameter).unwrap().type_name, "mscrm.account");
    }

    #[test]
    fn test_values_json_excludes_metadata() {
        let request = RequestBuilder::action("new_X")
            .value("Flag", true)
            .build()
            .unwrap();
        assert_eq!(request.values_json(), json!({ "Flag": true }));
    }
}
