//! HTTP executor for the Dataverse Web API
//!
//! Translates an [`ExecuteRequest`] into the OData call the platform expects:
//!
//! - actions: `POST <name>` or `POST <set>(<id>)/Microsoft.Dynamics.CRM.<name>`
//! - functions: `GET <name>(P=@P)?@P=<literal>`, bound form prefixed the same way
//! - CRUD: `Create`/`Retrieve`/`Update`/`Delete` against `<set>` / `<set>(<id>)`

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use log::debug;
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

use super::execute::{ExecuteResponse, Executor};
use super::pluralization::entity_set_name;
use super::request::{ExecuteRequest, OperationKind};
use super::value::{EntityRef, ParameterValue};
use crate::config::WebApiConfig;
use crate::guid::normalize_guid;

const NAMESPACE: &str = "Microsoft.Dynamics.CRM";

/// A planned HTTP call, relative to the service root
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCall {
    pub method: Method,
    /// Path and query (e.g., "accounts(<id>)/Microsoft.Dynamics.CRM.new_Score(...)?...")
    pub path: String,
    pub body: Option<Value>,
}

/// Work out the HTTP call for a request without sending it
pub fn plan(request: &ExecuteRequest) -> Result<HttpCall> {
    let call = match request.operation_kind() {
        OperationKind::Action => plan_action(request)?,
        OperationKind::Function => plan_function(request)?,
        OperationKind::Crud => plan_crud(request)?,
    };
    debug!("Planned {} {}", call.method, call.path);
    Ok(call)
}

fn record_path(entity: &EntityRef) -> Result<String> {
    let id = normalize_guid(&entity.id)
        .with_context(|| format!("Bound {} has an invalid id", entity.entity_type))?;
    Ok(format!("{}({})", entity_set_name(&entity.entity_type), id))
}

fn bound_prefix(request: &ExecuteRequest) -> Result<String> {
    match request.bound_entity() {
        Some(entity) => Ok(format!("{}/{}.", record_path(entity)?, NAMESPACE)),
        None => Ok(String::new()),
    }
}

fn payload_body(request: &ExecuteRequest) -> Value {
    let body: Map<String, Value> = request
        .payload()
        .map(|(name, value)| (name.clone(), wire_value(value)))
        .collect();
    Value::Object(body)
}

fn plan_action(request: &ExecuteRequest) -> Result<HttpCall> {
    Ok(HttpCall {
        method: Method::POST,
        path: format!("{}{}", bound_prefix(request)?, request.operation_name()),
        body: Some(payload_body(request)),
    })
}

fn plan_function(request: &ExecuteRequest) -> Result<HttpCall> {
    let mut aliases = Vec::new();
    let mut query = Vec::new();
    for (name, value) in request.payload() {
        aliases.push(format!("{}=@{}", name, name));
        query.push(format!(
            "@{}={}",
            name,
            urlencoding::encode(&function_literal(value))
        ));
    }

    let mut path = format!(
        "{}{}({})",
        bound_prefix(request)?,
        request.operation_name(),
        aliases.join(",")
    );
    if !query.is_empty() {
        path.push('?');
        path.push_str(&query.join("&"));
    }

    Ok(HttpCall {
        method: Method::GET,
        path,
        body: None,
    })
}

fn plan_crud(request: &ExecuteRequest) -> Result<HttpCall> {
    let entity = request.bound_entity().with_context(|| {
        format!(
            "CRUD message '{}' needs a bound entity",
            request.operation_name()
        )
    })?;

    match request.operation_name() {
        "Create" => Ok(HttpCall {
            method: Method::POST,
            path: entity_set_name(&entity.entity_type),
            body: Some(payload_body(request)),
        }),
        "Retrieve" => Ok(HttpCall {
            method: Method::GET,
            path: record_path(entity)?,
            body: None,
        }),
        "Update" => Ok(HttpCall {
            method: Method::PATCH,
            path: record_path(entity)?,
            body: Some(payload_body(request)),
        }),
        "Delete" => Ok(HttpCall {
            method: Method::DELETE,
            path: record_path(entity)?,
            body: None,
        }),
        other => anyhow::bail!("Unsupported CRUD message '{}'", other),
    }
}

fn wire_reference(reference: &EntityRef) -> Value {
    let mut object = Map::new();
    object.insert(
        "@odata.type".to_string(),
        Value::String(format!("{}.{}", NAMESPACE, reference.entity_type)),
    );
    object.insert(
        format!("{}id", reference.entity_type),
        Value::String(reference.id.clone()),
    );
    Value::Object(object)
}

/// JSON form of a value in a request body
pub fn wire_value(value: &ParameterValue) -> Value {
    match value {
        ParameterValue::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ParameterValue::EntityReference(reference) => wire_reference(reference),
        ParameterValue::EntityCollection(references) => {
            Value::Array(references.iter().map(wire_reference).collect())
        }
        ParameterValue::Array(items) => Value::Array(items.iter().map(wire_value).collect()),
        other => other.to_json(),
    }
}

/// OData literal for a function parameter alias
pub fn function_literal(value: &ParameterValue) -> String {
    match value {
        ParameterValue::Null => "null".to_string(),
        ParameterValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        ParameterValue::Integer(i) => i.to_string(),
        ParameterValue::Number(n) => n.to_string(),
        ParameterValue::Boolean(b) => b.to_string(),
        ParameterValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        ParameterValue::EntityReference(reference) => json!({
            "@odata.id": format!(
                "{}({})",
                entity_set_name(&reference.entity_type),
                reference.id.trim_matches(|c| c == '{' || c == '}')
            )
        })
        .to_string(),
        other => wire_value(other).to_string(),
    }
}

/// [`Executor`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct WebApiExecutor {
    client: Client,
    config: WebApiConfig,
}

impl WebApiExecutor {
    pub fn new(config: WebApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &WebApiConfig {
        &self.config
    }
}

#[async_trait]
impl Executor for WebApiExecutor {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse> {
        let call = plan(request)?;
        let url = format!("{}{}", self.config.service_root(), call.path);

        let mut builder = self
            .client
            .request(call.method.clone(), &url)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0");
        if let Some(token) = &self.config.access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &call.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} {} failed", call.method, url))?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        debug!("{} {} -> {}", call.method, url, status);

        Ok(ExecuteResponse {
            status,
            headers,
            body,
        })
    }
}
