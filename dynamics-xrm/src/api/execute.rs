//! Execute orchestration
//!
//! `execute_action`, `execute_function` and `execute_crud` build a request with a fixed
//! operation kind, hand it to an [`Executor`] and unwrap the response.

use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;

use super::error::ExecuteError;
use super::request::{ExecuteRequest, OperationKind, Parameters, build_request};
use super::value::EntityRef;

/// Raw response from the execute endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecuteResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ExecuteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Unwrapped result of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    /// The body parsed as JSON
    Json(Value),
    /// The body was empty or not JSON (e.g. `204 No Content`)
    Raw(ExecuteResponse),
}

impl ExecuteOutcome {
    pub fn json(&self) -> Option<&Value> {
        match self {
            ExecuteOutcome::Json(value) => Some(value),
            ExecuteOutcome::Raw(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ExecuteOutcome::Json(value) => Some(value),
            ExecuteOutcome::Raw(_) => None,
        }
    }
}

/// Something that can send an [`ExecuteRequest`] to the platform
///
/// [`crate::api::WebApiExecutor`] talks to the Web API over HTTP; tests use mocks.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: &ExecuteRequest) -> anyhow::Result<ExecuteResponse>;
}

/// Send a built request and unwrap the response
///
/// Non-success statuses come back as [`ExecuteError::Http`].
pub async fn execute<E>(executor: &E, request: &ExecuteRequest) -> Result<ExecuteOutcome, ExecuteError>
where
    E: Executor + ?Sized,
{
    info!(
        "Executing {} '{}'",
        request.operation_kind().label(),
        request.operation_name()
    );

    let response = executor
        .execute(request)
        .await
        .map_err(ExecuteError::Transport)?;

    if !response.ok() {
        warn!(
            "{} '{}' returned HTTP {}",
            request.operation_kind().label(),
            request.operation_name(),
            response.status
        );
        return Err(ExecuteError::Http {
            status: response.status,
            body: response.body,
        });
    }

    match response.json() {
        Ok(value) => Ok(ExecuteOutcome::Json(value)),
        Err(_) => Ok(ExecuteOutcome::Raw(response)),
    }
}

async fn build_and_execute<E>(
    executor: &E,
    operation_kind: OperationKind,
    name: &str,
    parameters: Parameters,
    bound_entity: Option<EntityRef>,
) -> Result<ExecuteOutcome, ExecuteError>
where
    E: Executor + ?Sized,
{
    let request = build_request(parameters, operation_kind, name, bound_entity)?;
    execute(executor, &request).await
}

/// Invoke a custom or platform action
pub async fn execute_action<E>(
    executor: &E,
    name: &str,
    parameters: impl Into<Parameters>,
    bound_entity: Option<EntityRef>,
) -> Result<ExecuteOutcome, ExecuteError>
where
    E: Executor + ?Sized,
{
    build_and_execute(executor, OperationKind::Action, name, parameters.into(), bound_entity).await
}

/// Invoke a function
pub async fn execute_function<E>(
    executor: &E,
    name: &str,
    parameters: impl Into<Parameters>,
    bound_entity: Option<EntityRef>,
) -> Result<ExecuteOutcome, ExecuteError>
where
    E: Executor + ?Sized,
{
    build_and_execute(executor, OperationKind::Function, name, parameters.into(), bound_entity)
        .await
}

/// Run a CRUD message (`Create`, `Retrieve`, `Update`, `Delete`)
pub async fn execute_crud<E>(
    executor: &E,
    name: &str,
    parameters: impl Into<Parameters>,
    bound_entity: Option<EntityRef>,
) -> Result<ExecuteOutcome, ExecuteError>
where
    E: Executor + ?Sized,
{
    build_and_execute(executor, OperationKind::Crud, name, parameters.into(), bound_entity).await
}


#[cfg(test)]
mod tests {
    use super::mock::MockExecutor;
    use super::*;
    use crate::api::catalog::ParameterKind;
    use crate::api::request::RequestParameter;
    use serde_json::json;

    fn account() -> EntityRef {
        EntityRef::new("account", "00000000-0000-0000-0000-000000000001")
    }

    #[tokio::test]
    async fn test_operation_kinds_per_helper() {
        let mock = MockExecutor::default();

        execute_action(&mock, "new_A", Vec::<RequestParameter>::new(), None)
            .await
            .unwrap();
        execute_function(&mock, "new_F", Vec::<RequestParameter>::new(), None)
            .await
            .unwrap();
        execute_crud(&mock, "Retrieve", Vec::<RequestParameter>::new(), Some(account()))
            .await
            .unwrap();

        let kinds: Vec<u8> = mock
            .requests()
            .iter()
            .map(|r| r.metadata().operation_type.code())
            .collect();
        assert_eq!(kinds, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_json_body_is_parsed() {
        let mock = MockExecutor::responding(ExecuteResponse::new(200, r#"{"Value":"x"}"#));
        let outcome = execute_function(&mock, "new_F", Vec::<RequestParameter>::new(), None)
            .await
            .unwrap();
        assert_eq!(outcome, ExecuteOutcome::Json(json!({ "Value": "x" })));
    }

    #[tokio::test]
    async fn test_empty_body_falls_back_to_raw_response() {
        let mock = MockExecutor::responding(ExecuteResponse::new(204, ""));
        let outcome = execute_action(&mock, "new_A", Vec::<RequestParameter>::new(), None)
            .await
            .unwrap();
        match outcome {
            ExecuteOutcome::Raw(response) => assert_eq!(response.status, 204),
            other => panic!("expected raw response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_ok_response_is_an_error() {
        let mock = MockExecutor::responding(ExecuteResponse::new(
            400,
            r#"{"error":{"message":"bad"}}"#,
        ));
        let err = execute_action(&mock, "new_A", Vec::<RequestParameter>::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("bad"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let mock = MockExecutor::failing("connection refused");
        let err = execute_function(&mock, "new_F", Vec::<RequestParameter>::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_invalid_parameters_never_reach_executor() {
        let mock = MockExecutor::default();
        let err = execute_action(
            &mock,
            "new_A",
            vec![RequestParameter::new("x", ParameterKind::Integer, "nope")],
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecuteError::Request(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_executor_behind_trait_object() {
        let mock = MockExecutor::default();
        let executor: &dyn Executor = &mock;
        execute_action(executor, "new_A", Vec::<RequestParameter>::new(), Some(account()))
            .await
            .unwrap();
        let requests = mock.requests();
        assert_eq!(requests[0].bound_entity(), Some(&account()));
    }
}
