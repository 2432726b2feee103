//! Environment variable lookup
//!
//! Reads the current value of a Dataverse environment variable through the
//! `RetrieveEnvironmentVariableValue` function.

use std::collections::BTreeMap;

use crate::api::{ExecuteError, Executor, ParameterValue, execute_function};

const RETRIEVE_FUNCTION: &str = "RetrieveEnvironmentVariableValue";

/// Current value of an environment variable, by definition schema name
///
/// Returns `None` when the platform reports no value.
pub async fn environment_variable<E>(
    executor: &E,
    schema_name: &str,
) -> Result<Option<String>, ExecuteError>
where
    E: Executor + ?Sized,
{
    let mut parameters = BTreeMap::new();
    parameters.insert(
        "DefinitionSchemaName".to_string(),
        ParameterValue::from(schema_name),
    );

    let outcome = execute_function(executor, RETRIEVE_FUNCTION, parameters, None).await?;
    let value = outcome
        .json()
        .and_then(|body| body.get("Value"))
        .and_then(|value| value.as_str())
        .map(str::to_string);

    if value.is_none() {
        log::debug!("Environment variable '{}' has no value", schema_name);
    }
    Ok(value)
}
