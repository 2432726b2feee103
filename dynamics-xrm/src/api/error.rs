//! Errors raised while building and executing Web API requests

use super::catalog::ParameterKind;
use super::value::ParameterValue;

/// Request construction failure
///
/// These are usage errors: the same input will fail the same way every time,
/// so callers should fix the parameters rather than retry.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// Kind name is not part of the type catalog
    UnsupportedKind { kind: String },
    /// Value's runtime type does not match the declared kind
    TypeMismatch {
        name: String,
        value: ParameterValue,
        expected: ParameterKind,
    },
    /// `EntityReference`/`Entity` value without both `id` and `entityType`
    MalformedEntityReference {
        name: String,
        value: ParameterValue,
        expected: ParameterKind,
    },
    /// `EntityCollection` that is not an array of `{ id, entityType }` objects
    MalformedEntityCollection { name: String, value: ParameterValue },
    /// `DateTime` value that is not a date
    InvalidDate { name: String, value: ParameterValue },
    /// Same parameter name supplied twice
    DuplicateParameter { name: String },
    /// Operation name is empty
    MissingOperationName,
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::UnsupportedKind { kind } => {
                write!(f, "unsupported kind '{}'", kind)
            }
            RequestError::TypeMismatch {
                name,
                value,
                expected,
            } => write!(
                f,
                "Parameter '{}' has value {} which is not a valid {} (expected a {})",
                name,
                value,
                expected,
                expected.native_type()
            ),
            RequestError::MalformedEntityReference {
                name,
                value,
                expected,
            } => write!(
                f,
                "Parameter '{}' has value {} which is not a valid {} (expected an object with 'id' and 'entityType')",
                name, value, expected
            ),
            RequestError::MalformedEntityCollection { name, value } => write!(
                f,
                "Parameter '{}' has value {} which is not a valid {} (expected an array of objects with 'id' and 'entityType')",
                name,
                value,
                ParameterKind::EntityCollection
            ),
            RequestError::InvalidDate { name, value } => write!(
                f,
                "Parameter '{}' has value {} which is not a valid {} (expected a date)",
                name,
                value,
                ParameterKind::DateTime
            ),
            RequestError::DuplicateParameter { name } => {
                write!(f, "Parameter '{}' is supplied more than once", name)
            }
            RequestError::MissingOperationName => {
                write!(f, "Operation name must not be empty")
            }
        }
    }
}

impl std::error::Error for RequestError {}

/// Failure of an execute call
#[derive(Debug)]
pub enum ExecuteError {
    /// The request could not be built
    Request(RequestError),
    /// The transport failed before a response arrived
    Transport(anyhow::Error),
    /// The platform answered with a non-success status
    Http { status: u16, body: String },
}

impl std::fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::Request(e) => write!(f, "Invalid request: {}", e),
            ExecuteError::Transport(e) => write!(f, "Execute failed: {:#}", e),
            ExecuteError::Http { status, body } => {
                if body.is_empty() {
                    write!(f, "Execute returned HTTP {}", status)
                } else {
                    write!(f, "Execute returned HTTP {}: {}", status, body)
                }
            }
        }
    }
}

impl std::error::Error for ExecuteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecuteError::Request(e) => Some(e),
            ExecuteError::Transport(e) => Some(&**e),
            ExecuteError::Http { .. } => None,
        }
    }
}

impl From<RequestError> for ExecuteError {
    fn from(error: RequestError) -> Self {
        ExecuteError::Request(error)
    }
}

impl ExecuteError {
    /// HTTP status, when the platform answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ExecuteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
