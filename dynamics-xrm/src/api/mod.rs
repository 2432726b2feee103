//! Dataverse Web API request engine
//!
//! Builds strongly-typed execute requests for actions, functions and CRUD messages
//! from loosely-typed parameters, and sends them through an [`Executor`].

pub mod catalog;
pub mod error;
pub mod execute;
pub mod pluralization;
pub mod request;
pub mod value;
pub mod webapi;

pub use catalog::{
    ParameterKind, ParameterTypeDescriptor, StructuralProperty, infer, resolve, resolve_name,
};
pub use error::{ExecuteError, RequestError};
pub use execute::{
    ExecuteOutcome, ExecuteResponse, Executor, execute, execute_action, execute_crud,
    execute_function,
};
pub use request::{
    BOUND_PARAMETER, ExecuteRequest, OperationKind, Parameters, RequestBuilder, RequestMetadata,
    RequestParameter, build_request, validate_parameter,
};
pub use value::{EntityRef, NativeType, ParameterValue};
pub use webapi::{HttpCall, WebApiExecutor, plan};
