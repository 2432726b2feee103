//! Typed helpers for Dynamics 365 / Dataverse client scripting
//!
//! The heart of the crate is [`api`]: it turns loosely-typed parameters into the
//! metadata-carrying request the Web API execute contract expects, validating each
//! value against its declared kind. Around it sit small helpers for form fields,
//! GUIDs, lookup view layouts and environment variables.
//!
//! ```ignore
//! use dynamics_xrm::api::{EntityRef, ParameterKind, RequestBuilder, WebApiExecutor, execute};
//! use dynamics_xrm::config::WebApiConfig;
//!
//! let executor = WebApiExecutor::new(WebApiConfig::from_env()?)?;
//! let request = RequestBuilder::action("new_Approve")
//!     .parameter("Comment", ParameterKind::String, "Looks good")
//!     .bound_to(EntityRef::new("account", account_id))
//!     .build()?;
//! let outcome = execute(&executor, &request).await?;
//! ```

pub mod api;
pub mod config;
pub mod environment;
pub mod fetchxml;
pub mod form;
pub mod guid;

pub use api::{
    EntityRef, ExecuteError, ExecuteOutcome, ExecuteRequest, Executor, OperationKind,
    ParameterKind, ParameterValue, RequestBuilder, RequestError, RequestParameter,
    WebApiExecutor,
};
pub use config::WebApiConfig;
pub use environment::environment_variable;
pub use guid::normalize_guid;
