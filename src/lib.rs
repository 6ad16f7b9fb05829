//! Call named, parameterized requests against configurable environments.
//!
//! Requests and environments are plain json records. A placeholder in a
//! request's endpoint or body that names another request is filled by calling
//! that request first, so a single call may run a whole chain of them.

pub mod chain;
pub mod environments;
pub mod error;
pub mod executor;
pub mod fs;
pub mod requests;
pub mod template;
pub mod types;

pub use chain::CallChain;
pub use environments::{EnvironmentRegistry, DEFAULT_ENVIRONMENT};
pub use error::{Error, ErrorKind, Result};
pub use executor::{Executor, HttpTransport, OutgoingRequest, Payload, RawResponse, Transport};
pub use requests::RequestCatalog;
pub use types::{Environment, Method, RequestDefinition};
