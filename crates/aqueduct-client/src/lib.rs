//! Query lifecycle client for a managed, asynchronous SQL query service.
//!
//! This crate owns the submit/poll/cancel lifecycle controller, the
//! admission gate bounding concurrent lifecycles, the result stream
//! adapter, and the narrow contracts for the two remote collaborators
//! (query execution and object storage).

/// Query lifecycle controller and handles.
pub mod controller;
/// Admission gate bounding concurrent lifecycles.
pub mod gate;
/// Result stream adapter over the object store.
pub mod results;
/// Remote service contracts.
pub mod service;
/// In-memory doubles for the service contracts.
pub mod testing;

pub use controller::{ControllerSettings, QueryController, QueryHandle};
pub use gate::{AdmissionGate, AdmissionPermit};
pub use results::ResultStreamAdapter;
pub use service::{ByteStream, ExecutionMetadata, ObjectStore, QueryService, StartQueryRequest};
