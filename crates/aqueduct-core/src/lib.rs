//! Core contracts for the aqueduct query lifecycle client.
//!
//! This crate defines the backoff policy, fault taxonomy, per-call
//! configuration, execution-status model, and result locator parsing shared
//! by the client crate and its consumers. Everything here is pure
//! computation; the async machinery lives in `aqueduct-client`.

/// Per-call query configuration and call-time defaults.
pub mod config;
/// Fault taxonomy and operation-level errors.
pub mod error;
/// Result locator decomposition.
pub mod locator;
/// Backoff policy used by retry loops.
pub mod retry;
/// Execution status model and boundary mapping.
pub mod status;

pub use config::{DEFAULT_DATABASE, DEFAULT_WORK_GROUP, EncryptionConfig, QueryConfig};
pub use error::{FaultCategory, QueryError, ServiceFault, classify_fault};
pub use locator::{LocatorError, ResultLocator};
pub use retry::RetryPolicy;
pub use status::{ExecutionRecord, ExecutionStatus};
