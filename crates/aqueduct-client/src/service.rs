use aqueduct_core::{EncryptionConfig, ServiceFault};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Lazy, single-pass sequence of result bytes.
///
/// Finite (bounded by the object size) and not restartable; open a new
/// stream to read again.
pub type ByteStream = BoxStream<'static, Result<Bytes, ServiceFault>>;

/// One query submission as handed to the remote service.
///
/// Defaults are already resolved; the service sees concrete values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartQueryRequest {
    /// SQL text, passed through unparsed.
    pub query: String,
    /// Object-store URI receiving the results.
    pub output_location: String,
    /// Target database.
    pub database: String,
    /// Work group the query runs under.
    pub work_group: String,
    /// Optional result encryption settings.
    pub encryption: Option<EncryptionConfig>,
}

/// Raw execution metadata as returned by the remote service.
///
/// The state is an open string set; the controller classifies it at the
/// boundary via [`aqueduct_core::ExecutionRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetadata {
    /// Raw remote state string.
    pub state: String,
    /// Service-provided reason for the latest state change, when any.
    pub state_change_reason: Option<String>,
}

impl ExecutionMetadata {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            state_change_reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.state_change_reason = Some(reason.into());
        self
    }
}

/// Narrow contract over the managed query-execution service.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Begin executing a query; returns the remote execution id.
    async fn start_query_execution(
        &self,
        request: &StartQueryRequest,
    ) -> Result<String, ServiceFault>;

    /// Fetch current execution metadata for one execution id.
    async fn get_query_execution(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionMetadata, ServiceFault>;

    /// Ask the service to stop an execution.
    async fn stop_query_execution(&self, execution_id: &str) -> Result<(), ServiceFault>;
}

/// Narrow contract over the object store holding query results.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open the object at `bucket`/`key` as a chunked byte stream.
    ///
    /// Faults are not retried by this client.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, ServiceFault>;
}
