use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use aqueduct_core::{
    ExecutionRecord, ExecutionStatus, QueryConfig, QueryError, RetryPolicy, ServiceFault,
};
use tracing::{debug, warn};

use crate::{
    gate::{AdmissionGate, AdmissionPermit},
    service::{QueryService, StartQueryRequest},
};

const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 5;

/// Manufactured reasons for terminal states the service left unexplained.
const DEFAULT_FAILURE_REASON: &str = "query failed without a state change reason";
const DEFAULT_CANCEL_REASON: &str = "query was cancelled";

/// Bootstrap settings for a [`QueryController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Service region; required, non-empty.
    pub region: String,
    /// Maximum concurrently active lifecycles.
    pub max_concurrent_queries: usize,
}

impl ControllerSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
        }
    }

    pub fn with_max_concurrent_queries(mut self, max_concurrent_queries: usize) -> Self {
        self.max_concurrent_queries = max_concurrent_queries;
        self
    }
}

/// Opaque handle to one submitted query lifecycle.
///
/// The handle owns this lifecycle's admission slot: the slot frees eagerly
/// when a poll observes a terminal state, and on drop for every other exit
/// path. A handle is never reused for a different logical query.
#[derive(Debug)]
pub struct QueryHandle {
    execution_id: String,
    slot: Mutex<Option<AdmissionPermit>>,
}

impl QueryHandle {
    fn new(execution_id: String, permit: AdmissionPermit) -> Self {
        Self {
            execution_id,
            slot: Mutex::new(Some(permit)),
        }
    }

    /// Remote execution id backing this handle.
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    fn release_slot(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.take();
        }
    }
}

/// Drives query lifecycles: submit, poll, cancel, metadata fetch.
///
/// Holds no per-query state beyond the handles it returns; every poll
/// re-derives the execution state from the service.
pub struct QueryController<S> {
    service: Arc<S>,
    gate: AdmissionGate,
    settings: ControllerSettings,
}

impl<S: QueryService> QueryController<S> {
    /// Validate bootstrap settings and build a controller.
    ///
    /// Fails fast with a configuration error before any lifecycle begins.
    pub fn new(service: Arc<S>, settings: ControllerSettings) -> Result<Self, QueryError> {
        if settings.region.trim().is_empty() {
            return Err(QueryError::Configuration(
                "region must not be empty".to_owned(),
            ));
        }

        let gate = AdmissionGate::new(settings.max_concurrent_queries);
        Ok(Self {
            service,
            gate,
            settings,
        })
    }

    pub fn region(&self) -> &str {
        &self.settings.region
    }

    /// Gate bounding this controller's concurrent lifecycles.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Submit a query for execution.
    ///
    /// Waits for an admission slot, then issues the start call, retrying
    /// transient faults under the configured policy. Every retry is a fresh
    /// remote call: a transient failure after the service already committed
    /// can leave a duplicate execution behind. Callers that need
    /// exactly-once must deduplicate downstream.
    pub async fn submit(
        &self,
        query_text: &str,
        config: &QueryConfig,
    ) -> Result<QueryHandle, QueryError> {
        config.validate()?;

        let permit = self.gate.acquire().await;
        let request = StartQueryRequest {
            query: query_text.to_owned(),
            output_location: config.output_location.clone(),
            database: config.database().to_owned(),
            work_group: config.work_group().to_owned(),
            encryption: config.encryption.clone(),
        };

        let service = &self.service;
        let request_ref = &request;
        let execution_id = retry_remote(&config.retry, "start_query_execution", move || {
            service.start_query_execution(request_ref)
        })
        .await
        .map_err(|source| QueryError::Submission { source })?;

        debug!(execution_id = %execution_id, work_group = %request.work_group, "query submitted");
        Ok(QueryHandle::new(execution_id, permit))
    }

    /// Poll one lifecycle.
    ///
    /// `Ok(true)` means the query succeeded; `Ok(false)` means it is still
    /// in flight. Terminal failures surface as errors, and any terminal
    /// outcome frees the admission slot. This never sleeps internally; the
    /// polling cadence is the caller's concern.
    pub async fn check_status(
        &self,
        handle: &QueryHandle,
        config: &QueryConfig,
    ) -> Result<bool, QueryError> {
        let record = self.fetch_execution_metadata(handle, config).await?;

        match record.status {
            ExecutionStatus::Queued | ExecutionStatus::Running => Ok(false),
            ExecutionStatus::Succeeded => {
                debug!(execution_id = handle.execution_id(), "query succeeded");
                handle.release_slot();
                Ok(true)
            }
            ExecutionStatus::Failed => {
                handle.release_slot();
                Err(QueryError::Execution {
                    reason: record
                        .state_change_reason
                        .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_owned()),
                })
            }
            ExecutionStatus::Cancelled => {
                handle.release_slot();
                Err(QueryError::Cancelled {
                    reason: record
                        .state_change_reason
                        .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_owned()),
                })
            }
            ExecutionStatus::Unknown(state) => {
                warn!(
                    execution_id = handle.execution_id(),
                    state = %state,
                    "unrecognized execution state"
                );
                handle.release_slot();
                Err(QueryError::UnknownState { state })
            }
        }
    }

    /// Ask the service to stop an execution.
    ///
    /// Stopping an already-terminal query is not a controller-level error;
    /// whatever the service answers for a repeated stop passes through.
    /// Retries use the same doubling schedule as every other operation.
    pub async fn cancel(&self, handle: &QueryHandle, config: &QueryConfig) -> Result<(), QueryError> {
        let service = &self.service;
        let execution_id = handle.execution_id();
        retry_remote(&config.retry, "stop_query_execution", move || {
            service.stop_query_execution(execution_id)
        })
        .await
        .map_err(|source| QueryError::Cancellation { source })
    }

    /// Fetch current execution metadata, classified at the boundary.
    ///
    /// Purely a read; transient faults retry unconditionally under the
    /// configured policy.
    pub async fn fetch_execution_metadata(
        &self,
        handle: &QueryHandle,
        config: &QueryConfig,
    ) -> Result<ExecutionRecord, QueryError> {
        let service = &self.service;
        let execution_id = handle.execution_id();
        let metadata = retry_remote(&config.retry, "get_query_execution", move || {
            service.get_query_execution(execution_id)
        })
        .await
        .map_err(|source| QueryError::MetadataFetch { source })?;

        Ok(ExecutionRecord::from_raw_state(
            &metadata.state,
            metadata.state_change_reason,
        ))
    }
}

/// Drive one remote call to completion under a backoff policy.
///
/// Owns the attempt counter for this outer operation; the counter starts at
/// zero and is discarded at the terminal outcome. The wait suspends the
/// caller's future without occupying a worker thread.
async fn retry_remote<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut call: F,
) -> Result<T, ServiceFault>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceFault>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(fault) if policy.should_retry(&fault, attempt) => {
                let wait = policy.wait_for_attempt(attempt);
                debug!(
                    operation,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    code = %fault.code,
                    "transient service fault, retrying"
                );
                tokio::time::sleep(wait).await;
                attempt = attempt.saturating_add(1);
            }
            Err(fault) => {
                warn!(operation, attempt, code = %fault.code, "remote call failed");
                return Err(fault);
            }
        }
    }
}
