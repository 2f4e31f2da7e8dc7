//! Scripted in-memory doubles for the remote service contracts.
//!
//! Used by this crate's tests and the smoke binary, and kept public so
//! downstream consumers can exercise the controller without a live
//! service. Each operation pops the next queued response; an empty queue
//! answers with a benign default.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use aqueduct_core::{FaultCategory, ServiceFault};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use uuid::Uuid;

use crate::service::{ByteStream, ExecutionMetadata, ObjectStore, QueryService, StartQueryRequest};

/// Chunk size used when serving stored objects.
const STREAM_CHUNK_BYTES: usize = 64;

/// Scripted query service with per-operation response queues and call
/// counters.
///
/// Defaults when a queue is empty: start generates a fresh execution id,
/// metadata reports `SUCCEEDED`, stop succeeds.
#[derive(Debug, Default)]
pub struct ScriptedQueryService {
    start_responses: Mutex<VecDeque<Result<String, ServiceFault>>>,
    metadata_responses: Mutex<VecDeque<Result<ExecutionMetadata, ServiceFault>>>,
    stop_responses: Mutex<VecDeque<Result<(), ServiceFault>>>,
    last_request: Mutex<Option<StartQueryRequest>>,
    start_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl ScriptedQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next start-query response.
    pub fn push_start(&self, response: Result<String, ServiceFault>) {
        self.start_responses
            .lock()
            .expect("lock poisoned")
            .push_back(response);
    }

    /// Queue the next metadata response.
    pub fn push_metadata(&self, response: Result<ExecutionMetadata, ServiceFault>) {
        self.metadata_responses
            .lock()
            .expect("lock poisoned")
            .push_back(response);
    }

    /// Queue the next stop response.
    pub fn push_stop(&self, response: Result<(), ServiceFault>) {
        self.stop_responses
            .lock()
            .expect("lock poisoned")
            .push_back(response);
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Most recent start request, as seen by the service.
    pub fn last_request(&self) -> Option<StartQueryRequest> {
        self.last_request.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl QueryService for ScriptedQueryService {
    async fn start_query_execution(
        &self,
        request: &StartQueryRequest,
    ) -> Result<String, ServiceFault> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("lock poisoned") = Some(request.clone());
        self.start_responses
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(format!("exec-{}", Uuid::new_v4())))
    }

    async fn get_query_execution(
        &self,
        _execution_id: &str,
    ) -> Result<ExecutionMetadata, ServiceFault> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.metadata_responses
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(ExecutionMetadata::new("SUCCEEDED")))
    }

    async fn stop_query_execution(&self, _execution_id: &str) -> Result<(), ServiceFault> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stop_responses
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// In-memory object store serving fixed objects as chunked streams.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object at `bucket`/`key`.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.objects
            .lock()
            .expect("lock poisoned")
            .insert((bucket.to_owned(), key.to_owned()), data.into());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream, ServiceFault> {
        let data = self
            .objects
            .lock()
            .expect("lock poisoned")
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
            .ok_or_else(|| {
                ServiceFault::new(
                    FaultCategory::InvalidRequest,
                    "NoSuchKey",
                    format!("no object at {bucket}/{key}"),
                )
            })?;

        let chunks: Vec<Result<Bytes, ServiceFault>> = data
            .chunks(STREAM_CHUNK_BYTES)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}
