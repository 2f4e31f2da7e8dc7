use std::sync::Arc;

use aqueduct_core::{QueryError, ResultLocator};
use tracing::debug;

use crate::service::{ByteStream, ObjectStore};

/// Resolves a result locator to a lazy byte stream.
///
/// Single-pass and unbuffered: chunks pass through as the store yields
/// them, so the result object is never materialized in memory. Store
/// faults are not retried here; the terminal fetch step is a one-shot read
/// and callers own any retry discipline for it.
pub struct ResultStreamAdapter<O> {
    store: Arc<O>,
}

impl<O: ObjectStore> ResultStreamAdapter<O> {
    pub fn new(store: Arc<O>) -> Self {
        Self { store }
    }

    /// Open the result object behind `locator` as a chunked byte stream.
    pub async fn open_result_stream(&self, locator: &str) -> Result<ByteStream, QueryError> {
        let locator = ResultLocator::parse(locator)?;
        debug!(
            bucket = locator.bucket(),
            key = locator.key(),
            "opening result stream"
        );
        self.store
            .get_object(locator.bucket(), locator.key())
            .await
            .map_err(|source| QueryError::ResultFetch { source })
    }
}
