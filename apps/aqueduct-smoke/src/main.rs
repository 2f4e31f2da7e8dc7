//! End-to-end smoke run of the query lifecycle against in-memory services.
//!
//! Exercises the full surface: a throttled submission that recovers under
//! backoff, a queued/running polling phase, and a streamed result fetch.

mod config;
mod logging;

use std::{error::Error, process, sync::Arc, time::Duration};

use aqueduct_client::{
    ControllerSettings, ExecutionMetadata, QueryController, ResultStreamAdapter,
    testing::{MemoryObjectStore, ScriptedQueryService},
};
use aqueduct_core::{QueryConfig, ResultLocator, ServiceFault};
use config::SmokeConfig;
use futures::StreamExt;
use tracing::info;

const SMOKE_QUERY: &str = "SELECT region, COUNT(*) AS requests FROM access_log GROUP BY region";
const SMOKE_RESULT: &[u8] = b"region,requests\neu-west-1,1204\nus-east-1,5731\n";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() {
    logging::init();

    let smoke = match SmokeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(smoke).await {
        eprintln!("Smoke run failed: {err}");
        process::exit(1);
    }
}

async fn run(smoke: SmokeConfig) -> Result<(), Box<dyn Error>> {
    let service = Arc::new(ScriptedQueryService::new());
    // One throttled start plus a queued/running phase, so the retry and
    // polling paths both run before success.
    service.push_start(Err(ServiceFault::throttled("simulated throttle")));
    service.push_metadata(Ok(ExecutionMetadata::new("QUEUED")));
    service.push_metadata(Ok(ExecutionMetadata::new("RUNNING")));
    service.push_metadata(Ok(ExecutionMetadata::new("SUCCEEDED")));

    let controller = QueryController::new(
        service,
        ControllerSettings::new(smoke.region.clone())
            .with_max_concurrent_queries(smoke.max_concurrent_queries),
    )?;

    let query_config = QueryConfig {
        retry: smoke.retry,
        ..QueryConfig::new(smoke.output_location.clone())
    };

    let handle = controller.submit(SMOKE_QUERY, &query_config).await?;
    info!(execution_id = handle.execution_id(), "query submitted");

    while !controller.check_status(&handle, &query_config).await? {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    info!(execution_id = handle.execution_id(), "query reached success");

    let result_uri = format!(
        "{}{}.csv",
        with_trailing_slash(&smoke.output_location),
        handle.execution_id()
    );
    let store = Arc::new(MemoryObjectStore::new());
    let locator = ResultLocator::parse(&result_uri)?;
    store.put_object(locator.bucket(), locator.key(), SMOKE_RESULT);

    let adapter = ResultStreamAdapter::new(store);
    let mut stream = adapter.open_result_stream(&result_uri).await?;
    let mut total_bytes = 0usize;
    while let Some(chunk) = stream.next().await {
        total_bytes += chunk?.len();
    }

    info!(total_bytes, result_uri = %result_uri, "result stream drained");
    println!("Query lifecycle completed; streamed {total_bytes} result bytes.");
    Ok(())
}

fn with_trailing_slash(value: &str) -> String {
    if value.ends_with('/') {
        value.to_owned()
    } else {
        format!("{value}/")
    }
}
