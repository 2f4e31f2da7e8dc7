use serde::{Deserialize, Serialize};

use crate::{error::QueryError, retry::RetryPolicy};

/// Database used when a call does not name one.
pub const DEFAULT_DATABASE: &str = "default";
/// Work group used when a call does not name one.
pub const DEFAULT_WORK_GROUP: &str = "primary";

/// Result encryption settings forwarded with a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptionConfig {
    /// Encryption option, for example `SSE_S3` or `SSE_KMS`.
    pub option: String,
    /// KMS key id; required by the service for KMS-backed options.
    pub kms_key_id: Option<String>,
}

/// Per-call query configuration.
///
/// Immutable for the duration of a call; unset fields resolve to their
/// defaults through the accessors instead of being written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryConfig {
    /// Object-store URI receiving query results. Required, non-empty.
    pub output_location: String,
    /// Target database; `"default"` when unset.
    pub database: Option<String>,
    /// Work group the query runs under; `"primary"` when unset.
    pub work_group: Option<String>,
    /// Optional result encryption settings.
    pub encryption: Option<EncryptionConfig>,
    /// Backoff tuning for this lifecycle's remote calls.
    pub retry: RetryPolicy,
}

impl QueryConfig {
    /// Minimal configuration with everything else defaulted.
    pub fn new(output_location: impl Into<String>) -> Self {
        Self {
            output_location: output_location.into(),
            database: None,
            work_group: None,
            encryption: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Database resolved at call time.
    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    /// Work group resolved at call time.
    pub fn work_group(&self) -> &str {
        self.work_group.as_deref().unwrap_or(DEFAULT_WORK_GROUP)
    }

    /// Reject configuration that must be present before any remote call.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.output_location.trim().is_empty() {
            return Err(QueryError::Configuration(
                "output location must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_defaults_without_mutating_config() {
        let config = QueryConfig::new("s3://results-bucket/prefix/");
        assert_eq!(config.database(), "default");
        assert_eq!(config.work_group(), "primary");
        assert_eq!(config.database, None);
        assert_eq!(config.work_group, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = QueryConfig {
            database: Some("telemetry".to_owned()),
            work_group: Some("adhoc".to_owned()),
            ..QueryConfig::new("s3://results-bucket/prefix/")
        };
        assert_eq!(config.database(), "telemetry");
        assert_eq!(config.work_group(), "adhoc");
    }

    #[test]
    fn rejects_empty_output_location() {
        let config = QueryConfig::new("   ");
        let err = config.validate().expect_err("blank location must fail");
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn accepts_populated_output_location() {
        let config = QueryConfig::new("s3://results-bucket/prefix/");
        config.validate().expect("valid config must pass");
    }
}
