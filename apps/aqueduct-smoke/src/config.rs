//! Environment-backed runtime configuration for `aqueduct-smoke`.

use std::{env, error::Error, fmt};

use aqueduct_core::RetryPolicy;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_OUTPUT_LOCATION: &str = "s3://aqueduct-smoke/results/";
const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 5;

/// Runtime configuration used by the smoke binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeConfig {
    /// Service region forwarded to the controller bootstrap.
    pub region: String,
    /// Output location used for every smoke query.
    pub output_location: String,
    /// Admission gate capacity.
    pub max_concurrent_queries: usize,
    /// Backoff tuning for the smoke lifecycle.
    pub retry: RetryPolicy,
}

impl SmokeConfig {
    /// Parse configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let region = optional_trimmed_env("AQUEDUCT_REGION", &mut lookup)
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());
        let output_location = optional_trimmed_env("AQUEDUCT_OUTPUT_LOCATION", &mut lookup)
            .unwrap_or_else(|| DEFAULT_OUTPUT_LOCATION.to_owned());

        let max_concurrent_queries = parse_optional_usize(
            "AQUEDUCT_MAX_CONCURRENT",
            DEFAULT_MAX_CONCURRENT_QUERIES,
            &mut lookup,
        )?;
        if max_concurrent_queries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AQUEDUCT_MAX_CONCURRENT",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        let retry_defaults = RetryPolicy::default();
        let base_wait_ms = parse_optional_u64(
            "AQUEDUCT_RETRY_BASE_WAIT_MS",
            retry_defaults.base_wait_ms(),
            &mut lookup,
        )?;
        let max_wait_ms = parse_optional_u64(
            "AQUEDUCT_RETRY_MAX_WAIT_MS",
            retry_defaults.max_wait_ms(),
            &mut lookup,
        )?;
        let max_attempts = parse_optional_u32(
            "AQUEDUCT_RETRY_MAX_ATTEMPTS",
            retry_defaults.max_attempts(),
            &mut lookup,
        )?;

        Ok(Self {
            region,
            output_location,
            max_concurrent_queries,
            retry: RetryPolicy::new(base_wait_ms, max_wait_ms, max_attempts),
        })
    }
}

/// Errors produced while parsing runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}='{value}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

fn optional_trimmed_env<F>(key: &'static str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_optional_u32<F>(key: &'static str, default: u32, lookup: &mut F) -> Result<u32, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    value
        .parse::<u32>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value,
            reason: err.to_string(),
        })
}

fn parse_optional_u64<F>(key: &'static str, default: u64, lookup: &mut F) -> Result<u64, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    value
        .parse::<u64>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value,
            reason: err.to_string(),
        })
}

fn parse_optional_usize<F>(
    key: &'static str,
    default: usize,
    lookup: &mut F,
) -> Result<usize, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    value
        .parse::<usize>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value,
            reason: err.to_string(),
        })
}
