use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locator::LocatorError;

/// Broad category of a fault returned by a remote call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FaultCategory {
    /// Rate-limited or throttled by the service.
    Throttled,
    /// Query engine ran out of resources at the current scale factor.
    ResourceExhausted,
    /// Malformed request or reference to a missing entity.
    InvalidRequest,
    /// Any other service-side failure.
    Service,
    /// Transport failure reaching the service.
    Network,
}

/// Stable failure payload carried out of one remote call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{category:?}:{code}: {message}")]
pub struct ServiceFault {
    /// High-level fault category.
    pub category: FaultCategory,
    /// Raw machine-readable error code reported by the service.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ServiceFault {
    /// Construct a fault with an explicit category.
    pub fn new(
        category: FaultCategory,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Construct a fault by classifying the raw code and message.
    pub fn classified(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        let category = classify_fault(&code, &message);
        Self {
            category,
            code,
            message,
        }
    }

    /// Build a standard throttling fault.
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::new(FaultCategory::Throttled, "ThrottlingException", message)
    }

    /// Whether retrying the failed call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.category,
            FaultCategory::Throttled | FaultCategory::ResourceExhausted
        )
    }
}

/// Map a raw service error code and message to a fault category.
///
/// The scale-factor exhaustion signal arrives as a plain message on an
/// otherwise generic execution error, so the message participates in
/// classification.
pub fn classify_fault(code: &str, message: &str) -> FaultCategory {
    match code {
        "ThrottlingException" | "TooManyRequestsException" => FaultCategory::Throttled,
        _ if message.contains("exhausted resources at this scale factor") => {
            FaultCategory::ResourceExhausted
        }
        "InvalidRequestException" | "ResourceNotFoundException" => FaultCategory::InvalidRequest,
        "RequestTimeout" | "ConnectionError" => FaultCategory::Network,
        _ => FaultCategory::Service,
    }
}

/// Operation-level errors surfaced by the lifecycle controller and the
/// result stream adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Missing or invalid configuration; raised before any remote call.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Submission failed non-retryably or exhausted its retry attempts.
    #[error("query submission failed: {source}")]
    Submission {
        #[source]
        source: ServiceFault,
    },
    /// Execution metadata could not be fetched.
    #[error("query metadata fetch failed: {source}")]
    MetadataFetch {
        #[source]
        source: ServiceFault,
    },
    /// The stop-query call failed.
    #[error("query cancellation failed: {source}")]
    Cancellation {
        #[source]
        source: ServiceFault,
    },
    /// The remote query reached the FAILED state.
    #[error("query execution failed: {reason}")]
    Execution { reason: String },
    /// The remote query reached the CANCELLED state.
    #[error("query was cancelled: {reason}")]
    Cancelled { reason: String },
    /// The remote query reported a state this client does not recognize.
    #[error("query reported unknown state '{state}'")]
    UnknownState { state: String },
    /// The result locator could not be parsed.
    #[error("invalid result locator: {0}")]
    InvalidLocator(#[from] LocatorError),
    /// The result object could not be read; never retried here.
    #[error("result fetch failed: {source}")]
    ResultFetch {
        #[source]
        source: ServiceFault,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_throttling_codes_as_transient() {
        for code in ["ThrottlingException", "TooManyRequestsException"] {
            let fault = ServiceFault::classified(code, "slow down");
            assert_eq!(fault.category, FaultCategory::Throttled);
            assert!(fault.is_transient());
        }
    }

    #[test]
    fn classifies_scale_factor_exhaustion_by_message() {
        let fault = ServiceFault::classified(
            "InternalServerException",
            "Query exhausted resources at this scale factor",
        );
        assert_eq!(fault.category, FaultCategory::ResourceExhausted);
        assert!(fault.is_transient());
    }

    #[test]
    fn invalid_request_is_not_transient() {
        let fault = ServiceFault::classified("InvalidRequestException", "no such database");
        assert_eq!(fault.category, FaultCategory::InvalidRequest);
        assert!(!fault.is_transient());
    }

    #[test]
    fn unrecognized_codes_fall_back_to_service_category() {
        let fault = ServiceFault::classified("SomethingNew", "surprise");
        assert_eq!(fault.category, FaultCategory::Service);
        assert!(!fault.is_transient());
    }

    #[test]
    fn keeps_fault_serialization_stable() {
        let fault = ServiceFault::throttled("wait");
        let encoded = serde_json::to_string(&fault).expect("fault should serialize");
        assert!(encoded.contains("\"Throttled\""));
        assert!(encoded.contains("\"ThrottlingException\""));
    }
}
