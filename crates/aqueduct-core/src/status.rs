use serde::{Deserialize, Serialize};

/// Remote execution state as classified by this client.
///
/// The remote state enum is not closed from the client's perspective;
/// anything unrecognized is carried verbatim in `Unknown` rather than
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Accepted, waiting for capacity.
    Queued,
    /// Currently executing.
    Running,
    /// Finished; results are available at the output location.
    Succeeded,
    /// Finished with an execution failure.
    Failed,
    /// Stopped before completion.
    Cancelled,
    /// State string this client does not recognize.
    Unknown(String),
}

impl ExecutionStatus {
    /// Classify the raw remote state string. Total: never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Execution metadata after boundary mapping.
///
/// Derived fresh on every poll; nothing here is cached between polls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionRecord {
    /// Classified execution state.
    pub status: ExecutionStatus,
    /// Service-provided reason for the latest state change, when any.
    pub state_change_reason: Option<String>,
}

impl ExecutionRecord {
    /// Map a raw remote state and reason into a classified record.
    pub fn from_raw_state(raw_state: &str, state_change_reason: Option<String>) -> Self {
        Self {
            status: ExecutionStatus::parse(raw_state),
            state_change_reason,
        }
    }
}
