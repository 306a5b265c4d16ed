//! Long-running operation model and service resource naming.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ingress value that only admits internal traffic.
pub const INGRESS_INTERNAL_ONLY: &str = "INGRESS_TRAFFIC_INTERNAL_ONLY";

/// Fully qualified service resource name.
pub fn service_resource(project: &str, region: &str, service: &str) -> String {
    format!("projects/{project}/locations/{region}/services/{service}")
}

/// Remote long-running operation, as returned by patch and get-operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

/// Error status embedded in a finished operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl Status {
    /// An all-default status carries no error information.
    pub fn is_empty(&self) -> bool {
        self.code == 0 && self.message.is_empty() && self.details.is_empty()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message)
    }
}

/// Observed lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Succeeded,
    Failed(String),
}

impl Operation {
    pub fn state(&self) -> OperationState {
        if !self.done {
            return OperationState::Pending;
        }
        match &self.error {
            Some(status) if !status.is_empty() => OperationState::Failed(status.to_string()),
            _ => OperationState::Succeeded,
        }
    }

    /// Operation handle, if the server returned one.
    pub fn handle(&self) -> Option<&str> {
        Some(self.name.as_str()).filter(|n| !n.is_empty())
    }
}
