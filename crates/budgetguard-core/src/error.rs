//! Shared error type across budgetguard crates.

use thiserror::Error;

/// Stable error codes (used in logs and intake responses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Event envelope or alert payload could not be decoded.
    MalformedPayload,
    /// Budget amount is zero or negative.
    InvalidBudget,
    /// Project id or service list is missing.
    MissingConfiguration,
    /// A configuration value could not be parsed or is out of range.
    InvalidConfiguration,
    /// Remote long-running operation finished with an error.
    OperationFailed,
    /// Long-running operation did not finish before the deadline.
    OperationTimeout,
    /// Remote API call failed.
    ApiError,
    /// Access policy write kept losing to concurrent edits.
    PolicyConflict,
    /// Access token could not be obtained.
    Credentials,
    /// At least one service failed under the `continue` failure policy.
    PartialFailure,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::InvalidBudget => "INVALID_BUDGET",
            ErrorCode::MissingConfiguration => "MISSING_CONFIGURATION",
            ErrorCode::InvalidConfiguration => "INVALID_CONFIGURATION",
            ErrorCode::OperationFailed => "OPERATION_FAILED",
            ErrorCode::OperationTimeout => "OPERATION_TIMEOUT",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::PolicyConflict => "POLICY_CONFLICT",
            ErrorCode::Credentials => "CREDENTIALS",
            ErrorCode::PartialFailure => "PARTIAL_FAILURE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Unified error type used by core and runtime.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid budget amount: {0}")]
    InvalidBudget(f64),
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("operation failed: {name}: {detail}")]
    OperationFailed { name: String, detail: String },
    #[error("operation timeout: {0}")]
    OperationTimeout(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("policy conflict on {0}")]
    PolicyConflict(String),
    #[error("credentials: {0}")]
    Credentials(String),
    #[error("{} of {total} service(s) failed: {}", failed.len(), failed.join(", "))]
    PartialFailure { failed: Vec<String>, total: usize },
    #[error("internal: {0}")]
    Internal(String),
}

impl GuardError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            GuardError::MalformedPayload(_) => ErrorCode::MalformedPayload,
            GuardError::InvalidBudget(_) => ErrorCode::InvalidBudget,
            GuardError::MissingConfiguration(_) => ErrorCode::MissingConfiguration,
            GuardError::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            GuardError::OperationFailed { .. } => ErrorCode::OperationFailed,
            GuardError::OperationTimeout(_) => ErrorCode::OperationTimeout,
            GuardError::Api(_) => ErrorCode::ApiError,
            GuardError::PolicyConflict(_) => ErrorCode::PolicyConflict,
            GuardError::Credentials(_) => ErrorCode::Credentials,
            GuardError::PartialFailure { .. } => ErrorCode::PartialFailure,
            GuardError::Internal(_) => ErrorCode::Internal,
        }
    }
}
