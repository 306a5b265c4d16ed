use serde::Serialize;

/// What the ingress step did for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngressAction {
    Applied,
    Simulated,
}

/// Per-service result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardOutcome {
    pub service: String,
    /// Public grant removed (or, in dry-run, would have been).
    pub public_access_removed: bool,
    /// `None` when the service failed before the ingress step finished.
    pub ingress: Option<IngressAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GuardOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    EmptyPayload,
    InvalidBudget { budget: f64 },
    BelowThreshold { ratio: f64, threshold: f64 },
    MissingConfiguration,
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationReport {
    Skipped { reason: SkipReason },
    Remediated { dry_run: bool, services: Vec<GuardOutcome> },
}

impl InvocationReport {
    pub fn is_skipped(&self) -> bool {
        matches!(self, InvocationReport::Skipped { .. })
    }
}
