use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use budgetguard_core::error::{GuardError, Result};
use budgetguard_core::operation::service_resource;
use budgetguard_core::threshold::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    pub version: u32,

    #[serde(default)]
    pub guard: GuardSection,

    #[serde(default)]
    pub target: TargetSection,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub server: ServerSection,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            version: 1,
            guard: GuardSection::default(),
            target: TargetSection::default(),
            api: ApiSection::default(),
            server: ServerSection::default(),
        }
    }
}

impl GuardConfig {
    /// Range checks only. A missing project or service list is not a load
    /// error: it turns every firing invocation into a logged no-op instead.
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GuardError::InvalidConfiguration(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.guard.validate()?;
        self.api.validate()?;

        Ok(())
    }
}

/// What happens to the remaining services when one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failure ends the invocation.
    #[default]
    Abort,
    /// Every service is attempted; failures are reported together.
    Continue,
}

impl FailurePolicy {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(GuardError::InvalidConfiguration(format!(
                "failure policy must be abort or continue, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardSection {
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for GuardSection {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            dry_run: false,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl GuardSection {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(GuardError::InvalidConfiguration(format!(
                "guard.threshold must be a finite number >= 0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub services: Vec<String>,
}

impl Default for TargetSection {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            region: default_region(),
            services: Vec::new(),
        }
    }
}

impl TargetSection {
    /// Fully qualified resource names, in configured order.
    pub fn resources(&self) -> Result<Vec<String>> {
        let project = self.project_id.trim();
        let services: Vec<&str> = self
            .services
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if project.is_empty() || services.is_empty() {
            return Err(GuardError::MissingConfiguration(
                "GCP_PROJECT_ID or CLOUD_RUN_SERVICES".into(),
            ));
        }

        let region = self.region.trim();
        Ok(services
            .into_iter()
            .map(|svc| service_resource(project, region, svc))
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,

    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Static bearer token; when absent the metadata server is used.
    #[serde(default)]
    pub access_token: Option<Secret>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_secs: default_poll_interval_secs(),
            operation_timeout_secs: default_operation_timeout_secs(),
            conflict_retries: default_conflict_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            access_token: None,
        }
    }
}

impl ApiSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=60).contains(&self.poll_interval_secs) {
            return Err(GuardError::InvalidConfiguration(
                "api.poll_interval_secs must be between 1 and 60".into(),
            ));
        }
        if !(1..=3600).contains(&self.operation_timeout_secs) {
            return Err(GuardError::InvalidConfiguration(
                "api.operation_timeout_secs must be between 1 and 3600".into(),
            ));
        }
        if self.conflict_retries > 10 {
            return Err(GuardError::InvalidConfiguration(
                "api.conflict_retries must be at most 10".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GuardError::InvalidConfiguration(
                "api.request_timeout_secs must be positive".into(),
            ));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(GuardError::InvalidConfiguration(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// String that never shows up in `Debug` output.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_region() -> String {
    "us-central1".into()
}
fn default_base_url() -> String {
    "https://run.googleapis.com".into()
}
fn default_poll_interval_secs() -> u64 {
    2
}
fn default_operation_timeout_secs() -> u64 {
    120
}
fn default_conflict_retries() -> u32 {
    2
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
