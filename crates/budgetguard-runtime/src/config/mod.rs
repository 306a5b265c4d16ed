//! Guard configuration loader.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. strict YAML file named by `BUDGET_GUARD_CONFIG` (optional)
//! 3. environment variables
//!
//! The caller hands in the environment as key/value pairs; nothing in this
//! crate reads process state on its own.

pub mod schema;

use std::collections::HashMap;
use std::fs;

use budgetguard_core::error::{GuardError, Result};

pub use schema::{
    ApiSection, FailurePolicy, GuardConfig, GuardSection, Secret, ServerSection, TargetSection,
};

pub const ENV_CONFIG_FILE: &str = "BUDGET_GUARD_CONFIG";
pub const ENV_THRESHOLD: &str = "BUDGET_STOP_THRESHOLD";
pub const ENV_DRY_RUN: &str = "BUDGET_GUARD_DRY_RUN";
pub const ENV_FAILURE_POLICY: &str = "BUDGET_GUARD_FAILURE_POLICY";
pub const ENV_PROJECT_ID: &str = "GCP_PROJECT_ID";
pub const ENV_REGION: &str = "CLOUD_RUN_REGION";
pub const ENV_SERVICES: &str = "CLOUD_RUN_SERVICES";
pub const ENV_API_BASE: &str = "BUDGET_GUARD_API_BASE";
pub const ENV_POLL_INTERVAL: &str = "BUDGET_GUARD_POLL_INTERVAL_SECS";
pub const ENV_OPERATION_TIMEOUT: &str = "BUDGET_GUARD_OPERATION_TIMEOUT_SECS";
pub const ENV_CONFLICT_RETRIES: &str = "BUDGET_GUARD_CONFLICT_RETRIES";
pub const ENV_ACCESS_TOKEN: &str = "BUDGET_GUARD_ACCESS_TOKEN";
pub const ENV_PORT: &str = "PORT";

pub fn load_from_file(path: &str) -> Result<GuardConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| GuardError::InvalidConfiguration(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GuardConfig> {
    let cfg: GuardConfig = serde_yaml::from_str(s)
        .map_err(|e| GuardError::InvalidConfiguration(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Build the configuration from environment pairs (and the file they point to).
pub fn load_from_env<I>(vars: I) -> Result<GuardConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env: HashMap<String, String> = vars.into_iter().collect();

    let mut cfg = match env.get(ENV_CONFIG_FILE).filter(|p| !p.trim().is_empty()) {
        Some(path) => load_from_file(path.trim())?,
        None => GuardConfig::default(),
    };
    apply_env(&mut cfg, &env)?;
    cfg.validate()?;
    Ok(cfg)
}

fn apply_env(cfg: &mut GuardConfig, env: &HashMap<String, String>) -> Result<()> {
    if let Some(v) = env.get(ENV_THRESHOLD) {
        cfg.guard.threshold = parse_num(ENV_THRESHOLD, v)?;
    }
    if let Some(v) = env.get(ENV_DRY_RUN) {
        cfg.guard.dry_run = parse_flag(v);
    }
    if let Some(v) = env.get(ENV_FAILURE_POLICY) {
        cfg.guard.failure_policy = FailurePolicy::parse(v)?;
    }

    if let Some(v) = env.get(ENV_PROJECT_ID) {
        cfg.target.project_id = v.trim().to_string();
    }
    if let Some(v) = env.get(ENV_REGION).filter(|v| !v.trim().is_empty()) {
        cfg.target.region = v.trim().to_string();
    }
    if let Some(v) = env.get(ENV_SERVICES) {
        cfg.target.services = split_services(v);
    }

    if let Some(v) = env.get(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
        cfg.api.base_url = v.trim().to_string();
    }
    if let Some(v) = env.get(ENV_POLL_INTERVAL) {
        cfg.api.poll_interval_secs = parse_num(ENV_POLL_INTERVAL, v)?;
    }
    if let Some(v) = env.get(ENV_OPERATION_TIMEOUT) {
        cfg.api.operation_timeout_secs = parse_num(ENV_OPERATION_TIMEOUT, v)?;
    }
    if let Some(v) = env.get(ENV_CONFLICT_RETRIES) {
        cfg.api.conflict_retries = parse_num(ENV_CONFLICT_RETRIES, v)?;
    }
    if let Some(v) = env.get(ENV_ACCESS_TOKEN).filter(|v| !v.trim().is_empty()) {
        cfg.api.access_token = Some(Secret::new(v.trim()));
    }

    if let Some(v) = env.get(ENV_PORT) {
        let port: u16 = parse_num(ENV_PORT, v)?;
        cfg.server.listen = format!("0.0.0.0:{port}");
    }

    Ok(())
}

/// `1`, `true`, `yes`, `on` (any case) are true; everything else is false.
pub fn parse_flag(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Comma-separated service names; blanks are dropped.
pub fn split_services(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_num<T: std::str::FromStr>(key: &str, v: &str) -> Result<T> {
    v.trim()
        .parse()
        .map_err(|_| GuardError::InvalidConfiguration(format!("{key} is not a valid number: {v:?}")))
}
