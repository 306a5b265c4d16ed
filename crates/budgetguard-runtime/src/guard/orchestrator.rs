use budgetguard_core::alert::{decode_alert, EventEnvelope};
use budgetguard_core::error::{ErrorCode, GuardError, Result};
use budgetguard_core::threshold::evaluate;

use crate::api::{ApiConnector, ServiceAdminApi};
use crate::clock::Clock;
use crate::config::{FailurePolicy, GuardConfig};

use super::ingress::IngressRestrictor;
use super::outcome::{GuardOutcome, InvocationReport, SkipReason};
use super::policy_editor::PolicyEditor;
use super::waiter::OperationWaiter;

/// Top-level control flow of one invocation:
/// decode -> evaluate -> skip, or remediate every configured service in order.
pub struct BudgetGuard<'a> {
    cfg: &'a GuardConfig,
    connector: &'a dyn ApiConnector,
    clock: &'a dyn Clock,
}

impl<'a> BudgetGuard<'a> {
    pub fn new(cfg: &'a GuardConfig, connector: &'a dyn ApiConnector, clock: &'a dyn Clock) -> Self {
        Self {
            cfg,
            connector,
            clock,
        }
    }

    /// Run one invocation.
    ///
    /// Skips (empty payload, invalid budget, below threshold, missing
    /// configuration) are `Ok`. Malformed payloads and remote failures are
    /// `Err` so the transport can redeliver.
    pub async fn handle(&self, env: &EventEnvelope) -> Result<InvocationReport> {
        let Some(alert) = decode_alert(env)? else {
            tracing::warn!("budget payload is empty");
            return Ok(skipped(SkipReason::EmptyPayload));
        };

        let threshold = self.cfg.guard.threshold;
        let eval = match evaluate(&alert, threshold) {
            Ok(e) => e,
            Err(GuardError::InvalidBudget(budget)) => {
                return Ok(skipped(SkipReason::InvalidBudget { budget }));
            }
            Err(e) => return Err(e),
        };

        if !eval.fires() {
            tracing::info!(
                ratio = %format!("{:.4}", eval.ratio),
                threshold = %format!("{threshold:.4}"),
                "ratio below threshold, skip guard"
            );
            return Ok(skipped(SkipReason::BelowThreshold {
                ratio: eval.ratio,
                threshold,
            }));
        }

        let resources = match self.cfg.target.resources() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "missing required env: GCP_PROJECT_ID or CLOUD_RUN_SERVICES");
                return Ok(skipped(SkipReason::MissingConfiguration));
            }
        };

        let dry_run = self.cfg.guard.dry_run;
        tracing::warn!(
            ratio = %format!("{:.4}", eval.ratio),
            threshold = %format!("{threshold:.4}"),
            services = resources.len(),
            dry_run,
            "budget threshold crossed, guard fired"
        );

        let api = self.connector.connect().await?;
        let services = self.remediate(api.as_ref(), &resources).await?;

        tracing::info!(count = services.len(), dry_run, "budget guard finished for {} service(s)", services.len());
        Ok(InvocationReport::Remediated { dry_run, services })
    }

    async fn remediate(&self, api: &dyn ServiceAdminApi, resources: &[String]) -> Result<Vec<GuardOutcome>> {
        let mut outcomes = Vec::with_capacity(resources.len());

        for resource in resources {
            tracing::info!(%resource, "restricting public access");
            match self.guard_service(api, resource).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => match self.cfg.guard.failure_policy {
                    FailurePolicy::Abort => {
                        tracing::error!(%resource, error = %e, code = e.code().as_str(), "service remediation failed, aborting");
                        return Err(e.into());
                    }
                    FailurePolicy::Continue => {
                        tracing::error!(%resource, error = %e, code = e.code().as_str(), "service remediation failed, continuing");
                        outcomes.push(e.into_outcome(resource));
                    }
                },
            }
        }

        let failed: Vec<String> = outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.service.clone())
            .collect();
        if !failed.is_empty() {
            for o in &outcomes {
                tracing::warn!(
                    service = %o.service,
                    public_access_removed = o.public_access_removed,
                    ingress = ?o.ingress,
                    error = %o.error.as_deref().unwrap_or("-"),
                    "service outcome"
                );
            }
            return Err(GuardError::PartialFailure {
                failed,
                total: outcomes.len(),
            });
        }

        Ok(outcomes)
    }

    async fn guard_service(&self, api: &dyn ServiceAdminApi, resource: &str) -> std::result::Result<GuardOutcome, ServiceFailure> {
        let dry_run = self.cfg.guard.dry_run;
        let api_cfg = &self.cfg.api;

        let editor = PolicyEditor::new(api, dry_run, api_cfg.conflict_retries);
        let removed = editor
            .remove_public_invoker(resource)
            .await
            .map_err(|e| ServiceFailure::new(e, false))?;

        let waiter = OperationWaiter::new(api, self.clock, api_cfg.poll_interval());
        let restrictor = IngressRestrictor::new(api, waiter, dry_run, api_cfg.operation_timeout());
        let ingress = restrictor
            .restrict(resource)
            .await
            .map_err(|e| ServiceFailure::new(e, removed))?;

        tracing::info!(%resource, public_access_removed = removed, ?ingress, "service guarded");
        Ok(GuardOutcome {
            service: resource.to_string(),
            public_access_removed: removed,
            ingress: Some(ingress),
            error: None,
        })
    }
}

fn skipped(reason: SkipReason) -> InvocationReport {
    InvocationReport::Skipped { reason }
}

/// Error from one service, remembering how far it got.
struct ServiceFailure {
    error: GuardError,
    public_access_removed: bool,
}

impl ServiceFailure {
    fn new(error: GuardError, public_access_removed: bool) -> Self {
        Self {
            error,
            public_access_removed,
        }
    }

    fn code(&self) -> ErrorCode {
        self.error.code()
    }

    fn into_outcome(self, resource: &str) -> GuardOutcome {
        GuardOutcome {
            service: resource.to_string(),
            public_access_removed: self.public_access_removed,
            ingress: None,
            error: Some(self.error.to_string()),
        }
    }
}

impl std::fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl From<ServiceFailure> for GuardError {
    fn from(f: ServiceFailure) -> Self {
        f.error
    }
}
