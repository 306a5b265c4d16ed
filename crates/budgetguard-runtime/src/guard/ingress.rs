use std::time::Duration;

use budgetguard_core::error::Result;
use budgetguard_core::operation::INGRESS_INTERNAL_ONLY;

use crate::api::ServiceAdminApi;

use super::outcome::IngressAction;
use super::waiter::OperationWaiter;

/// Restricts a service's ingress to internal traffic.
pub struct IngressRestrictor<'a> {
    api: &'a dyn ServiceAdminApi,
    waiter: OperationWaiter<'a>,
    dry_run: bool,
    timeout: Duration,
}

impl<'a> IngressRestrictor<'a> {
    pub fn new(
        api: &'a dyn ServiceAdminApi,
        waiter: OperationWaiter<'a>,
        dry_run: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            waiter,
            dry_run,
            timeout,
        }
    }

    /// Dry-run issues no call at all.
    pub async fn restrict(&self, resource: &str) -> Result<IngressAction> {
        if self.dry_run {
            tracing::info!(%resource, ingress = INGRESS_INTERNAL_ONLY, "[dry-run] would restrict ingress");
            return Ok(IngressAction::Simulated);
        }

        let op = self.api.patch_ingress(resource, INGRESS_INTERNAL_ONLY).await?;
        match op.handle() {
            Some(name) => {
                tracing::debug!(%resource, operation = %name, "waiting for ingress update");
                self.waiter.wait(name, self.timeout).await?;
            }
            None => tracing::debug!(%resource, "ingress update completed synchronously"),
        }

        tracing::info!(%resource, ingress = INGRESS_INTERNAL_ONLY, "ingress restricted");
        Ok(IngressAction::Applied)
    }
}
