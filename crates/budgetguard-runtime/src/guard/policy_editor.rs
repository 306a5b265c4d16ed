use budgetguard_core::error::{GuardError, Result};
use budgetguard_core::iam::{INVOKER_ROLE, PUBLIC_MEMBER};

use crate::api::ServiceAdminApi;

/// Removes the public invoker grant from a service's access policy.
pub struct PolicyEditor<'a> {
    api: &'a dyn ServiceAdminApi,
    dry_run: bool,
    conflict_retries: u32,
}

impl<'a> PolicyEditor<'a> {
    pub fn new(api: &'a dyn ServiceAdminApi, dry_run: bool, conflict_retries: u32) -> Self {
        Self {
            api,
            dry_run,
            conflict_retries,
        }
    }

    /// Returns whether the policy needed a change.
    ///
    /// Nothing is written when the grant is already absent, or in dry-run.
    /// The written policy carries the etag of the snapshot it was derived
    /// from; a stale write is retried from a fresh read.
    pub async fn remove_public_invoker(&self, resource: &str) -> Result<bool> {
        let mut attempt = 0u32;
        loop {
            let current = self.api.get_iam_policy(resource).await?;
            let Some(updated) = current.without_public_invoker() else {
                tracing::debug!(%resource, "no public invoker binding");
                return Ok(false);
            };

            if self.dry_run {
                tracing::info!(
                    %resource,
                    role = INVOKER_ROLE,
                    member = PUBLIC_MEMBER,
                    "[dry-run] would remove public invoker"
                );
                return Ok(true);
            }

            match self.api.set_iam_policy(resource, &updated).await {
                Ok(_) => {
                    tracing::info!(%resource, "public invoker removed");
                    return Ok(true);
                }
                Err(GuardError::PolicyConflict(_)) if attempt < self.conflict_retries => {
                    attempt += 1;
                    tracing::warn!(%resource, attempt, "policy changed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
