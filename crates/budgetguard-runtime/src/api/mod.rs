//! Remote service-management API seam.
//!
//! The guard only needs four calls. They sit behind a trait so the
//! remediation logic can run against the real Admin API or an in-memory fake.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use budgetguard_core::error::Result;
use budgetguard_core::iam::IamPolicy;
use budgetguard_core::operation::Operation;

pub use http::{HttpConnector, RunAdminClient};

/// Service-management operations used by the guard.
#[async_trait]
pub trait ServiceAdminApi: Send + Sync {
    /// Full access-policy snapshot of `resource`.
    async fn get_iam_policy(&self, resource: &str) -> Result<IamPolicy>;

    /// Whole-policy replace. Returns `GuardError::PolicyConflict` when the
    /// server rejects the write as stale.
    async fn set_iam_policy(&self, resource: &str, policy: &IamPolicy) -> Result<IamPolicy>;

    /// Partial update of the service's ingress field.
    async fn patch_ingress(&self, resource: &str, ingress: &str) -> Result<Operation>;

    async fn get_operation(&self, name: &str) -> Result<Operation>;
}

/// Produces an authenticated API handle, once per remediating invocation.
#[async_trait]
pub trait ApiConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ServiceAdminApi>>;
}
