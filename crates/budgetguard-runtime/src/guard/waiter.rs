use std::time::Duration;

use budgetguard_core::error::{GuardError, Result};
use budgetguard_core::operation::OperationState;

use crate::api::ServiceAdminApi;
use crate::clock::Clock;

/// Bounded polling loop over a long-running operation.
///
/// Polls every `poll_interval` until the operation reports completion or the
/// absolute deadline (`now + timeout`) passes. The operation is only read,
/// never mutated.
pub struct OperationWaiter<'a> {
    api: &'a dyn ServiceAdminApi,
    clock: &'a dyn Clock,
    poll_interval: Duration,
}

impl<'a> OperationWaiter<'a> {
    pub fn new(api: &'a dyn ServiceAdminApi, clock: &'a dyn Clock, poll_interval: Duration) -> Self {
        Self {
            api,
            clock,
            poll_interval,
        }
    }

    pub async fn wait(&self, name: &str, timeout: Duration) -> Result<()> {
        let deadline = self.clock.now() + timeout;

        while self.clock.now() < deadline {
            let op = self.api.get_operation(name).await?;
            match op.state() {
                OperationState::Succeeded => {
                    tracing::debug!(operation = %name, "operation done");
                    return Ok(());
                }
                OperationState::Failed(detail) => {
                    return Err(GuardError::OperationFailed {
                        name: name.to_string(),
                        detail,
                    });
                }
                OperationState::Pending => {
                    tracing::debug!(operation = %name, "operation pending");
                }
            }
            self.clock.sleep(self.poll_interval).await;
        }

        Err(GuardError::OperationTimeout(name.to_string()))
    }
}
