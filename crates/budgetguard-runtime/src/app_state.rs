//! Shared application state for the intake server.
//!
//! Configuration is built once at startup and never mutated afterwards; every
//! invocation borrows it.

use std::sync::Arc;

use crate::api::ApiConnector;
use crate::clock::Clock;
use crate::config::GuardConfig;
use crate::guard::BudgetGuard;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GuardConfig,
    connector: Arc<dyn ApiConnector>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(cfg: GuardConfig, connector: Arc<dyn ApiConnector>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                connector,
                clock,
            }),
        }
    }

    /// Guard bound to this state, for one invocation.
    pub fn guard(&self) -> BudgetGuard<'_> {
        BudgetGuard::new(
            &self.inner.cfg,
            self.inner.connector.as_ref(),
            self.inner.clock.as_ref(),
        )
    }
}
