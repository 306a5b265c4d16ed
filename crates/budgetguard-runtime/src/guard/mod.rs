//! Decision-and-remediation engine.
//!
//! Leaves first: `waiter` (long-running operation polling), `policy_editor`
//! (public invoker removal), `ingress` (internal-only ingress patch), and
//! `orchestrator` which drives them per target service. Data only flows
//! downward; nothing calls back into the orchestrator.

pub mod ingress;
pub mod orchestrator;
pub mod outcome;
pub mod policy_editor;
pub mod waiter;

pub use ingress::IngressRestrictor;
pub use orchestrator::BudgetGuard;
pub use outcome::{GuardOutcome, IngressAction, InvocationReport, SkipReason};
pub use policy_editor::PolicyEditor;
pub use waiter::OperationWaiter;
