//! In-memory doubles shared by the runtime integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};

use budgetguard_core::alert::EventEnvelope;
use budgetguard_core::error::{GuardError, Result};
use budgetguard_core::iam::{Binding, IamPolicy, INVOKER_ROLE, PUBLIC_MEMBER};
use budgetguard_core::operation::{service_resource, Operation, Status};
use budgetguard_runtime::api::{ApiConnector, ServiceAdminApi};
use budgetguard_runtime::clock::Clock;
use budgetguard_runtime::config::GuardConfig;

pub const PROJECT: &str = "acme-prod";
pub const REGION: &str = "us-central1";

/// Push envelope carrying `json` as its base64-encoded data.
pub fn envelope_with(json: &str) -> EventEnvelope {
    let body = serde_json::json!({
        "message": { "data": Base64.encode(json.as_bytes()), "messageId": "1" },
        "subscription": format!("projects/{PROJECT}/subscriptions/budget-guard"),
    });
    EventEnvelope::from_slice(body.to_string().as_bytes()).unwrap()
}

pub fn resource(service: &str) -> String {
    service_resource(PROJECT, REGION, service)
}

pub fn config(services: &[&str]) -> GuardConfig {
    let mut cfg = GuardConfig::default();
    cfg.target.project_id = PROJECT.into();
    cfg.target.region = REGION.into();
    cfg.target.services = services.iter().map(|s| s.to_string()).collect();
    cfg
}

/// Policy with an admin binding and `allUsers` (plus `extra`) as invokers.
pub fn public_policy(extra_invokers: &[&str]) -> IamPolicy {
    let mut invokers = vec![PUBLIC_MEMBER];
    invokers.extend_from_slice(extra_invokers);
    IamPolicy {
        version: Some(1),
        bindings: vec![
            Binding::new("roles/run.admin", &["user:ops@example.com"]),
            Binding::new(INVOKER_ROLE, &invokers),
        ],
        etag: Some("BwX1".into()),
        ..IamPolicy::default()
    }
}

pub fn private_policy() -> IamPolicy {
    IamPolicy {
        version: Some(1),
        bindings: vec![Binding::new(INVOKER_ROLE, &["serviceAccount:sched@acme.iam.gserviceaccount.com"])],
        etag: Some("BwX2".into()),
        ..IamPolicy::default()
    }
}

pub fn pending(name: &str) -> Operation {
    Operation {
        name: name.into(),
        done: false,
        error: None,
    }
}

pub fn done(name: &str) -> Operation {
    Operation {
        name: name.into(),
        done: true,
        error: None,
    }
}

pub fn failed(name: &str, message: &str) -> Operation {
    Operation {
        name: name.into(),
        done: true,
        error: Some(Status {
            code: 9,
            message: message.into(),
            details: Vec::new(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetPolicy(String),
    SetPolicy(String, IamPolicy),
    Patch(String, String),
    GetOperation(String),
}

impl Call {
    pub fn target(&self) -> &str {
        match self {
            Call::GetPolicy(r) | Call::SetPolicy(r, _) | Call::Patch(r, _) | Call::GetOperation(r) => r,
        }
    }
}

#[derive(Default)]
struct FakeState {
    policies: HashMap<String, IamPolicy>,
    operations: HashMap<String, VecDeque<Operation>>,
    patch_responses: HashMap<String, Operation>,
    failing_patches: HashSet<String>,
    write_conflicts: u32,
    calls: Vec<Call>,
}

/// Scriptable stand-in for the Admin API.
///
/// - policies are stored per resource and replaced on successful writes
/// - patch returns a pending operation `{resource}/operations/ingress` unless
///   scripted otherwise
/// - get-operation pops scripted states; the last one repeats, and an
///   unscripted operation reports done
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(self, resource: &str, policy: IamPolicy) -> Self {
        self.state.lock().unwrap().policies.insert(resource.into(), policy);
        self
    }

    pub fn script_operation(self, name: &str, states: Vec<Operation>) -> Self {
        self.state
            .lock()
            .unwrap()
            .operations
            .insert(name.into(), states.into_iter().collect());
        self
    }

    pub fn patch_returns(self, resource: &str, op: Operation) -> Self {
        self.state.lock().unwrap().patch_responses.insert(resource.into(), op);
        self
    }

    pub fn fail_patch(self, resource: &str) -> Self {
        self.state.lock().unwrap().failing_patches.insert(resource.into());
        self
    }

    pub fn reject_writes(self, n: u32) -> Self {
        self.state.lock().unwrap().write_conflicts = n;
        self
    }

    pub fn policy(&self, resource: &str) -> IamPolicy {
        self.state
            .lock()
            .unwrap()
            .policies
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<(String, IamPolicy)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetPolicy(r, p) => Some((r, p)),
                _ => None,
            })
            .collect()
    }

    pub fn patches(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Patch(r, i) => Some((r, i)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn operation_name(resource: &str) -> String {
        format!("{resource}/operations/ingress")
    }
}

#[async_trait]
impl ServiceAdminApi for FakeApi {
    async fn get_iam_policy(&self, resource: &str) -> Result<IamPolicy> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::GetPolicy(resource.into()));
        Ok(st.policies.get(resource).cloned().unwrap_or_default())
    }

    async fn set_iam_policy(&self, resource: &str, policy: &IamPolicy) -> Result<IamPolicy> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::SetPolicy(resource.into(), policy.clone()));
        if st.write_conflicts > 0 {
            st.write_conflicts -= 1;
            return Err(GuardError::PolicyConflict(resource.into()));
        }
        st.policies.insert(resource.into(), policy.clone());
        Ok(policy.clone())
    }

    async fn patch_ingress(&self, resource: &str, ingress: &str) -> Result<Operation> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::Patch(resource.into(), ingress.into()));
        if st.failing_patches.contains(resource) {
            return Err(GuardError::Api(format!("patch {resource}: HTTP 403: denied")));
        }
        Ok(st
            .patch_responses
            .get(resource)
            .cloned()
            .unwrap_or_else(|| pending(&Self::operation_name(resource))))
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::GetOperation(name.into()));
        let Some(queue) = st.operations.get_mut(name) else {
            return Ok(done(name));
        };
        let op = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(op.unwrap_or_else(|| done(name)))
    }
}

/// Hands out the same fake API on every connect and counts connects.
pub struct FakeConnector {
    pub api: Arc<FakeApi>,
    connects: AtomicUsize,
}

impl FakeConnector {
    pub fn new(api: FakeApi) -> Self {
        Self {
            api: Arc::new(api),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiConnector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn ServiceAdminApi>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let api: Arc<dyn ServiceAdminApi> = self.api.clone();
        Ok(api)
    }
}

/// Connector whose credentials never work.
pub struct NoCredentials;

#[async_trait]
impl ApiConnector for NoCredentials {
    async fn connect(&self) -> Result<Arc<dyn ServiceAdminApi>> {
        Err(GuardError::Credentials("metadata server unreachable".into()))
    }
}

/// Clock that only moves when slept on.
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, d: Duration) {
        *self.offset.lock().unwrap() += d;
        self.sleeps.lock().unwrap().push(d);
    }
}
