//! Access-control policy model and member filtering.
//!
//! The policy is owned by the remote API. Callers fetch a full snapshot,
//! filter a local copy here, and decide whether to write it back. Fields this
//! crate does not model (`auditConfigs`, binding conditions, ...) are kept
//! verbatim so a write-back never drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role granting permission to invoke a service.
pub const INVOKER_ROLE: &str = "roles/run.invoker";
/// Member representing any caller, authenticated or not.
pub const PUBLIC_MEMBER: &str = "allUsers";

/// Resource access policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IamPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    /// Concurrency token; echoed back on write so the server can reject
    /// stale replacements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One role-to-members grant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Binding {
    pub fn new(role: impl Into<String>, members: &[&str]) -> Self {
        Self {
            role: role.into(),
            members: members.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl IamPolicy {
    /// Whether any binding for `role` lists `member`.
    pub fn grants(&self, role: &str, member: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.role == role && b.members.iter().any(|m| m == member))
    }

    /// Copy of this policy with `member` removed from every `role` binding.
    ///
    /// Returns `None` when nothing was removed. Bindings of other roles are
    /// passed through untouched, and a `role` binding left without members is
    /// dropped rather than kept empty.
    pub fn without_member(&self, role: &str, member: &str) -> Option<IamPolicy> {
        let mut removed = false;
        let mut bindings = Vec::with_capacity(self.bindings.len());

        for binding in &self.bindings {
            if binding.role != role {
                bindings.push(binding.clone());
                continue;
            }

            let members: Vec<String> = binding
                .members
                .iter()
                .filter(|m| m.as_str() != member)
                .cloned()
                .collect();
            if members.len() != binding.members.len() {
                removed = true;
            }
            if !members.is_empty() {
                bindings.push(Binding {
                    members,
                    ..binding.clone()
                });
            }
        }

        if !removed {
            return None;
        }
        Some(IamPolicy {
            bindings,
            ..self.clone()
        })
    }

    /// `without_member(INVOKER_ROLE, PUBLIC_MEMBER)`.
    pub fn without_public_invoker(&self) -> Option<IamPolicy> {
        self.without_member(INVOKER_ROLE, PUBLIC_MEMBER)
    }
}
