//! Process-wide outbound network switch for provider calls.
//!
//! `TRIAGE_NETWORK_POLICY=deny` always wins over a scoped allow.

use std::sync::{Mutex, OnceLock};

pub const POLICY_ENV: &str = "TRIAGE_NETWORK_POLICY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkPolicy {
    Allow,
    Deny(String),
}

fn current() -> &'static Mutex<NetworkPolicy> {
    static POLICY: OnceLock<Mutex<NetworkPolicy>> = OnceLock::new();
    POLICY.get_or_init(|| Mutex::new(NetworkPolicy::Allow))
}

/// Restores the previous policy on drop.
pub struct NetworkPolicyGuard {
    previous: NetworkPolicy,
}

impl NetworkPolicyGuard {
    pub fn set(policy: NetworkPolicy) -> Self {
        let mut slot = current()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::mem::replace(&mut *slot, policy);
        Self { previous }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::set(NetworkPolicy::Deny(reason.into()))
    }
}

impl Drop for NetworkPolicyGuard {
    fn drop(&mut self) {
        let mut slot = current()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = self.previous.clone();
    }
}

pub fn check_outbound(target: &str) -> anyhow::Result<()> {
    match effective_policy() {
        NetworkPolicy::Allow => Ok(()),
        NetworkPolicy::Deny(reason) => anyhow::bail!(
            "outbound network blocked by policy (target={}): {}",
            target,
            reason
        ),
    }
}

fn effective_policy() -> NetworkPolicy {
    if let Ok(raw) = std::env::var(POLICY_ENV) {
        if raw.trim().eq_ignore_ascii_case("deny") {
            return NetworkPolicy::Deny(format!("{}=deny", POLICY_ENV));
        }
    }
    current()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}
