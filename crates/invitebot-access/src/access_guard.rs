use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const ALLOW_ALLOWLISTED: &str = "allow_allowlisted";
const DENY_ALLOWLIST_EMPTY: &str = "deny_allowlist_empty";
const DENY_NOT_ALLOWLISTED: &str = "deny_not_allowlisted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a denied requester is answered.
pub enum DenyPolicy {
    /// Drop the command without replying.
    Silent,
    /// Reply with a denial message.
    #[default]
    Explicit,
}

impl DenyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Explicit => "explicit",
        }
    }

    pub fn replies_on_denial(self) -> bool {
        matches!(self, Self::Explicit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of one access check with a stable reason code for logs.
pub enum AccessDecision {
    Allow { reason_code: &'static str },
    Deny { reason_code: &'static str },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Allow { reason_code } | Self::Deny { reason_code } => reason_code,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Membership test of requester ids against a fixed administrator set.
///
/// The set is closed: anything not listed is denied, and an empty set denies
/// everyone.
pub struct AccessGuard {
    allowed: BTreeSet<i64>,
    deny_policy: DenyPolicy,
}

impl AccessGuard {
    pub fn new(allowed: impl IntoIterator<Item = i64>, deny_policy: DenyPolicy) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            deny_policy,
        }
    }

    pub fn deny_policy(&self) -> DenyPolicy {
        self.deny_policy
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }

    pub fn authorize(&self, requester_id: i64) -> bool {
        self.evaluate(requester_id).is_allowed()
    }

    pub fn evaluate(&self, requester_id: i64) -> AccessDecision {
        let decision = if self.allowed.is_empty() {
            AccessDecision::Deny {
                reason_code: DENY_ALLOWLIST_EMPTY,
            }
        } else if self.allowed.contains(&requester_id) {
            AccessDecision::Allow {
                reason_code: ALLOW_ALLOWLISTED,
            }
        } else {
            AccessDecision::Deny {
                reason_code: DENY_NOT_ALLOWLISTED,
            }
        };
        if !decision.is_allowed() {
            tracing::warn!(
                requester_id,
                reason_code = decision.reason_code(),
                "access denied"
            );
        }
        decision
    }
}
