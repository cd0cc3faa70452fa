// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The permission decision cache (§4.F): per-orchestrator memoization of
//! allow/deny decisions, keyed by `(permission type, pattern)`, so a
//! decision the user already made for one child is replayed automatically
//! for the next child that asks the same question.
//!
//! In-memory only, matching §5's single-process state guarantee: no
//! persistence, rebuilt from scratch on restart.

use orch_core::OrchestratorSessionId;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A decision forwarded to a newly asked permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny,
}

/// Normalize a permission's `pattern` field: a bare string becomes a
/// single-element list, an array passes through, and an absent value
/// becomes `[""]` (the wildcard-everything pattern).
pub fn normalize_patterns(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => vec![String::new()],
    }
}

#[derive(Default)]
struct OrchestratorPermissions {
    allow: HashSet<(String, String)>,
    deny: HashSet<(String, String)>,
}

/// A permission request captured by its ID, awaiting a reply.
struct PendingPermission {
    orchestrator_id: OrchestratorSessionId,
    permission_type: String,
    patterns: Vec<String>,
}

/// Per-orchestrator allow/deny memoization.
pub struct PermissionDecisionCache {
    decisions: Mutex<HashMap<OrchestratorSessionId, OrchestratorPermissions>>,
    pending: Mutex<HashMap<String, PendingPermission>>,
}

impl Default for PermissionDecisionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionDecisionCache {
    pub fn new() -> Self {
        Self {
            decisions: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Capture a permission record by its ID, so a later reply can be
    /// attributed to the right orchestrator and `(type, pattern)` keys.
    pub fn capture(
        &self,
        permission_id: impl Into<String>,
        orchestrator_id: OrchestratorSessionId,
        permission_type: impl Into<String>,
        patterns: Vec<String>,
    ) {
        self.pending.lock().insert(
            permission_id.into(),
            PendingPermission {
                orchestrator_id,
                permission_type: permission_type.into(),
                patterns,
            },
        );
    }

    /// Record a reply to a captured permission. `"always"` records an
    /// allow decision, `"reject"` records a deny decision; anything else
    /// is ignored (no decision remembered for next time).
    pub fn reply(&self, permission_id: &str, response: &str) {
        let Some(pending) = self.pending.lock().remove(permission_id) else {
            return;
        };
        match response {
            "always" => self.record(pending, true),
            "reject" => self.record(pending, false),
            _ => {}
        }
    }

    fn record(&self, pending: PendingPermission, allow: bool) {
        let mut decisions = self.decisions.lock();
        let entry = decisions.entry(pending.orchestrator_id).or_default();
        for pattern in pending.patterns {
            let key = (pending.permission_type.clone(), pattern);
            if allow {
                entry.deny.remove(&key);
                entry.allow.insert(key);
            } else {
                entry.allow.remove(&key);
                entry.deny.insert(key);
            }
        }
    }

    /// Look up a forwarded decision for a new permission request. Deny
    /// wins over allow if both somehow match.
    pub fn lookup(
        &self,
        orchestrator_id: &OrchestratorSessionId,
        permission_type: &str,
        patterns: &[String],
    ) -> Option<PermissionDecision> {
        let decisions = self.decisions.lock();
        let entry = decisions.get(orchestrator_id)?;
        let matches = |set: &HashSet<(String, String)>| {
            patterns
                .iter()
                .any(|p| set.contains(&(permission_type.to_string(), p.clone())))
        };
        if matches(&entry.deny) {
            Some(PermissionDecision::Deny)
        } else if matches(&entry.allow) {
            Some(PermissionDecision::Allow)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "permissions_tests.rs"]
mod tests;
