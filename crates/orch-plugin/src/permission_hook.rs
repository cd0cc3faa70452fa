// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The permission hook (§4.G / §6 "Permission hook (exposed)"): given an
//! incoming permission request in a child's session, translate the child
//! session ID to its orchestrator ID, query the decision cache, and if a
//! decision exists, set the request's `status` field to `allow`/`deny`.

use orch_core::{ChildSessionId, Clock, IdGen, SystemClock, UuidIdGen};
use orch_adapters::HostClient;
use orch_engine::{normalize_patterns, ChildSessionSupervisor, PermissionDecision, PermissionDecisionCache};
use serde_json::Value;
use std::sync::Arc;

/// Mutates incoming permission requests in place with a remembered
/// allow/deny decision, when one exists for the owning orchestrator.
pub struct PermissionHook<H, C = SystemClock, G = UuidIdGen>
where
    H: HostClient,
    C: Clock,
    G: IdGen,
{
    supervisor: Arc<ChildSessionSupervisor<H, C, G>>,
    permissions: Arc<PermissionDecisionCache>,
}

impl<H, C, G> PermissionHook<H, C, G>
where
    H: HostClient,
    C: Clock,
    G: IdGen + 'static,
{
    pub fn new(
        supervisor: Arc<ChildSessionSupervisor<H, C, G>>,
        permissions: Arc<PermissionDecisionCache>,
    ) -> Self {
        Self {
            supervisor,
            permissions,
        }
    }

    /// `request` is the permission object the host is about to act on, with
    /// at least `sessionID`, `type`, and optionally `pattern` fields. If a
    /// decision is found, `request.status` is set to `"allow"`/`"deny"` and
    /// `true` is returned; otherwise `request` is left untouched.
    pub fn apply(&self, request: &mut Value) -> bool {
        let Some(object) = request.as_object() else {
            return false;
        };
        let Some(session_id) = object.get("sessionID").and_then(Value::as_str) else {
            return false;
        };
        let Some(permission_type) = object.get("type").and_then(Value::as_str) else {
            return false;
        };
        let patterns = normalize_patterns(object.get("pattern"));

        let child_id = ChildSessionId::new(session_id.to_string());
        let Some(orchestrator_id) = self.supervisor.owning_orchestrator(&child_id) else {
            return false;
        };
        let Some(decision) = self
            .permissions
            .lookup(&orchestrator_id, permission_type, &patterns)
        else {
            return false;
        };

        let status = match decision {
            PermissionDecision::Allow => "allow",
            PermissionDecision::Deny => "deny",
        };
        if let Some(object) = request.as_object_mut() {
            object.insert("status".to_string(), Value::String(status.to_string()));
        }
        true
    }
}

#[cfg(test)]
#[path = "permission_hook_tests.rs"]
mod tests;
