// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The host event dispatcher (§6's "Host event stream (consumed)"): routes
//! `session.idle`/`session.status`/`session.error` into the supervisor and
//! `permission.updated`/`permission.replied` into the permission decision
//! cache. Events arrive as `{type, properties}` envelopes.

use orch_core::{ChildSessionId, Clock, IdGen, SystemClock, UuidIdGen};
use orch_adapters::HostClient;
use orch_engine::{normalize_patterns, ChildSessionSupervisor, PermissionDecisionCache};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    properties: Value,
}

#[derive(Deserialize)]
struct SessionIdleProperties {
    #[serde(rename = "sessionID")]
    session_id: String,
}

#[derive(Deserialize)]
struct SessionStatusProperties {
    #[serde(rename = "sessionID")]
    session_id: String,
    status: SessionStatusKind,
}

#[derive(Deserialize)]
struct SessionStatusKind {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct SessionErrorProperties {
    #[serde(rename = "sessionID")]
    session_id: String,
    error: String,
}

#[derive(Deserialize)]
struct PermissionUpdatedProperties {
    id: String,
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(rename = "permissionType")]
    permission_type: String,
    #[serde(default)]
    pattern: Option<Value>,
}

#[derive(Deserialize)]
struct PermissionRepliedProperties {
    #[serde(rename = "permissionID")]
    permission_id: String,
    response: String,
}

fn parse_error(err: serde_json::Error) -> Value {
    json!({ "status": "error", "error": err.to_string() })
}

/// Routes one host event at a time into the supervisor and permission cache.
pub struct EventDispatcher<H, C = SystemClock, G = UuidIdGen>
where
    H: HostClient,
    C: Clock,
    G: IdGen,
{
    supervisor: Arc<ChildSessionSupervisor<H, C, G>>,
    permissions: Arc<PermissionDecisionCache>,
}

impl<H, C, G> EventDispatcher<H, C, G>
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

    /// Dispatch one `{type, properties}` event. Always returns
    /// `{status:"ok"}` for a recognized event, or `{status:"error"}` if the
    /// envelope or its properties couldn't be parsed.
    pub async fn dispatch(&self, event: Value) -> Value {
        let envelope: Envelope = match serde_json::from_value(event) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "malformed host event envelope");
                return parse_error(err);
            }
        };

        match envelope.kind.as_str() {
            "session.idle" => {
                let props: SessionIdleProperties = match serde_json::from_value(envelope.properties)
                {
                    Ok(props) => props,
                    Err(err) => return parse_error(err),
                };
                self.supervisor.on_idle(&ChildSessionId::new(props.session_id));
            }
            "session.status" => {
                let props: SessionStatusProperties =
                    match serde_json::from_value(envelope.properties) {
                        Ok(props) => props,
                        Err(err) => return parse_error(err),
                    };
                if props.status.kind == "busy" {
                    self.supervisor
                        .on_busy(&ChildSessionId::new(props.session_id));
                }
            }
            "session.error" => {
                let props: SessionErrorProperties =
                    match serde_json::from_value(envelope.properties) {
                        Ok(props) => props,
                        Err(err) => return parse_error(err),
                    };
                self.supervisor
                    .on_session_error(&ChildSessionId::new(props.session_id), &props.error)
                    .await;
            }
            "permission.updated" => {
                let props: PermissionUpdatedProperties =
                    match serde_json::from_value(envelope.properties) {
                        Ok(props) => props,
                        Err(err) => return parse_error(err),
                    };
                let child_id = ChildSessionId::new(props.session_id);
                if let Some(orchestrator_id) = self.supervisor.owning_orchestrator(&child_id) {
                    let patterns = normalize_patterns(props.pattern.as_ref());
                    self.permissions
                        .capture(props.id, orchestrator_id, props.permission_type, patterns);
                }
            }
            "permission.replied" => {
                let props: PermissionRepliedProperties =
                    match serde_json::from_value(envelope.properties) {
                        Ok(props) => props,
                        Err(err) => return parse_error(err),
                    };
                self.permissions.reply(&props.permission_id, &props.response);
            }
            other => {
                warn!(event_type = other, "unrecognized host event type");
                return json!({ "status": "error", "error": format!("unrecognized event type: {other}") });
            }
        }

        json!({ "status": "ok" })
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
