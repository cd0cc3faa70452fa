// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tool surface (§4.G): the four JSON-in/JSON-out operations invoked by
//! the orchestrator agent. Every response is a single JSON object with a
//! `status` field in `{created, prompt_sent, ok, error}`.

use orch_core::config::find_repo_root;
use orch_core::{
    ChildSessionId, Clock, IdGen, OrchestratorSessionId, Progress, SystemClock, UuidIdGen,
    ERROR_STRING_MAX,
};
use orch_adapters::HostClient;
use orch_engine::ChildSessionSupervisor;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn error_response(error: &str) -> Value {
    let mut truncated = error.to_string();
    truncated.truncate(ERROR_STRING_MAX);
    json!({ "status": "error", "error": truncated })
}

fn bad_args(err: serde_json::Error) -> Value {
    error_response(&format!("invalid arguments: {err}"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCreateArgs {
    title: String,
}

#[derive(Deserialize)]
struct SessionPromptArgs {
    #[serde(rename = "sessionID")]
    session_id: String,
    prompt: String,
    #[serde(default)]
    agent: Option<String>,
}

#[derive(Deserialize)]
struct SessionStatusArgs {
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(default)]
    refresh: Option<bool>,
}

/// The four tool operations, backed by one [`ChildSessionSupervisor`].
pub struct ToolSurface<H, C = SystemClock, G = UuidIdGen>
where
    H: HostClient,
    C: Clock,
    G: IdGen,
{
    supervisor: Arc<ChildSessionSupervisor<H, C, G>>,
}

impl<H, C, G> ToolSurface<H, C, G>
where
    H: HostClient,
    C: Clock,
    G: IdGen + 'static,
{
    pub fn new(supervisor: Arc<ChildSessionSupervisor<H, C, G>>) -> Self {
        Self { supervisor }
    }

    /// `session_create({title}) -> {status, sessionID, title, directory}`.
    pub async fn session_create(
        &self,
        caller: &OrchestratorSessionId,
        orchestrator_directory: &Path,
        args: Value,
    ) -> Value {
        let args: SessionCreateArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return bad_args(err),
        };
        let repo_root = find_repo_root(orchestrator_directory);
        match self
            .supervisor
            .session_create(caller, orchestrator_directory, &repo_root, &args.title)
            .await
        {
            Ok(created) => json!({
                "status": "created",
                "sessionID": created.child_session_id.as_str(),
                "title": created.title,
                "directory": created.directory,
            }),
            Err(err) => error_response(&err.to_string()),
        }
    }

    /// `session_prompt({sessionID, prompt, agent}) -> {status, sessionID, agent, forwardToken, pathRewrite}`.
    pub async fn session_prompt(&self, caller: &OrchestratorSessionId, args: Value) -> Value {
        let args: SessionPromptArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return bad_args(err),
        };
        let child_id = ChildSessionId::new(args.session_id.clone());
        match self
            .supervisor
            .session_prompt(caller, &child_id, &args.prompt, args.agent.as_deref())
            .await
        {
            Ok(sent) => json!({
                "status": "prompt_sent",
                "sessionID": args.session_id,
                "agent": sent.agent,
                "forwardToken": sent.forward_token.as_str(),
                "pathRewrite": sent.path_rewrite_note,
            }),
            Err(err) => error_response(&err.to_string()),
        }
    }

    /// `session_status({sessionID, refresh}) -> {status, sessionID, state, progress, statusType, timestamps…, excerpt, workspace…}`.
    pub async fn session_status(&self, caller: &OrchestratorSessionId, args: Value) -> Value {
        let args: SessionStatusArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return bad_args(err),
        };
        let child_id = ChildSessionId::new(args.session_id.clone());
        let refresh = args.refresh.unwrap_or(false);
        match self
            .supervisor
            .session_status(caller, &child_id, refresh)
            .await
        {
            Ok(status) => {
                let status_type = if status.progress == Progress::Running {
                    "busy"
                } else {
                    "idle"
                };
                json!({
                    "status": "ok",
                    "sessionID": args.session_id,
                    "state": status.state,
                    "progress": status.progress,
                    "statusType": status_type,
                    "lastPromptAt": status.tracking.last_prompt_at,
                    "lastResultAt": status.tracking.last_result_at,
                    "lastErrorAt": status.tracking.last_error_at,
                    "lastAssistantMessageAt": status.tracking.last_assistant_message_at,
                    "excerpt": status.tracking.last_assistant_message_excerpt,
                    "workspace": status.workspace,
                })
            }
            Err(err) => error_response(&err.to_string()),
        }
    }

    /// `session_list({}) -> {status, count, children}`.
    pub fn session_list(&self, caller: &OrchestratorSessionId) -> Value {
        match self.supervisor.session_list(caller) {
            Ok(children) => {
                let children: Vec<Value> = children.iter().map(child_metadata_json).collect();
                json!({
                    "status": "ok",
                    "count": children.len(),
                    "children": children,
                })
            }
            Err(err) => error_response(&err.to_string()),
        }
    }
}

fn child_metadata_json(child: &orch_core::ChildMetadata) -> Value {
    json!({
        "sessionID": child.child_session_id.as_str(),
        "title": child.title,
        "createdAt": child.created_at,
        "state": child.state,
        "lastActivityAt": child.last_activity_at,
        "workspace": child.workspace,
    })
}

#[cfg(test)]
#[path = "tool_surface_tests.rs"]
mod tests;
