// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The child session supervisor (§4.E): wires the registry, debouncer,
//! resolver, workspace provisioner, and host session client together into
//! the handlers the tool surface and event dispatcher (`orch-plugin`) call
//! into.

use crate::debouncer::{IdleCallback, IdleDebouncer};
use crate::error::SupervisorError;
use crate::heuristics::{extract_questions, rewrite_paths, RewriteOutcome};
use crate::resolver::{create_trigger_marker, extract_text, resolve};
use async_trait::async_trait;
use orch_adapters::{is_busy, provision, HostClient, OutgoingPart, ProvisionRequest};
use orch_core::{
    truncate_excerpt, ChildMetadata, ChildRecord, ChildSessionId, ChildState, Clock, ForwardToken,
    IdGen, OrchestratorSessionId, PendingForwardRequest, Progress, SystemClock, TrackingInfo,
    UuidIdGen, WorkspaceRef, ERROR_STRING_MAX, FORWARD_TOKEN_KEY, TRACKING_EXCERPT_MAX,
};
use orch_storage::RegistryStore;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Result of a successful `session_create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedChild {
    pub child_session_id: ChildSessionId,
    pub title: String,
    pub directory: PathBuf,
    pub workspace: WorkspaceRef,
}

/// Result of a successful `session_prompt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSent {
    pub forward_token: ForwardToken,
    pub agent: Option<String>,
    pub path_rewrite_note: Option<String>,
}

/// Snapshot returned by `session_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildStatus {
    pub child_session_id: ChildSessionId,
    pub state: ChildState,
    pub progress: Progress,
    pub tracking: TrackingInfo,
    pub workspace: Option<WorkspaceRef>,
}

/// Bridges [`IdleDebouncer`] timer fires back into
/// [`ChildSessionSupervisor::handle_stable_idle`] without the debouncer
/// holding a strong reference to the supervisor that owns it.
struct StableIdleTrigger<H, C, G>
where
    H: HostClient,
    C: Clock,
    G: IdGen,
{
    supervisor: Weak<ChildSessionSupervisor<H, C, G>>,
}

#[async_trait]
impl<H, C, G> IdleCallback for StableIdleTrigger<H, C, G>
where
    H: HostClient,
    C: Clock,
    G: IdGen + 'static,
{
    async fn on_stable_idle(&self, child_id: ChildSessionId) {
        if let Some(supervisor) = self.supervisor.upgrade() {
            supervisor.handle_stable_idle(&child_id).await;
        }
    }
}

/// The central controller described in §4.E. Construct via [`Self::new`],
/// which returns an `Arc` since the idle debouncer holds a weak
/// back-reference for its timer-fire callback.
pub struct ChildSessionSupervisor<H, C = SystemClock, G = UuidIdGen>
where
    H: HostClient,
    C: Clock,
    G: IdGen,
{
    registry: RegistryStore,
    host: Arc<H>,
    debouncer: IdleDebouncer,
    clock: C,
    id_gen: G,
}

impl<H, C, G> ChildSessionSupervisor<H, C, G>
where
    H: HostClient,
    C: Clock,
    G: IdGen + 'static,
{
    pub fn new(registry: RegistryStore, host: Arc<H>, clock: C, id_gen: G) -> Arc<Self> {
        Arc::new_cyclic(|weak| {
            let callback: Arc<dyn IdleCallback> = Arc::new(StableIdleTrigger {
                supervisor: weak.clone(),
            });
            Self {
                registry,
                host,
                debouncer: IdleDebouncer::new(callback),
                clock,
                id_gen,
            }
        })
    }

    fn refuse_if_nested(&self, orchestrator_id: &OrchestratorSessionId) -> Result<(), SupervisorError> {
        if self.registry.is_nested_orchestrator(orchestrator_id) {
            return Err(SupervisorError::NestedOrchestrator);
        }
        Ok(())
    }

    /// On `session_create`: provision a workspace, then ask the host to
    /// create a child session in it. The workspace is cleaned up if host
    /// creation fails.
    pub async fn session_create(
        &self,
        orchestrator_id: &OrchestratorSessionId,
        orchestrator_directory: &Path,
        repo_root: &Path,
        title: &str,
    ) -> Result<CreatedChild, SupervisorError> {
        self.refuse_if_nested(orchestrator_id)?;

        let provisional_id = self.id_gen.next();
        let (_tx, aborted) = watch::channel(false);
        let workspace = provision(
            ProvisionRequest {
                session_id: &provisional_id,
                title,
                orchestrator_directory,
                repo_root,
            },
            aborted,
        )
        .await;

        let created = match self
            .host
            .session_create(orchestrator_id.as_str(), title, &workspace.directory)
            .await
        {
            Ok(created) => created,
            Err(err) => {
                orch_adapters::cleanup(&workspace).await;
                return Err(SupervisorError::Host(err));
            }
        };

        let child_id = ChildSessionId::new(created.id);
        let record = ChildRecord::new(
            child_id.clone(),
            orchestrator_id.clone(),
            created.title.clone(),
            self.clock.epoch_ms(),
        )
        .with_orchestrator_directory(Some(orchestrator_directory.to_path_buf()))
        .with_workspace(Some(workspace.clone()));
        self.registry.register(record);

        Ok(CreatedChild {
            child_session_id: child_id,
            title: created.title,
            directory: workspace.directory.clone(),
            workspace,
        })
    }

    /// On `session_prompt`: plant a fresh forward token, enqueue the
    /// pending request, and dispatch the prompt asynchronously.
    pub async fn session_prompt(
        &self,
        caller_orchestrator_id: &OrchestratorSessionId,
        child_id: &ChildSessionId,
        prompt: &str,
        agent: Option<&str>,
    ) -> Result<PromptSent, SupervisorError> {
        self.refuse_if_nested(caller_orchestrator_id)?;

        let record = self
            .registry
            .get(child_id)
            .ok_or_else(|| SupervisorError::UnknownChild(child_id.as_str().to_string()))?;

        let directory = record
            .workspace
            .as_ref()
            .map(|w| w.directory.clone())
            .or_else(|| record.orchestrator_directory.clone())
            .unwrap_or_default();

        let mut final_prompt = prompt.to_string();
        let mut path_rewrite_note = None;
        if let Some(orchestrator_directory) = &record.orchestrator_directory {
            match rewrite_paths(prompt, orchestrator_directory, &directory) {
                RewriteOutcome::Rewritten(rewritten) => final_prompt = rewritten,
                RewriteOutcome::Unchanged { note } => path_rewrite_note = Some(note),
            }
        }

        let marker = match self
            .host
            .session_messages(child_id.as_str(), &directory)
            .await
        {
            Ok(messages) => create_trigger_marker(&messages),
            Err(err) => {
                warn!(child_id = %child_id, error = %err, "failed to snapshot trigger marker");
                Default::default()
            }
        };

        let forward_token = ForwardToken::new(self.id_gen.next());
        let pending = PendingForwardRequest::new(forward_token.clone(), self.clock.epoch_ms())
            .with_trigger_marker(marker);
        self.registry.enqueue_pending_forward(child_id, pending);

        let instructed_prompt = format!(
            "{final_prompt}\n\nWhen you are completely finished with this request, end your \
             final reply with exactly this line on its own:\n{FORWARD_TOKEN_KEY}: {forward_token}\n"
        );

        if let Err(err) = self
            .host
            .session_prompt_async(
                child_id.as_str(),
                &directory,
                agent,
                vec![OutgoingPart::text(instructed_prompt)],
            )
            .await
        {
            self.registry.remove_pending_forward(child_id, &forward_token);
            return Err(SupervisorError::Host(err));
        }

        self.registry
            .mark_prompt_sent(child_id, self.clock.epoch_ms(), agent.map(str::to_string));

        Ok(PromptSent {
            forward_token,
            agent: agent.map(str::to_string),
            path_rewrite_note,
        })
    }

    /// `busy` host event: cancel any armed idle timer.
    pub fn on_busy(&self, child_id: &ChildSessionId) {
        self.debouncer.on_busy(child_id);
    }

    /// `idle` host event: re-arm the debounce timer iff at least one
    /// forward request is still pending for this child.
    pub fn on_idle(&self, child_id: &ChildSessionId) {
        let has_pending = self.registry.peek_pending_forward(child_id).is_some();
        self.debouncer.on_idle(child_id, has_pending);
    }

    /// `session.error` host event: always marks the child errored, and
    /// consumes at most one pending request with a synthetic error post.
    pub async fn on_session_error(&self, child_id: &ChildSessionId, error: &str) {
        self.debouncer.on_error(child_id);

        let now = self.clock.epoch_ms();
        self.registry
            .mark_error(child_id, now, truncate_excerpt(error, TRACKING_EXCERPT_MAX));

        let Some(pending) = self.registry.shift_pending_forward(child_id) else {
            return;
        };
        let Some(record) = self.registry.get(child_id) else {
            return;
        };
        let Some(orchestrator_directory) = record.orchestrator_directory.clone() else {
            return;
        };

        let body = format!(
            "[Child session {child_id} error]\n\n{}",
            truncate_excerpt(error, ERROR_STRING_MAX)
        );
        let metadata = json!({
            "childSessionId": child_id.as_str(),
            "status": "error",
            "forwardToken": pending.forward_token.as_str(),
        });
        if let Err(err) = self
            .host
            .session_prompt_synthetic(
                record.orchestrator_session_id.as_str(),
                &orchestrator_directory,
                "",
                vec![OutgoingPart::synthetic(body, metadata)],
            )
            .await
        {
            warn!(child_id = %child_id, error = %err, "failed to post synthetic error message");
        }
    }

    /// Timer fire: forward the oldest pending request's reply if the
    /// resolver finds one and the child has truly gone idle.
    ///
    /// `pub(crate)` rather than private so supervisor tests can drive it
    /// directly instead of waiting out the real debounce window.
    pub(crate) async fn handle_stable_idle(&self, child_id: &ChildSessionId) {
        let Some(pending) = self.registry.peek_pending_forward(child_id) else {
            return;
        };
        let Some(record) = self.registry.get(child_id) else {
            return;
        };
        let Some(directory) = record.workspace.as_ref().map(|w| w.directory.clone()) else {
            return;
        };

        match is_busy(self.host.as_ref(), &directory, child_id.as_str()).await {
            Ok(true) => return,
            Err(err) => {
                debug!(child_id = %child_id, error = %err, "status check failed, skipping this idle fire");
                return;
            }
            Ok(false) => {}
        }

        let messages = match self
            .host
            .session_messages(child_id.as_str(), &directory)
            .await
        {
            Ok(messages) => messages,
            Err(err) => {
                debug!(child_id = %child_id, error = %err, "failed to fetch messages, will retry on next idle");
                return;
            }
        };

        let Some(found) = resolve(&messages, &pending) else {
            debug!(child_id = %child_id, "no forwardable message yet, will retry on next idle");
            return;
        };

        self.registry.shift_pending_forward(child_id);

        if record.last_delivered_assistant_message_id.as_ref() == Some(&found.assistant_message_id) {
            debug!(child_id = %child_id, "forwardable message already delivered, skipping");
            return;
        }

        let Some(orchestrator_directory) = record.orchestrator_directory.clone() else {
            return;
        };

        let label = if record.tracking.last_prompt_agent.as_deref() == Some("plan") {
            "plan"
        } else {
            "completed"
        };
        let body = format!("[Child session {child_id} {label}]\n\n{}", found.cleaned_text);
        let metadata = json!({
            "childSessionId": child_id.as_str(),
            "status": label,
            "assistantMessageId": found.assistant_message_id.as_str(),
            "forwardToken": pending.forward_token.as_str(),
        });
        if let Err(err) = self
            .host
            .session_prompt_synthetic(
                record.orchestrator_session_id.as_str(),
                &orchestrator_directory,
                "",
                vec![OutgoingPart::synthetic(body, metadata)],
            )
            .await
        {
            warn!(child_id = %child_id, error = %err, "failed to post synthetic result message");
        }

        let questions = extract_questions(&found.cleaned_text);
        if !questions.is_empty() {
            let q_body = format!(
                "[Child session {child_id} questions]\n\n{}",
                questions.join("\n")
            );
            let q_metadata = json!({
                "childSessionId": child_id.as_str(),
                "status": "questions",
                "assistantMessageId": found.assistant_message_id.as_str(),
                "forwardToken": pending.forward_token.as_str(),
            });
            let _ = self
                .host
                .session_prompt_synthetic(
                    record.orchestrator_session_id.as_str(),
                    &orchestrator_directory,
                    "",
                    vec![OutgoingPart::synthetic(q_body, q_metadata)],
                )
                .await;
        }

        self.registry
            .set_last_delivered_assistant_message_id(child_id, found.assistant_message_id);
        self.registry.mark_result_received(
            child_id,
            self.clock.epoch_ms(),
            truncate_excerpt(&found.cleaned_text, TRACKING_EXCERPT_MAX),
        );
    }

    /// On `session_status`: verify ownership, optionally refresh the
    /// excerpt from the latest assistant message, and return a snapshot.
    pub async fn session_status(
        &self,
        caller_orchestrator_id: &OrchestratorSessionId,
        child_id: &ChildSessionId,
        refresh: bool,
    ) -> Result<ChildStatus, SupervisorError> {
        self.refuse_if_nested(caller_orchestrator_id)?;

        let mut record = self
            .registry
            .get(child_id)
            .ok_or_else(|| SupervisorError::UnknownChild(child_id.as_str().to_string()))?;

        if &record.orchestrator_session_id != caller_orchestrator_id {
            return Err(SupervisorError::NotOwnedByCaller {
                child: child_id.as_str().to_string(),
                caller: caller_orchestrator_id.as_str().to_string(),
            });
        }

        let directory = record.workspace.as_ref().map(|w| w.directory.clone());

        if refresh {
            if let Some(dir) = &directory {
                if let Ok(messages) = self.host.session_messages(child_id.as_str(), dir).await {
                    if let Some(last) = messages.iter().rev().find(|m| m.role == "assistant" && m.id.is_some()) {
                        let text = extract_text(&last.parts);
                        if !text.trim().is_empty() {
                            self.registry.record_observed_assistant_message(
                                child_id,
                                self.clock.epoch_ms(),
                                truncate_excerpt(&text, TRACKING_EXCERPT_MAX),
                            );
                            record = self.registry.get(child_id).unwrap_or(record);
                        }
                    }
                }
            }
        }

        let host_reports_busy = match &directory {
            Some(dir) => is_busy(self.host.as_ref(), dir, child_id.as_str())
                .await
                .unwrap_or(false),
            None => false,
        };

        Ok(ChildStatus {
            child_session_id: child_id.clone(),
            state: record.tracking.state,
            progress: record.tracking.state.derive_progress(host_reports_busy),
            tracking: record.tracking,
            workspace: record.workspace,
        })
    }

    /// On `session_list`: the registry's listing for this orchestrator.
    pub fn session_list(
        &self,
        orchestrator_id: &OrchestratorSessionId,
    ) -> Result<Vec<ChildMetadata>, SupervisorError> {
        self.refuse_if_nested(orchestrator_id)?;
        Ok(self.registry.list(orchestrator_id))
    }

    /// The orchestrator a given child session is registered under, used by
    /// the permission hook to translate an incoming permission request's
    /// session ID before querying the decision cache.
    pub fn owning_orchestrator(&self, child_id: &ChildSessionId) -> Option<OrchestratorSessionId> {
        self.registry.get_orchestrator_session_id(child_id)
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
