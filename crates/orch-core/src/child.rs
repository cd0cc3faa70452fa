// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable unit of the registry: a child session record and its state
//! machine.

use crate::forward::{AssistantMessageId, PendingForwardRequest};
use crate::session::{ChildSessionId, OrchestratorSessionId};
use crate::workspace::WorkspaceRef;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle state of a child session.
///
/// Allowed transitions: `Created -> PromptSent -> {ResultReceived | Error}`;
/// `PromptSent` and `ResultReceived` may re-enter `PromptSent` on a new
/// prompt. `Error` is not terminal: a follow-up prompt returns to
/// `PromptSent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildState {
    #[default]
    Created,
    PromptSent,
    ResultReceived,
    Error,
}

impl ChildState {
    /// Whether `next` is a legal transition from `self`.
    pub fn can_transition_to(self, next: ChildState) -> bool {
        use ChildState::*;
        matches!(
            (self, next),
            (Created, PromptSent)
                | (PromptSent, ResultReceived)
                | (PromptSent, Error)
                | (ResultReceived, PromptSent)
                | (Error, PromptSent)
        )
    }
}

impl std::fmt::Display for ChildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildState::Created => write!(f, "created"),
            ChildState::PromptSent => write!(f, "prompt_sent"),
            ChildState::ResultReceived => write!(f, "result_received"),
            ChildState::Error => write!(f, "error"),
        }
    }
}

/// Derived progress, computed from state plus the host's live busy/idle
/// signal. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Done,
    Running,
    Pending,
}

impl ChildState {
    /// Derive [`Progress`] given whether the host currently reports the
    /// child busy.
    pub fn derive_progress(self, host_reports_busy: bool) -> Progress {
        match self {
            ChildState::ResultReceived | ChildState::Error => Progress::Done,
            _ if host_reports_busy => Progress::Running,
            _ => Progress::Pending,
        }
    }
}

/// Mutable tracking fields, updated on every supervisor event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub state: ChildState,
    pub last_prompt_at: Option<u64>,
    pub last_prompt_agent: Option<String>,
    pub last_result_at: Option<u64>,
    pub last_error_at: Option<u64>,
    pub last_assistant_message_at: Option<u64>,
    pub last_assistant_message_excerpt: Option<String>,
}

/// The durable unit of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub child_session_id: ChildSessionId,
    pub orchestrator_session_id: OrchestratorSessionId,
    pub orchestrator_directory: Option<PathBuf>,
    pub title: String,
    pub created_at: u64,
    pub workspace: Option<WorkspaceRef>,
    pub tracking: TrackingInfo,
    pub last_delivered_assistant_message_id: Option<AssistantMessageId>,
    pub pending_forward_requests: Vec<PendingForwardRequest>,
}

impl ChildRecord {
    pub fn new(
        child_session_id: ChildSessionId,
        orchestrator_session_id: OrchestratorSessionId,
        title: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            child_session_id,
            orchestrator_session_id,
            orchestrator_directory: None,
            title: title.into(),
            created_at,
            workspace: None,
            tracking: TrackingInfo::default(),
            last_delivered_assistant_message_id: None,
            pending_forward_requests: Vec::new(),
        }
    }

    pub fn with_orchestrator_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.orchestrator_directory = dir;
        self
    }

    pub fn with_workspace(mut self, workspace: Option<WorkspaceRef>) -> Self {
        self.workspace = workspace;
        self
    }

    /// `max` over every timestamp field that can move, per §4.A's
    /// `computeLastActivityAt`.
    pub fn last_activity_at(&self) -> u64 {
        [
            Some(self.created_at),
            self.tracking.last_prompt_at,
            self.tracking.last_result_at,
            self.tracking.last_error_at,
            self.tracking.last_assistant_message_at,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(self.created_at)
    }
}

/// Summary returned by `session_list` / `Registry::list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildMetadata {
    pub child_session_id: ChildSessionId,
    pub title: String,
    pub created_at: u64,
    pub state: ChildState,
    pub last_activity_at: u64,
    pub workspace: Option<WorkspaceRef>,
}

impl From<&ChildRecord> for ChildMetadata {
    fn from(record: &ChildRecord) -> Self {
        Self {
            child_session_id: record.child_session_id.clone(),
            title: record.title.clone(),
            created_at: record.created_at,
            state: record.tracking.state,
            last_activity_at: record.last_activity_at(),
            workspace: record.workspace.clone(),
        }
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
