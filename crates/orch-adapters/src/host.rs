// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The consumed capability set: everything the supervisor needs from the
//! host process embedding this plugin. Modeled the same way the teacher
//! models `SessionAdapter` — an `async_trait` the rest of the crate depends
//! on abstractly, with a real implementation elsewhere and a fake here for
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from host RPC calls.
#[derive(Debug, Error)]
pub enum HostClientError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("host call failed: {0}")]
    CallFailed(String),
    #[error("host call timed out: {0}")]
    TimedOut(String),
}

/// Whether the host currently reports a session as busy or idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSessionStatus {
    Busy,
    Idle,
}

/// One part of a host message (§6's `parts: [{type, text?, ignored?}]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
}

/// One message in a child's session history, as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessage {
    pub role: String,
    /// Messages without an id are discarded by the resolver (§4.C).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub parts: Vec<HostMessagePart>,
}

/// A part sent as the `prompt`/`promptAsync` payload.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingPart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl OutgoingPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
            synthetic: None,
            metadata: None,
        }
    }

    pub fn synthetic(text: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
            synthetic: Some(true),
            metadata: Some(metadata),
        }
    }
}

/// Result of `session.create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: String,
    pub title: String,
}

/// Result of discovering agents available in a directory (`app.agents`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAgentInfo {
    pub name: String,
}

/// The host session client: everything the supervisor consumes from the
/// embedding host (§6, "Host session client (consumed)").
#[async_trait]
pub trait HostClient: Send + Sync + 'static {
    async fn session_create(
        &self,
        parent_id: &str,
        title: &str,
        directory: &Path,
    ) -> Result<CreatedSession, HostClientError>;

    async fn session_prompt_async(
        &self,
        session_id: &str,
        directory: &Path,
        agent: Option<&str>,
        parts: Vec<OutgoingPart>,
    ) -> Result<(), HostClientError>;

    /// Synchronous post of a synthetic message (used to deliver forwarded
    /// results and error notices back into the orchestrator session).
    async fn session_prompt_synthetic(
        &self,
        session_id: &str,
        directory: &Path,
        agent: &str,
        parts: Vec<OutgoingPart>,
    ) -> Result<(), HostClientError>;

    /// Busy/idle status for every session tracked under `directory`.
    async fn session_status(
        &self,
        directory: &Path,
    ) -> Result<Vec<(String, HostSessionStatus)>, HostClientError>;

    async fn session_messages(
        &self,
        session_id: &str,
        directory: &Path,
    ) -> Result<Vec<HostMessage>, HostClientError>;

    /// Optional capability: discover configured agents, used only to check
    /// whether a `"plan"` agent exists. Hosts that don't support this
    /// return an empty list rather than an error.
    async fn app_agents(&self, directory: &Path) -> Result<Vec<HostAgentInfo>, HostClientError> {
        let _ = directory;
        Ok(Vec::new())
    }
}

/// Convenience: look up one session's status out of `session_status`'s
/// full listing.
pub async fn is_busy(
    host: &dyn HostClient,
    directory: &Path,
    session_id: &str,
) -> Result<bool, HostClientError> {
    let statuses = host.session_status(directory).await?;
    Ok(statuses
        .into_iter()
        .any(|(id, status)| id == session_id && status == HostSessionStatus::Busy))
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHostClient, HostCall};

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
