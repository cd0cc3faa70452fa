// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake host client for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    CreatedSession, HostAgentInfo, HostClient, HostClientError, HostMessage, HostSessionStatus,
    OutgoingPart,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded host call, for assertions in supervisor tests.
#[derive(Debug, Clone)]
pub enum HostCall {
    SessionCreate {
        parent_id: String,
        title: String,
        directory: PathBuf,
    },
    SessionPromptAsync {
        session_id: String,
        agent: Option<String>,
        parts: Vec<String>,
    },
    SessionPromptSynthetic {
        session_id: String,
        agent: String,
        parts: Vec<String>,
    },
    SessionStatus {
        directory: PathBuf,
    },
    SessionMessages {
        session_id: String,
    },
}

struct FakeHostState {
    calls: Vec<HostCall>,
    next_id: u64,
    statuses: HashMap<String, HostSessionStatus>,
    messages: HashMap<String, Vec<HostMessage>>,
    create_failure: Option<String>,
    prompt_failure: Option<String>,
    agents: Vec<HostAgentInfo>,
}

/// Fake [`HostClient`] for unit-testing the supervisor without a real host.
#[derive(Clone)]
pub struct FakeHostClient {
    inner: Arc<Mutex<FakeHostState>>,
}

impl Default for FakeHostClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeHostState {
                calls: Vec::new(),
                next_id: 0,
                statuses: HashMap::new(),
                messages: HashMap::new(),
                create_failure: None,
                prompt_failure: None,
                agents: Vec::new(),
            })),
        }
    }
}

impl FakeHostClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_status(&self, session_id: &str, status: HostSessionStatus) {
        self.inner
            .lock()
            .statuses
            .insert(session_id.to_string(), status);
    }

    pub fn set_messages(&self, session_id: &str, messages: Vec<HostMessage>) {
        self.inner
            .lock()
            .messages
            .insert(session_id.to_string(), messages);
    }

    pub fn fail_next_create(&self, reason: impl Into<String>) {
        self.inner.lock().create_failure = Some(reason.into());
    }

    pub fn fail_next_prompt(&self, reason: impl Into<String>) {
        self.inner.lock().prompt_failure = Some(reason.into());
    }

    pub fn set_agents(&self, agents: Vec<HostAgentInfo>) {
        self.inner.lock().agents = agents;
    }
}

fn extract_texts(parts: &[OutgoingPart]) -> Vec<String> {
    parts.iter().map(|p| p.text.clone()).collect()
}

#[async_trait]
impl HostClient for FakeHostClient {
    async fn session_create(
        &self,
        parent_id: &str,
        title: &str,
        directory: &Path,
    ) -> Result<CreatedSession, HostClientError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::SessionCreate {
            parent_id: parent_id.to_string(),
            title: title.to_string(),
            directory: directory.to_path_buf(),
        });

        if let Some(reason) = inner.create_failure.take() {
            return Err(HostClientError::CallFailed(reason));
        }

        inner.next_id += 1;
        let id = format!("fake-child-{}", inner.next_id);
        Ok(CreatedSession {
            id,
            title: title.to_string(),
        })
    }

    async fn session_prompt_async(
        &self,
        session_id: &str,
        _directory: &Path,
        agent: Option<&str>,
        parts: Vec<OutgoingPart>,
    ) -> Result<(), HostClientError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::SessionPromptAsync {
            session_id: session_id.to_string(),
            agent: agent.map(str::to_string),
            parts: extract_texts(&parts),
        });

        if let Some(reason) = inner.prompt_failure.take() {
            return Err(HostClientError::CallFailed(reason));
        }
        Ok(())
    }

    async fn session_prompt_synthetic(
        &self,
        session_id: &str,
        _directory: &Path,
        agent: &str,
        parts: Vec<OutgoingPart>,
    ) -> Result<(), HostClientError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::SessionPromptSynthetic {
            session_id: session_id.to_string(),
            agent: agent.to_string(),
            parts: extract_texts(&parts),
        });
        Ok(())
    }

    async fn session_status(
        &self,
        directory: &Path,
    ) -> Result<Vec<(String, HostSessionStatus)>, HostClientError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::SessionStatus {
            directory: directory.to_path_buf(),
        });
        Ok(inner
            .statuses
            .iter()
            .map(|(id, status)| (id.clone(), *status))
            .collect())
    }

    async fn session_messages(
        &self,
        session_id: &str,
        _directory: &Path,
    ) -> Result<Vec<HostMessage>, HostClientError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::SessionMessages {
            session_id: session_id.to_string(),
        });
        Ok(inner.messages.get(session_id).cloned().unwrap_or_default())
    }

    async fn app_agents(&self, _directory: &Path) -> Result<Vec<HostAgentInfo>, HostClientError> {
        Ok(self.inner.lock().agents.clone())
    }
}
