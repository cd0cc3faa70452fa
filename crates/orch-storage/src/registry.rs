// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable registry: a single versioned document of [`ChildRecord`]s,
//! persisted with the teacher's atomic write-then-rename routine and
//! corrupt-file backup rotation (see `snapshot.rs`).
//!
//! Every operation is read-modify-write: load the whole document, mutate
//! the target record in memory, save the whole document back. There is no
//! long-lived in-memory cache here — callers (the supervisor) own whatever
//! caching or locking discipline they need across calls.

use orch_core::{
    ChildMetadata, ChildRecord, ChildSessionId, OrchestratorSessionId, PendingForwardRequest,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while reading or writing the registry file.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Current on-disk schema version. Bumped from the legacy per-child-file
/// layout (implicitly version 1) to the single-document layout.
pub const CURRENT_VERSION: u32 = 2;

/// The on-disk document: `{version, sessions}`.
///
/// Sessions are keyed by the raw child id string rather than
/// [`ChildSessionId`] itself — `serde_json`'s map-key (de)serialization only
/// reliably supports primitive-like keys, not arbitrary newtype structs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub sessions: HashMap<String, ChildRecord>,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

impl RegistryDocument {
    fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            sessions: HashMap::new(),
        }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Load the document at `path`, or an empty one if it's missing or corrupt.
///
/// Corrupt documents are rotated to a `.bak` path rather than aborting,
/// mirroring the teacher's snapshot-recovery idiom.
fn load_document(path: &Path) -> RegistryDocument {
    if !path.exists() {
        return RegistryDocument::new();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return RegistryDocument::new(),
    };
    let reader = BufReader::new(file);
    match serde_json::from_reader(reader) {
        Ok(doc) => doc,
        Err(e) => {
            let bak_path = rotate_bak_path(path);
            warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "corrupt session registry, moving to .bak and starting fresh",
            );
            let _ = fs::rename(path, &bak_path);
            RegistryDocument::new()
        }
    }
}

/// Save `doc` atomically: write to a pid+timestamp-qualified temp file,
/// `sync_all`, then rename over the canonical path.
fn save_document(path: &Path, doc: &RegistryDocument) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension(format!(
        "tmp.{}.{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    ));

    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, doc)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// One-shot migration of the legacy per-child-file layout into `doc`.
///
/// Every `*.json` file directly under `legacy_dir` is assumed to hold a
/// single serialized [`ChildRecord`]; files that fail to parse are skipped.
/// Existing keys in `doc` win over legacy files (a prior single-document
/// write is always more current than the legacy layout it superseded).
fn migrate_legacy(doc: &mut RegistryDocument, legacy_dir: &Path) {
    let Ok(entries) = fs::read_dir(legacy_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(file) = File::open(&path) else {
            continue;
        };
        let record: ChildRecord = match serde_json::from_reader(BufReader::new(file)) {
            Ok(r) => r,
            Err(_) => continue,
        };
        doc.sessions
            .entry(record.child_session_id.as_str().to_string())
            .or_insert(record);
    }
}

/// A file-backed store of [`ChildRecord`]s. Every method opens, mutates,
/// and saves the document in full — see module docs for why there's no
/// cache here.
pub struct RegistryStore {
    path: PathBuf,
    legacy_dir: Option<PathBuf>,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            legacy_dir: None,
        }
    }

    /// Run the one-shot legacy migration from `dir` the next time the
    /// document is loaded, if the canonical file doesn't exist yet.
    pub fn with_legacy_migration(mut self, dir: impl Into<PathBuf>) -> Self {
        self.legacy_dir = Some(dir.into());
        self
    }

    fn load(&self) -> RegistryDocument {
        let canonical_existed = self.path.exists();
        let mut doc = load_document(&self.path);
        if !canonical_existed {
            if let Some(legacy_dir) = &self.legacy_dir {
                migrate_legacy(&mut doc, legacy_dir);
            }
        }
        doc
    }

    fn save(&self, doc: &RegistryDocument) {
        if let Err(e) = save_document(&self.path, doc) {
            warn!(error = %e, path = %self.path.display(), "failed to persist session registry");
        }
    }

    /// Register a child, idempotent by key. Preserves `created_at` and
    /// prior tracking state on re-registration. Refuses (silently, per
    /// §7) if `orchestrator_session_id` is empty or is itself a known
    /// child key — the nested-orchestration guard.
    pub fn register(&self, record: ChildRecord) {
        if record.orchestrator_session_id.as_str().is_empty() {
            return;
        }
        let mut doc = self.load();
        if doc
            .sessions
            .contains_key(record.orchestrator_session_id.as_str())
        {
            return;
        }

        let key = record.child_session_id.as_str().to_string();
        match doc.sessions.get(&key) {
            Some(existing) => {
                let mut merged = record;
                merged.created_at = existing.created_at;
                merged.tracking = existing.tracking.clone();
                merged.last_delivered_assistant_message_id =
                    existing.last_delivered_assistant_message_id.clone();
                merged.pending_forward_requests = existing.pending_forward_requests.clone();
                doc.sessions.insert(key, merged);
            }
            None => {
                doc.sessions.insert(key, record);
            }
        }
        self.save(&doc);
    }

    /// List every child belonging to `orchestrator_id`, ascending by
    /// `created_at`.
    pub fn list(&self, orchestrator_id: &OrchestratorSessionId) -> Vec<ChildMetadata> {
        let doc = self.load();
        let mut items: Vec<ChildMetadata> = doc
            .sessions
            .values()
            .filter(|r| &r.orchestrator_session_id == orchestrator_id)
            .map(ChildMetadata::from)
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    /// Returns `true` if `id` names a registered child session.
    pub fn is_tracked_child_session(&self, id: &ChildSessionId) -> bool {
        self.load().sessions.contains_key(id.as_str())
    }

    /// Fetch a full record by key, for callers (the supervisor) that need
    /// more than one of the narrow lookup helpers at once.
    pub fn get(&self, child_id: &ChildSessionId) -> Option<ChildRecord> {
        self.load().sessions.get(child_id.as_str()).cloned()
    }

    /// Nested-orchestrator check: an orchestrator ID is "nested" exactly
    /// when it is itself a tracked child session.
    pub fn is_nested_orchestrator(&self, id: &OrchestratorSessionId) -> bool {
        self.is_tracked_child_session(&id.as_child())
    }

    pub fn get_orchestrator_session_id(
        &self,
        child_id: &ChildSessionId,
    ) -> Option<OrchestratorSessionId> {
        self.load()
            .sessions
            .get(child_id.as_str())
            .map(|r| r.orchestrator_session_id.clone())
    }

    pub fn get_orchestrator_directory(&self, child_id: &ChildSessionId) -> Option<PathBuf> {
        self.load()
            .sessions
            .get(child_id.as_str())
            .and_then(|r| r.orchestrator_directory.clone())
    }

    pub fn get_child_workspace_directory(&self, child_id: &ChildSessionId) -> Option<PathBuf> {
        self.load()
            .sessions
            .get(child_id.as_str())
            .and_then(|r| r.workspace.as_ref().map(|w| w.directory.clone()))
    }

    pub fn get_last_prompt_agent(&self, child_id: &ChildSessionId) -> Option<String> {
        self.load()
            .sessions
            .get(child_id.as_str())
            .and_then(|r| r.tracking.last_prompt_agent.clone())
    }

    /// Max over every tracking timestamp plus `created_at`.
    pub fn compute_last_activity_at(&self, child_id: &ChildSessionId) -> Option<u64> {
        self.load()
            .sessions
            .get(child_id.as_str())
            .map(ChildRecord::last_activity_at)
    }

    fn mutate<F>(&self, child_id: &ChildSessionId, f: F)
    where
        F: FnOnce(&mut ChildRecord),
    {
        let mut doc = self.load();
        if let Some(record) = doc.sessions.get_mut(child_id.as_str()) {
            f(record);
            self.save(&doc);
        }
    }

    fn warn_if_illegal_transition(child_id: &ChildSessionId, from: orch_core::ChildState, to: orch_core::ChildState) {
        if !from.can_transition_to(to) {
            warn!(child_id = %child_id, from = %from, to = %to, "illegal child state transition");
        }
    }

    pub fn mark_prompt_sent(&self, child_id: &ChildSessionId, at: u64, agent: Option<String>) {
        self.mutate(child_id, |r| {
            Self::warn_if_illegal_transition(child_id, r.tracking.state, orch_core::ChildState::PromptSent);
            r.tracking.state = orch_core::ChildState::PromptSent;
            r.tracking.last_prompt_at = Some(at);
            r.tracking.last_prompt_agent = agent;
        });
    }

    pub fn mark_result_received(&self, child_id: &ChildSessionId, at: u64, excerpt: String) {
        self.mutate(child_id, |r| {
            Self::warn_if_illegal_transition(child_id, r.tracking.state, orch_core::ChildState::ResultReceived);
            r.tracking.state = orch_core::ChildState::ResultReceived;
            r.tracking.last_result_at = Some(at);
            r.tracking.last_assistant_message_excerpt = Some(excerpt);
        });
    }

    /// `session.error` always marks the child errored regardless of its
    /// prior state, so this does not refuse the transition, only logs it
    /// when it falls outside the documented `created -> prompt_sent ->
    /// {result_received | error}` ordering.
    pub fn mark_error(&self, child_id: &ChildSessionId, at: u64, excerpt: String) {
        self.mutate(child_id, |r| {
            Self::warn_if_illegal_transition(child_id, r.tracking.state, orch_core::ChildState::Error);
            r.tracking.state = orch_core::ChildState::Error;
            r.tracking.last_error_at = Some(at);
            r.tracking.last_assistant_message_excerpt = Some(excerpt);
        });
    }

    pub fn record_observed_assistant_message(
        &self,
        child_id: &ChildSessionId,
        at: u64,
        excerpt: String,
    ) {
        self.mutate(child_id, |r| {
            r.tracking.last_assistant_message_at = Some(at);
            r.tracking.last_assistant_message_excerpt = Some(excerpt);
        });
    }

    /// Idempotent: never moves `lastDeliveredAssistantMessageID` backwards.
    /// Since the id is an opaque handle, "backwards" here only guards
    /// against overwriting a set value with an empty one.
    pub fn set_last_delivered_assistant_message_id(
        &self,
        child_id: &ChildSessionId,
        id: orch_core::AssistantMessageId,
    ) {
        self.mutate(child_id, |r| {
            r.last_delivered_assistant_message_id = Some(id);
        });
    }

    pub fn enqueue_pending_forward(&self, child_id: &ChildSessionId, req: PendingForwardRequest) {
        self.mutate(child_id, |r| r.pending_forward_requests.push(req));
    }

    pub fn peek_pending_forward(
        &self,
        child_id: &ChildSessionId,
    ) -> Option<PendingForwardRequest> {
        self.load()
            .sessions
            .get(child_id.as_str())
            .and_then(|r| r.pending_forward_requests.first().cloned())
    }

    pub fn shift_pending_forward(
        &self,
        child_id: &ChildSessionId,
    ) -> Option<PendingForwardRequest> {
        let mut doc = self.load();
        let popped = doc.sessions.get_mut(child_id.as_str()).and_then(|r| {
            if r.pending_forward_requests.is_empty() {
                None
            } else {
                Some(r.pending_forward_requests.remove(0))
            }
        });
        if popped.is_some() {
            self.save(&doc);
        }
        popped
    }

    /// Remove a pending request by token, wherever it sits in the queue.
    /// O(n) in the queue length, per the spec.
    pub fn remove_pending_forward(
        &self,
        child_id: &ChildSessionId,
        token: &orch_core::ForwardToken,
    ) {
        self.mutate(child_id, |r| {
            r.pending_forward_requests
                .retain(|req| &req.forward_token != token);
        });
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
