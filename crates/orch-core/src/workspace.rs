// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A child's workspace reference: either an isolated git worktree, or `None`
//! meaning the child falls back to reusing the orchestrator's own directory.
//!
//! Unlike the teacher's `WorkspaceId`/`WorkspaceStatus` pair, a child's
//! workspace here has no independent lifecycle entity in the registry — it
//! is a plain value attached to the [`crate::child::ChildRecord`] that owns
//! it, immutable once assigned (invariant 5 of the data model).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of workspace a child was provisioned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceKind {
    /// An isolated, version-controlled worktree dedicated to this child.
    Isolated,
    /// The child reuses the orchestrator's own directory; no worktree was
    /// created (repo doesn't support worktrees, or provisioning failed).
    Fallback,
}

/// The workspace a child session runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub kind: WorkspaceKind,
    pub directory: PathBuf,
    pub branch: Option<String>,
}

impl WorkspaceRef {
    pub fn isolated(directory: PathBuf, branch: String) -> Self {
        Self {
            kind: WorkspaceKind::Isolated,
            directory,
            branch: Some(branch),
        }
    }

    pub fn fallback(directory: PathBuf) -> Self {
        Self {
            kind: WorkspaceKind::Fallback,
            directory,
            branch: None,
        }
    }

    pub fn is_isolated(&self) -> bool {
        self.kind == WorkspaceKind::Isolated
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
