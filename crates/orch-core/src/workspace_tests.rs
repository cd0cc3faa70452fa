// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

#[test]
fn isolated_workspace_carries_a_branch() {
    let ws = WorkspaceRef::isolated(PathBuf::from("/repo/.opencode/worktrees/wt1"), "wt/wt1".into());
    assert!(ws.is_isolated());
    assert_eq!(ws.branch.as_deref(), Some("wt/wt1"));
}

#[test]
fn fallback_workspace_has_no_branch() {
    let ws = WorkspaceRef::fallback(PathBuf::from("/repo"));
    assert!(!ws.is_isolated());
    assert_eq!(ws.branch, None);
}
