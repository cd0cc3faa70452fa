// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace provisioning: an isolated git worktree per child, with a
//! fallback to the orchestrator's own directory when the repo doesn't
//! support worktrees or provisioning fails.
//!
//! Creation and teardown shell out to `git` directly via
//! [`crate::subprocess::run_with_timeout`], the same helper and timeout
//! budget the teacher uses for its worktree mutations; removal mirrors the
//! teacher's prune logic in `oj-daemon::listener::mutations` exactly: detect
//! a worktree by `.git` being a file, best-effort `git worktree remove
//! --force`, then unconditionally `remove_dir_all`.

use crate::subprocess::{run_with_timeout, GIT_WORKTREE_TIMEOUT};
use orch_core::config::{worktrees_dir, WORKSPACE_PROBE_BACKOFF_MS};
use orch_core::{WorkspaceKind, WorkspaceRef};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, warn};

const MAX_NAME_COLLISION_RETRIES: u32 = 10;

fn slugify(input: &str, max_len: usize) -> String {
    let mut out = String::new();
    let mut last_was_sep = true;
    for c in input.chars() {
        let lower = c.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            out.push(lower);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_');
    trimmed.chars().take(max_len).collect()
}

fn random_hex(bytes: usize) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex.chars().take(bytes * 2).collect()
}

fn local_timestamp() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    // No chrono dependency here; a monotonic-looking numeric stamp satisfies
    // the "prefix + timestamp" uniqueness requirement just as well as a
    // calendar-formatted one, without pulling in a date/time crate for a
    // single call site.
    format!("{now}")
}

/// Everything provisioning needs to name and place a workspace.
pub struct ProvisionRequest<'a> {
    pub session_id: &'a str,
    pub title: &'a str,
    pub orchestrator_directory: &'a Path,
    pub repo_root: &'a Path,
}

/// Probe whether `repo_root` supports isolated (git worktree) workspaces.
async fn supports_worktrees(repo_root: &Path) -> bool {
    let mut inside = Command::new("git");
    inside
        .arg("rev-parse")
        .arg("--is-inside-work-tree")
        .current_dir(repo_root);
    let inside_ok = matches!(
        run_with_timeout(inside, GIT_WORKTREE_TIMEOUT, "git rev-parse --is-inside-work-tree").await,
        Ok(output) if output.status.success()
    );
    if !inside_ok {
        return false;
    }

    let mut git_dir = Command::new("git");
    git_dir.arg("rev-parse").arg("--git-dir").current_dir(repo_root);
    matches!(
        run_with_timeout(git_dir, GIT_WORKTREE_TIMEOUT, "git rev-parse --git-dir").await,
        Ok(output) if output.status.success()
    )
}

async fn git_worktree_add(repo_root: &Path, branch: &str, dir: &Path) -> Result<(), String> {
    let mut cmd = Command::new("git");
    cmd.arg("worktree")
        .arg("add")
        .arg("-b")
        .arg(branch)
        .arg(dir)
        .current_dir(repo_root);
    let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree add").await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}

/// Provision a workspace for a new child session. Falls back to
/// `request.orchestrator_directory` on any failure, timeout, or when the
/// repo doesn't support worktrees.
pub async fn provision(
    request: ProvisionRequest<'_>,
    mut aborted: watch::Receiver<bool>,
) -> WorkspaceRef {
    if *aborted.borrow() {
        return WorkspaceRef::fallback(request.orchestrator_directory.to_path_buf());
    }

    if !supports_worktrees(request.repo_root).await {
        debug!(repo_root = %request.repo_root.display(), "repo does not support worktrees, using fallback workspace");
        return WorkspaceRef::fallback(request.orchestrator_directory.to_path_buf());
    }

    let worktree_root = worktrees_dir(request.repo_root);
    if tokio::fs::create_dir_all(&worktree_root).await.is_err() {
        return WorkspaceRef::fallback(request.orchestrator_directory.to_path_buf());
    }

    let title_slug = slugify(request.title, 40);
    let id_slug = slugify(request.session_id, 20);
    let stamp = local_timestamp();
    let base_name = format!("wt_{stamp}_{title_slug}_{id_slug}");

    for attempt in 0..=MAX_NAME_COLLISION_RETRIES {
        if *aborted.borrow() {
            return WorkspaceRef::fallback(request.orchestrator_directory.to_path_buf());
        }

        let dir_name = if attempt == 0 {
            base_name.clone()
        } else {
            format!("{base_name}_{attempt}")
        };
        let branch = if attempt == 0 {
            format!("orch/{base_name}")
        } else {
            format!("orch/{base_name}_{}", random_hex(2))
        };
        let dir: PathBuf = worktree_root.join(&dir_name);

        match git_worktree_add(request.repo_root, &branch, &dir).await {
            Ok(()) => return WorkspaceRef::isolated(dir, branch),
            Err(reason) => {
                warn!(attempt, error = %reason, "worktree creation attempt failed, retrying");
                if let Some(delay_ms) = WORKSPACE_PROBE_BACKOFF_MS.get(attempt as usize) {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                }
            }
        }
    }

    warn!("exhausted worktree creation retries, falling back to orchestrator directory");
    WorkspaceRef::fallback(request.orchestrator_directory.to_path_buf())
}

/// Tear down a workspace created by [`provision`]. No-op for fallback
/// workspaces (nothing was created). Best-effort for isolated ones: a
/// failed `git worktree remove` still gets `remove_dir_all`'d.
pub async fn cleanup(workspace: &WorkspaceRef) {
    if workspace.kind != WorkspaceKind::Isolated {
        return;
    }
    let dir = &workspace.directory;
    if !dir.is_dir() {
        return;
    }

    let dot_git = dir.join(".git");
    let is_worktree = tokio::fs::symlink_metadata(&dot_git)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);

    if is_worktree {
        let mut cmd = Command::new("git");
        cmd.arg("worktree")
            .arg("remove")
            .arg("--force")
            .arg(dir)
            .current_dir(dir);
        let _ = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree remove").await;
    }

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
