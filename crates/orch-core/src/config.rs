// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized configuration resolution: repo root discovery, registry path,
//! and the handful of durations the supervisor needs, with environment
//! overrides for tests (mirroring the teacher's `ORCH_STATE_DIR`-style
//! `env::state_dir()` resolution).

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Marker directory name used to find the repo root, per §4.A.
pub const CONFIG_DIR_MARKER: &str = ".opencode";

/// Subdirectory under the config dir that holds this plugin's state.
pub const PRODUCT_DIR: &str = "child-sessions";

/// Default registry file name.
pub const REGISTRY_FILE_NAME: &str = "session-registry.json";

/// Default idle-debounce duration (§4.D).
pub const DEBOUNCE_DURATION: Duration = Duration::from_millis(5000);

/// Workspace-readiness probe back-off schedule, total budget ~2.75s (§5).
pub const WORKSPACE_PROBE_BACKOFF_MS: &[u64] = &[50, 100, 200, 400, 800, 1200];

/// Walk upward from `start` looking for a `.opencode`-style marker
/// directory. Falls back to `start` itself if none is found.
pub fn find_repo_root(start: &Path) -> PathBuf {
    let mut dir = start;
    loop {
        if dir.join(CONFIG_DIR_MARKER).is_dir() {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return start.to_path_buf(),
        }
    }
}

/// Resolve the registry file path for `repo_root`.
///
/// `ORCH_STATE_DIR`, when set, overrides the whole `<repo_root>/<config
/// dir>/<product dir>` prefix — used by tests for filesystem isolation.
pub fn registry_path(repo_root: &Path) -> PathBuf {
    if let Ok(dir) = std::env::var("ORCH_STATE_DIR") {
        return PathBuf::from(dir).join(REGISTRY_FILE_NAME);
    }
    repo_root
        .join(CONFIG_DIR_MARKER)
        .join(PRODUCT_DIR)
        .join(REGISTRY_FILE_NAME)
}

/// Legacy per-child-file directory, migrated once on first load (§4.A).
pub fn legacy_sessions_dir(repo_root: &Path) -> PathBuf {
    if let Ok(dir) = std::env::var("ORCH_STATE_DIR") {
        return PathBuf::from(dir).join("sessions");
    }
    repo_root
        .join(CONFIG_DIR_MARKER)
        .join(PRODUCT_DIR)
        .join("sessions")
}

/// Directory that holds provisioned worktrees for `repo_root`.
pub fn worktrees_dir(repo_root: &Path) -> PathBuf {
    repo_root.join(CONFIG_DIR_MARKER).join("worktrees")
}

/// Idle-debounce duration, overridable via `ORCH_DEBOUNCE_MS` for tests that
/// would otherwise need to wait out the real 5s window.
pub fn debounce_duration() -> Duration {
    std::env::var("ORCH_DEBOUNCE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEBOUNCE_DURATION)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
