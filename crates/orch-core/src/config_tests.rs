// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
fn find_repo_root_walks_up_to_marker() {
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join(CONFIG_DIR_MARKER)).unwrap();
    let nested = root.path().join("a/b/c");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_repo_root(&nested), root.path());
}

#[test]
fn find_repo_root_falls_back_to_start_when_no_marker_exists() {
    let root = tempdir().unwrap();
    let nested = root.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_repo_root(&nested), nested);
}

#[test]
#[serial]
fn registry_path_defaults_under_repo_root() {
    std::env::remove_var("ORCH_STATE_DIR");
    let root = Path::new("/repo");
    let path = registry_path(root);
    assert_eq!(
        path,
        Path::new("/repo/.opencode/child-sessions/session-registry.json")
    );
}

#[test]
#[serial]
fn registry_path_honors_env_override() {
    std::env::set_var("ORCH_STATE_DIR", "/tmp/orch-test-state");
    let path = registry_path(Path::new("/repo"));
    assert_eq!(
        path,
        Path::new("/tmp/orch-test-state/session-registry.json")
    );
    std::env::remove_var("ORCH_STATE_DIR");
}

#[test]
#[serial]
fn debounce_duration_defaults_to_five_seconds() {
    std::env::remove_var("ORCH_DEBOUNCE_MS");
    assert_eq!(debounce_duration(), Duration::from_millis(5000));
}

#[test]
#[serial]
fn debounce_duration_honors_env_override() {
    std::env::set_var("ORCH_DEBOUNCE_MS", "25");
    assert_eq!(debounce_duration(), Duration::from_millis(25));
    std::env::remove_var("ORCH_DEBOUNCE_MS");
}

#[test]
fn worktrees_dir_is_under_config_marker() {
    let dir = worktrees_dir(Path::new("/repo"));
    assert_eq!(dir, Path::new("/repo/.opencode/worktrees"));
}
