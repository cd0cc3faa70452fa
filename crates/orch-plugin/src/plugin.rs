// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production wiring: one [`OrchestratorPlugin`] per repo root, bundling the
//! tool surface, permission hook, and event dispatcher around a single
//! [`ChildSessionSupervisor`].

use orch_adapters::HostClient;
use orch_core::config::{legacy_sessions_dir, registry_path};
use orch_core::{SystemClock, UuidIdGen};
use orch_engine::{ChildSessionSupervisor, PermissionDecisionCache};
use orch_storage::RegistryStore;
use std::path::Path;
use std::sync::Arc;

use crate::events::EventDispatcher;
use crate::permission_hook::PermissionHook;
use crate::tool_surface::ToolSurface;

/// The whole plugin surface for one repo root, using the production
/// `SystemClock`/`UuidIdGen` pair. Tests wire `ToolSurface`/`EventDispatcher`/
/// `PermissionHook` directly against fakes instead of going through this
/// constructor.
pub struct OrchestratorPlugin<H: HostClient> {
    pub tools: ToolSurface<H>,
    pub events: EventDispatcher<H>,
    pub permissions: PermissionHook<H>,
}

impl<H: HostClient> OrchestratorPlugin<H> {
    pub fn new(host: Arc<H>, repo_root: &Path) -> Self {
        let registry = RegistryStore::new(registry_path(repo_root))
            .with_legacy_migration(legacy_sessions_dir(repo_root));
        let supervisor = ChildSessionSupervisor::new(registry, host, SystemClock, UuidIdGen);
        let permissions = Arc::new(PermissionDecisionCache::new());

        Self {
            tools: ToolSurface::new(Arc::clone(&supervisor)),
            events: EventDispatcher::new(Arc::clone(&supervisor), Arc::clone(&permissions)),
            permissions: PermissionHook::new(supervisor, permissions),
        }
    }
}
