//! Shared harness for the plugin-surface specifications.

#![allow(dead_code)]

use orch_adapters::FakeHostClient;
use orch_core::id::SequentialIdGen;
use orch_core::{FakeClock, OrchestratorSessionId};
use orch_engine::{ChildSessionSupervisor, PermissionDecisionCache};
use orch_storage::RegistryStore;
use std::sync::Arc;

pub type TestSupervisor = ChildSessionSupervisor<FakeHostClient, FakeClock, SequentialIdGen>;
pub type TestTools = orch_plugin::ToolSurface<FakeHostClient, FakeClock, SequentialIdGen>;
pub type TestEvents = orch_plugin::EventDispatcher<FakeHostClient, FakeClock, SequentialIdGen>;
pub type TestPermissions = orch_plugin::PermissionHook<FakeHostClient, FakeClock, SequentialIdGen>;

pub struct Harness {
    pub tools: TestTools,
    pub events: TestEvents,
    pub permissions: TestPermissions,
    pub host: FakeHostClient,
    pub dir: tempfile::TempDir,
}

pub fn plugin_harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let registry = RegistryStore::new(dir.path().join("registry.json"));
    let host = FakeHostClient::new();
    let supervisor = ChildSessionSupervisor::new(
        registry,
        Arc::new(host.clone()),
        FakeClock::new(),
        SequentialIdGen::new("tok"),
    );
    let decisions = Arc::new(PermissionDecisionCache::new());

    Harness {
        tools: orch_plugin::ToolSurface::new(Arc::clone(&supervisor)),
        events: orch_plugin::EventDispatcher::new(Arc::clone(&supervisor), Arc::clone(&decisions)),
        permissions: orch_plugin::PermissionHook::new(supervisor, decisions),
        host,
        dir,
    }
}

pub fn orchestrator(name: &str) -> OrchestratorSessionId {
    OrchestratorSessionId::new(name)
}
