// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! orch-plugin: the library surface embedded in the host process (§2.1's
//! Component G). Exposes the tool surface the orchestrator agent calls,
//! the permission hook that annotates incoming permission requests, and
//! the event dispatcher that routes host session/permission events into
//! [`orch_engine::ChildSessionSupervisor`].
//!
//! This crate only emits `tracing` events; it never installs a subscriber,
//! since the host process that embeds it owns that decision.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod events;
mod permission_hook;
mod plugin;
mod tool_surface;

pub use events::EventDispatcher;
pub use permission_hook::PermissionHook;
pub use plugin::OrchestratorPlugin;
pub use tool_surface::ToolSurface;
