// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the supervisor and its collaborators.

use orch_adapters::HostClientError;
use thiserror::Error;

/// Errors surfaced by [`crate::supervisor::ChildSessionSupervisor`].
///
/// These are the validation and host-call failures §7 says must reach the
/// tool caller; everything else (persistence, provisioning fallback,
/// resolver misses) is handled internally and never produces one of these.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("nested orchestration is not supported")]
    NestedOrchestrator,
    #[error("unknown child session: {0}")]
    UnknownChild(String),
    #[error("child session {child} is not owned by caller {caller}")]
    NotOwnedByCaller { child: String, caller: String },
    #[error(transparent)]
    Host(#[from] HostClientError),
}
