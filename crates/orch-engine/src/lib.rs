// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orch-engine: the child session supervisor and its collaborators
//! (forwarding resolver, idle debouncer, permission decision cache,
//! peripheral heuristics).

mod debouncer;
mod error;
mod heuristics;
mod permissions;
mod resolver;
mod supervisor;

pub use debouncer::{IdleCallback, IdleDebouncer};
pub use error::SupervisorError;
pub use heuristics::{extract_questions, rewrite_paths, RewriteOutcome};
pub use permissions::{normalize_patterns, PermissionDecision, PermissionDecisionCache};
pub use resolver::{create_trigger_marker, extract_text, resolve, ForwardableAssistantMessage};
pub use supervisor::{ChildSessionSupervisor, ChildStatus, CreatedChild, PromptSent};
