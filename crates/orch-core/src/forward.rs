// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The forward-token handshake and the pending-forward-request queue entry.
//!
//! A [`PendingForwardRequest`] is planted every time the orchestrator sends a
//! prompt to a child: it records where in the child's message history to
//! start scanning, and the token the child is asked to echo back so the
//! resolver (`orch-engine::resolver`) can pick the one reply out of however
//! many assistant turns the child produces before going idle.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque token planted in an outgoing prompt and echoed back by the
    /// child on its final reply line, e.g. `opencode_cc_forward_token: <token>`.
    pub struct ForwardToken;
}

crate::define_id! {
    /// Identifier for a single assistant message within a child session.
    pub struct AssistantMessageId;
}

/// The literal key the resolver looks for on its own line, stripped before
/// the forwarded text reaches the orchestrator.
pub const FORWARD_TOKEN_KEY: &str = "opencode_cc_forward_token";

/// One outstanding "the orchestrator sent a prompt and is awaiting a reply".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingForwardRequest {
    pub forward_token: ForwardToken,
    pub created_at: u64,
    /// Scan must start at or after this index in the child's message list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_message_count: Option<usize>,
    /// Fallback anchor when the index is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_assistant_message_id: Option<AssistantMessageId>,
}

impl PendingForwardRequest {
    pub fn new(forward_token: ForwardToken, created_at: u64) -> Self {
        Self {
            forward_token,
            created_at,
            after_message_count: None,
            after_assistant_message_id: None,
        }
    }

    pub fn with_trigger_marker(mut self, marker: TriggerMarker) -> Self {
        self.after_message_count = marker.after_message_count;
        self.after_assistant_message_id = marker.after_assistant_message_id;
        self
    }
}

/// A snapshot of "where are we now" in a child's message list, captured
/// immediately before a new prompt is dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerMarker {
    pub after_message_count: Option<usize>,
    pub after_assistant_message_id: Option<AssistantMessageId>,
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
