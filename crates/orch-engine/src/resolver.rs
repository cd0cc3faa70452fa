// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The forwarding resolver: picks the one assistant reply in a child's
//! message history that satisfies a [`PendingForwardRequest`], out of
//! however many intermediate turns the child produced while working.
//!
//! The token line format and scanning rule are the handshake described in
//! §4.C: the supervisor plants `opencode_cc_forward_token: <token>` as the
//! final instruction in an outgoing prompt, and this module is the only
//! place that looks for it on the way back.

use orch_adapters::{HostMessage, HostMessagePart};
use orch_core::{AssistantMessageId, PendingForwardRequest, TriggerMarker, FORWARD_TOKEN_KEY};

/// The one assistant reply that satisfies a pending forward request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardableAssistantMessage {
    pub assistant_message_id: AssistantMessageId,
    pub cleaned_text: String,
}

/// A normalized message: messages without an id are dropped at this stage
/// since they can never be referenced as an `afterAssistantMessageID`
/// anchor or delivered as a forwarding result.
struct Normalized {
    role: String,
    id: String,
    text: String,
}

/// Join every non-ignored text part into one string, in order.
pub fn extract_text(parts: &[HostMessagePart]) -> String {
    parts
        .iter()
        .filter(|p| p.kind == "text" && !p.ignored.unwrap_or(false))
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize(messages: &[HostMessage]) -> Vec<Normalized> {
    messages
        .iter()
        .filter_map(|m| {
            let id = m.id.clone()?;
            Some(Normalized {
                role: m.role.clone(),
                id,
                text: extract_text(&m.parts),
            })
        })
        .collect()
}

fn token_line(token: &str) -> String {
    format!("{FORWARD_TOKEN_KEY}: {token}")
}

/// Strip every line that, trimmed, exactly matches the token line. Lines
/// that merely contain the token text alongside other content are left
/// untouched.
fn strip_token_line(text: &str, expected: &str) -> String {
    text.lines()
        .filter(|line| line.trim() != expected)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Resolve at most one forwardable message for `request` out of `messages`.
pub fn resolve(
    messages: &[HostMessage],
    request: &PendingForwardRequest,
) -> Option<ForwardableAssistantMessage> {
    let normalized = normalize(messages);
    let start_index = start_index(&normalized, request);
    let expected = token_line(request.forward_token.as_str());

    let mut found: Option<ForwardableAssistantMessage> = None;
    for message in normalized.iter().skip(start_index) {
        if message.role != "assistant" {
            continue;
        }
        if !message.text.lines().any(|line| line.trim() == expected) {
            continue;
        }
        let cleaned = strip_token_line(&message.text, &expected);
        if cleaned.is_empty() {
            continue;
        }
        found = Some(ForwardableAssistantMessage {
            assistant_message_id: AssistantMessageId::new(message.id.clone()),
            cleaned_text: cleaned,
        });
    }
    found
}

fn start_index(normalized: &[Normalized], request: &PendingForwardRequest) -> usize {
    if let Some(count) = request.after_message_count {
        if count <= normalized.len() {
            return count;
        }
    }
    if let Some(anchor) = &request.after_assistant_message_id {
        if let Some(pos) = normalized.iter().position(|m| m.id == anchor.as_str()) {
            return pos + 1;
        }
    }
    0
}

/// Snapshot "where are we now" in a child's message list, to be attached to
/// a [`PendingForwardRequest`] before the prompt that will elicit a new
/// reply is dispatched.
pub fn create_trigger_marker(messages: &[HostMessage]) -> TriggerMarker {
    let normalized = normalize(messages);
    let after_assistant_message_id = normalized
        .iter()
        .rev()
        .find(|m| m.role == "assistant")
        .map(|m| AssistantMessageId::new(m.id.clone()));
    TriggerMarker {
        after_message_count: Some(normalized.len()),
        after_assistant_message_id,
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
