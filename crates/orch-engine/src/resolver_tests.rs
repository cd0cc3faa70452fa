// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orch_core::ForwardToken;

fn text_part(text: &str) -> HostMessagePart {
    HostMessagePart {
        kind: "text".to_string(),
        text: Some(text.to_string()),
        ignored: None,
    }
}

fn assistant(id: &str, text: &str) -> HostMessage {
    HostMessage {
        role: "assistant".to_string(),
        id: Some(id.to_string()),
        parts: vec![text_part(text)],
    }
}

fn tool(id: &str) -> HostMessage {
    HostMessage {
        role: "tool".to_string(),
        id: Some(id.to_string()),
        parts: vec![text_part("result")],
    }
}

fn request(token: &str) -> PendingForwardRequest {
    PendingForwardRequest::new(ForwardToken::new(token), 1)
}

#[yare::parameterized(
    single_match = {
        vec![assistant("a1", "output\nopencode_cc_forward_token: T")],
        Some(("a1", "output")),
    },
    no_match_without_token = {
        vec![assistant("a1", "just thinking")],
        None,
    },
    last_of_two_matches_wins = {
        vec![
            assistant("a1", "first\nopencode_cc_forward_token: T"),
            assistant("a2", "second\nopencode_cc_forward_token: T"),
        ],
        Some(("a2", "second")),
    },
    token_only_with_no_remaining_text_is_skipped = {
        vec![assistant("a1", "opencode_cc_forward_token: T")],
        None,
    },
)]
fn resolve_cases(messages: Vec<HostMessage>, expected: Option<(&str, &str)>) {
    let found = resolve(&messages, &request("T"));
    match expected {
        Some((id, text)) => {
            let found = found.unwrap();
            assert_eq!(found.assistant_message_id.as_str(), id);
            assert_eq!(found.cleaned_text, text);
        }
        None => assert!(found.is_none()),
    }
}

#[test]
fn messages_without_id_are_discarded() {
    let mut orphan = assistant("ignored-anyway", "opencode_cc_forward_token: T");
    orphan.id = None;
    let found = resolve(&[orphan], &request("T"));
    assert!(found.is_none());
}

#[test]
fn intermediate_assistant_turn_without_token_is_skipped() {
    let messages = vec![
        assistant("a1", "thinking..."),
        tool("t1"),
        assistant("a2", "output\nopencode_cc_forward_token: T"),
    ];
    let found = resolve(&messages, &request("T")).unwrap();
    assert_eq!(found.assistant_message_id.as_str(), "a2");
    assert_eq!(found.cleaned_text, "output");
}

#[test]
fn cleaned_text_never_contains_the_token_line() {
    let messages = vec![assistant(
        "a1",
        "line one\nopencode_cc_forward_token: T\nline two",
    )];
    let found = resolve(&messages, &request("T")).unwrap();
    assert!(!found.cleaned_text.contains("opencode_cc_forward_token"));
    assert_eq!(found.cleaned_text, "line one\nline two");
}

#[test]
fn partial_match_on_same_line_is_preserved() {
    let messages = vec![assistant(
        "a1",
        "see opencode_cc_forward_token: T for details",
    )];
    let found = resolve(&messages, &request("T"));
    assert!(found.is_none());
}

#[test]
fn start_index_skips_messages_before_after_message_count() {
    let messages = vec![
        assistant("a1", "old\nopencode_cc_forward_token: T"),
        assistant("a2", "new\nopencode_cc_forward_token: T"),
    ];
    let mut req = request("T");
    req.after_message_count = Some(1);
    let found = resolve(&messages, &req).unwrap();
    assert_eq!(found.assistant_message_id.as_str(), "a2");
}

#[test]
fn start_index_falls_back_to_anchor_message_id() {
    let messages = vec![
        assistant("a1", "old\nopencode_cc_forward_token: T"),
        assistant("a2", "new\nopencode_cc_forward_token: T"),
    ];
    let mut req = request("T");
    req.after_message_count = None;
    req.after_assistant_message_id = Some(orch_core::AssistantMessageId::new("a1"));
    let found = resolve(&messages, &req).unwrap();
    assert_eq!(found.assistant_message_id.as_str(), "a2");
}

#[test]
fn create_trigger_marker_captures_count_and_last_assistant_id() {
    let messages = vec![
        assistant("a1", "first"),
        tool("t1"),
        assistant("a2", "second"),
    ];
    let marker = create_trigger_marker(&messages);
    assert_eq!(marker.after_message_count, Some(3));
    assert_eq!(
        marker.after_assistant_message_id,
        Some(orch_core::AssistantMessageId::new("a2"))
    );
}

#[test]
fn create_trigger_marker_on_empty_history_has_no_anchor() {
    let marker = create_trigger_marker(&[]);
    assert_eq!(marker.after_message_count, Some(0));
    assert_eq!(marker.after_assistant_message_id, None);
}
