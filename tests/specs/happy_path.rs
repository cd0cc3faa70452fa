//! E1/E2: a prompt round-trips through the tool surface and event stream,
//! and an intermediate assistant turn without the token line is skipped.

use crate::prelude::{orchestrator, plugin_harness};
use orch_adapters::{HostCall, HostMessage, HostMessagePart, HostSessionStatus};
use orch_core::FORWARD_TOKEN_KEY;
use serde_json::json;
use serial_test::serial;
use std::time::Duration;

/// Collapses the 5s idle debounce window to a few milliseconds so these
/// tests don't block on the real timer. Must be set before the supervisor
/// (and its debouncer) is constructed.
fn shrink_debounce_window() {
    std::env::set_var("ORCH_DEBOUNCE_MS", "5");
}

fn text_message(id: &str, role: &str, text: &str) -> HostMessage {
    HostMessage {
        role: role.to_string(),
        id: Some(id.to_string()),
        parts: vec![HostMessagePart {
            kind: "text".to_string(),
            text: Some(text.to_string()),
            ignored: None,
        }],
    }
}

#[tokio::test]
#[serial]
async fn happy_path_delivers_one_synthetic_completion() {
    shrink_debounce_window();
    let harness = plugin_harness();
    let orch = orchestrator("o1");

    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "fix the bug" }))
        .await;
    assert_eq!(created["status"], "created");
    let session_id = created["sessionID"].as_str().unwrap().to_string();

    let prompted = harness
        .tools
        .session_prompt(
            &orch,
            json!({ "sessionID": session_id, "prompt": "Run git status", "agent": "build" }),
        )
        .await;
    assert_eq!(prompted["status"], "prompt_sent");
    let token = prompted["forwardToken"].as_str().unwrap().to_string();

    harness
        .host
        .set_status(&session_id, HostSessionStatus::Idle);
    harness.host.set_messages(
        &session_id,
        vec![
            text_message("a1", "assistant", "scratch"),
            text_message("t1", "tool", "result"),
            text_message(
                "a2",
                "assistant",
                &format!("output\n{FORWARD_TOKEN_KEY}: {token}"),
            ),
        ],
    );

    let idle_response = harness
        .events
        .dispatch(json!({
            "type": "session.idle",
            "properties": { "sessionID": session_id }
        }))
        .await;
    assert_eq!(idle_response["status"], "ok");
    tokio::time::sleep(Duration::from_millis(200)).await;

    let synthetic = harness
        .host
        .calls()
        .into_iter()
        .find_map(|c| match c {
            HostCall::SessionPromptSynthetic {
                session_id, parts, ..
            } => Some((session_id, parts)),
            _ => None,
        })
        .expect("a synthetic completion was posted to the orchestrator");
    assert_eq!(synthetic.0, "o1");
    assert!(synthetic.1[0].contains("completed"));
    assert!(synthetic.1[0].contains("output"));
    assert!(!synthetic.1[0].contains(FORWARD_TOKEN_KEY));

    let status = harness
        .tools
        .session_status(&orch, json!({ "sessionID": session_id }))
        .await;
    assert_eq!(status["status"], "ok");
    assert_eq!(status["state"], "result_received");
    assert_eq!(status["excerpt"], "output");
}

#[tokio::test]
#[serial]
async fn intermediate_assistant_turn_without_the_token_is_skipped() {
    shrink_debounce_window();
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();
    let prompted = harness
        .tools
        .session_prompt(&orch, json!({ "sessionID": session_id, "prompt": "go" }))
        .await;
    let token = prompted["forwardToken"].as_str().unwrap().to_string();

    harness
        .host
        .set_status(&session_id, HostSessionStatus::Idle);
    harness.host.set_messages(
        &session_id,
        vec![
            text_message("a1", "assistant", "thinking..."),
            text_message(
                "a2",
                "assistant",
                &format!("final answer\n{FORWARD_TOKEN_KEY}: {token}"),
            ),
        ],
    );

    harness
        .events
        .dispatch(json!({
            "type": "session.idle",
            "properties": { "sessionID": session_id }
        }))
        .await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let synthetic = harness
        .host
        .calls()
        .into_iter()
        .find_map(|c| match c {
            HostCall::SessionPromptSynthetic { parts, .. } => Some(parts),
            _ => None,
        })
        .expect("the later assistant turn carrying the token was forwarded");
    assert!(synthetic[0].contains("final answer"));
    assert!(!synthetic[0].contains("thinking..."));
}
