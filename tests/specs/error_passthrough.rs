//! E4: a `session.error` event consumes exactly one pending forward and
//! posts exactly one synthetic error to the orchestrator.

use crate::prelude::{orchestrator, plugin_harness};
use orch_adapters::HostCall;
use serde_json::json;

#[tokio::test]
async fn session_error_event_posts_one_synthetic_error() {
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();
    harness
        .tools
        .session_prompt(&orch, json!({ "sessionID": session_id, "prompt": "go" }))
        .await;

    let response = harness
        .events
        .dispatch(json!({
            "type": "session.error",
            "properties": { "sessionID": session_id, "error": "boom" }
        }))
        .await;
    assert_eq!(response["status"], "ok");

    let errors: Vec<_> = harness
        .host
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            HostCall::SessionPromptSynthetic { parts, .. } => Some(parts),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0][0].contains("error"));
    assert!(errors[0][0].contains("boom"));

    let status = harness
        .tools
        .session_status(&orch, json!({ "sessionID": session_id }))
        .await;
    assert_eq!(status["state"], "error");
}
