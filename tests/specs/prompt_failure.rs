//! E3: a prompt call that fails at the host leaves no pending forward and
//! reports the error through the tool surface.

use crate::prelude::{orchestrator, plugin_harness};
use serde_json::json;

#[tokio::test]
async fn failed_prompt_clears_the_pending_forward_and_reports_an_error() {
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();
    harness.host.fail_next_prompt("host unavailable");

    let response = harness
        .tools
        .session_prompt(&orch, json!({ "sessionID": session_id, "prompt": "go" }))
        .await;

    assert_eq!(response["status"], "error");

    let status = harness
        .tools
        .session_status(&orch, json!({ "sessionID": session_id }))
        .await;
    assert_eq!(status["state"], "created");
}
