//! E5: a child session may never act as an orchestrator for another child.

use crate::prelude::{orchestrator, plugin_harness};
use serde_json::json;

#[tokio::test]
async fn nested_orchestrator_is_refused_for_create_and_prompt() {
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();
    let nested_caller = orch_core::ChildSessionId::new(session_id.clone()).as_orchestrator();

    let nested_create = harness
        .tools
        .session_create(&nested_caller, harness.dir.path(), json!({ "title": "nested" }))
        .await;
    assert_eq!(nested_create["status"], "error");

    let nested_prompt = harness
        .tools
        .session_prompt(
            &nested_caller,
            json!({ "sessionID": session_id, "prompt": "hi" }),
        )
        .await;
    assert_eq!(nested_prompt["status"], "error");

    let nested_status = harness
        .tools
        .session_status(&nested_caller, json!({ "sessionID": session_id }))
        .await;
    assert_eq!(nested_status["status"], "error");

    let nested_list = harness.tools.session_list(&nested_caller);
    assert_eq!(nested_list["status"], "error");
}
