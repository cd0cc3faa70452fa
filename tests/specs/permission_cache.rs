//! The permission decision cache, fed through the event stream and
//! consulted by the permission hook against a live child session.

use crate::prelude::{orchestrator, plugin_harness};
use serde_json::json;

#[tokio::test]
async fn replied_allow_decision_is_applied_to_a_later_request_with_the_same_pattern() {
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();

    harness
        .events
        .dispatch(json!({
            "type": "permission.updated",
            "properties": {
                "id": "p1",
                "sessionID": session_id,
                "permissionType": "bash",
                "pattern": "git *"
            }
        }))
        .await;
    harness
        .events
        .dispatch(json!({
            "type": "permission.replied",
            "properties": { "permissionID": "p1", "response": "always" }
        }))
        .await;

    let mut request = json!({
        "sessionID": session_id,
        "type": "bash",
        "pattern": "git *",
    });
    let applied = harness.permissions.apply(&mut request);

    assert!(applied);
    assert_eq!(request["status"], "allow");
}

#[tokio::test]
async fn replied_reject_decision_denies_a_later_request() {
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();

    harness
        .events
        .dispatch(json!({
            "type": "permission.updated",
            "properties": {
                "id": "p1",
                "sessionID": session_id,
                "permissionType": "bash",
                "pattern": "rm *"
            }
        }))
        .await;
    harness
        .events
        .dispatch(json!({
            "type": "permission.replied",
            "properties": { "permissionID": "p1", "response": "reject" }
        }))
        .await;

    let mut request = json!({
        "sessionID": session_id,
        "type": "bash",
        "pattern": "rm *",
    });
    let applied = harness.permissions.apply(&mut request);

    assert!(applied);
    assert_eq!(request["status"], "deny");
}

#[tokio::test]
async fn a_request_with_no_remembered_decision_is_left_untouched() {
    let harness = plugin_harness();
    let orch = orchestrator("o1");
    let created = harness
        .tools
        .session_create(&orch, harness.dir.path(), json!({ "title": "t" }))
        .await;
    let session_id = created["sessionID"].as_str().unwrap().to_string();

    let mut request = json!({
        "sessionID": session_id,
        "type": "bash",
        "pattern": "anything",
    });
    let applied = harness.permissions.apply(&mut request);

    assert!(!applied);
    assert!(request.get("status").is_none());
}
