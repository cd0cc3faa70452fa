// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn child_and_orchestrator_ids_compare_by_string_value() {
    let child = ChildSessionId::new("c1");
    let as_orch = child.as_orchestrator();
    assert_eq!(as_orch.as_str(), "c1");
    assert_eq!(as_orch.as_child().as_str(), "c1");
}

#[test]
fn distinct_types_do_not_implement_partial_eq_across_each_other() {
    // Compile-time property: ChildSessionId and OrchestratorSessionId are
    // distinct types. This test exercises the explicit conversion path that
    // the nested-orchestrator guard relies on.
    let orch = OrchestratorSessionId::new("o1");
    let child = ChildSessionId::new("c1");
    assert_ne!(orch.as_child().as_str(), child.as_str());
}
