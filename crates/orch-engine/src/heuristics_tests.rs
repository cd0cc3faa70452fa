// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn rewrite_paths_substitutes_prefix() {
    let outcome = rewrite_paths(
        "edit /repo/src/main.rs please",
        Path::new("/repo"),
        Path::new("/repo/.opencode/worktrees/wt1"),
    );
    assert_eq!(
        outcome,
        RewriteOutcome::Rewritten(
            "edit /repo/.opencode/worktrees/wt1/src/main.rs please".to_string()
        )
    );
}

#[test]
fn rewrite_paths_unchanged_when_no_occurrence() {
    let outcome = rewrite_paths("nothing path-like here", Path::new("/repo"), Path::new("/wt"));
    assert!(matches!(outcome, RewriteOutcome::Unchanged { .. }));
}

#[test]
fn rewrite_paths_unchanged_when_from_equals_to() {
    let outcome = rewrite_paths("/repo/a.rs", Path::new("/repo"), Path::new("/repo"));
    assert!(matches!(outcome, RewriteOutcome::Unchanged { .. }));
}

#[yare::parameterized(
    single_question_line = { "What should I do next?", vec!["What should I do next?"] },
    no_questions = { "Everything is done.", vec![] },
    questions_block = {
        "I finished the task.\n\nQuestions:\n- Should I deploy?\n- Run tests too?",
        vec!["Should I deploy?", "Run tests too?"],
    },
    mixed_inline_and_block = {
        "Is this right?\n\nQuestions:\n1. Another one?",
        vec!["Is this right?", "Another one?"],
    },
)]
fn extract_questions_cases(text: &str, expected: Vec<&str>) {
    let found = extract_questions(text);
    assert_eq!(found, expected);
}
