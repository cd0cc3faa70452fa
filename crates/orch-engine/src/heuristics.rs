// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peripheral heuristics (§6.1, §9): pure string transforms over prompt and
//! forwarded text. Both are best-effort — a failure here is never allowed
//! to abort `session_prompt` or hide the underlying forwarded text.

use std::path::Path;

/// Result of attempting to rewrite orchestrator-relative paths in a prompt
/// to child-workspace-relative ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten(String),
    Unchanged { note: String },
}

/// Substitute occurrences of `from` with `to` in `prompt`, treating both as
/// plain path-string prefixes. Non-UTF8 paths or an empty `from` leave the
/// prompt untouched rather than erroring.
pub fn rewrite_paths(prompt: &str, from: &Path, to: &Path) -> RewriteOutcome {
    let (Some(from_str), Some(to_str)) = (from.to_str(), to.to_str()) else {
        return RewriteOutcome::Unchanged {
            note: "path is not valid UTF-8".to_string(),
        };
    };
    if from_str.is_empty() || from_str == to_str {
        return RewriteOutcome::Unchanged {
            note: "nothing to rewrite".to_string(),
        };
    }
    if !prompt.contains(from_str) {
        return RewriteOutcome::Unchanged {
            note: "no occurrences of orchestrator directory in prompt".to_string(),
        };
    }
    RewriteOutcome::Rewritten(prompt.replace(from_str, to_str))
}

/// Extract candidate questions from forwarded text: lines ending in `?`,
/// plus any lines under a `Questions:`-style header.
pub fn extract_questions(text: &str) -> Vec<String> {
    let mut questions = Vec::new();
    let mut in_block = false;
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            in_block = false;
            continue;
        }
        if line.trim_end_matches(':').eq_ignore_ascii_case("questions") {
            in_block = true;
            continue;
        }
        let bare = line
            .trim_start_matches(['-', '*'])
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
            .trim();
        if in_block && !bare.is_empty() {
            questions.push(bare.to_string());
        } else if line.ends_with('?') {
            questions.push(line.to_string());
        }
    }
    questions.dedup();
    questions
}

#[cfg(test)]
#[path = "heuristics_tests.rs"]
mod tests;
