// src/evaluator.rs
//! # Match Evaluator
//! Pure, testable logic that maps `(text, include, ignore)` → `MatchResult`.
//! No I/O, no shared state, safe to call from any number of tasks.
//!
//! The caller must hand in already-normalized text (case-folded, whitespace
//! collapsed); the evaluator performs no normalization itself. The ignore
//! veto always runs first and short-circuits the whole decision.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expression::{split_and_members, ParsedExpression};
use crate::matching::term_in_text;

/// Outcome of one evaluation. Created fresh per call, never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_match: bool,
    pub blocked_by_ignore: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_keywords: Vec<String>,
}

impl MatchResult {
    fn no_match() -> Self {
        Self::default()
    }

    fn blocked(ignored_keywords: Vec<String>) -> Self {
        Self {
            is_match: false,
            blocked_by_ignore: true,
            matched_keywords: Vec::new(),
            ignored_keywords,
        }
    }
}

/// Evaluate one include expression (and an optional ignore expression)
/// against normalized message text.
pub fn evaluate(
    text: &str,
    include: &ParsedExpression,
    ignore: Option<&ParsedExpression>,
) -> MatchResult {
    // 1) Ignore veto. Any hit suppresses the notification outright.
    if let Some(ignore) = ignore {
        let vetoed: Vec<String> = veto_terms(ignore)
            .into_iter()
            .filter(|term| term_in_text(term, text))
            .collect();
        if !vetoed.is_empty() {
            debug!(ignored = ?vetoed, "message vetoed by ignore list");
            return MatchResult::blocked(vetoed);
        }
    }

    let mut matched: Vec<String> = Vec::new();

    // 2) Required terms: all must be present.
    for term in &include.required {
        if term_in_text(term, text) {
            matched.push(term.clone());
        } else {
            return MatchResult::no_match();
        }
    }

    // 3) Required-OR groups: at least one member per group. A member with `+`
    // is an AND-item: all of its sub-terms must be present.
    for group in &include.required_or {
        let satisfied = group.iter().any(|member| or_member_matches(member, text));
        if !satisfied {
            return MatchResult::no_match();
        }
    }

    // 4) Plus-joined AND-groups act as optional signals. A group with none of
    // its terms present is inapplicable; a fully present group counts as a
    // match; a partially present group is dropped without vetoing. Subscribers
    // already rely on the partial-drop behavior, so it stays observable as-is.
    let mut and_matches: Vec<String> = Vec::new();
    for group in &include.and_groups {
        let present = group
            .iter()
            .filter(|term| term_in_text(term, text))
            .count();
        if present == 0 {
            continue;
        }
        if present == group.len() {
            and_matches.extend(group.iter().cloned());
        } else {
            debug!(group = ?group, "AND-group only partially present; skipped");
        }
    }

    // 5) Optional terms, wildcards, phrases.
    let mut optional_matches: Vec<String> = Vec::new();
    for term in include.optional.iter().chain(include.wildcards.iter()) {
        if term_in_text(term, text) {
            optional_matches.push(term.clone());
        }
    }
    for phrase_words in &include.phrases {
        let phrase = phrase_words.join(" ");
        if term_in_text(&phrase, text) {
            optional_matches.push(phrase);
        }
    }

    // 6) Final decision. Required criteria, once satisfied above, decide the
    // match on their own; otherwise at least one optional signal must hit.
    let is_match = if include.has_required_criteria() {
        true
    } else {
        !optional_matches.is_empty() || !and_matches.is_empty()
    };

    matched.extend(optional_matches);
    matched.extend(and_matches);

    MatchResult {
        is_match,
        blocked_by_ignore: false,
        matched_keywords: matched,
        ignored_keywords: Vec::new(),
    }
}

/// An OR-group member with `+` joins sub-terms that must all be present.
fn or_member_matches(member: &str, text: &str) -> bool {
    if member.contains('+') {
        let parts = split_and_members(member);
        if parts.len() >= 2 {
            return parts.iter().all(|part| term_in_text(part, text));
        }
    }
    term_in_text(member, text)
}

/// Flatten an ignore expression to plain veto terms. Required/OR/AND
/// structure carries no meaning on the ignore side; `+`-compound members are
/// split so each sub-term can veto on its own.
fn veto_terms(expr: &ParsedExpression) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    terms.extend(expr.required.iter().cloned());
    for group in expr.required_or.iter().chain(expr.and_groups.iter()) {
        for member in group {
            if member.contains('+') {
                terms.extend(split_and_members(member));
            } else {
                terms.push(member.clone());
            }
        }
    }
    terms.extend(expr.optional.iter().cloned());
    terms.extend(expr.wildcards.iter().cloned());
    terms.extend(expr.phrases.iter().map(|words| words.join(" ")));
    terms
}
