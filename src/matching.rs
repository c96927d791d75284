// src/matching.rs
//! Unicode-safe containment primitives used by the evaluator: exact terms
//! bounded by whitespace, wildcard prefixes bounded by a Unicode letter/number
//! class, and ordered multi-word phrases. All helpers expect text that was
//! already case-folded and whitespace-collapsed by the caller.

use regex::Regex;
use tracing::debug;

/// Left boundary for wildcard prefixes: start of string or any character
/// outside the Unicode letter/number class. An ASCII-only `\w` would keep
/// non-Latin scripts from matching at all.
const WORD_BOUNDARY: &str = r"(?:^|[^\p{L}\p{N}])";

/// Run of Unicode letters/numbers completing a wildcard match.
const WORD_TAIL: &str = r"[\p{L}\p{N}]*";

/// Exact term: present in `text` bounded by start/end-of-string or whitespace
/// on both sides.
pub fn exact_in_text(term: &str, text: &str) -> bool {
    if term.is_empty() || text.is_empty() {
        return false;
    }
    let pattern = format!(r"(?i)(?:^|\s){}(?:\s|$)", regex::escape(term));
    is_match(&pattern, text)
}

/// Wildcard prefix: the literal `prefix` at a word boundary, followed by zero
/// or more letter/number characters. A bare `*` (empty prefix) never matches.
pub fn wildcard_in_text(prefix: &str, text: &str) -> bool {
    if prefix.is_empty() || text.is_empty() {
        return false;
    }
    let pattern = format!("(?i){}{}", WORD_BOUNDARY, regex::escape(prefix));
    is_match(&pattern, text)
}

/// Phrase: the words appear adjacently (separated by one-or-more whitespace)
/// in order; a word ending in `*` is a wildcard at that position.
pub fn phrase_in_text(words: &[String], text: &str) -> bool {
    if words.is_empty() || text.is_empty() {
        return false;
    }
    let last = words.len() - 1;
    let mut pattern = String::from("(?i)");
    for (i, word) in words.iter().enumerate() {
        if word.as_str() == "*" {
            return false;
        }
        let wildcard_prefix = word.strip_suffix('*').filter(|p| !p.is_empty());
        if i == 0 {
            pattern.push_str(if wildcard_prefix.is_some() {
                WORD_BOUNDARY
            } else {
                r"(?:^|\s)"
            });
        } else {
            pattern.push_str(r"\s+");
        }
        match wildcard_prefix {
            Some(prefix) => {
                pattern.push_str(&regex::escape(prefix));
                pattern.push_str(WORD_TAIL);
            }
            None => pattern.push_str(&regex::escape(word)),
        }
        if i == last && wildcard_prefix.is_none() {
            pattern.push_str(r"(?:\s|$)");
        }
    }
    is_match(&pattern, text)
}

/// Single entry point for the evaluator: dispatches on term shape.
/// Terms with whitespace are phrases, a trailing `*` is a wildcard,
/// everything else is an exact term.
pub fn term_in_text(term: &str, text: &str) -> bool {
    if term.contains(char::is_whitespace) {
        let words: Vec<String> = term.split_whitespace().map(str::to_string).collect();
        return phrase_in_text(&words, text);
    }
    if let Some(prefix) = term.strip_suffix('*') {
        return wildcard_in_text(prefix, text);
    }
    exact_in_text(term, text)
}

fn is_match(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(err) => {
            // Unreachable with escaped input; logged rather than propagated
            // because containment must stay infallible.
            debug!(%err, "containment pattern failed to compile");
            false
        }
    }
}
