// src/expression.rs
//! Keyword specification parser: splits a subscriber-authored comma-separated
//! filter string into a structured boolean expression.
//!
//! Syntax: `[term]` required, `[a|b]` / `[a/b]` required-OR, `a+b` AND-group,
//! `term*` wildcard, multi-word tokens are phrases, everything else is an
//! optional exact term. Parsing is total over free text: malformed input is
//! repaired or dropped with a logged notice, never an error.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

/// Literal keywords that contain group syntax characters but are single terms.
/// Checked case-insensitively against the whole token.
const AND_LITERAL_EXCEPTIONS: [&str; 4] = ["c++", "c#", ".net", "f#"];

/// Placeholder protecting the substring `c++` while splitting on `+`,
/// so `"c++ + remote"` parses as the members `["c++", "remote"]`.
const CPP_GUARD: &str = "\u{1}cpp\u{1}";

static DEFAULT_PARSER: Lazy<KeywordParser> = Lazy::new(KeywordParser::default);

/// One comma-separated unit of a specification string, after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    Required(String),
    RequiredOr(Vec<String>),
    AndGroup(Vec<String>),
    Phrase(Vec<String>),
    Wildcard(String),
    Optional(String),
}

/// Immutable output of the parser. Every raw token lands in exactly one
/// bucket; only a genuinely empty bracket group is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedExpression {
    /// Bracketed single terms; all must be present.
    pub required: BTreeSet<String>,
    /// Bracketed `|`/`/` groups; at least one member per group must be
    /// present. A member may itself be a `+`-compound AND-item.
    pub required_or: Vec<Vec<String>>,
    /// `+`-joined groups outside brackets.
    pub and_groups: Vec<Vec<String>>,
    /// Plain exact terms.
    pub optional: BTreeSet<String>,
    /// Terms ending in `*`, stored as written.
    pub wildcards: BTreeSet<String>,
    /// Multi-word tokens, split into ordered word lists.
    pub phrases: Vec<Vec<String>>,
}

impl ParsedExpression {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
            && self.required_or.is_empty()
            && self.and_groups.is_empty()
            && self.optional.is_empty()
            && self.wildcards.is_empty()
            && self.phrases.is_empty()
    }

    /// True when the expression carries required or required-OR criteria;
    /// those alone decide the match once satisfied.
    pub fn has_required_criteria(&self) -> bool {
        !self.required.is_empty() || !self.required_or.is_empty()
    }
}

/// The parser owns its fixed exception set; no mutable global state.
#[derive(Debug, Clone)]
pub struct KeywordParser {
    and_exceptions: HashSet<String>,
}

impl Default for KeywordParser {
    fn default() -> Self {
        Self {
            and_exceptions: AND_LITERAL_EXCEPTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Parse with the default exception set. Pure and deterministic; callers may
/// cache results keyed by the raw string but are not required to.
pub fn parse(spec: &str) -> ParsedExpression {
    DEFAULT_PARSER.parse(spec)
}

impl KeywordParser {
    pub fn parse(&self, spec: &str) -> ParsedExpression {
        let mut expr = ParsedExpression::default();
        for token in split_tokens(spec) {
            let token = token.to_lowercase();
            match self.classify(&token) {
                Some(TokenClass::Required(term)) => {
                    expr.required.insert(term);
                }
                Some(TokenClass::RequiredOr(group)) => expr.required_or.push(group),
                Some(TokenClass::AndGroup(group)) => expr.and_groups.push(group),
                Some(TokenClass::Phrase(words)) => expr.phrases.push(words),
                Some(TokenClass::Wildcard(term)) => {
                    expr.wildcards.insert(term);
                }
                Some(TokenClass::Optional(term)) => {
                    expr.optional.insert(term);
                }
                None => {}
            }
        }
        expr
    }

    /// Classify one trimmed, lowercased token. `None` means the token was
    /// dropped (empty bracket group).
    fn classify(&self, token: &str) -> Option<TokenClass> {
        if token.starts_with('[') {
            return self.classify_bracket(token);
        }
        if token.contains('+') && !self.and_exceptions.contains(token) {
            let members = split_and_members(token);
            // A single trailing `+` ("remote+") is a plain term, not a group.
            if members.len() >= 2 {
                return Some(TokenClass::AndGroup(members));
            }
        }
        if token.contains(char::is_whitespace) {
            let words = token.split_whitespace().map(str::to_string).collect();
            return Some(TokenClass::Phrase(words));
        }
        if token.ends_with('*') {
            return Some(TokenClass::Wildcard(token.to_string()));
        }
        Some(TokenClass::Optional(token.to_string()))
    }

    fn classify_bracket(&self, token: &str) -> Option<TokenClass> {
        if !token.ends_with(']') {
            warn!(token = %token, "unterminated bracket group in keyword spec");
        }
        let inner = token
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim();
        if inner.is_empty() {
            warn!(token = %token, "empty bracket group in keyword spec; ignored");
            return None;
        }
        let separator = if inner.contains('|') {
            Some('|')
        } else if inner.contains('/') {
            Some('/')
        } else {
            None
        };
        if let Some(sep) = separator {
            let members: Vec<String> = inner
                .split(sep)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if members.is_empty() {
                warn!(token = %token, "bracket group with only separators; ignored");
                return None;
            }
            return Some(TokenClass::RequiredOr(members));
        }
        Some(TokenClass::Required(inner.to_string()))
    }
}

/// Split the raw spec on commas, trim, drop blanks, and repair bracket groups
/// the subscriber forgot to comma-separate: `"[admin*] linux python"` becomes
/// the tokens `["[admin*]", "linux", "python"]`.
fn split_tokens(spec: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in spec.split(',') {
        let tok = raw.trim();
        if tok.is_empty() {
            continue;
        }
        if tok.contains('[') && tok.contains(']') && !tok.ends_with(']') {
            if let Some(close) = tok.find(']') {
                let (group, tail) = tok.split_at(close + 1);
                warn!(token = %tok, "bracket group not comma-separated; auto-splitting");
                tokens.push(group.trim().to_string());
                tokens.extend(tail.split_whitespace().map(str::to_string));
                continue;
            }
        }
        tokens.push(tok.to_string());
    }
    tokens
}

/// Split a `+`-joined token into trimmed, non-blank members, protecting the
/// literal `c++` from the split.
pub(crate) fn split_and_members(token: &str) -> Vec<String> {
    token
        .replace("c++", CPP_GUARD)
        .split('+')
        .map(|part| part.trim().replace(CPP_GUARD, "c++"))
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(spec: &str) -> ParsedExpression {
        parse(spec)
    }

    #[test]
    fn plain_terms_are_optional() {
        let e = parsed("java, python");
        assert_eq!(
            e.optional.iter().cloned().collect::<Vec<_>>(),
            vec!["java", "python"]
        );
        assert!(!e.has_required_criteria());
    }

    #[test]
    fn blanks_and_stray_commas_are_dropped() {
        let e = parsed(" java , ,,  python ,");
        assert_eq!(e.optional.len(), 2);
    }

    #[test]
    fn bracket_single_term_is_required() {
        let e = parsed("[devops]");
        assert!(e.required.contains("devops"));
        assert!(e.has_required_criteria());
    }

    #[test]
    fn bracket_or_group_splits_on_pipe_or_slash() {
        let e = parsed("[java|kotlin], [rust/go]");
        assert_eq!(e.required_or.len(), 2);
        assert_eq!(e.required_or[0], vec!["java", "kotlin"]);
        assert_eq!(e.required_or[1], vec!["rust", "go"]);
    }

    #[test]
    fn empty_bracket_group_is_ignored() {
        let e = parsed("[], linux");
        assert!(e.required.is_empty());
        assert!(e.optional.contains("linux"));
    }

    #[test]
    fn and_group_outside_brackets() {
        let e = parsed("docker+kubernetes");
        assert_eq!(e.and_groups, vec![vec!["docker", "kubernetes"]]);
    }

    #[test]
    fn and_literal_exceptions_stay_single_terms() {
        let e = parsed("C++, c#, .NET, f#");
        assert!(e.and_groups.is_empty());
        assert!(e.optional.contains("c++"));
        assert!(e.optional.contains("c#"));
        assert!(e.optional.contains(".net"));
        assert!(e.optional.contains("f#"));
    }

    #[test]
    fn cpp_survives_inside_and_group() {
        let e = parsed("c++ + remote");
        assert_eq!(e.and_groups, vec![vec!["c++", "remote"]]);
    }

    #[test]
    fn single_trailing_plus_is_not_a_group() {
        let e = parsed("remote+");
        assert!(e.and_groups.is_empty());
        assert!(e.optional.contains("remote+"));
    }

    #[test]
    fn multi_word_token_is_a_phrase() {
        let e = parsed("machine learning");
        assert_eq!(e.phrases, vec![vec!["machine", "learning"]]);
    }

    #[test]
    fn phrase_words_may_be_wildcards() {
        let e = parsed("senior dev*");
        assert_eq!(e.phrases, vec![vec!["senior", "dev*"]]);
    }

    #[test]
    fn trailing_star_is_a_wildcard() {
        let e = parsed("admin*");
        assert!(e.wildcards.contains("admin*"));
    }

    #[test]
    fn bracket_repair_splits_missing_comma() {
        let repaired = parsed("[admin*] linux python");
        let explicit = parsed("[admin*], linux, python");
        assert_eq!(repaired, explicit);
        assert!(repaired.required.contains("admin*"));
        assert!(repaired.optional.contains("linux"));
        assert!(repaired.optional.contains("python"));
    }

    #[test]
    fn or_group_keeps_compound_and_members() {
        let e = parsed("[java+kotlin/python]");
        assert_eq!(e.required_or, vec![vec!["java+kotlin", "python"]]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let spec = "[backend], docker+kubernetes, admin*, machine learning, c++";
        assert_eq!(parse(spec), parse(spec));
    }

    #[test]
    fn classification_is_total() {
        // Adversarial junk must classify without panicking and without loss
        // (other than empty brackets).
        let e = parsed("[[weird]], +++, [a|], *, [unclosed");
        assert!(e.required.contains("weird"));
        // "+++"  -> no non-blank members -> falls through to optional
        assert!(e.optional.contains("+++"));
        // "[a|]" -> one-member OR group
        assert_eq!(e.required_or, vec![vec!["a"]]);
        // bare "*" classifies as wildcard; it simply never matches
        assert!(e.wildcards.contains("*"));
        // unterminated bracket keeps its content as a required term
        assert!(e.required.contains("unclosed"));
    }
}
