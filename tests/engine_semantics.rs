// tests/engine_semantics.rs
// End-to-end checks of the parse → evaluate contract. Tests are
// self-contained; text is written pre-normalized (lowercase, single spaces),
// which is the evaluator's documented precondition.

use channel_alert_bot::{evaluate, normalize_message, parse, MatchResult};

fn run(text: &str, include: &str) -> MatchResult {
    evaluate(text, &parse(include), None)
}

fn run_with_ignore(text: &str, include: &str, ignore: &str) -> MatchResult {
    evaluate(text, &parse(include), Some(&parse(ignore)))
}

#[test]
fn parsing_is_idempotent() {
    for spec in [
        "",
        "java, python",
        "[admin*] linux",
        "[java+kotlin/python], docker+kubernetes, c++, machine learning",
    ] {
        assert_eq!(parse(spec), parse(spec));
    }
}

#[test]
fn bracket_term_is_required() {
    assert!(run("we need python devs", "[python]").is_match);
    assert!(!run("we need java devs", "[python]").is_match);
}

#[test]
fn required_or_with_and_sub_item() {
    let include = "[java+kotlin/python]";
    assert!(run("looking for java and kotlin engineer", include).is_match);
    assert!(!run("looking for java engineer", include).is_match);
}

#[test]
fn wildcard_boundaries_are_unicode_aware() {
    assert!(run("administrator needed", "admin*").is_match);
    assert!(!run("readmin needed", "admin*").is_match);
    // Cyrillic prefix through the full normalize → evaluate path.
    let text = normalize_message("Администратор нужен");
    assert!(run(&text, "админ*").is_match);
}

#[test]
fn ignore_veto_takes_precedence() {
    let r = run_with_ignore("python internship available", "python", "internship");
    assert!(!r.is_match);
    assert!(r.blocked_by_ignore);
    assert_eq!(r.ignored_keywords, vec!["internship"]);
}

#[test]
fn malformed_bracket_auto_repair() {
    assert_eq!(parse("[admin*] linux"), parse("[admin*], linux"));
}

#[test]
fn partial_and_group_neither_matches_nor_vetoes() {
    // Only "docker" present: the group contributes nothing.
    assert!(!run("docker compose tutorial", "docker+kubernetes").is_match);
    // A separately satisfied optional keyword still wins.
    let r = run("docker on linux hosts", "docker+kubernetes, linux");
    assert!(r.is_match);
    assert_eq!(r.matched_keywords, vec!["linux"]);
}

#[test]
fn optional_only_spec_needs_one_hit() {
    assert!(!run("ruby and go positions", "java, python").is_match);
    let r = run("java backend role", "java, python");
    assert!(r.is_match);
    assert_eq!(r.matched_keywords, vec!["java"]);
}

#[test]
fn phrases_match_adjacent_words_in_order() {
    assert!(run("senior machine learning engineer", "machine learning").is_match);
    assert!(!run("learning from machine output", "machine learning").is_match);
}

#[test]
fn evaluation_never_panics_on_adversarial_specs() {
    let specs = [
        "[]", "[[]]", "*,*,*", "+", "a+", "+b", "[|/]", "[a|b|]", "c++ + c++",
        "   ", ",,,,", "[x] y [z] w",
    ];
    for spec in specs {
        let include = parse(spec);
        let _ = evaluate("arbitrary message text", &include, Some(&include));
        let _ = evaluate("", &include, None);
    }
}

#[test]
fn match_result_serializes_cleanly() {
    let r = run("java backend role", "java");
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["is_match"], serde_json::json!(true));
    assert_eq!(v["matched_keywords"], serde_json::json!(["java"]));
    // Empty lists are omitted from the wire shape.
    assert!(v.get("ignored_keywords").is_none());
}
