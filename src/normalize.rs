// src/normalize.rs
//! Message-text normalization applied by the pipeline before evaluation.
//! The matching engine itself never normalizes; it relies on this exact
//! precondition: case-folded text with collapsed whitespace.

use once_cell::sync::OnceCell;

pub fn normalize_message(s: &str) -> String {
    // 1) Unify typographic quotes to ASCII
    let mut out = s
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 2) Collapse whitespace (incl. NBSP, newlines, tabs)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 3) Unicode-aware case folding
    out.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_ok() {
        assert_eq!(normalize_message(""), "");
    }

    #[test]
    fn folds_whitespace_and_nbsp() {
        assert_eq!(normalize_message("A\u{00A0}\n\tB   C"), "a b c");
    }

    #[test]
    fn lowercases_non_latin_scripts() {
        assert_eq!(normalize_message("Администратор НУЖЕН"), "администратор нужен");
    }

    #[test]
    fn unifies_quotes() {
        assert_eq!(normalize_message("\u{201C}ok\u{201D}"), "\"ok\"");
    }
}
