/// Language reported when nothing else matches.
pub const PLAIN_TEXT: &str = "text";

/// Guesses a snippet's language from a few telltale tokens.
///
/// Rules are tried in order and the first hit wins, so React code is reported
/// as javascript even though it also contains `const `.
pub fn detect_language(code: &str) -> &'static str {
    let has = |needle: &str| code.contains(needle);

    if has("import React") || has("useState") {
        "javascript"
    } else if has("def ") && has(":") {
        "python"
    } else if has("public class") || has("public static void main") {
        "java"
    } else if has("func ") && has("package main") {
        "go"
    } else if has("fn ") && has("let mut") {
        "rust"
    } else if has("#include") || has("std::") {
        "cpp"
    } else if has("const ") || has("let ") || has("var ") {
        "javascript"
    } else {
        PLAIN_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_common_languages() {
        assert_eq!(detect_language("import React from 'react';"), "javascript");
        assert_eq!(detect_language("def add(a, b):\n    return a + b"), "python");
        assert_eq!(
            detect_language("public class Main { public static void main(String[] a) {} }"),
            "java"
        );
        assert_eq!(detect_language("package main\n\nfunc main() {}"), "go");
        assert_eq!(detect_language("fn main() { let mut x = 1; }"), "rust");
        assert_eq!(detect_language("#include <stdio.h>"), "cpp");
        assert_eq!(detect_language("var x = 1;"), "javascript");
    }

    #[test]
    fn test_first_rule_wins() {
        // "let " would also match the javascript fallback
        assert_eq!(detect_language("fn f() { let mut v = vec![]; }"), "rust");
        // rust without `let mut` falls through to the generic `let ` rule
        assert_eq!(detect_language("fn f() { let v = 1; }"), "javascript");
    }

    #[test]
    fn test_unknown_is_text() {
        assert_eq!(detect_language("SELECT * FROM users"), PLAIN_TEXT);
        assert_eq!(detect_language(""), PLAIN_TEXT);
    }
}
