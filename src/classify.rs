//! Heuristic language classification for untagged code blocks.
//!
//! Fenced code that names its own language bypasses this module entirely;
//! the classifier only runs on bare fences and indented code. Rules form a
//! ranked table of substring probes checked against the lowercased text, and
//! the first rule to match wins. Anything unrecognized falls back to `"text"`.

use memchr::memmem;

/// Ranked classification rules. Order matters: earlier rules shadow later
/// ones when their keyword sets overlap (e.g. `from` belongs to SQL here).
static RULES: &[(&str, fn(&str) -> bool)] = &[
    ("sql", is_sql),
    ("python", is_python),
    ("javascript", is_javascript),
    ("java", is_java),
    ("html", is_html),
    ("css", is_css),
    ("bash", is_bash),
];

/// Classify a code snippet, returning a lowercase language tag.
///
/// The tag is suitable for `language-*` CSS classes and for the uppercased
/// corner label on rendered code blocks. Returns `"text"` when no rule
/// matches.
pub fn classify(code: &str) -> &'static str {
    let text = code.trim().to_ascii_lowercase();
    for (tag, predicate) in RULES {
        if predicate(&text) {
            return tag;
        }
    }
    "text"
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles
        .iter()
        .any(|needle| memmem::find(text.as_bytes(), needle.as_bytes()).is_some())
}

fn is_sql(text: &str) -> bool {
    contains_any(
        text,
        &[
            "select", "insert", "update", "delete", "create", "drop", "alter", "from", "where",
            "join",
        ],
    )
}

fn is_python(text: &str) -> bool {
    contains_any(
        text,
        &["def ", "import ", "from ", "class ", "if __name__", "print("],
    )
}

fn is_javascript(text: &str) -> bool {
    contains_any(
        text,
        &["function", "var ", "let ", "const ", "console.log", "=>"],
    )
}

fn is_java(text: &str) -> bool {
    contains_any(text, &["public class", "public static", "system.out.println"])
}

fn is_html(text: &str) -> bool {
    text.contains('<')
        && text.contains('>')
        && contains_any(text, &["<html", "<div", "<p>", "<span"])
}

fn is_css(text: &str) -> bool {
    text.contains('{') && text.contains('}') && text.contains(':')
}

fn is_bash(text: &str) -> bool {
    contains_any(
        text,
        &["#!/bin/bash", "echo ", "cd ", "ls ", "chmod ", "sudo "],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sql() {
        assert_eq!(classify("SELECT * FROM users WHERE id = 1;"), "sql");
    }

    #[test]
    fn test_classify_python() {
        assert_eq!(classify("def main():\n    pass"), "python");
    }

    #[test]
    fn test_classify_javascript() {
        assert_eq!(classify("const add = (a, b) => a + b;"), "javascript");
    }

    #[test]
    fn test_classify_java() {
        assert_eq!(classify("System.out.println(\"hello\");"), "java");
    }

    #[test]
    fn test_classify_html() {
        assert_eq!(classify("<div id=\"box\">hi</div>"), "html");
    }

    #[test]
    fn test_classify_css() {
        assert_eq!(classify("body { color: red; }"), "css");
    }

    #[test]
    fn test_classify_bash() {
        assert_eq!(classify("#!/bin/bash\necho hi"), "bash");
    }

    #[test]
    fn test_classify_fallback_text() {
        assert_eq!(classify("plain prose, nothing special"), "text");
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), "text");
        assert_eq!(classify("   \n  "), "text");
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("Select Name From T"), "sql");
    }

    #[test]
    fn test_classify_rank_order_sql_shadows_python() {
        // "from" belongs to the SQL rule, which outranks Python.
        assert_eq!(classify("from collections import deque"), "sql");
    }

    #[test]
    fn test_classify_rank_order_python_shadows_javascript() {
        assert_eq!(classify("def log():\n    console.log"), "python");
    }
}
