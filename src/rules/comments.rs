//! Comment formatting: blank line before own-line comments, indentation
//! matching the following code, `*` alignment in block comments, and
//! `KEYWORD:` annotation shape.

use super::first_on_line;
use crate::diagnostics::{Severity, Violation};
use crate::engine::{CheckContext, Rule};
use crate::lexer::TokenKind;

pub struct CommentFormat;

const ANNOTATIONS: &[&str] = &["TODO", "FIXME", "NOTE", "HACK", "XXX"];

impl CommentFormat {
    /// A line that may directly precede a comment without a separating
    /// blank line: block openers, labels, or another comment.
    fn permits_following_comment(line: &str) -> bool {
        let t = line.trim_end();
        t.is_empty()
            || t.ends_with('{')
            || t.ends_with(':')
            || t.trim_start().starts_with("//")
            || t.trim_start().starts_with('*')
            || t.trim_start().starts_with("/*")
            || t.ends_with("*/")
    }

    fn check_annotation(text: &str, out: &mut Vec<Violation>, line: usize, col: usize) {
        let body = text
            .trim_start_matches('/')
            .trim_start_matches('*')
            .trim_start();
        for kw in ANNOTATIONS {
            if let Some(rest) = body.strip_prefix(kw) {
                // A longer word that merely starts with the keyword is not
                // an annotation.
                let boundary = rest
                    .chars()
                    .next()
                    .is_none_or(|c| !c.is_ascii_alphanumeric());
                if boundary && !rest.starts_with(':') {
                    out.push(Violation::new(
                        "comment-format",
                        line,
                        col,
                        format!("annotation '{kw}' must be followed by a colon"),
                    ));
                }
            }
        }
    }
}

impl Rule for CommentFormat {
    fn id(&self) -> &'static str {
        "comment-format"
    }

    fn description(&self) -> &'static str {
        "comment placement, indentation, alignment, and annotations"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let mut out = Vec::new();
        for (i, t) in ctx.tokens.iter().enumerate() {
            if !t.is_comment() {
                continue;
            }
            Self::check_annotation(&t.text, &mut out, t.line, t.col);

            if !first_on_line(ctx.tokens, i) {
                // Trailing comments share their line with code; only the
                // annotation shape applies.
                continue;
            }

            // Blank line (or a permissive opener) before an own-line comment.
            if t.line > 1 && !Self::permits_following_comment(ctx.lines[t.line - 2]) {
                out.push(Violation::new(
                    self.id(),
                    t.line,
                    t.col,
                    "expected a blank line before this comment",
                ));
            }

            // Comment indentation should match the code it annotates.
            if let Some(next) = ctx.tokens[i + 1..].iter().find(|n| !n.is_comment()) {
                if next.line > t.end_line && next.col != t.col {
                    out.push(Violation::new(
                        self.id(),
                        t.line,
                        t.col,
                        "comment indentation does not match the following line",
                    ));
                }
            }

            // Interior lines of a block comment align their '*' under the
            // '*' of the opening '/*'.
            if t.kind == TokenKind::BlockComment && t.end_line > t.line {
                for line_no in t.line + 1..=t.end_line {
                    let raw = ctx.lines[line_no - 1];
                    let trimmed = raw.trim_start();
                    let col = raw.len() - trimmed.len() + 1;
                    if !trimmed.starts_with('*') {
                        out.push(Violation::new(
                            self.id(),
                            line_no,
                            col,
                            "block comment lines should start with '*'",
                        ));
                    } else if col != t.col + 1 {
                        out.push(Violation::new(
                            self.id(),
                            line_no,
                            col,
                            "block comment '*' is misaligned",
                        ));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::check_rule;

    #[test]
    fn test_blank_line_required_before_comment() {
        let src = "var a = 1;\n// explain b\nvar b = 2;\n";
        let found = check_rule(src, "comment-format");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_blank_line_present_is_fine() {
        let src = "var a = 1;\n\n// explain b\nvar b = 2;\n";
        assert!(check_rule(src, "comment-format").is_empty());
    }

    #[test]
    fn test_comment_after_open_brace_is_fine() {
        let src = "function f() {\n    'use strict';\n\n    // body\n    return 1;\n}\n";
        assert!(check_rule(src, "comment-format").is_empty());
    }

    #[test]
    fn test_comment_indent_must_match_next_line() {
        let src = "if (a) {\n// misplaced\n    b();\n}\n";
        let found = check_rule(src, "comment-format");
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("indentation"));
    }

    #[test]
    fn test_block_comment_star_alignment() {
        let good = "/*\n * one\n * two\n */\nvar a = 1;\n";
        assert!(check_rule(good, "comment-format").is_empty());

        let bad = "/*\n * one\n   * two\n */\nvar a = 1;\n";
        let found = check_rule(bad, "comment-format");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 3);
    }

    #[test]
    fn test_annotation_requires_colon() {
        let found = check_rule("// TODO add caching\nvar a = 1;\n", "comment-format");
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("TODO"));

        assert!(check_rule("// TODO: add caching\nvar a = 1;\n", "comment-format").is_empty());
    }

    #[test]
    fn test_trailing_comment_is_exempt_from_placement() {
        let src = "var a = 1; // trailing\nvar b = 2;\n";
        assert!(check_rule(src, "comment-format").is_empty());
    }
}
