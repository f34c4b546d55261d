//! Line and spacing rules: indentation, line length, operator spacing,
//! and spacing around parentheses.

use super::{first_on_line, is_case_label_colon, prev_sig, Depths};
use crate::diagnostics::Violation;
use crate::engine::{CheckContext, Rule};
use crate::fixer::TextEdit;
use crate::lexer::TokenKind;

/// Leading whitespace must be spaces, exactly one indent width per brace
/// nesting level on statement lines.
///
/// Lines that continue a wrapped statement must be indented at least to
/// the statement's own level; closing `)`/`]` lines and the interior lines
/// of multi-line tokens are exempt. Comment alignment is covered by the
/// comment-format rule instead.
pub struct Indentation;

impl Rule for Indentation {
    fn id(&self) -> &'static str {
        "indentation"
    }

    fn description(&self) -> &'static str {
        "indentation is spaces only, one width per nesting level"
    }

    fn options(&self) -> &'static [&'static str] {
        &["width"]
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let width = ctx
            .config
            .rule_option_usize(self.id(), "width", ctx.config.indent_width);
        if width == 0 {
            return Vec::new();
        }
        let depths = Depths::compute(ctx.tokens);

        // Lines that begin inside a multi-line token (block comment or a
        // string with escaped newlines) are not independently indented.
        let mut interior = std::collections::HashSet::new();
        for t in ctx.tokens {
            for line in t.line + 1..=t.end_line {
                interior.insert(line);
            }
        }

        let mut out = Vec::new();
        let mut tabbed = std::collections::HashSet::new();
        for (idx, raw) in ctx.lines.iter().enumerate() {
            let line_no = idx + 1;
            if raw.trim().is_empty() || interior.contains(&line_no) {
                continue;
            }
            if let Some(tab) = raw
                .char_indices()
                .take_while(|(_, c)| c.is_whitespace())
                .find(|(_, c)| *c == '\t')
            {
                out.push(Violation::new(
                    self.id(),
                    line_no,
                    tab.0 + 1,
                    "indentation must use spaces, not tabs",
                ));
                tabbed.insert(line_no);
            }
        }

        for (i, t) in ctx.tokens.iter().enumerate() {
            if !first_on_line(ctx.tokens, i)
                || t.is_comment()
                || interior.contains(&t.line)
                || tabbed.contains(&t.line)
            {
                continue;
            }
            // Depth is measured before the token, so a line opened by '}'
            // belongs to the level it closes.
            let mut depth = depths.brace[i];
            if t.is_punct("}") {
                depth = depth.saturating_sub(1);
            }
            let expected = depth * width;
            let indent = t.col - 1;
            let starts_statement = prev_sig(ctx.tokens, i).is_none_or(|p| {
                let pt = &ctx.tokens[p];
                pt.is_punct(";")
                    || pt.is_punct("{")
                    || pt.is_punct("}")
                    || (pt.is_op(":") && is_case_label_colon(ctx.tokens, p))
            });
            if starts_statement {
                if indent != expected {
                    out.push(Violation::new(
                        self.id(),
                        t.line,
                        1,
                        format!("expected {expected} spaces of indentation, found {indent}"),
                    ));
                }
            } else if !(t.is_punct(")") || t.is_punct("]")) && indent < expected {
                out.push(Violation::new(
                    self.id(),
                    t.line,
                    1,
                    "continuation line should be indented to its statement's level",
                ));
            }
        }
        out
    }
}

/// Lines must not exceed the configured character limit.
pub struct LineLength;

impl Rule for LineLength {
    fn id(&self) -> &'static str {
        "line-length"
    }

    fn description(&self) -> &'static str {
        "lines stay within the configured maximum length"
    }

    fn options(&self) -> &'static [&'static str] {
        &["max_length"]
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let max = ctx
            .config
            .rule_option_usize(self.id(), "max_length", ctx.config.max_line_length);
        let mut out = Vec::new();
        for (idx, raw) in ctx.lines.iter().enumerate() {
            let len = raw.chars().count();
            if len > max {
                out.push(Violation::new(
                    self.id(),
                    idx + 1,
                    max + 1,
                    format!("line has {len} characters, limit is {max}"),
                ));
            }
        }
        out
    }
}

// '==' and '!=' are absent: strict-equality rewrites them to '==='/'!==',
// and padding is checked on the rewritten form. Fixing both on one token
// would produce overlapping edits.
const BINARY_OPS: &[&str] = &[
    "=", "===", "!==", "<", "<=", ">", ">=", "+", "-", "*", "/", "%", "&&", "||",
    "&", "|", "^", "<<", ">>", ">>>", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=",
    ">>=", ">>>=",
];

/// Binary and assignment operators need whitespace on both sides.
pub struct OperatorSpacing;

impl OperatorSpacing {
    /// `+`/`-` directly after an operator, an opening bracket, a separator,
    /// or a keyword is a sign, not a binary operator.
    fn is_unary(ctx: &CheckContext<'_>, i: usize) -> bool {
        let Some(p) = prev_sig(ctx.tokens, i) else {
            return true;
        };
        let prev = &ctx.tokens[p];
        prev.kind == TokenKind::Operator
            || prev.kind == TokenKind::Keyword
            || matches!(prev.text.as_str(), "(" | "[" | "{" | "," | ";")
    }
}

impl Rule for OperatorSpacing {
    fn id(&self) -> &'static str {
        "operator-spacing"
    }

    fn description(&self) -> &'static str {
        "binary operators are padded with whitespace"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let mut out = Vec::new();
        for (i, t) in ctx.tokens.iter().enumerate() {
            if t.kind != TokenKind::Operator || !BINARY_OPS.contains(&t.text.as_str()) {
                continue;
            }
            if matches!(t.text.as_str(), "+" | "-" | "*" | "&") && Self::is_unary(ctx, i) {
                continue;
            }
            let before_ok = t.start == 0
                || ctx
                    .byte_before(t.start)
                    .is_some_and(|b| b.is_ascii_whitespace());
            let after_ok = ctx
                .byte_at(t.end)
                .is_none_or(|b| b.is_ascii_whitespace());
            if !before_ok || !after_ok {
                out.push(
                    Violation::new(
                        self.id(),
                        t.line,
                        t.col,
                        format!("missing whitespace around '{}'", t.text),
                    )
                    .fixable_at(t.start, t.end),
                );
            }
        }
        out
    }

    fn fix(&self, ctx: &CheckContext<'_>, violation: &Violation) -> Option<TextEdit> {
        let (start, end) = violation.span?;
        let op = &ctx.src[start..end];
        let before_ok = start == 0
            || ctx
                .byte_before(start)
                .is_some_and(|b| b.is_ascii_whitespace());
        let after_ok = ctx.byte_at(end).is_none_or(|b| b.is_ascii_whitespace());
        let mut replacement = String::new();
        if !before_ok {
            replacement.push(' ');
        }
        replacement.push_str(op);
        if !after_ok {
            replacement.push(' ');
        }
        Some(TextEdit::new(start, end, replacement))
    }
}

const PAREN_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "with"];

/// No padding just inside parentheses; one space between a control keyword
/// and its opening parenthesis.
pub struct ParenSpacing;

impl Rule for ParenSpacing {
    fn id(&self) -> &'static str {
        "paren-spacing"
    }

    fn description(&self) -> &'static str {
        "spacing inside and around parentheses"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let bytes = ctx.src.as_bytes();
        let mut out = Vec::new();
        for (i, t) in ctx.tokens.iter().enumerate() {
            if t.is_punct("(") {
                // Space (not newline) directly after the paren.
                let mut end = t.end;
                while matches!(bytes.get(end), Some(b' ' | b'\t')) {
                    end += 1;
                }
                if end > t.end && bytes.get(end).is_some_and(|b| *b != b'\n' && *b != b'\r') {
                    out.push(
                        Violation::new(self.id(), t.line, t.col + 1, "unexpected space after '('")
                            .fixable_at(t.end, end),
                    );
                }
                // Control keywords read better with one space before '('.
                if let Some(p) = prev_sig(ctx.tokens, i) {
                    let prev = &ctx.tokens[p];
                    if prev.kind == TokenKind::Keyword
                        && PAREN_KEYWORDS.contains(&prev.text.as_str())
                        && prev.end == t.start
                    {
                        out.push(
                            Violation::new(
                                self.id(),
                                prev.line,
                                prev.col,
                                format!("missing space after '{}'", prev.text),
                            )
                            .fixable_at(prev.end, prev.end),
                        );
                    }
                }
            } else if t.is_punct(")") {
                let mut start = t.start;
                while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
                    start -= 1;
                }
                let breaks_line = start == 0 || bytes[start - 1] == b'\n';
                if start < t.start && !breaks_line {
                    out.push(
                        Violation::new(self.id(), t.line, t.col, "unexpected space before ')'")
                            .fixable_at(start, t.start),
                    );
                }
            }
        }
        out
    }

    fn fix(&self, _ctx: &CheckContext<'_>, violation: &Violation) -> Option<TextEdit> {
        let (start, end) = violation.span?;
        if start == end {
            Some(TextEdit::insert(start, " "))
        } else {
            Some(TextEdit::delete(start, end))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{check, check_rule, check_with, fix};

    #[test]
    fn test_tight_assignment_is_flagged() {
        let found = check_rule("var x=1;\n", "operator-spacing");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 1);
        assert_eq!(found[0].column, 6);
        assert!(found[0].fixable);
    }

    #[test]
    fn test_tight_assignment_is_the_only_violation() {
        let found = check("var x=1;\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "operator-spacing");
    }

    #[test]
    fn test_operator_spacing_fix_converges() {
        assert_eq!(fix("var x=1;\n"), "var x = 1;\n");
        assert_eq!(fix("var y = a+b;\n"), "var y = a + b;\n");
    }

    #[test]
    fn test_loose_equality_spacing_is_left_to_the_rewrite() {
        // strict-equality owns '=='/'!='; one fix pass rewrites the operator,
        // the next pads the strict form. No conflicting edits either way.
        assert!(check_rule("var x = a==b;\n", "operator-spacing").is_empty());
        let first = fix("var x = a==b;\n");
        assert_eq!(first, "var x = a===b;\n");
        assert_eq!(fix(&first), "var x = a === b;\n");
    }

    #[test]
    fn test_unary_minus_is_not_binary() {
        assert!(check_rule("var x = -1;\n", "operator-spacing").is_empty());
        assert!(check_rule("return -x;\n", "operator-spacing").is_empty());
        assert!(check_rule("f(a, -b);\n", "operator-spacing").is_empty());
    }

    #[test]
    fn test_increment_is_exempt() {
        assert!(check_rule("i++;\n", "operator-spacing").is_empty());
    }

    #[test]
    fn test_regex_literal_is_not_a_division_chain() {
        assert!(check("var re = /ab+c/g;\n").is_empty());
    }

    #[test]
    fn test_statement_indent_must_match_nesting() {
        let src = "if (a) {\n   b();\n}\n";
        let found = check_rule(src, "indentation");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert!(found[0].message.contains("expected 4"));
    }

    #[test]
    fn test_unindented_block_body_is_flagged() {
        let found = check_rule("if (a) {\nb();\n}\n", "indentation");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_over_indented_statement_is_flagged() {
        let found = check_rule("if (a) {\n        b();\n}\n", "indentation");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_nested_levels_are_checked() {
        let src = "if (a) {\n    if (b) {\n        c();\n    }\n}\n";
        assert!(check_rule(src, "indentation").is_empty());
    }

    #[test]
    fn test_indentation_tabs_are_flagged() {
        let found = check_rule("if (a) {\n\tb();\n}\n", "indentation");
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("tabs"));
    }

    #[test]
    fn test_continuation_indent_is_free_above_statement_level() {
        let src = "f(a,\n      b);\n";
        assert!(check_rule(src, "indentation").is_empty());
    }

    #[test]
    fn test_continuation_below_statement_level_is_flagged() {
        let src = "function f() {\n    'use strict';\n    g(a,\nb);\n}\n";
        let found = check_rule(src, "indentation");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 4);
        assert!(found[0].message.contains("continuation"));
    }

    #[test]
    fn test_closing_paren_line_matches_opener() {
        let src = "f(\n    a\n);\n";
        assert!(check_rule(src, "indentation").is_empty());
    }

    #[test]
    fn test_indentation_width_option() {
        let mut cfg = crate::config::Config::default();
        cfg.rules.insert(
            "indentation".into(),
            crate::config::RuleCfg {
                enabled: true,
                options: [("width".to_string(), serde_json::json!(2))].into_iter().collect(),
            },
        );
        let src = "if (a) {\n  b();\n}\n";
        let found: Vec<_> = check_with(src, &cfg)
            .into_iter()
            .filter(|v| v.rule == "indentation")
            .collect();
        assert!(found.is_empty());
    }

    #[test]
    fn test_line_length_limit() {
        let long = format!("var a = '{}';\n", "x".repeat(120));
        let found = check_rule(&long, "line-length");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column, 101);
    }

    #[test]
    fn test_paren_padding_flagged_and_fixed() {
        let found = check_rule("if ( x ) { y(); }\n", "paren-spacing");
        assert_eq!(found.len(), 2);
        assert_eq!(fix("if ( x ) { y(); }\n"), "if (x) { y(); }\n");
    }

    #[test]
    fn test_keyword_needs_space_before_paren() {
        let found = check_rule("if(x) { y(); }\n", "paren-spacing");
        assert_eq!(found.len(), 1);
        assert_eq!(fix("if(x) { y(); }\n"), "if (x) { y(); }\n");
    }

    #[test]
    fn test_multiline_call_args_are_fine() {
        let src = "f(\n    a\n);\n";
        assert!(check_rule(src, "paren-spacing").is_empty());
    }
}
