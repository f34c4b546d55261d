//! Statement-level rules: strict mode placement, strict equality, ternary
//! misuse, mandatory braces, switch fallthrough, and object literal layout.

use super::{first_on_line, is_case_label_colon, match_close, next_sig, prev_sig, Depths};
use crate::diagnostics::{Severity, Violation};
use crate::engine::{CheckContext, Rule};
use crate::fixer::TextEdit;
use crate::lexer::{Token, TokenKind};

fn is_use_strict(t: &Token) -> bool {
    t.kind == TokenKind::Str && t.text.len() >= 2 && &t.text[1..t.text.len() - 1] == "use strict"
}

/// `'use strict'` belongs at the top of a function body, never at the top
/// level of a file.
pub struct StrictMode;

impl Rule for StrictMode {
    fn id(&self) -> &'static str {
        "strict-mode"
    }

    fn description(&self) -> &'static str {
        "strict mode is function-local, never global"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let depths = Depths::compute(tokens);
        let mut out = Vec::new();

        for (i, t) in tokens.iter().enumerate() {
            if is_use_strict(t) && depths.brace[i] == 0 {
                let starts_statement = prev_sig(tokens, i)
                    .is_none_or(|p| tokens[p].is_punct(";") || tokens[p].is_punct("}"));
                if starts_statement {
                    out.push(Violation::new(
                        self.id(),
                        t.line,
                        t.col,
                        "'use strict' must not be applied at the top level",
                    ));
                }
            }

            // Top-level function bodies must open with the pragma. Nested
            // functions inherit it from the enclosing scope.
            if ctx.config.require_strict_mode_per_function
                && t.is_kw("function")
                && depths.brace[i] == 0
            {
                let Some(mut p) = next_sig(tokens, i) else {
                    continue;
                };
                if tokens[p].kind == TokenKind::Ident {
                    let Some(np) = next_sig(tokens, p) else {
                        continue;
                    };
                    p = np;
                }
                if !tokens[p].is_punct("(") {
                    continue;
                }
                let Some(close) = match_close(tokens, p, "(", ")") else {
                    continue;
                };
                let Some(body) = next_sig(tokens, close) else {
                    continue;
                };
                if !tokens[body].is_punct("{") {
                    continue;
                }
                let opens_with_pragma = next_sig(tokens, body)
                    .is_some_and(|first| is_use_strict(&tokens[first]));
                if !opens_with_pragma {
                    out.push(Violation::new(
                        self.id(),
                        t.line,
                        t.col,
                        "function body must begin with 'use strict'",
                    ));
                }
            }
        }
        out
    }
}

/// `==`/`!=` are flagged and rewritten to their strict forms.
pub struct StrictEquality;

impl Rule for StrictEquality {
    fn id(&self) -> &'static str {
        "strict-equality"
    }

    fn description(&self) -> &'static str {
        "loose equality operators are not allowed"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        ctx.tokens
            .iter()
            .filter(|t| t.is_op("==") || t.is_op("!="))
            .map(|t| {
                let strict = if t.text == "==" { "===" } else { "!==" };
                Violation::new(
                    self.id(),
                    t.line,
                    t.col,
                    format!("use '{strict}' instead of '{}'", t.text),
                )
                .fixable_at(t.start, t.end)
            })
            .collect()
    }

    fn fix(&self, ctx: &CheckContext<'_>, violation: &Violation) -> Option<TextEdit> {
        let (start, end) = violation.span?;
        let strict = match &ctx.src[start..end] {
            "==" => "===",
            "!=" => "!==",
            _ => return None,
        };
        Some(TextEdit::new(start, end, strict))
    }
}

/// A ternary evaluated as a bare expression statement runs only for side
/// effects; its result must be assigned, returned, or passed along.
pub struct TernaryStatement;

impl Rule for TernaryStatement {
    fn id(&self) -> &'static str {
        "ternary-statement"
    }

    fn description(&self) -> &'static str {
        "ternary results must be consumed"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let depths = Depths::compute(tokens);
        let mut out = Vec::new();
        for (i, t) in tokens.iter().enumerate() {
            if !t.is_op("?") {
                continue;
            }
            // Statement window: back to the previous terminator.
            let mut start = 0;
            let mut boundary: Option<usize> = None;
            let mut j = i;
            while let Some(p) = prev_sig(tokens, j) {
                let pt = &tokens[p];
                if pt.is_punct(";") || pt.is_punct("{") || pt.is_punct("}") || pt.is_op(":") {
                    start = p + 1;
                    boundary = Some(p);
                    break;
                }
                j = p;
            }
            // A colon boundary that is not a case label means the ternary
            // sits in a property value or another ternary's branch, where
            // its result is consumed.
            if let Some(b) = boundary {
                if tokens[b].is_op(":") && !is_case_label_colon(tokens, b) {
                    continue;
                }
            }
            // Inside parens opened after the statement start the value is an
            // argument or a grouped subexpression, hence consumed.
            if depths.paren[i] > depths.paren.get(start).copied().unwrap_or(0) {
                continue;
            }
            let consumed = tokens[start..i].iter().any(|w| {
                (w.kind == TokenKind::Operator && w.text.ends_with('=') && !matches!(w.text.as_str(), "==" | "===" | "!=" | "!==" | "<=" | ">="))
                    || w.is_kw("return")
                    || w.is_kw("var")
                    || w.is_kw("case")
                    || w.is_kw("throw")
            });
            if !consumed {
                out.push(Violation::new(
                    self.id(),
                    t.line,
                    t.col,
                    "ternary result must be assigned or returned",
                ));
            }
        }
        out
    }
}

const BRACED_KEYWORDS: &[&str] = &["if", "for", "while", "switch"];

/// Compound statement bodies always take braces, even one-liners.
pub struct CompoundStatementBraces;

impl Rule for CompoundStatementBraces {
    fn id(&self) -> &'static str {
        "compound-statement-braces"
    }

    fn description(&self) -> &'static str {
        "control-flow bodies require braces"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let mut out = Vec::new();
        for (i, t) in tokens.iter().enumerate() {
            if t.kind != TokenKind::Keyword {
                continue;
            }
            match t.text.as_str() {
                kw if BRACED_KEYWORDS.contains(&kw) => {
                    let Some(p) = next_sig(tokens, i) else {
                        continue;
                    };
                    if !tokens[p].is_punct("(") {
                        continue;
                    }
                    let Some(close) = match_close(tokens, p, "(", ")") else {
                        continue;
                    };
                    let Some(body) = next_sig(tokens, close) else {
                        continue;
                    };
                    // `while (...)` closing a do-while ends in ';'.
                    if tokens[body].is_punct(";") && kw == "while" {
                        continue;
                    }
                    if !tokens[body].is_punct("{") {
                        out.push(Violation::new(
                            self.id(),
                            t.line,
                            t.col,
                            format!("body of '{kw}' statement requires braces"),
                        ));
                    }
                }
                "else" => {
                    let Some(n) = next_sig(tokens, i) else {
                        continue;
                    };
                    if !tokens[n].is_punct("{") && !tokens[n].is_kw("if") {
                        out.push(Violation::new(
                            self.id(),
                            t.line,
                            t.col,
                            "body of 'else' requires braces",
                        ));
                    }
                }
                "do" => {
                    let Some(n) = next_sig(tokens, i) else {
                        continue;
                    };
                    if !tokens[n].is_punct("{") {
                        out.push(Violation::new(
                            self.id(),
                            t.line,
                            t.col,
                            "body of 'do' requires braces",
                        ));
                    }
                }
                _ => {}
            }
        }
        out
    }
}

const TERMINATORS: &[&str] = &["break", "continue", "return", "throw"];

/// Non-empty case bodies end with a terminator or carry an explicit
/// fallthrough comment before the next label.
pub struct SwitchFallthrough;

impl SwitchFallthrough {
    /// True when the last statement of `segment` begins with a terminator
    /// keyword.
    fn terminated(tokens: &[Token], segment: &[usize]) -> bool {
        // Trailing ';' and '}' tokens only close the final statement (a
        // braced case body ends in '}' after its 'break;'); skip past them
        // to its last content token.
        let mut end = segment.len();
        while end > 0 {
            let t = &tokens[segment[end - 1]];
            if t.is_punct(";") || t.is_punct("}") {
                end -= 1;
            } else {
                break;
            }
        }
        if end == 0 {
            return false;
        }
        // The final statement starts after the last boundary before it.
        let mut stmt_start = 0usize;
        for pos in (0..end - 1).rev() {
            let t = &tokens[segment[pos]];
            if t.is_punct(";") || t.is_punct("}") || t.is_punct("{") {
                stmt_start = pos + 1;
                break;
            }
        }
        TERMINATORS.contains(&tokens[segment[stmt_start]].text.as_str())
    }
}

impl Rule for SwitchFallthrough {
    fn id(&self) -> &'static str {
        "switch-fallthrough"
    }

    fn description(&self) -> &'static str {
        "case fallthrough must be explicit"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let depths = Depths::compute(tokens);
        let mut out = Vec::new();
        for (i, t) in tokens.iter().enumerate() {
            if !t.is_kw("switch") {
                continue;
            }
            let Some(p) = next_sig(tokens, i) else { continue };
            let Some(close) = match_close(tokens, p, "(", ")") else { continue };
            let Some(open) = next_sig(tokens, close) else { continue };
            if !tokens[open].is_punct("{") {
                continue;
            }
            let Some(end) = match_close(tokens, open, "{", "}") else { continue };
            let body_depth = depths.brace[open] + 1;

            // Label positions at the switch body's own depth.
            let labels: Vec<usize> = (open + 1..end)
                .filter(|&k| {
                    depths.brace[k] == body_depth
                        && (tokens[k].is_kw("case") || tokens[k].is_kw("default"))
                })
                .collect();

            for (li, &label) in labels.iter().enumerate() {
                let Some(&next_label) = labels.get(li + 1) else {
                    break; // the last segment falls out of the switch
                };
                let colon = (label..next_label)
                    .find(|&k| tokens[k].is_op(":") && depths.brace[k] == body_depth);
                let Some(colon) = colon else { continue };
                let segment: Vec<usize> = (colon + 1..next_label)
                    .filter(|&k| !tokens[k].is_comment())
                    .collect();
                if segment.is_empty() {
                    continue; // grouped labels share one body
                }
                let has_comment_escape = (segment[segment.len() - 1] + 1..next_label)
                    .any(|k| tokens[k].is_comment());
                if !Self::terminated(tokens, &segment) && !has_comment_escape {
                    out.push(Violation::new(
                        self.id(),
                        tokens[label].line,
                        tokens[label].col,
                        "case falls through without 'break' or a fallthrough comment",
                    ));
                }
            }
        }
        out
    }
}

/// Object literal layout: cuddled opening braces and blank lines around
/// function-valued properties.
pub struct ObjectLiteral;

impl Rule for ObjectLiteral {
    fn id(&self) -> &'static str {
        "object-literal"
    }

    fn description(&self) -> &'static str {
        "object and block brace layout"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let depths = Depths::compute(tokens);
        let mut out = Vec::new();
        for (i, t) in tokens.iter().enumerate() {
            if !t.is_punct("{") {
                continue;
            }
            let prev = prev_sig(tokens, i);

            // Dangling open brace on its own line.
            if first_on_line(tokens, i) {
                if let Some(p) = prev {
                    let pt = &tokens[p];
                    let attaches = pt.is_punct(")")
                        || pt.is_op("=")
                        || pt.is_kw("else")
                        || pt.is_kw("do")
                        || pt.is_kw("try")
                        || pt.is_kw("finally");
                    if attaches && pt.end_line < t.line {
                        out.push(Violation::new(
                            self.id(),
                            t.line,
                            t.col,
                            "opening brace belongs on the same line as the preceding statement",
                        ));
                    }
                }
            }

            // Function-valued properties inside an object literal get a blank
            // line above them (unless they open the literal).
            let is_object = prev.is_some_and(|p| {
                matches!(tokens[p].text.as_str(), "=" | "(" | "," | "[" | ":")
                    || tokens[p].is_kw("return")
            });
            if !is_object {
                continue;
            }
            let Some(end) = match_close(tokens, i, "{", "}") else {
                continue;
            };
            let inner_depth = depths.brace[i] + 1;
            for k in i + 1..end {
                if depths.brace[k] != inner_depth || !tokens[k].is_op(":") {
                    continue;
                }
                let value_is_function =
                    next_sig(tokens, k).is_some_and(|n| tokens[n].is_kw("function"));
                let Some(name_idx) = prev_sig(tokens, k) else {
                    continue;
                };
                let name = &tokens[name_idx];
                if !value_is_function || name.line <= tokens[i].line {
                    continue;
                }
                let above = ctx.lines[name.line - 2].trim();
                if !above.is_empty() && !above.ends_with('{') {
                    out.push(Violation::new(
                        self.id(),
                        name.line,
                        name.col,
                        "separate function-valued properties with a blank line",
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{check, check_rule, check_with, fix};
    use crate::config::Config;

    #[test]
    fn test_unbraced_if_body_is_the_only_violation() {
        let found = check("if (x) doSomething();\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "compound-statement-braces");
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn test_braced_bodies_are_fine() {
        assert!(check("if (x) { doSomething(); }\n").is_empty());
    }

    #[test]
    fn test_else_and_do_require_braces() {
        let src = "if (a) { b(); } else c();\n";
        let found = check_rule(src, "compound-statement-braces");
        assert_eq!(found.len(), 1);

        let found = check_rule("do d(); while (a);\n", "compound-statement-braces");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_do_while_tail_is_not_flagged() {
        let src = "do {\n    a();\n} while (b);\n";
        assert!(check_rule(src, "compound-statement-braces").is_empty());
    }

    #[test]
    fn test_else_if_chain_is_fine() {
        let src = "if (a) {\n    b();\n} else if (c) {\n    d();\n}\n";
        assert!(check_rule(src, "compound-statement-braces").is_empty());
    }

    #[test]
    fn test_loose_equality_flagged_and_fixed() {
        let found = check_rule("if (a == b) { c(); }\n", "strict-equality");
        assert_eq!(found.len(), 1);
        assert!(found[0].fixable);
        assert_eq!(fix("if (a == b) { c(); }\n"), "if (a === b) { c(); }\n");
        assert_eq!(fix("if (a != b) { c(); }\n"), "if (a !== b) { c(); }\n");
    }

    #[test]
    fn test_strict_equality_not_flagged() {
        assert!(check_rule("if (a === b) { c(); }\n", "strict-equality").is_empty());
    }

    #[test]
    fn test_bare_ternary_statement_flagged() {
        let found = check_rule("a === b ? f() : g();\n", "ternary-statement");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_consumed_ternaries_are_fine() {
        assert!(check_rule("var x = a ? 1 : 2;\n", "ternary-statement").is_empty());
        assert!(check_rule("h(a ? 1 : 2);\n", "ternary-statement").is_empty());
        let src = "function f(a) {\n    'use strict';\n    return a ? 1 : 2;\n}\n";
        assert!(check_rule(src, "ternary-statement").is_empty());
    }

    #[test]
    fn test_top_level_use_strict_flagged() {
        let found = check_rule("'use strict';\nvar a = 1;\n", "strict-mode");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn test_function_missing_pragma() {
        let src = "function f() {\n    return 1;\n}\n";
        let found = check_rule(src, "strict-mode");
        assert_eq!(found.len(), 1);

        let mut cfg = Config::default();
        cfg.require_strict_mode_per_function = false;
        let relaxed: Vec<_> = check_with(src, &cfg)
            .into_iter()
            .filter(|v| v.rule == "strict-mode")
            .collect();
        assert!(relaxed.is_empty());
    }

    #[test]
    fn test_function_with_pragma_is_fine() {
        let src = "function f() {\n    'use strict';\n    return 1;\n}\n";
        assert!(check_rule(src, "strict-mode").is_empty());
    }

    #[test]
    fn test_fallthrough_without_terminator() {
        let src = "switch (a) {\ncase 1:\n    f();\ncase 2:\n    g();\n    break;\n}\n";
        let found = check_rule(src, "switch-fallthrough");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_fallthrough_comment_is_explicit() {
        let src = "switch (a) {\ncase 1:\n    f();\n    // falls through\ncase 2:\n    g();\n    break;\n}\n";
        assert!(check_rule(src, "switch-fallthrough").is_empty());
    }

    #[test]
    fn test_grouped_empty_cases_are_fine() {
        let src = "switch (a) {\ncase 1:\ncase 2:\n    g();\n    break;\n}\n";
        assert!(check_rule(src, "switch-fallthrough").is_empty());
    }

    #[test]
    fn test_braced_case_body_ending_in_break_is_fine() {
        let src = "switch (a) {\ncase 1: {\n    f();\n    break;\n}\ncase 2:\n    g();\n    break;\n}\n";
        assert!(check_rule(src, "switch-fallthrough").is_empty());
    }

    #[test]
    fn test_braced_case_body_without_terminator_is_flagged() {
        let src = "switch (a) {\ncase 1: {\n    f();\n}\ncase 2:\n    g();\n    break;\n}\n";
        let found = check_rule(src, "switch-fallthrough");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_return_terminates_case() {
        let src = "switch (a) {\ncase 1:\n    return f();\ncase 2:\n    break;\n}\n";
        assert!(check_rule(src, "switch-fallthrough").is_empty());
    }

    #[test]
    fn test_dangling_open_brace() {
        let src = "if (a)\n{\n    b();\n}\n";
        let found = check_rule(src, "object-literal");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_function_property_needs_blank_line() {
        let src = "var api = {\n    version: 1,\n    start: function () {\n        return 1;\n    }\n};\n";
        let found = check_rule(src, "object-literal");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 3);

        let spaced = "var api = {\n    version: 1,\n\n    start: function () {\n        return 1;\n    }\n};\n";
        assert!(check_rule(spaced, "object-literal").is_empty());
    }
}
