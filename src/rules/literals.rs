//! Literal formatting: quote style, octal literals, bare decimal points,
//! and explicit `undefined` initializers.

use super::prev_sig;
use crate::diagnostics::Violation;
use crate::engine::{CheckContext, Rule};
use crate::fixer::TextEdit;
use crate::lexer::TokenKind;

pub struct PrimitiveLiterals;

const MSG_QUOTES_SINGLE: &str = "string should use single quotes";
const MSG_QUOTES_DOUBLE: &str = "string should use double quotes";
const MSG_OCTAL: &str = "octal literals are not allowed";
const MSG_LEADING_ZERO: &str = "decimal fractions need a leading zero";
const MSG_TRAILING_ZERO: &str = "decimal points need a trailing digit";
const MSG_UNDEFINED: &str = "do not initialize variables to undefined";

impl PrimitiveLiterals {
    fn looks_octal(text: &str) -> bool {
        text.len() > 1
            && text.starts_with('0')
            && text.bytes().all(|b| b.is_ascii_digit())
    }

    /// `= undefined` inside a var statement: walk back to make sure the
    /// identifier being initialized belongs to a declaration.
    fn is_undefined_initializer(ctx: &CheckContext<'_>, i: usize) -> Option<(usize, usize)> {
        let eq = prev_sig(ctx.tokens, i)?;
        if !ctx.tokens[eq].is_op("=") {
            return None;
        }
        let name = prev_sig(ctx.tokens, eq)?;
        if ctx.tokens[name].kind != TokenKind::Ident {
            return None;
        }
        // Statement must start with `var` (scan back to the previous
        // statement boundary).
        let mut j = name;
        loop {
            let Some(p) = prev_sig(ctx.tokens, j) else {
                return None;
            };
            let t = &ctx.tokens[p];
            if t.is_punct(";") || t.is_punct("{") || t.is_punct("}") {
                return None;
            }
            if t.is_kw("var") {
                return Some((ctx.tokens[name].end, ctx.tokens[i].end));
            }
            j = p;
        }
    }
}

impl Rule for PrimitiveLiterals {
    fn id(&self) -> &'static str {
        "primitive-literals"
    }

    fn description(&self) -> &'static str {
        "literal formatting: quotes, octals, decimal points, undefined"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let want = ctx.config.quote_style.quote_char();
        let mut out = Vec::new();
        for (i, t) in ctx.tokens.iter().enumerate() {
            match t.kind {
                TokenKind::Str => {
                    let actual = t.text.chars().next().unwrap_or('\'');
                    if actual == want {
                        continue;
                    }
                    let msg = if want == '\'' {
                        MSG_QUOTES_SINGLE
                    } else {
                        MSG_QUOTES_DOUBLE
                    };
                    let body = &t.text[1..t.text.len() - 1];
                    let mut v = Violation::new(self.id(), t.line, t.col, msg);
                    // Re-quoting is only safe when the body never mentions
                    // the target quote character.
                    if !body.contains(want) {
                        v = v.fixable_at(t.start, t.end);
                    }
                    out.push(v);
                }
                TokenKind::Number => {
                    if Self::looks_octal(&t.text) {
                        out.push(Violation::new(self.id(), t.line, t.col, MSG_OCTAL));
                    } else if t.text.starts_with('.') {
                        out.push(
                            Violation::new(self.id(), t.line, t.col, MSG_LEADING_ZERO)
                                .fixable_at(t.start, t.start),
                        );
                    } else if t.text.ends_with('.') {
                        out.push(
                            Violation::new(self.id(), t.line, t.col, MSG_TRAILING_ZERO)
                                .fixable_at(t.end, t.end),
                        );
                    }
                }
                TokenKind::Ident if t.text == "undefined" => {
                    if let Some((start, end)) = Self::is_undefined_initializer(ctx, i) {
                        out.push(
                            Violation::new(self.id(), t.line, t.col, MSG_UNDEFINED)
                                .fixable_at(start, end),
                        );
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn fix(&self, ctx: &CheckContext<'_>, violation: &Violation) -> Option<TextEdit> {
        let (start, end) = violation.span?;
        match violation.message.as_str() {
            MSG_QUOTES_SINGLE | MSG_QUOTES_DOUBLE => {
                let q = ctx.config.quote_style.quote_char();
                let body = &ctx.src[start + 1..end - 1];
                Some(TextEdit::new(start, end, format!("{q}{body}{q}")))
            }
            MSG_LEADING_ZERO | MSG_TRAILING_ZERO => Some(TextEdit::insert(start, "0")),
            MSG_UNDEFINED => Some(TextEdit::delete(start, end)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::test_support::{check, check_rule, fix};

    #[test]
    fn test_double_quoted_string_flagged_once() {
        let found = check("var a = \"hi\";\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "primitive-literals");
        assert!(found[0].fixable);
    }

    #[test]
    fn test_quote_fix_and_recheck_clean() {
        let fixed = fix("var a = \"hi\";\n");
        assert_eq!(fixed, "var a = 'hi';\n");
        assert!(check_rule(&fixed, "primitive-literals").is_empty());
    }

    #[test]
    fn test_embedded_single_quote_is_reported_but_not_fixable() {
        let found = check_rule("var a = \"it's\";\n", "primitive-literals");
        assert_eq!(found.len(), 1);
        assert!(!found[0].fixable);
    }

    #[test]
    fn test_octal_literal_flagged() {
        let found = check_rule("var mode = 0644;\n", "primitive-literals");
        assert_eq!(found.len(), 1);
        assert!(!found[0].fixable);
    }

    #[test]
    fn test_hex_and_zero_are_fine() {
        assert!(check_rule("var a = 0x1F;\nvar b = 0;\n", "primitive-literals").is_empty());
    }

    #[test]
    fn test_bare_decimal_points_fixed() {
        assert_eq!(fix("var a = .5;\n"), "var a = 0.5;\n");
        assert_eq!(fix("var b = 5.;\n"), "var b = 5.0;\n");
    }

    #[test]
    fn test_undefined_initializer_removed() {
        let found = check_rule("var a = undefined;\n", "primitive-literals");
        assert_eq!(found.len(), 1);
        assert_eq!(fix("var a = undefined;\n"), "var a;\n");
    }

    #[test]
    fn test_undefined_comparison_is_fine() {
        assert!(check_rule("if (a === undefined) { b(); }\n", "primitive-literals").is_empty());
    }
}
