//! Declaration rules: var grouping and ordering, function declaration
//! spacing and placement, and naming conventions.

use super::{match_close, next_sig, prev_sig, Depths};
use crate::diagnostics::{Severity, Violation};
use crate::engine::{CheckContext, Rule};
use crate::fixer::TextEdit;
use crate::lexer::TokenKind;
use regex::Regex;
use std::sync::OnceLock;

fn camel_case() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z$][a-zA-Z0-9$]*$").unwrap())
}

fn pascal_case() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").unwrap())
}

fn screaming_snake() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap())
}

fn private_member() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^_[a-z][a-zA-Z0-9]*$").unwrap())
}

/// One `var` statement per scope, initialized declarators first, and `=`
/// aligned across a declarator list that spans lines.
pub struct DeclarationGrouping;

impl DeclarationGrouping {
    /// Token indices of the declarator list: (name, has initializer, eq column).
    fn declarators(ctx: &CheckContext<'_>, var_idx: usize) -> Vec<(usize, bool, Option<(usize, usize)>)> {
        let tokens = ctx.tokens;
        let mut out = Vec::new();
        let mut i = var_idx;
        let mut depth = 0usize;
        let mut current: Option<usize> = None;
        let mut eq: Option<(usize, usize)> = None;
        while let Some(n) = next_sig(tokens, i) {
            let t = &tokens[n];
            match t.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                "," if depth == 0 => {
                    if let Some(name) = current.take() {
                        out.push((name, eq.is_some(), eq.take()));
                    }
                }
                ";" if depth == 0 => break,
                "=" if depth == 0 && t.kind == TokenKind::Operator => {
                    eq = Some((t.line, t.col));
                }
                _ => {
                    if current.is_none() && t.kind == TokenKind::Ident {
                        current = Some(n);
                    }
                }
            }
            i = n;
        }
        if let Some(name) = current {
            out.push((name, eq.is_some(), eq));
        }
        out
    }
}

impl Rule for DeclarationGrouping {
    fn id(&self) -> &'static str {
        "declaration-grouping"
    }

    fn description(&self) -> &'static str {
        "one var statement per scope, initialized declarators first"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let depths = Depths::compute(ctx.tokens);
        let mut out = Vec::new();

        // Count var statements per scope. Scopes are identified by the brace
        // depth plus a running id so two sibling blocks do not share a count.
        let mut scope_stack: Vec<usize> = vec![0];
        let mut scope_ids: Vec<usize> = vec![0];
        let mut next_scope = 1usize;
        let mut var_count: std::collections::HashMap<usize, usize> = Default::default();

        for (i, t) in ctx.tokens.iter().enumerate() {
            match t.text.as_str() {
                "{" => {
                    scope_stack.push(next_scope);
                    scope_ids.push(next_scope);
                    next_scope += 1;
                }
                "}" => {
                    scope_stack.pop();
                }
                "var" if t.kind == TokenKind::Keyword && depths.paren[i] == 0 => {
                    let scope = *scope_stack.last().unwrap_or(&0);
                    let count = var_count.entry(scope).or_insert(0);
                    *count += 1;
                    if *count > 1 {
                        out.push(Violation::new(
                            self.id(),
                            t.line,
                            t.col,
                            "combine var declarations into a single statement per scope",
                        ));
                    }

                    let decls = Self::declarators(ctx, i);
                    let mut seen_uninitialized = false;
                    for (name, initialized, _) in &decls {
                        if *initialized && seen_uninitialized {
                            let nt = &ctx.tokens[*name];
                            out.push(Violation::new(
                                self.id(),
                                nt.line,
                                nt.col,
                                "declare initialized variables before uninitialized ones",
                            ));
                        }
                        if !*initialized {
                            seen_uninitialized = true;
                        }
                    }

                    // Alignment only matters once the list wraps.
                    let eq_positions: Vec<(usize, usize)> =
                        decls.iter().filter_map(|(_, _, eq)| *eq).collect();
                    if eq_positions.len() > 1 {
                        let lines: std::collections::HashSet<_> =
                            eq_positions.iter().map(|(l, _)| l).collect();
                        let cols: std::collections::HashSet<_> =
                            eq_positions.iter().map(|(_, c)| c).collect();
                        if lines.len() > 1 && cols.len() > 1 {
                            let (l, c) = eq_positions[1];
                            out.push(Violation::new(
                                self.id(),
                                l,
                                c,
                                "align assignment operators in grouped declarations",
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }
}

const MSG_NAME_TIGHT: &str = "no space between function name and '('";
const MSG_ANON_SPACE: &str = "missing space after 'function'";
const MSG_BRACE_SPACE: &str = "missing space before function body '{'";

/// Function declaration spacing and declaration-before-use placement.
pub struct FunctionDeclaration;

impl Rule for FunctionDeclaration {
    fn id(&self) -> &'static str {
        "function-declaration"
    }

    fn description(&self) -> &'static str {
        "function spacing and declaration before first use"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let mut out = Vec::new();
        let mut declared: Vec<(String, usize, usize)> = Vec::new(); // (name, byte start, line)

        for (i, t) in tokens.iter().enumerate() {
            if !t.is_kw("function") {
                continue;
            }
            let Some(n) = next_sig(tokens, i) else {
                continue;
            };
            let paren_idx = if tokens[n].kind == TokenKind::Ident {
                let name = &tokens[n];
                declared.push((name.text.clone(), t.start, t.line));
                let Some(p) = next_sig(tokens, n) else {
                    continue;
                };
                if tokens[p].is_punct("(") && name.end < tokens[p].start {
                    out.push(
                        Violation::new(self.id(), name.line, name.col, MSG_NAME_TIGHT)
                            .fixable_at(name.end, tokens[p].start),
                    );
                }
                p
            } else {
                // Anonymous: one space between keyword and '('.
                if tokens[n].is_punct("(") && t.end == tokens[n].start {
                    out.push(
                        Violation::new(self.id(), t.line, t.col, MSG_ANON_SPACE)
                            .fixable_at(t.end, t.end),
                    );
                }
                n
            };
            if !tokens[paren_idx].is_punct("(") {
                continue;
            }
            if let Some(close) = match_close(tokens, paren_idx, "(", ")") {
                if let Some(body) = next_sig(tokens, close) {
                    let rp = &tokens[close];
                    if tokens[body].is_punct("{") && rp.end == tokens[body].start {
                        out.push(
                            Violation::new(self.id(), rp.line, rp.col, MSG_BRACE_SPACE)
                                .fixable_at(rp.end, rp.end),
                        );
                    }
                }
            }
        }

        // A call site earlier in the file than the declaration it targets.
        for (name, decl_start, decl_line) in &declared {
            for (i, t) in tokens.iter().enumerate() {
                if t.start >= *decl_start {
                    break;
                }
                if t.kind != TokenKind::Ident || &t.text != name {
                    continue;
                }
                let called = next_sig(tokens, i).is_some_and(|n| tokens[n].is_punct("("));
                let member = prev_sig(tokens, i)
                    .is_some_and(|p| tokens[p].is_punct(".") || tokens[p].is_kw("function"));
                if called && !member {
                    out.push(Violation::new(
                        self.id(),
                        t.line,
                        t.col,
                        format!("'{name}' is called before its declaration on line {decl_line}"),
                    ));
                    break;
                }
            }
        }
        out
    }

    fn fix(&self, _ctx: &CheckContext<'_>, violation: &Violation) -> Option<TextEdit> {
        let (start, end) = violation.span?;
        match violation.message.as_str() {
            MSG_NAME_TIGHT => Some(TextEdit::delete(start, end)),
            MSG_ANON_SPACE | MSG_BRACE_SPACE => Some(TextEdit::insert(start, " ")),
            _ => None,
        }
    }
}

/// Identifier naming per category, checked by regex classification only.
pub struct NamingConvention;

impl NamingConvention {
    fn check_var_names(ctx: &CheckContext<'_>, var_idx: usize, out: &mut Vec<Violation>) {
        for (name_idx, _, _) in DeclarationGrouping::declarators(ctx, var_idx) {
            let t = &ctx.tokens[name_idx];
            if !camel_case().is_match(&t.text) && !screaming_snake().is_match(&t.text) {
                out.push(Violation::new(
                    "naming-convention",
                    t.line,
                    t.col,
                    format!(
                        "variable '{}' should be camelCase (or SCREAMING_SNAKE for constants)",
                        t.text
                    ),
                ));
            }
        }
    }
}

impl Rule for NamingConvention {
    fn id(&self) -> &'static str {
        "naming-convention"
    }

    fn description(&self) -> &'static str {
        "identifier naming per category"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tokens;
        let depths = Depths::compute(tokens);
        let mut out = Vec::new();
        for (i, t) in tokens.iter().enumerate() {
            if t.is_kw("var") && depths.paren[i] == 0 {
                Self::check_var_names(ctx, i, &mut out);
            } else if t.is_kw("function") {
                if let Some(n) = next_sig(tokens, i) {
                    let name = &tokens[n];
                    if name.kind == TokenKind::Ident
                        && !camel_case().is_match(&name.text)
                        && !pascal_case().is_match(&name.text)
                    {
                        out.push(Violation::new(
                            self.id(),
                            name.line,
                            name.col,
                            format!("function '{}' should be camelCase (PascalCase for constructors)", name.text),
                        ));
                    }
                }
            } else if t.is_kw("new") {
                // Walk the member chain; the constructed name is the last
                // identifier before the argument list.
                let mut j = i;
                let mut last: Option<usize> = None;
                while let Some(n) = next_sig(tokens, j) {
                    match tokens[n].kind {
                        TokenKind::Ident => last = Some(n),
                        TokenKind::Punct if tokens[n].text == "." => {}
                        _ => break,
                    }
                    j = n;
                }
                if let Some(n) = last {
                    let name = &tokens[n];
                    if !pascal_case().is_match(&name.text) {
                        out.push(Violation::new(
                            self.id(),
                            name.line,
                            name.col,
                            format!("constructor '{}' should be PascalCase", name.text),
                        ));
                    }
                }
            } else if t.kind == TokenKind::Ident && t.text.starts_with('_') {
                let after_dot = prev_sig(tokens, i).is_some_and(|p| tokens[p].is_punct("."));
                if after_dot && !private_member().is_match(&t.text) {
                    out.push(Violation::new(
                        self.id(),
                        t.line,
                        t.col,
                        format!("private member '{}' should be a single underscore plus camelCase", t.text),
                    ));
                }
            }
        }
        out
    }
}
