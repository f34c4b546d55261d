//! Rule registry and shared token-navigation helpers.
//!
//! Each rule is an independent, stateless check over the token stream and
//! raw lines. Helpers here are the only code shared between rule files;
//! no rule depends on another rule's output.

pub mod comments;
pub mod declarations;
pub mod literals;
pub mod statements;
pub mod whitespace;

use crate::engine::Rule;
use crate::lexer::Token;

/// Every registered rule, in stable registration order.
pub fn all() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(whitespace::Indentation),
        Box::new(whitespace::LineLength),
        Box::new(whitespace::OperatorSpacing),
        Box::new(whitespace::ParenSpacing),
        Box::new(literals::PrimitiveLiterals),
        Box::new(comments::CommentFormat),
        Box::new(declarations::DeclarationGrouping),
        Box::new(declarations::FunctionDeclaration),
        Box::new(declarations::NamingConvention),
        Box::new(statements::StrictMode),
        Box::new(statements::StrictEquality),
        Box::new(statements::TernaryStatement),
        Box::new(statements::CompoundStatementBraces),
        Box::new(statements::SwitchFallthrough),
        Box::new(statements::ObjectLiteral),
    ]
}

/// Index of the nearest non-comment token before `i`.
pub(crate) fn prev_sig(tokens: &[Token], i: usize) -> Option<usize> {
    tokens[..i].iter().rposition(|t| !t.is_comment())
}

/// Index of the nearest non-comment token after `i`.
pub(crate) fn next_sig(tokens: &[Token], i: usize) -> Option<usize> {
    tokens[i + 1..]
        .iter()
        .position(|t| !t.is_comment())
        .map(|off| i + 1 + off)
}

/// Index of the matching `close` for the `open` punct at `open_idx`.
pub(crate) fn match_close(tokens: &[Token], open_idx: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(open_idx) {
        if t.is_punct(open) {
            depth += 1;
        } else if t.is_punct(close) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// True when no other token starts or ends on the token's start line.
pub(crate) fn first_on_line(tokens: &[Token], i: usize) -> bool {
    i == 0 || tokens[i - 1].end_line < tokens[i].line
}

/// Does the ':' at `colon` close a `case`/`default` label (as opposed to a
/// ternary branch or an object property)?
pub(crate) fn is_case_label_colon(tokens: &[Token], colon: usize) -> bool {
    let mut j = colon;
    while let Some(p) = prev_sig(tokens, j) {
        let t = &tokens[p];
        if t.is_kw("case") || t.is_kw("default") {
            return true;
        }
        if t.is_punct(";") || t.is_punct("{") || t.is_punct("}") || t.is_op(":") || t.is_op("?") {
            return false;
        }
        j = p;
    }
    false
}

/// Nesting depths measured before each token.
pub(crate) struct Depths {
    pub paren: Vec<usize>,
    pub brace: Vec<usize>,
}

impl Depths {
    pub fn compute(tokens: &[Token]) -> Self {
        let mut paren = Vec::with_capacity(tokens.len());
        let mut brace = Vec::with_capacity(tokens.len());
        let (mut p, mut b) = (0usize, 0usize);
        for t in tokens {
            paren.push(p);
            brace.push(b);
            match t.text.as_str() {
                "(" => p += 1,
                ")" => p = p.saturating_sub(1),
                "{" => b += 1,
                "}" => b = b.saturating_sub(1),
                _ => {}
            }
        }
        Self { paren, brace }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_registry_ids_are_unique() {
        let rules = all();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
        ids.sort();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_match_close_nested() {
        let tokens = tokenize("f(a, (b), c)").unwrap();
        let open = tokens.iter().position(|t| t.is_punct("(")).unwrap();
        let close = match_close(&tokens, open, "(", ")").unwrap();
        assert_eq!(close, tokens.len() - 1);
    }

    #[test]
    fn test_depths_before_tokens() {
        let tokens = tokenize("f(x[0], {a: 1})").unwrap();
        let d = Depths::compute(&tokens);
        let brace_open = tokens.iter().position(|t| t.is_punct("{")).unwrap();
        assert_eq!(d.paren[brace_open], 1);
        let a = tokens.iter().position(|t| t.text == "a").unwrap();
        assert_eq!(d.brace[a], 1);
    }
}
