//! Hand-written lexer for the target scripting language.
//!
//! Produces a flat, ordered token stream with 1-based line/column positions
//! and byte spans. Comments are kept as tokens because several rules inspect
//! comment placement and formatting. Whitespace is not tokenized; the spans
//! of consecutive tokens bracket it exactly, so slicing the source by spans
//! plus gaps reproduces the input byte for byte.
//!
//! A `/` is a regex literal or a division operator depending on the
//! preceding token: after an operator, an opening delimiter, a separator,
//! or a non-value keyword it starts a regex; after a value it divides.

use crate::error::{Error, Result};

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Ident,
    Number,
    Str,
    Operator,
    Punct,
    Regex,
    LineComment,
    BlockComment,
}

/// A single token with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub col: usize,
    /// 1-based line of the character just past the token.
    pub end_line: usize,
    /// 1-based column of the character just past the token.
    pub end_col: usize,
    /// Byte offset span in the original source.
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_kw(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "continue", "default", "delete", "do", "else", "false", "finally",
    "for", "function", "if", "in", "instanceof", "new", "null", "return", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with",
];

/// Multi-character operators, longest first so maximal munch works by scan order.
const OPERATORS: &[&str] = &[
    ">>>=", "===", "!==", ">>>", "<<=", ">>=", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=",
    "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "++", "--", "+", "-", "*", "/", "%", "<",
    ">", "=", "!", "&", "|", "^", "~", "?", ":",
];

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

/// Tokenize `src` into a complete token stream.
///
/// Fails with a positioned lex error on an unterminated string or block
/// comment, a raw newline inside a string, or a character outside the
/// language's alphabet.
pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut lx = Lexer {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        line: 1,
        col: 1,
    };
    let mut tokens = Vec::with_capacity(src.len() / 4);
    loop {
        lx.skip_whitespace();
        if lx.pos >= lx.bytes.len() {
            break;
        }
        let regex_ok = regex_allowed(tokens.iter().rev().find(|t: &&Token| !t.is_comment()));
        tokens.push(lx.next_token(regex_ok)?);
    }
    Ok(tokens)
}

/// Can a `/` at this point start a regex literal?
fn regex_allowed(prev: Option<&Token>) -> bool {
    let Some(t) = prev else {
        return true;
    };
    match t.kind {
        TokenKind::Operator => true,
        // Value keywords end an expression; the rest introduce one.
        TokenKind::Keyword => !matches!(t.text.as_str(), "this" | "true" | "false" | "null"),
        TokenKind::Punct => matches!(t.text.as_str(), "(" | "[" | "{" | "," | ";"),
        _ => false,
    }
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.pos];
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if b & 0xC0 != 0x80 {
            // Count characters, not bytes: UTF-8 continuation bytes do not
            // move the column.
            self.col += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn next_token(&mut self, regex_ok: bool) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        let b = self.bytes[self.pos];

        let kind = match b {
            b'/' if self.peek_at(1) == Some(b'/') => {
                while self.peek().is_some() && self.peek() != Some(b'\n') {
                    self.advance();
                }
                TokenKind::LineComment
            }
            b'/' if self.peek_at(1) == Some(b'*') => {
                self.advance();
                self.advance();
                loop {
                    match self.peek() {
                        None => {
                            return Err(Error::Lex {
                                line,
                                column: col,
                                message: "unterminated block comment".into(),
                            });
                        }
                        Some(b'*') if self.peek_at(1) == Some(b'/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        _ => {
                            self.advance();
                        }
                    }
                }
                TokenKind::BlockComment
            }
            b'/' if regex_ok => {
                self.advance();
                let mut in_class = false;
                loop {
                    match self.peek() {
                        None | Some(b'\n') => {
                            return Err(Error::Lex {
                                line,
                                column: col,
                                message: "unterminated regular expression".into(),
                            });
                        }
                        Some(b'\\') => {
                            self.advance();
                            if self.peek().is_some() {
                                self.advance();
                            }
                        }
                        Some(b'[') => {
                            in_class = true;
                            self.advance();
                        }
                        Some(b']') => {
                            in_class = false;
                            self.advance();
                        }
                        Some(b'/') if !in_class => {
                            self.advance();
                            break;
                        }
                        _ => {
                            self.advance();
                        }
                    }
                }
                while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                    self.advance();
                }
                TokenKind::Regex
            }
            b'\'' | b'"' => {
                let quote = self.advance();
                loop {
                    match self.peek() {
                        None | Some(b'\n') => {
                            return Err(Error::Lex {
                                line,
                                column: col,
                                message: "unterminated string literal".into(),
                            });
                        }
                        Some(b'\\') => {
                            self.advance();
                            if self.peek().is_some() {
                                self.advance();
                            }
                        }
                        Some(c) if c == quote => {
                            self.advance();
                            break;
                        }
                        _ => {
                            self.advance();
                        }
                    }
                }
                TokenKind::Str
            }
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                self.lex_number_tail();
                TokenKind::Number
            }
            b'0'..=b'9' => {
                self.advance();
                if b == b'0' && matches!(self.peek(), Some(b'x' | b'X')) {
                    self.advance();
                    while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.advance();
                    }
                } else {
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.advance();
                    }
                    if self.peek() == Some(b'.') {
                        self.advance();
                        self.lex_number_tail();
                    } else {
                        self.lex_exponent();
                    }
                }
                TokenKind::Number
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$')
                {
                    self.advance();
                }
                if KEYWORDS.contains(&&self.src[start..self.pos]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Ident
                }
            }
            b'(' | b')' | b'{' | b'}' | b'[' | b']' | b';' | b',' | b'.' => {
                self.advance();
                TokenKind::Punct
            }
            _ => {
                let rest = &self.src[self.pos..];
                let op = OPERATORS.iter().find(|op| rest.starts_with(**op));
                match op {
                    Some(op) => {
                        for _ in 0..op.len() {
                            self.advance();
                        }
                        TokenKind::Operator
                    }
                    None => {
                        return Err(Error::Lex {
                            line,
                            column: col,
                            message: format!("unexpected character: {:?}", rest.chars().next().unwrap_or('\0')),
                        });
                    }
                }
            }
        };

        Ok(Token {
            kind,
            text: self.src[start..self.pos].to_string(),
            line,
            col,
            end_line: self.line,
            end_col: self.col,
            start,
            end: self.pos,
        })
    }

    fn lex_number_tail(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.lex_exponent();
    }

    fn lex_exponent(&mut self) {
        if matches!(self.peek(), Some(b'e' | b'E'))
            && (self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
                || (matches!(self.peek_at(1), Some(b'+' | b'-'))
                    && self.peek_at(2).is_some_and(|c| c.is_ascii_digit())))
        {
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_spans_cover_source() {
        let src = "var x = 1;\n// note\nif (x === 2) {\n    f('a\\'b');\n}\n";
        let tokens = tokenize(src).unwrap();
        let mut cursor = 0usize;
        for t in &tokens {
            assert!(t.start >= cursor, "overlapping spans");
            assert!(
                src[cursor..t.start].chars().all(char::is_whitespace),
                "non-whitespace gap before token {:?}",
                t
            );
            assert_eq!(&src[t.start..t.end], t.text);
            cursor = t.end;
        }
        assert!(src[cursor..].chars().all(char::is_whitespace));
    }

    #[test]
    fn test_positions_across_lines() {
        let tokens = tokenize("var a;\n  foo();").unwrap();
        let foo = tokens.iter().find(|t| t.text == "foo").unwrap();
        assert_eq!((foo.line, foo.col), (2, 3));
        let semi = tokens.last().unwrap();
        assert_eq!((semi.line, semi.col), (2, 8));
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = tokenize("var varx = undefined;").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[3].kind, TokenKind::Ident); // undefined is not a keyword
    }

    #[test]
    fn test_number_shapes() {
        let tokens = tokenize(".5 5. 0x1F 012 1e10 2.5e-3").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec![".5", "5.", "0x1F", "012", "1e10", "2.5e-3"]);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_maximal_munch_operators() {
        let tokens = tokenize("a === b !== c >>> d").unwrap();
        let ops: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ops, vec!["===", "!==", ">>>"]);
    }

    #[test]
    fn test_comments_are_retained() {
        let tokens = tokenize("// line\n/* block\n spans */ x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        assert_eq!(tokens[1].kind, TokenKind::BlockComment);
        assert_eq!(tokens[1].end_line, 2);
        assert_eq!(tokens[2].text, "x");
    }

    #[test]
    fn test_regex_literal_vs_division() {
        let tokens = tokenize("var re = /a[/]b/g; var x = a / b;").unwrap();
        let regexes: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Regex)
            .collect();
        assert_eq!(regexes.len(), 1);
        assert_eq!(regexes[0].text, "/a[/]b/g");
        assert!(tokens.iter().any(|t| t.is_op("/")));
    }

    #[test]
    fn test_regex_after_call_is_division() {
        let tokens = tokenize("var x = f(1) / 2;").unwrap();
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Regex));
    }

    #[test]
    fn test_unterminated_regex_is_an_error() {
        assert!(tokenize("var re = /abc\n;").is_err());
    }

    #[test]
    fn test_unterminated_string_reports_start() {
        let err = tokenize("var a = 'oops").unwrap_err();
        match err {
            Error::Lex { line, column, .. } => {
                assert_eq!((line, column), (1, 9));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_newline_in_string_is_an_error() {
        assert!(tokenize("var a = 'two\nlines';").is_err());
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("x;\n/* never closed").unwrap_err();
        match err {
            Error::Lex { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
