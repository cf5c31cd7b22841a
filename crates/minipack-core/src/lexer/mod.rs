mod token;

pub use token::{TemplatePart, Token, TokenKind};

use crate::errors::ParseError;
use crate::span::Span;

/// Hand-written scanner for the JavaScript subset the bundler understands.
///
/// Produces a flat token stream; template literal interpolations are lexed
/// eagerly into nested token streams so the parser never re-enters the
/// lexer.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Tokenize the whole input. The returned stream always ends with Eof.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let line = self.line;
        let column = self.pos - self.line_start + 1;
        let span_here = |lexer: &Self| Span::new(start, lexer.pos, line, column);

        let Some((_, ch)) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, Span::new(start, start, line, column)));
        };

        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '^' => TokenKind::Caret,

            '+' => match self.peek() {
                Some('+') => {
                    self.advance();
                    TokenKind::PlusPlus
                }
                Some('=') => {
                    self.advance();
                    TokenKind::PlusAssign
                }
                _ => TokenKind::Plus,
            },
            '-' => match self.peek() {
                Some('-') => {
                    self.advance();
                    TokenKind::MinusMinus
                }
                Some('=') => {
                    self.advance();
                    TokenKind::MinusAssign
                }
                _ => TokenKind::Minus,
            },
            '*' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::StarAssign
                }
                _ => TokenKind::Star,
            },
            '/' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::SlashAssign
                }
                _ => TokenKind::Slash,
            },
            '%' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::PercentAssign
                }
                _ => TokenKind::Percent,
            },
            '=' => match self.peek() {
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                }
                Some('>') => {
                    self.advance();
                    TokenKind::Arrow
                }
                _ => TokenKind::Assign,
            },
            '!' => match self.peek() {
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                }
                _ => TokenKind::Bang,
            },
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::LessEq
                }
                Some('<') => {
                    self.advance();
                    TokenKind::ShiftLeft
                }
                _ => TokenKind::Less,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::GreaterEq
                }
                Some('>') => {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        TokenKind::UnsignedShiftRight
                    } else {
                        TokenKind::ShiftRight
                    }
                }
                _ => TokenKind::Greater,
            },
            '&' => match self.peek() {
                Some('&') => {
                    self.advance();
                    TokenKind::AndAnd
                }
                _ => TokenKind::Ampersand,
            },
            '|' => match self.peek() {
                Some('|') => {
                    self.advance();
                    TokenKind::OrOr
                }
                _ => TokenKind::Pipe,
            },
            '?' => match self.peek() {
                Some('?') => {
                    self.advance();
                    TokenKind::NullishCoalesce
                }
                _ => TokenKind::Question,
            },

            '"' | '\'' => self.scan_string(ch, span_here(self))?,
            '`' => self.scan_template(span_here(self))?,

            '0'..='9' => self.scan_number(start, span_here(self))?,

            _ if is_identifier_start(ch) => self.scan_identifier(start),

            other => {
                return Err(ParseError::new(
                    format!("unexpected character '{other}'"),
                    span_here(self),
                ))
            }
        };

        Ok(Token::new(kind, Span::new(start, self.pos, line, column)))
    }

    // Character stream management

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.pos = pos + ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.line_start = self.pos;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let start = self.pos;
                    let line = self.line;
                    let column = self.pos - self.line_start + 1;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some((_, '*')) if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(ParseError::new(
                                    "unterminated block comment",
                                    Span::new(start, self.pos, line, column),
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // Literal scanning

    fn scan_string(&mut self, quote: char, span: Span) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        Span::new(span.start, self.pos, span.line, span.column),
                    ))
                }
                Some((_, '\n')) => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        Span::new(span.start, self.pos, span.line, span.column),
                    ))
                }
                Some((_, ch)) if ch == quote => return Ok(TokenKind::String(value)),
                Some((_, '\\')) => {
                    if let Some(ch) = self.scan_escape(span)? {
                        value.push(ch);
                    }
                }
                Some((_, ch)) => value.push(ch),
            }
        }
    }

    fn scan_escape(&mut self, span: Span) -> Result<Option<char>, ParseError> {
        let Some((_, ch)) = self.advance() else {
            return Err(ParseError::new(
                "unterminated escape sequence",
                Span::new(span.start, self.pos, span.line, span.column),
            ));
        };
        let escaped = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'v' => '\u{000B}',
            '0' => '\0',
            // Escaped line break: line continuation, produces nothing
            '\n' => return Ok(None),
            'u' => return self.scan_unicode_escape(span).map(Some),
            // Everything else escapes to itself (\\, \', \", \`, \$, ...)
            other => other,
        };
        Ok(Some(escaped))
    }

    fn scan_unicode_escape(&mut self, span: Span) -> Result<char, ParseError> {
        let mut digits = String::new();
        if self.peek() == Some('{') {
            self.advance();
            while let Some(ch) = self.peek() {
                if ch == '}' {
                    self.advance();
                    break;
                }
                digits.push(ch);
                self.advance();
            }
        } else {
            for _ in 0..4 {
                match self.advance() {
                    Some((_, ch)) => digits.push(ch),
                    None => break,
                }
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                ParseError::new(
                    format!("invalid unicode escape '\\u{digits}'"),
                    Span::new(span.start, self.pos, span.line, span.column),
                )
            })
    }

    fn scan_template(&mut self, span: Span) -> Result<TokenKind, ParseError> {
        let mut parts = Vec::new();
        let mut cooked = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::new(
                        "unterminated template literal",
                        Span::new(span.start, self.pos, span.line, span.column),
                    ))
                }
                Some((_, '`')) => break,
                Some((_, '\\')) => {
                    if let Some(ch) = self.scan_escape(span)? {
                        cooked.push(ch);
                    }
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    if !cooked.is_empty() {
                        parts.push(TemplatePart::Chunk(std::mem::take(&mut cooked)));
                    }
                    parts.push(TemplatePart::Expr(self.scan_interpolation(span)?));
                }
                Some((_, ch)) => cooked.push(ch),
            }
        }
        if !cooked.is_empty() || parts.is_empty() {
            parts.push(TemplatePart::Chunk(cooked));
        }
        Ok(TokenKind::Template(parts))
    }

    /// Lex tokens inside `${ ... }` up to the matching close brace.
    /// Nested braces (object literals, nested templates) are balanced.
    fn scan_interpolation(&mut self, span: Span) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    if depth == 0 {
                        tokens.push(Token::new(TokenKind::Eof, token.span));
                        return Ok(tokens);
                    }
                    depth -= 1;
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        "unterminated template interpolation",
                        Span::new(span.start, self.pos, span.line, span.column),
                    ))
                }
                _ => {}
            }
            tokens.push(token);
        }
    }

    fn scan_number(&mut self, start: usize, span: Span) -> Result<TokenKind, ParseError> {
        // Hex literal
        if &self.source[start..self.pos] == "0" && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            while matches!(self.peek(), Some(ch) if ch.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = &self.source[start + 2..self.pos];
            return u64::from_str_radix(digits, 16)
                .map(|n| TokenKind::Number(n as f64))
                .map_err(|_| {
                    ParseError::new(
                        format!("invalid hex literal '0x{digits}'"),
                        Span::new(start, self.pos, span.line, span.column),
                    )
                });
        }

        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.source[start..self.pos];
        text.parse::<f64>().map(TokenKind::Number).map_err(|_| {
            ParseError::new(
                format!("invalid number literal '{text}'"),
                Span::new(start, self.pos, span.line, span.column),
            )
        })
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek(), Some(ch) if is_identifier_continue(ch)) {
            self.advance();
        }
        match &self.source[start..self.pos] {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "new" => TokenKind::New,
            "throw" => TokenKind::Throw,
            "typeof" => TokenKind::Typeof,
            "delete" => TokenKind::Delete,
            "void" => TokenKind::Void,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            name => TokenKind::Identifier(name.to_string()),
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation_and_operators() {
        assert_eq!(
            kinds("a === b && c !== d"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::EqEqEq,
                TokenKind::Identifier("b".to_string()),
                TokenKind::AndAnd,
                TokenKind::Identifier("c".to_string()),
                TokenKind::NotEqEq,
                TokenKind::Identifier("d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#"'a\nb' "c\"d""#),
            vec![
                TokenKind::String("a\nb".to_string()),
                TokenKind::String("c\"d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 0xff 1e3"),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(3.14),
                TokenKind::Number(255.0),
                TokenKind::Number(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("a // comment\n/* block\n comment */ b"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Identifier("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_require_call() {
        assert_eq!(
            kinds("const a = require('./js/a.js')"),
            vec![
                TokenKind::Const,
                TokenKind::Identifier("a".to_string()),
                TokenKind::Assign,
                TokenKind::Identifier("require".to_string()),
                TokenKind::LeftParen,
                TokenKind::String("./js/a.js".to_string()),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_template_literal_with_interpolation() {
        let tokens = kinds("`x ${a.text} y`");
        assert_eq!(tokens.len(), 2);
        match &tokens[0] {
            TokenKind::Template(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], TemplatePart::Chunk("x ".to_string()));
                match &parts[1] {
                    TemplatePart::Expr(inner) => {
                        assert_eq!(inner.len(), 4); // a . text Eof
                        assert_eq!(inner[0].kind, TokenKind::Identifier("a".to_string()));
                        assert_eq!(inner[3].kind, TokenKind::Eof);
                    }
                    other => panic!("expected interpolation, got {other:?}"),
                }
                assert_eq!(parts[2], TemplatePart::Chunk(" y".to_string()));
            }
            other => panic!("expected template, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_braces_in_interpolation() {
        let tokens = kinds("`${ { a: 1 } }`");
        match &tokens[0] {
            TokenKind::Template(parts) => match &parts[0] {
                TemplatePart::Expr(inner) => {
                    assert_eq!(inner.last().unwrap().kind, TokenKind::Eof);
                    assert_eq!(inner[0].kind, TokenKind::LeftBrace);
                }
                other => panic!("expected interpolation, got {other:?}"),
            },
            other => panic!("expected template, got {other:?}"),
        }
    }

    #[test]
    fn test_line_tracking() {
        let tokens = Lexer::new("a\n  b").tokenize().expect("lexing failed");
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(Lexer::new("'abc").tokenize().is_err());
    }

    #[test]
    fn test_unexpected_character_fails() {
        assert!(Lexer::new("a # b").tokenize().is_err());
    }
}
