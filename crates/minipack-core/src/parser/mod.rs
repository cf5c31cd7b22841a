mod expression;
mod statement;

#[cfg(test)]
mod tests;

use crate::ast::Program;
use crate::errors::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Span;

pub use expression::ExpressionParser;
pub use statement::StatementParser;

/// Lex and parse one module's source text.
pub fn parse_module(source: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}

/// Recursive-descent parser over the lexer's token stream.
///
/// There is no error recovery: the first error aborts, since a module
/// that fails to parse fails the whole build.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let start_span = self.current_span();
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        let end_span = if let Some(last) = statements.last() {
            last.span()
        } else {
            start_span
        };

        Ok(Program::new(statements, start_span.combine(&end_span)))
    }

    // Token stream management

    pub(crate) fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should never be empty")
        })
    }

    pub(crate) fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn match_token(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ParseError> {
        if self.check(&kind) {
            return Ok(self.advance());
        }

        Err(ParseError::new(
            format!("{}, found {}", message, self.current().kind.describe()),
            self.current_span(),
        ))
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Semicolons between statements are optional
    pub(crate) fn consume_optional_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }
}
