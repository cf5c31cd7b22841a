use super::{ExpressionParser, Parser};
use crate::ast::statement::*;
use crate::ast::{Ident, Spanned};
use crate::errors::ParseError;
use crate::lexer::TokenKind;

pub trait StatementParser {
    fn parse_statement(&mut self) -> Result<Statement, ParseError>;
    fn parse_block(&mut self) -> Result<Block, ParseError>;
}

impl StatementParser for Parser {
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match &self.current().kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_variable_declaration()?;
                self.consume_optional_semicolon();
                Ok(Statement::Variable(decl))
            }
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Break => {
                let span = self.current_span();
                self.advance();
                self.consume_optional_semicolon();
                Ok(Statement::Break(span))
            }
            TokenKind::Continue => {
                let span = self.current_span();
                self.advance();
                self.consume_optional_semicolon();
                Ok(Statement::Continue(span))
            }
            TokenKind::Semicolon => {
                let span = self.current_span();
                self.advance();
                Ok(Statement::Empty(span))
            }
            TokenKind::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            _ => {
                let expr = self.parse_expression()?;
                self.consume_optional_semicolon();
                Ok(Statement::Expression(expr))
            }
        }
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::LeftBrace, "expected '{'")?;

        let mut statements = Vec::new();
        while !self.is_at_end() && !self.check(&TokenKind::RightBrace) {
            statements.push(self.parse_statement()?);
        }

        let end_span = self.consume(TokenKind::RightBrace, "expected '}'")?.span;
        Ok(Block {
            statements,
            span: start_span.combine(&end_span),
        })
    }
}

impl Parser {
    /// Parse `var|let|const name [= init] (, name [= init])*` without the
    /// trailing semicolon, so for-loop initializers can reuse it.
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let start_span = self.current_span();
        let kind = match &self.current().kind {
            TokenKind::Var => VariableKind::Var,
            TokenKind::Let => VariableKind::Let,
            TokenKind::Const => VariableKind::Const,
            other => {
                return Err(ParseError::new(
                    format!("expected variable declaration, found {}", other.describe()),
                    start_span,
                ))
            }
        };
        self.advance();

        let mut declarators = Vec::new();
        loop {
            let name = self.parse_identifier("expected variable name")?;
            let initializer = if self.match_token(&[TokenKind::Assign]) {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            declarators.push(VariableDeclarator { name, initializer });

            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }

        let end_span = declarators
            .last()
            .map(|d| {
                d.initializer
                    .as_ref()
                    .map(|e| e.span)
                    .unwrap_or(d.name.span)
            })
            .unwrap_or(start_span);

        Ok(VariableDeclaration {
            kind,
            declarators,
            span: start_span.combine(&end_span),
        })
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::Function, "expected 'function'")?;
        let name = self.parse_identifier("expected function name")?;
        let params = self.parse_parameter_list()?;
        let body = self.parse_block()?;
        let span = start_span.combine(&body.span);

        Ok(Statement::Function(FunctionDeclaration {
            name,
            params,
            body,
            span,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::Return, "expected 'return'")?;

        let value = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RightBrace)
            || self.is_at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let end_span = value.as_ref().map(|e| e.span).unwrap_or(start_span);
        self.consume_optional_semicolon();

        Ok(Statement::Return(ReturnStatement {
            value,
            span: start_span.combine(&end_span),
        }))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::If, "expected 'if'")?;
        self.consume(TokenKind::LeftParen, "expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "expected ')' after if condition")?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token(&[TokenKind::Else]) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        let end_span = alternate
            .as_ref()
            .map(|s| s.span())
            .unwrap_or_else(|| consequent.span());

        Ok(Statement::If(IfStatement {
            condition,
            consequent,
            alternate,
            span: start_span.combine(&end_span),
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::While, "expected 'while'")?;
        self.consume(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "expected ')' after while condition")?;
        let body = Box::new(self.parse_statement()?);
        let span = start_span.combine(&body.span());

        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span,
        }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::For, "expected 'for'")?;
        self.consume(TokenKind::LeftParen, "expected '(' after 'for'")?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.current().kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            Some(ForInit::Variable(self.parse_variable_declaration()?))
        } else {
            Some(ForInit::Expression(self.parse_expression()?))
        };
        self.consume(TokenKind::Semicolon, "expected ';' after for initializer")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "expected ';' after for condition")?;

        let update = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RightParen, "expected ')' after for clauses")?;

        let body = self.parse_statement()?;
        let span = start_span.combine(&body.span());

        Ok(Statement::For(Box::new(ForStatement {
            init,
            condition,
            update,
            body,
            span,
        })))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::Throw, "expected 'throw'")?;
        let value = self.parse_expression()?;
        let span = start_span.combine(&value.span);
        self.consume_optional_semicolon();

        Ok(Statement::Throw(ThrowStatement { value, span }))
    }

    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Ident>, ParseError> {
        self.consume(TokenKind::LeftParen, "expected '('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                params.push(self.parse_identifier("expected parameter name")?);
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "expected ')'")?;
        Ok(params)
    }

    pub(crate) fn parse_identifier(&mut self, message: &str) -> Result<Ident, ParseError> {
        let span = self.current_span();
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(Spanned::new(name, span))
            }
            other => Err(ParseError::new(
                format!("{}, found {}", message, other.describe()),
                span,
            )),
        }
    }
}
