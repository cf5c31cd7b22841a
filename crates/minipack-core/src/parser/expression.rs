use super::{Parser, StatementParser};
use crate::ast::expression::*;
use crate::errors::ParseError;
use crate::lexer::{TemplatePart, TokenKind};
use crate::span::Span;

pub trait ExpressionParser {
    fn parse_expression(&mut self) -> Result<Expression, ParseError>;
}

impl ExpressionParser for Parser {
    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_assignment_expression()
    }
}

impl Parser {
    pub(crate) fn parse_assignment_expression(&mut self) -> Result<Expression, ParseError> {
        if self.is_arrow_function_ahead() {
            return self.parse_arrow_function();
        }

        let target = self.parse_conditional()?;

        let op = match &self.current().kind {
            TokenKind::Assign => AssignmentOp::Assign,
            TokenKind::PlusAssign => AssignmentOp::AddAssign,
            TokenKind::MinusAssign => AssignmentOp::SubtractAssign,
            TokenKind::StarAssign => AssignmentOp::MultiplyAssign,
            TokenKind::SlashAssign => AssignmentOp::DivideAssign,
            TokenKind::PercentAssign => AssignmentOp::ModuloAssign,
            _ => return Ok(target),
        };
        self.advance();

        // Right-associative
        let value = self.parse_assignment_expression()?;
        let span = target.span.combine(&value.span);
        Ok(Expression::new(
            ExpressionKind::Assignment(op, Box::new(target), Box::new(value)),
            span,
        ))
    }

    fn parse_conditional(&mut self) -> Result<Expression, ParseError> {
        let condition = self.parse_nullish_coalescing()?;

        if !self.match_token(&[TokenKind::Question]) {
            return Ok(condition);
        }

        let consequent = self.parse_assignment_expression()?;
        self.consume(TokenKind::Colon, "expected ':' in conditional expression")?;
        let alternate = self.parse_assignment_expression()?;
        let span = condition.span.combine(&alternate.span);

        Ok(Expression::new(
            ExpressionKind::Conditional(
                Box::new(condition),
                Box::new(consequent),
                Box::new(alternate),
            ),
            span,
        ))
    }

    fn parse_nullish_coalescing(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_logical_or()?;
        while self.match_token(&[TokenKind::NullishCoalesce]) {
            let right = self.parse_logical_or()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Logical(LogicalOp::NullishCoalesce, Box::new(left), Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn parse_logical_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.match_token(&[TokenKind::OrOr]) {
            let right = self.parse_logical_and()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Logical(LogicalOp::Or, Box::new(left), Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_bitwise_or()?;
        while self.match_token(&[TokenKind::AndAnd]) {
            let right = self.parse_bitwise_or()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Logical(LogicalOp::And, Box::new(left), Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_bitwise_xor()?;
        while self.match_token(&[TokenKind::Pipe]) {
            let right = self.parse_bitwise_xor()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(BinaryOp::BitwiseOr, Box::new(left), Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_bitwise_and()?;
        while self.match_token(&[TokenKind::Caret]) {
            let right = self.parse_bitwise_and()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(BinaryOp::BitwiseXor, Box::new(left), Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_equality()?;
        while self.match_token(&[TokenKind::Ampersand]) {
            let right = self.parse_equality()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(BinaryOp::BitwiseAnd, Box::new(left), Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match &self.current().kind {
                TokenKind::EqEq => BinaryOp::Equal,
                TokenKind::EqEqEq => BinaryOp::StrictEqual,
                TokenKind::NotEq => BinaryOp::NotEqual,
                TokenKind::NotEqEq => BinaryOp::StrictNotEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(op, Box::new(left), Box::new(right)),
                span,
            );
        }
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match &self.current().kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEq => BinaryOp::LessEqual,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEq => BinaryOp::GreaterEqual,
                TokenKind::In => BinaryOp::In,
                TokenKind::Instanceof => BinaryOp::Instanceof,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_shift()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(op, Box::new(left), Box::new(right)),
                span,
            );
        }
    }

    fn parse_shift(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match &self.current().kind {
                TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
                TokenKind::ShiftRight => BinaryOp::ShiftRight,
                TokenKind::UnsignedShiftRight => BinaryOp::UnsignedShiftRight,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(op, Box::new(left), Box::new(right)),
                span,
            );
        }
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match &self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(op, Box::new(left), Box::new(right)),
                span,
            );
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match &self.current().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.combine(&right.span);
            left = Expression::new(
                ExpressionKind::Binary(op, Box::new(left), Box::new(right)),
                span,
            );
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let start_span = self.current_span();

        let op = match &self.current().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitwiseNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start_span.combine(&operand.span);
            return Ok(Expression::new(
                ExpressionKind::Unary(op, Box::new(operand)),
                span,
            ));
        }

        let update = match &self.current().kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start_span.combine(&operand.span);
            return Ok(Expression::new(
                ExpressionKind::Update(op, UpdatePosition::Prefix, Box::new(operand)),
                span,
            ));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };
        expr = self.parse_call_tail(expr)?;

        let update = match &self.current().kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            let end_span = self.current_span();
            self.advance();
            let span = expr.span.combine(&end_span);
            expr = Expression::new(
                ExpressionKind::Update(op, UpdatePosition::Postfix, Box::new(expr)),
                span,
            );
        }

        Ok(expr)
    }

    /// Member access, index and call chains: `a.b[c](d).e(f)`
    fn parse_call_tail(&mut self, mut expr: Expression) -> Result<Expression, ParseError> {
        loop {
            match &self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.parse_identifier("expected property name after '.'")?;
                    let span = expr.span.combine(&name.span);
                    expr = Expression::new(ExpressionKind::Member(Box::new(expr), name), span);
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let end_span = self
                        .consume(TokenKind::RightBracket, "expected ']' after index")?
                        .span;
                    let span = expr.span.combine(&end_span);
                    expr = Expression::new(
                        ExpressionKind::Index(Box::new(expr), Box::new(index)),
                        span,
                    );
                }
                TokenKind::LeftParen => {
                    let (arguments, end_span) = self.parse_arguments()?;
                    let span = expr.span.combine(&end_span);
                    expr = Expression::new(ExpressionKind::Call(Box::new(expr), arguments), span);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_new_expression(&mut self) -> Result<Expression, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::New, "expected 'new'")?;

        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };

        // Member/index chain binds tighter than the constructor call
        loop {
            match &self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.parse_identifier("expected property name after '.'")?;
                    let span = callee.span.combine(&name.span);
                    callee = Expression::new(ExpressionKind::Member(Box::new(callee), name), span);
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let end_span = self
                        .consume(TokenKind::RightBracket, "expected ']' after index")?
                        .span;
                    let span = callee.span.combine(&end_span);
                    callee = Expression::new(
                        ExpressionKind::Index(Box::new(callee), Box::new(index)),
                        span,
                    );
                }
                _ => break,
            }
        }

        let (arguments, end_span) = if self.check(&TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            (Vec::new(), callee.span)
        };
        let span = start_span.combine(&end_span);

        Ok(Expression::new(
            ExpressionKind::New(Box::new(callee), arguments),
            span,
        ))
    }

    fn parse_arguments(&mut self) -> Result<(Vec<Expression>, Span), ParseError> {
        self.consume(TokenKind::LeftParen, "expected '('")?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                arguments.push(self.parse_assignment_expression()?);
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let end_span = self
            .consume(TokenKind::RightParen, "expected ')' after arguments")?
            .span;
        Ok((arguments, end_span))
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let span = self.current_span();

        let kind = match &self.current().kind {
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                ExpressionKind::Literal(Literal::Number(value))
            }
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                ExpressionKind::Literal(Literal::String(value))
            }
            TokenKind::True => {
                self.advance();
                ExpressionKind::Literal(Literal::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                ExpressionKind::Literal(Literal::Boolean(false))
            }
            TokenKind::Null => {
                self.advance();
                ExpressionKind::Literal(Literal::Null)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                ExpressionKind::Identifier(name)
            }
            TokenKind::Template(_) => return self.parse_template_literal(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let end_span = self
                    .consume(TokenKind::RightParen, "expected ')'")?
                    .span;
                return Ok(Expression::new(
                    ExpressionKind::Parenthesized(Box::new(inner)),
                    span.combine(&end_span),
                ));
            }
            TokenKind::LeftBracket => return self.parse_array_literal(),
            TokenKind::LeftBrace => return self.parse_object_literal(),
            TokenKind::Function => return self.parse_function_expression(),
            other => {
                return Err(ParseError::new(
                    format!("unexpected {}", other.describe()),
                    span,
                ))
            }
        };

        Ok(Expression::new(kind, span))
    }

    fn parse_template_literal(&mut self) -> Result<Expression, ParseError> {
        let span = self.current_span();
        let TokenKind::Template(raw_parts) = self.current().kind.clone() else {
            return Err(ParseError::new("expected template literal", span));
        };
        self.advance();

        let mut parts = Vec::new();
        for part in raw_parts {
            match part {
                TemplatePart::Chunk(text) => parts.push(TemplateElement::Chunk(text)),
                TemplatePart::Expr(tokens) => {
                    let mut sub_parser = Parser::new(tokens);
                    let expr = sub_parser.parse_expression()?;
                    if !sub_parser.is_at_end() {
                        return Err(ParseError::new(
                            "unexpected trailing tokens in template interpolation",
                            sub_parser.current_span(),
                        ));
                    }
                    parts.push(TemplateElement::Expr(expr));
                }
            }
        }

        Ok(Expression::new(
            ExpressionKind::Template(TemplateLiteral { parts }),
            span,
        ))
    }

    fn parse_array_literal(&mut self) -> Result<Expression, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::LeftBracket, "expected '['")?;

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RightBracket) {
            elements.push(self.parse_assignment_expression()?);
            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }
        let end_span = self
            .consume(TokenKind::RightBracket, "expected ']' after array elements")?
            .span;

        Ok(Expression::new(
            ExpressionKind::Array(elements),
            start_span.combine(&end_span),
        ))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::LeftBrace, "expected '{'")?;

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let key_span = self.current_span();
            let key = match &self.current().kind {
                TokenKind::Identifier(name) => PropertyKey::Identifier(name.clone()),
                TokenKind::String(value) => PropertyKey::String(value.clone()),
                TokenKind::Number(value) => PropertyKey::Number(*value),
                other => {
                    return Err(ParseError::new(
                        format!("expected property key, found {}", other.describe()),
                        key_span,
                    ))
                }
            };
            self.advance();

            let value = if self.match_token(&[TokenKind::Colon]) {
                self.parse_assignment_expression()?
            } else if let PropertyKey::Identifier(name) = &key {
                // Shorthand property: { a } is { a: a }
                Expression::new(ExpressionKind::Identifier(name.clone()), key_span)
            } else {
                return Err(ParseError::new(
                    "expected ':' after property key",
                    self.current_span(),
                ));
            };

            properties.push(ObjectProperty { key, value });
            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }
        let end_span = self
            .consume(TokenKind::RightBrace, "expected '}' after object properties")?
            .span;

        Ok(Expression::new(
            ExpressionKind::Object(properties),
            start_span.combine(&end_span),
        ))
    }

    fn parse_function_expression(&mut self) -> Result<Expression, ParseError> {
        let start_span = self.current_span();
        self.consume(TokenKind::Function, "expected 'function'")?;

        let name = if matches!(self.current().kind, TokenKind::Identifier(_)) {
            Some(self.parse_identifier("expected function name")?)
        } else {
            None
        };
        let params = self.parse_parameter_list()?;
        let body = self.parse_block()?;
        let span = start_span.combine(&body.span);

        Ok(Expression::new(
            ExpressionKind::Function(FunctionExpression { name, params, body }),
            span,
        ))
    }

    /// Lookahead for `ident =>` or `( params ) =>` without consuming input
    fn is_arrow_function_ahead(&self) -> bool {
        match &self.current().kind {
            TokenKind::Identifier(_) => {
                matches!(self.peek(1).map(|t| &t.kind), Some(TokenKind::Arrow))
            }
            TokenKind::LeftParen => {
                let mut depth = 0usize;
                let mut offset = 1;
                loop {
                    match self.peek(offset).map(|t| &t.kind) {
                        Some(TokenKind::LeftParen) => depth += 1,
                        Some(TokenKind::RightParen) => {
                            if depth == 0 {
                                return matches!(
                                    self.peek(offset + 1).map(|t| &t.kind),
                                    Some(TokenKind::Arrow)
                                );
                            }
                            depth -= 1;
                        }
                        Some(TokenKind::Eof) | None => return false,
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Expression, ParseError> {
        let start_span = self.current_span();

        let params = if matches!(self.current().kind, TokenKind::Identifier(_)) {
            vec![self.parse_identifier("expected parameter name")?]
        } else {
            self.parse_parameter_list()?
        };
        self.consume(TokenKind::Arrow, "expected '=>'")?;

        let (body, end_span) = if self.check(&TokenKind::LeftBrace) {
            let block = self.parse_block()?;
            let span = block.span;
            (ArrowBody::Block(block), span)
        } else {
            let expr = self.parse_assignment_expression()?;
            let span = expr.span;
            (ArrowBody::Expression(Box::new(expr)), span)
        };

        Ok(Expression::new(
            ExpressionKind::Arrow(ArrowFunction { params, body }),
            start_span.combine(&end_span),
        ))
    }
}
