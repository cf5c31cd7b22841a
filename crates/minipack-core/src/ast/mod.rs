pub mod expression;
pub mod statement;

use crate::span::Span;

/// Wrapper for AST nodes with span information
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Spanned { node, span }
    }
}

/// Identifier
pub type Ident = Spanned<String>;

/// Top-level program: one module's statements
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<statement::Statement>,
    pub span: Span,
}

impl Program {
    pub fn new(statements: Vec<statement::Statement>, span: Span) -> Self {
        Program { statements, span }
    }
}
