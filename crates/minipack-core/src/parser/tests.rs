use super::*;
use crate::ast::expression::*;
use crate::ast::statement::*;
use indoc::indoc;

fn parse_source(source: &str) -> Program {
    parse_module(source).expect("parse failed")
}

#[test]
fn test_parse_variable_declaration() {
    let program = parse_source("const a = require('./js/a.js')");
    assert_eq!(program.statements.len(), 1);

    match &program.statements[0] {
        Statement::Variable(decl) => {
            assert_eq!(decl.kind, VariableKind::Const);
            assert_eq!(decl.declarators.len(), 1);
            assert_eq!(decl.declarators[0].name.node, "a");
            match &decl.declarators[0].initializer {
                Some(Expression {
                    kind: ExpressionKind::Call(callee, args),
                    ..
                }) => {
                    assert!(matches!(
                        &callee.kind,
                        ExpressionKind::Identifier(name) if name == "require"
                    ));
                    assert_eq!(args.len(), 1);
                }
                other => panic!("expected call initializer, got {other:?}"),
            }
        }
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_parse_multiple_declarators() {
    let program = parse_source("var x = 1, y, z = 3;");
    match &program.statements[0] {
        Statement::Variable(decl) => {
            assert_eq!(decl.declarators.len(), 3);
            assert!(decl.declarators[1].initializer.is_none());
        }
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_parse_function_declaration() {
    let program = parse_source(indoc! {"
        function add(a, b) {
            return a + b
        }
    "});
    match &program.statements[0] {
        Statement::Function(func) => {
            assert_eq!(func.name.node, "add");
            assert_eq!(func.params.len(), 2);
            assert_eq!(func.body.statements.len(), 1);
        }
        _ => panic!("expected function declaration"),
    }
}

#[test]
fn test_parse_if_else() {
    let program = parse_source(indoc! {"
        if (x > 0) {
            y = 1;
        } else {
            y = 2;
        }
    "});
    match &program.statements[0] {
        Statement::If(if_stmt) => {
            assert!(if_stmt.alternate.is_some());
        }
        _ => panic!("expected if statement"),
    }
}

#[test]
fn test_parse_for_loop() {
    let program = parse_source("for (var i = 0; i < 10; i++) { total += i }");
    match &program.statements[0] {
        Statement::For(for_stmt) => {
            assert!(matches!(for_stmt.init, Some(ForInit::Variable(_))));
            assert!(for_stmt.condition.is_some());
            assert!(matches!(
                for_stmt.update.as_ref().map(|e| &e.kind),
                Some(ExpressionKind::Update(UpdateOp::Increment, UpdatePosition::Postfix, _))
            ));
        }
        _ => panic!("expected for statement"),
    }
}

#[test]
fn test_parse_member_chains() {
    let program = parse_source("document.body.appendChild(div)");
    match &program.statements[0] {
        Statement::Expression(Expression {
            kind: ExpressionKind::Call(callee, args),
            ..
        }) => {
            assert_eq!(args.len(), 1);
            assert!(matches!(callee.kind, ExpressionKind::Member(_, _)));
        }
        other => panic!("expected call expression, got {other:?}"),
    }
}

#[test]
fn test_parse_object_literal() {
    let program = parse_source("module.exports = { text: 'hello', count: 2 }");
    match &program.statements[0] {
        Statement::Expression(Expression {
            kind: ExpressionKind::Assignment(AssignmentOp::Assign, _, value),
            ..
        }) => match &value.kind {
            ExpressionKind::Object(props) => {
                assert_eq!(props.len(), 2);
                assert_eq!(props[0].key, PropertyKey::Identifier("text".to_string()));
            }
            other => panic!("expected object literal, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_parse_shorthand_property() {
    let program = parse_source("var o = { a, b: 2 }");
    match &program.statements[0] {
        Statement::Variable(decl) => match &decl.declarators[0].initializer {
            Some(Expression {
                kind: ExpressionKind::Object(props),
                ..
            }) => {
                assert!(matches!(
                    &props[0].value.kind,
                    ExpressionKind::Identifier(name) if name == "a"
                ));
            }
            other => panic!("expected object literal, got {other:?}"),
        },
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_parse_template_with_interpolation() {
    let program = parse_source("var s = `a is ${a.text} here`");
    match &program.statements[0] {
        Statement::Variable(decl) => match &decl.declarators[0].initializer {
            Some(Expression {
                kind: ExpressionKind::Template(template),
                ..
            }) => {
                assert_eq!(template.parts.len(), 3);
                assert!(matches!(
                    &template.parts[1],
                    TemplateElement::Expr(Expression {
                        kind: ExpressionKind::Member(_, _),
                        ..
                    })
                ));
            }
            other => panic!("expected template literal, got {other:?}"),
        },
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_parse_arrow_functions() {
    let program = parse_source("var f = x => x + 1; var g = (a, b) => { return a * b; }");
    match &program.statements[0] {
        Statement::Variable(decl) => {
            assert!(matches!(
                decl.declarators[0].initializer.as_ref().map(|e| &e.kind),
                Some(ExpressionKind::Arrow(ArrowFunction {
                    body: ArrowBody::Expression(_),
                    ..
                }))
            ));
        }
        _ => panic!("expected variable declaration"),
    }
    match &program.statements[1] {
        Statement::Variable(decl) => {
            assert!(matches!(
                decl.declarators[0].initializer.as_ref().map(|e| &e.kind),
                Some(ExpressionKind::Arrow(ArrowFunction {
                    body: ArrowBody::Block(_),
                    ..
                }))
            ));
        }
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_parenthesized_is_not_arrow() {
    let program = parse_source("var y = (a + b) * c");
    match &program.statements[0] {
        Statement::Variable(decl) => match &decl.declarators[0].initializer {
            Some(Expression {
                kind: ExpressionKind::Binary(BinaryOp::Multiply, left, _),
                ..
            }) => {
                assert!(matches!(left.kind, ExpressionKind::Parenthesized(_)));
            }
            other => panic!("expected binary expression, got {other:?}"),
        },
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_parse_new_expression() {
    let program = parse_source("var e = new Error('boom')");
    match &program.statements[0] {
        Statement::Variable(decl) => {
            assert!(matches!(
                decl.declarators[0].initializer.as_ref().map(|e| &e.kind),
                Some(ExpressionKind::New(_, args)) if args.len() == 1
            ));
        }
        _ => panic!("expected variable declaration"),
    }
}

#[test]
fn test_advance_at_start_of_empty_stream() {
    let tokens = Lexer::new("").tokenize().expect("lexing failed");
    let mut parser = Parser::new(tokens);
    assert!(parser.is_at_end());
    assert_eq!(parser.advance().kind, TokenKind::Eof);
}

#[test]
fn test_parse_error_has_location() {
    let err = parse_module("var = 3").expect_err("should not parse");
    assert!(err.message.contains("expected variable name"));
    assert_eq!(err.span.line, 1);
}

#[test]
fn test_precedence() {
    let program = parse_source("var x = 1 + 2 * 3");
    match &program.statements[0] {
        Statement::Variable(decl) => match &decl.declarators[0].initializer {
            Some(Expression {
                kind: ExpressionKind::Binary(BinaryOp::Add, _, right),
                ..
            }) => {
                assert!(matches!(
                    right.kind,
                    ExpressionKind::Binary(BinaryOp::Multiply, _, _)
                ));
            }
            other => panic!("expected additive root, got {other:?}"),
        },
        _ => panic!("expected variable declaration"),
    }
}
