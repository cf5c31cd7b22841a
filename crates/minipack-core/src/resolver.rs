use crate::ast::expression::*;
use crate::ast::statement::*;
use crate::ast::Program;
use crate::codegen::CodeGenerator;
use crate::errors::{BundleError, ResolutionError};
use crate::parser::parse_module;
use crate::span::Span;

/// The identifier naming the import primitive in module source
pub const IMPORT_PRIMITIVE: &str = "require";

/// The reserved name of the loader function in the emitted runtime;
/// import call sites are rewritten to call it
pub const RUNTIME_REQUIRE: &str = "__minipack_require__";

/// A module after resolution: rewritten content plus the canonical
/// identifiers it imports, in source order (duplicates preserved)
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub content: String,
    pub dependencies: Vec<String>,
}

/// Whether a module's content is importable script that must be parsed
/// and rewritten. Anything else is final after the loader stage.
pub fn is_structural(identifier: &str) -> bool {
    identifier.ends_with(".js")
}

/// Normalize a relative path into a canonical module identifier:
/// forward slashes, `.`/`..` segments resolved, `./` prefix.
pub fn canonical_identifier(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let mut stack: Vec<&str> = Vec::new();
    for component in normalized.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if matches!(stack.last(), Some(last) if *last != "..") {
                    stack.pop();
                } else {
                    stack.push("..");
                }
            }
            component => stack.push(component),
        }
    }
    format!("./{}", stack.join("/"))
}

/// Resolve an import specifier against the directory of the importing
/// module, producing the target's canonical identifier.
pub fn resolve_specifier(importer: &str, specifier: &str) -> String {
    let importer = canonical_identifier(importer);
    let dir = match importer.rfind('/') {
        Some(index) => &importer[..index],
        None => ".",
    };
    canonical_identifier(&format!("{dir}/{specifier}"))
}

/// Parses a structural module, rewrites its import call sites and
/// collects its dependency edges.
pub struct ModuleResolver;

impl ModuleResolver {
    /// `resolve(identifier, content) -> { content: rewritten, dependencies }`
    ///
    /// Non-structural modules pass through unchanged with no dependencies.
    pub fn resolve(identifier: &str, content: String) -> Result<ResolvedModule, BundleError> {
        if !is_structural(identifier) {
            return Ok(ResolvedModule {
                content,
                dependencies: Vec::new(),
            });
        }

        let program = parse_module(&content).map_err(|source| BundleError::Parse {
            identifier: identifier.to_string(),
            source,
        })?;

        let mut rewriter = RequireRewriter {
            importer: identifier,
            dependencies: Vec::new(),
        };
        let rewritten = rewriter.rewrite_program(program)?;

        Ok(ResolvedModule {
            content: CodeGenerator::new().generate(&rewritten),
            dependencies: rewriter.dependencies,
        })
    }
}

/// AST fold that returns a new rewritten tree and separately collects
/// dependency identifiers, so the parse and collect phases never alias.
struct RequireRewriter<'a> {
    importer: &'a str,
    dependencies: Vec<String>,
}

impl RequireRewriter<'_> {
    fn rewrite_program(&mut self, program: Program) -> Result<Program, ResolutionError> {
        let statements = program
            .statements
            .into_iter()
            .map(|stmt| self.rewrite_statement(stmt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Program::new(statements, program.span))
    }

    fn rewrite_statement(&mut self, stmt: Statement) -> Result<Statement, ResolutionError> {
        Ok(match stmt {
            Statement::Variable(decl) => Statement::Variable(self.rewrite_variable(decl)?),
            Statement::Function(decl) => Statement::Function(FunctionDeclaration {
                name: decl.name,
                params: decl.params,
                body: self.rewrite_block(decl.body)?,
                span: decl.span,
            }),
            Statement::Return(stmt) => Statement::Return(ReturnStatement {
                value: stmt.value.map(|e| self.rewrite_expression(e)).transpose()?,
                span: stmt.span,
            }),
            Statement::If(stmt) => Statement::If(IfStatement {
                condition: self.rewrite_expression(stmt.condition)?,
                consequent: Box::new(self.rewrite_statement(*stmt.consequent)?),
                alternate: stmt
                    .alternate
                    .map(|s| self.rewrite_statement(*s).map(Box::new))
                    .transpose()?,
                span: stmt.span,
            }),
            Statement::While(stmt) => Statement::While(WhileStatement {
                condition: self.rewrite_expression(stmt.condition)?,
                body: Box::new(self.rewrite_statement(*stmt.body)?),
                span: stmt.span,
            }),
            Statement::For(stmt) => {
                let ForStatement {
                    init,
                    condition,
                    update,
                    body,
                    span,
                } = *stmt;
                Statement::For(Box::new(ForStatement {
                    init: init
                        .map(|init| {
                            Ok(match init {
                                ForInit::Variable(decl) => {
                                    ForInit::Variable(self.rewrite_variable(decl)?)
                                }
                                ForInit::Expression(expr) => {
                                    ForInit::Expression(self.rewrite_expression(expr)?)
                                }
                            })
                        })
                        .transpose()?,
                    condition: condition.map(|e| self.rewrite_expression(e)).transpose()?,
                    update: update.map(|e| self.rewrite_expression(e)).transpose()?,
                    body: self.rewrite_statement(body)?,
                    span,
                }))
            }
            Statement::Throw(stmt) => Statement::Throw(ThrowStatement {
                value: self.rewrite_expression(stmt.value)?,
                span: stmt.span,
            }),
            Statement::Block(block) => Statement::Block(self.rewrite_block(block)?),
            Statement::Expression(expr) => Statement::Expression(self.rewrite_expression(expr)?),
            passthrough @ (Statement::Break(_) | Statement::Continue(_) | Statement::Empty(_)) => {
                passthrough
            }
        })
    }

    fn rewrite_variable(
        &mut self,
        decl: VariableDeclaration,
    ) -> Result<VariableDeclaration, ResolutionError> {
        let declarators = decl
            .declarators
            .into_iter()
            .map(|declarator| {
                Ok(VariableDeclarator {
                    name: declarator.name,
                    initializer: declarator
                        .initializer
                        .map(|e| self.rewrite_expression(e))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ResolutionError>>()?;
        Ok(VariableDeclaration {
            kind: decl.kind,
            declarators,
            span: decl.span,
        })
    }

    fn rewrite_block(&mut self, block: Block) -> Result<Block, ResolutionError> {
        let statements = block
            .statements
            .into_iter()
            .map(|stmt| self.rewrite_statement(stmt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Block {
            statements,
            span: block.span,
        })
    }

    fn rewrite_expression(&mut self, expr: Expression) -> Result<Expression, ResolutionError> {
        let span = expr.span;
        let kind = match expr.kind {
            ExpressionKind::Call(callee, arguments) => {
                if matches!(&callee.kind, ExpressionKind::Identifier(name) if name == IMPORT_PRIMITIVE)
                {
                    return self.rewrite_import_site(callee.span, arguments, span);
                }
                ExpressionKind::Call(
                    Box::new(self.rewrite_expression(*callee)?),
                    self.rewrite_expressions(arguments)?,
                )
            }
            ExpressionKind::New(callee, arguments) => ExpressionKind::New(
                Box::new(self.rewrite_expression(*callee)?),
                self.rewrite_expressions(arguments)?,
            ),
            ExpressionKind::Member(object, property) => {
                ExpressionKind::Member(Box::new(self.rewrite_expression(*object)?), property)
            }
            ExpressionKind::Index(object, index) => ExpressionKind::Index(
                Box::new(self.rewrite_expression(*object)?),
                Box::new(self.rewrite_expression(*index)?),
            ),
            ExpressionKind::Unary(op, operand) => {
                ExpressionKind::Unary(op, Box::new(self.rewrite_expression(*operand)?))
            }
            ExpressionKind::Update(op, position, operand) => {
                ExpressionKind::Update(op, position, Box::new(self.rewrite_expression(*operand)?))
            }
            ExpressionKind::Binary(op, left, right) => ExpressionKind::Binary(
                op,
                Box::new(self.rewrite_expression(*left)?),
                Box::new(self.rewrite_expression(*right)?),
            ),
            ExpressionKind::Logical(op, left, right) => ExpressionKind::Logical(
                op,
                Box::new(self.rewrite_expression(*left)?),
                Box::new(self.rewrite_expression(*right)?),
            ),
            ExpressionKind::Conditional(condition, consequent, alternate) => {
                ExpressionKind::Conditional(
                    Box::new(self.rewrite_expression(*condition)?),
                    Box::new(self.rewrite_expression(*consequent)?),
                    Box::new(self.rewrite_expression(*alternate)?),
                )
            }
            ExpressionKind::Assignment(op, target, value) => ExpressionKind::Assignment(
                op,
                Box::new(self.rewrite_expression(*target)?),
                Box::new(self.rewrite_expression(*value)?),
            ),
            ExpressionKind::Array(elements) => {
                ExpressionKind::Array(self.rewrite_expressions(elements)?)
            }
            ExpressionKind::Object(properties) => ExpressionKind::Object(
                properties
                    .into_iter()
                    .map(|property| {
                        Ok(ObjectProperty {
                            key: property.key,
                            value: self.rewrite_expression(property.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ResolutionError>>()?,
            ),
            ExpressionKind::Template(template) => ExpressionKind::Template(TemplateLiteral {
                parts: template
                    .parts
                    .into_iter()
                    .map(|part| {
                        Ok(match part {
                            TemplateElement::Chunk(text) => TemplateElement::Chunk(text),
                            TemplateElement::Expr(expr) => {
                                TemplateElement::Expr(self.rewrite_expression(expr)?)
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, ResolutionError>>()?,
            }),
            ExpressionKind::Function(func) => ExpressionKind::Function(FunctionExpression {
                name: func.name,
                params: func.params,
                body: self.rewrite_block(func.body)?,
            }),
            ExpressionKind::Arrow(arrow) => ExpressionKind::Arrow(ArrowFunction {
                params: arrow.params,
                body: match arrow.body {
                    ArrowBody::Expression(expr) => {
                        ArrowBody::Expression(Box::new(self.rewrite_expression(*expr)?))
                    }
                    ArrowBody::Block(block) => ArrowBody::Block(self.rewrite_block(block)?),
                },
            }),
            ExpressionKind::Parenthesized(inner) => {
                ExpressionKind::Parenthesized(Box::new(self.rewrite_expression(*inner)?))
            }
            passthrough @ (ExpressionKind::Identifier(_) | ExpressionKind::Literal(_)) => {
                passthrough
            }
        };
        Ok(Expression::new(kind, span))
    }

    fn rewrite_expressions(
        &mut self,
        exprs: Vec<Expression>,
    ) -> Result<Vec<Expression>, ResolutionError> {
        exprs
            .into_iter()
            .map(|expr| self.rewrite_expression(expr))
            .collect()
    }

    /// Rewrite one import call site: the callee becomes the runtime
    /// loader's reserved name and the argument the canonical identifier.
    fn rewrite_import_site(
        &mut self,
        callee_span: Span,
        arguments: Vec<Expression>,
        call_span: Span,
    ) -> Result<Expression, ResolutionError> {
        // The target must be statically determinable: exactly one
        // string-literal argument.
        let specifier = match arguments.as_slice() {
            [Expression {
                kind: ExpressionKind::Literal(Literal::String(specifier)),
                ..
            }] => specifier.clone(),
            _ => {
                return Err(ResolutionError::NonLiteralArgument {
                    importer: self.importer.to_string(),
                    span: call_span,
                })
            }
        };

        let dependency = resolve_specifier(self.importer, &specifier);
        self.dependencies.push(dependency.clone());

        let argument_span = arguments[0].span;
        Ok(Expression::new(
            ExpressionKind::Call(
                Box::new(Expression::new(
                    ExpressionKind::Identifier(RUNTIME_REQUIRE.to_string()),
                    callee_span,
                )),
                vec![Expression::new(
                    ExpressionKind::Literal(Literal::String(dependency)),
                    argument_span,
                )],
            ),
            call_span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_canonical_identifier_normalizes() {
        assert_eq!(canonical_identifier("src/app.js"), "./src/app.js");
        assert_eq!(canonical_identifier("./src/./app.js"), "./src/app.js");
        assert_eq!(canonical_identifier("src/js/../a.js"), "./src/a.js");
        assert_eq!(canonical_identifier("src\\app.js"), "./src/app.js");
    }

    #[test]
    fn test_canonical_identifier_keeps_escaping_parents() {
        assert_eq!(canonical_identifier("../x.js"), "./../x.js");
        assert_eq!(canonical_identifier("a/../../x.js"), "./../x.js");
    }

    #[test]
    fn test_resolve_specifier_relative_to_importer_directory() {
        assert_eq!(
            resolve_specifier("./src/app.js", "./js/a.js"),
            "./src/js/a.js"
        );
        assert_eq!(resolve_specifier("./src/app.js", "../lib/x.js"), "./lib/x.js");
        assert_eq!(resolve_specifier("./app.js", "./a.js"), "./a.js");
    }

    #[test]
    fn test_distinct_specifiers_collapse_to_one_identifier() {
        let direct = resolve_specifier("./src/app.js", "./js/a.js");
        let roundabout = resolve_specifier("./src/app.js", "./js/../js/./a.js");
        assert_eq!(direct, roundabout);
    }

    #[test]
    fn test_rewrites_call_site_and_collects_dependency() {
        let resolved = ModuleResolver::resolve(
            "./src/app.js",
            "const a = require('./js/a.js');".to_string(),
        )
        .unwrap();

        assert_eq!(resolved.dependencies, vec!["./src/js/a.js".to_string()]);
        assert_eq!(
            resolved.content,
            "const a = __minipack_require__(\"./src/js/a.js\");\n"
        );
    }

    #[test]
    fn test_dependencies_preserve_source_order_and_duplicates() {
        let source = indoc! {"
            const a = require('./js/a.js');
            const b = require('./js/b.js');
            const again = require('./js/a.js');
        "};
        let resolved = ModuleResolver::resolve("./src/app.js", source.to_string()).unwrap();
        assert_eq!(
            resolved.dependencies,
            vec![
                "./src/js/a.js".to_string(),
                "./src/js/b.js".to_string(),
                "./src/js/a.js".to_string(),
            ]
        );
    }

    #[test]
    fn test_rewrites_inside_nested_scopes() {
        let source = indoc! {"
            function load() {
                if (cond) {
                    return require('./late.js');
                }
            }
        "};
        let resolved = ModuleResolver::resolve("./src/app.js", source.to_string()).unwrap();
        assert_eq!(resolved.dependencies, vec!["./src/late.js".to_string()]);
        assert!(resolved.content.contains("__minipack_require__(\"./src/late.js\")"));
    }

    #[test]
    fn test_non_literal_argument_is_resolution_error() {
        let err =
            ModuleResolver::resolve("./src/app.js", "require(name);".to_string()).unwrap_err();
        assert!(matches!(
            err,
            BundleError::Resolution(ResolutionError::NonLiteralArgument { .. })
        ));
    }

    #[test]
    fn test_wrong_arity_is_resolution_error() {
        assert!(ModuleResolver::resolve("./a.js", "require();".to_string()).is_err());
        assert!(
            ModuleResolver::resolve("./a.js", "require('./b.js', extra);".to_string()).is_err()
        );
    }

    #[test]
    fn test_member_require_is_not_an_import_site() {
        let resolved =
            ModuleResolver::resolve("./a.js", "ctx.require(name);".to_string()).unwrap();
        assert!(resolved.dependencies.is_empty());
        assert_eq!(resolved.content, "ctx.require(name);\n");
    }

    #[test]
    fn test_non_structural_module_passes_through() {
        let resolved = ModuleResolver::resolve(
            "./style/index.css",
            "body { color: red; }".to_string(),
        )
        .unwrap();
        assert_eq!(resolved.content, "body { color: red; }");
        assert!(resolved.dependencies.is_empty());
    }

    #[test]
    fn test_parse_failure_is_parse_error() {
        let err = ModuleResolver::resolve("./a.js", "var = ;".to_string()).unwrap_err();
        assert!(matches!(err, BundleError::Parse { identifier, .. } if identifier == "./a.js"));
    }
}
