mod expressions;
mod statements;

pub use expressions::{escape_string_literal, format_number};

use crate::ast::Program;

/// Regenerates JavaScript source text from a (possibly rewritten) AST.
pub struct CodeGenerator {
    output: String,
    indent_level: usize,
    indent_str: String,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        CodeGenerator {
            output: String::new(),
            indent_level: 0,
            indent_str: "  ".to_string(),
        }
    }

    pub fn generate(mut self, program: &Program) -> String {
        for statement in &program.statements {
            self.generate_statement(statement);
        }
        self.output
    }

    // Output management

    pub(crate) fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub(crate) fn writeln(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    pub(crate) fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.indent_str);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;
    use indoc::indoc;

    fn regenerate(source: &str) -> String {
        let program = parse_module(source).expect("parse failed");
        CodeGenerator::new().generate(&program)
    }

    #[test]
    fn test_variable_declaration() {
        assert_eq!(
            regenerate("const a = require('./js/a.js')"),
            "const a = require(\"./js/a.js\");\n"
        );
    }

    #[test]
    fn test_parentheses_preserved() {
        assert_eq!(regenerate("var y = (a + b) * c;"), "var y = (a + b) * c;\n");
    }

    #[test]
    fn test_member_call_chain() {
        assert_eq!(
            regenerate("document.body.appendChild(div)"),
            "document.body.appendChild(div);\n"
        );
    }

    #[test]
    fn test_object_literal() {
        assert_eq!(
            regenerate("module.exports = { text: 'hello' }"),
            "module.exports = { text: \"hello\" };\n"
        );
    }

    #[test]
    fn test_function_declaration() {
        let output = regenerate(indoc! {"
            function add(a, b) {
                return a + b
            }
        "});
        assert_eq!(output, "function add(a, b) {\n  return a + b;\n}\n");
    }

    #[test]
    fn test_if_else_chain() {
        let output = regenerate("if (x) { a() } else if (y) { b() } else { c() }");
        assert_eq!(
            output,
            "if (x) {\n  a();\n} else if (y) {\n  b();\n} else {\n  c();\n}\n"
        );
    }

    #[test]
    fn test_for_loop() {
        let output = regenerate("for (var i = 0; i < 10; i++) { f(i) }");
        assert_eq!(output, "for (var i = 0; i < 10; i++) {\n  f(i);\n}\n");
    }

    #[test]
    fn test_template_literal() {
        let output = regenerate("var s = `a is ${a.text}!`");
        assert_eq!(output, "var s = `a is ${a.text}!`;\n");
    }

    #[test]
    fn test_template_escapes() {
        let output = regenerate(r"var s = `tick \` dollar \${x}`");
        assert_eq!(output, "var s = `tick \\` dollar \\${x}`;\n");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            regenerate("var s = 'line\\nquote\"'"),
            "var s = \"line\\nquote\\\"\";\n"
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(regenerate("var n = 42; var m = 3.5"), "var n = 42;\nvar m = 3.5;\n");
    }

    #[test]
    fn test_arrow_functions() {
        assert_eq!(
            regenerate("var f = x => x + 1"),
            "var f = (x) => x + 1;\n"
        );
        assert_eq!(
            regenerate("var g = (a, b) => { return a; }"),
            "var g = (a, b) => {\n  return a;\n};\n"
        );
    }

    #[test]
    fn test_new_expression() {
        assert_eq!(
            regenerate("var e = new Error('boom')"),
            "var e = new Error(\"boom\");\n"
        );
    }

    #[test]
    fn test_conditional_and_logical() {
        assert_eq!(
            regenerate("var v = a && b ? c : d ?? e"),
            "var v = a && b ? c : d ?? e;\n"
        );
    }

    #[test]
    fn test_unary_and_update() {
        assert_eq!(regenerate("x = -y; z = !w; ++k"), "x = -y;\nz = !w;\n++k;\n");
    }

    #[test]
    fn test_throw_statement() {
        assert_eq!(
            regenerate("throw new Error('bad')"),
            "throw new Error(\"bad\");\n"
        );
    }

    #[test]
    fn test_round_trip_is_stable() {
        let source = indoc! {"
            const a = require('./js/a.js');
            const b = require('./js/b.js');
            var div = document.createElement('div');
            div.innerHTML = `app ${a.text} ${b.text}`;
            document.body.appendChild(div);
        "};
        let once = regenerate(source);
        let twice = regenerate(&once);
        assert_eq!(once, twice);
    }
}
