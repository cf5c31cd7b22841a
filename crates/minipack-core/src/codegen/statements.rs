use super::CodeGenerator;
use crate::ast::statement::*;

impl CodeGenerator {
    pub fn generate_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Variable(decl) => {
                self.write_indent();
                self.generate_variable_declaration(decl);
                self.writeln(";");
            }
            Statement::Function(decl) => self.generate_function_declaration(decl),
            Statement::Return(stmt) => self.generate_return_statement(stmt),
            Statement::If(stmt) => {
                self.write_indent();
                self.generate_if_statement(stmt);
                self.writeln("");
            }
            Statement::While(stmt) => self.generate_while_statement(stmt),
            Statement::For(stmt) => self.generate_for_statement(stmt),
            Statement::Break(_) => {
                self.write_indent();
                self.writeln("break;");
            }
            Statement::Continue(_) => {
                self.write_indent();
                self.writeln("continue;");
            }
            Statement::Throw(stmt) => {
                self.write_indent();
                self.write("throw ");
                self.generate_expression(&stmt.value);
                self.writeln(";");
            }
            Statement::Block(block) => {
                self.write_indent();
                self.generate_block(block);
                self.writeln("");
            }
            Statement::Empty(_) => {
                self.write_indent();
                self.writeln(";");
            }
            Statement::Expression(expr) => {
                self.write_indent();
                self.generate_expression(expr);
                self.writeln(";");
            }
        }
    }

    pub(crate) fn generate_variable_declaration(&mut self, decl: &VariableDeclaration) {
        self.write(decl.kind.keyword());
        self.write(" ");
        for (i, declarator) in decl.declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&declarator.name.node);
            if let Some(init) = &declarator.initializer {
                self.write(" = ");
                self.generate_expression(init);
            }
        }
    }

    fn generate_function_declaration(&mut self, decl: &FunctionDeclaration) {
        self.write_indent();
        self.write("function ");
        self.write(&decl.name.node);
        self.generate_parameter_list(&decl.params);
        self.write(" ");
        self.generate_block(&decl.body);
        self.writeln("");
    }

    fn generate_return_statement(&mut self, stmt: &ReturnStatement) {
        self.write_indent();
        match &stmt.value {
            Some(value) => {
                self.write("return ");
                self.generate_expression(value);
                self.writeln(";");
            }
            None => self.writeln("return;"),
        }
    }

    fn generate_if_statement(&mut self, stmt: &IfStatement) {
        self.write("if (");
        self.generate_expression(&stmt.condition);
        self.write(") ");
        self.generate_attached_body(&stmt.consequent);

        if let Some(alternate) = &stmt.alternate {
            self.write(" else ");
            // Keep `else if` chains flat
            if let Statement::If(nested) = alternate.as_ref() {
                self.generate_if_statement(nested);
            } else {
                self.generate_attached_body(alternate);
            }
        }
    }

    fn generate_while_statement(&mut self, stmt: &WhileStatement) {
        self.write_indent();
        self.write("while (");
        self.generate_expression(&stmt.condition);
        self.write(") ");
        self.generate_attached_body(&stmt.body);
        self.writeln("");
    }

    fn generate_for_statement(&mut self, stmt: &ForStatement) {
        self.write_indent();
        self.write("for (");
        match &stmt.init {
            Some(ForInit::Variable(decl)) => self.generate_variable_declaration(decl),
            Some(ForInit::Expression(expr)) => self.generate_expression(expr),
            None => {}
        }
        self.write("; ");
        if let Some(condition) = &stmt.condition {
            self.generate_expression(condition);
        }
        self.write("; ");
        if let Some(update) = &stmt.update {
            self.generate_expression(update);
        }
        self.write(") ");
        self.generate_attached_body(&stmt.body);
        self.writeln("");
    }

    /// Body of an if/while/for: single statements are normalized into a
    /// braced block so the regenerated form never dangles
    fn generate_attached_body(&mut self, stmt: &Statement) {
        if let Statement::Block(block) = stmt {
            self.generate_block(block);
        } else {
            self.writeln("{");
            self.indent();
            self.generate_statement(stmt);
            self.dedent();
            self.write_indent();
            self.write("}");
        }
    }

    pub(crate) fn generate_block(&mut self, block: &Block) {
        if block.statements.is_empty() {
            self.write("{}");
            return;
        }
        self.writeln("{");
        self.indent();
        for statement in &block.statements {
            self.generate_statement(statement);
        }
        self.dedent();
        self.write_indent();
        self.write("}");
    }
}
