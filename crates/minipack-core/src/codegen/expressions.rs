use super::CodeGenerator;
use crate::ast::expression::*;
use crate::ast::Ident;

/// Convert binary op to its source form
pub fn binary_op_to_string(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::Equal => "==",
        BinaryOp::StrictEqual => "===",
        BinaryOp::NotEqual => "!=",
        BinaryOp::StrictNotEqual => "!==",
        BinaryOp::Less => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::BitwiseAnd => "&",
        BinaryOp::BitwiseOr => "|",
        BinaryOp::BitwiseXor => "^",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>",
        BinaryOp::UnsignedShiftRight => ">>>",
        BinaryOp::In => "in",
        BinaryOp::Instanceof => "instanceof",
    }
}

pub fn logical_op_to_string(op: LogicalOp) -> &'static str {
    match op {
        LogicalOp::And => "&&",
        LogicalOp::Or => "||",
        LogicalOp::NullishCoalesce => "??",
    }
}

pub fn assignment_op_to_string(op: AssignmentOp) -> &'static str {
    match op {
        AssignmentOp::Assign => "=",
        AssignmentOp::AddAssign => "+=",
        AssignmentOp::SubtractAssign => "-=",
        AssignmentOp::MultiplyAssign => "*=",
        AssignmentOp::DivideAssign => "/=",
        AssignmentOp::ModuloAssign => "%=",
    }
}

pub fn unary_op_to_string(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "!",
        UnaryOp::Negate => "-",
        UnaryOp::Plus => "+",
        UnaryOp::BitwiseNot => "~",
        UnaryOp::Typeof => "typeof ",
        UnaryOp::Void => "void ",
        UnaryOp::Delete => "delete ",
    }
}

/// Render a number the way source JavaScript would write it
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Escape a cooked string value into a double-quoted literal
pub fn escape_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            ch if (ch as u32) < 0x20 => {
                escaped.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

impl CodeGenerator {
    pub fn generate_expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExpressionKind::Identifier(name) => self.write(name),
            ExpressionKind::Literal(literal) => self.generate_literal(literal),
            ExpressionKind::Template(template) => self.generate_template(template),
            ExpressionKind::Array(elements) => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.generate_expression(element);
                }
                self.write("]");
            }
            ExpressionKind::Object(properties) => self.generate_object(properties),
            ExpressionKind::Function(func) => self.generate_function_expression(func),
            ExpressionKind::Arrow(arrow) => self.generate_arrow_function(arrow),
            ExpressionKind::Unary(op, operand) => {
                self.write(unary_op_to_string(*op));
                self.generate_expression(operand);
            }
            ExpressionKind::Update(op, position, operand) => {
                let op_str = match op {
                    UpdateOp::Increment => "++",
                    UpdateOp::Decrement => "--",
                };
                match position {
                    UpdatePosition::Prefix => {
                        self.write(op_str);
                        self.generate_expression(operand);
                    }
                    UpdatePosition::Postfix => {
                        self.generate_expression(operand);
                        self.write(op_str);
                    }
                }
            }
            ExpressionKind::Binary(op, left, right) => {
                self.generate_expression(left);
                self.write(" ");
                self.write(binary_op_to_string(*op));
                self.write(" ");
                self.generate_expression(right);
            }
            ExpressionKind::Logical(op, left, right) => {
                self.generate_expression(left);
                self.write(" ");
                self.write(logical_op_to_string(*op));
                self.write(" ");
                self.generate_expression(right);
            }
            ExpressionKind::Conditional(condition, consequent, alternate) => {
                self.generate_expression(condition);
                self.write(" ? ");
                self.generate_expression(consequent);
                self.write(" : ");
                self.generate_expression(alternate);
            }
            ExpressionKind::Assignment(op, target, value) => {
                self.generate_expression(target);
                self.write(" ");
                self.write(assignment_op_to_string(*op));
                self.write(" ");
                self.generate_expression(value);
            }
            ExpressionKind::Call(callee, arguments) => {
                self.generate_expression(callee);
                self.generate_arguments(arguments);
            }
            ExpressionKind::New(callee, arguments) => {
                self.write("new ");
                self.generate_expression(callee);
                self.generate_arguments(arguments);
            }
            ExpressionKind::Member(object, property) => {
                self.generate_expression(object);
                self.write(".");
                self.write(&property.node);
            }
            ExpressionKind::Index(object, index) => {
                self.generate_expression(object);
                self.write("[");
                self.generate_expression(index);
                self.write("]");
            }
            ExpressionKind::Parenthesized(inner) => {
                self.write("(");
                self.generate_expression(inner);
                self.write(")");
            }
        }
    }

    fn generate_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.write("null"),
            Literal::Boolean(true) => self.write("true"),
            Literal::Boolean(false) => self.write("false"),
            Literal::Number(value) => {
                let text = format_number(*value);
                self.write(&text);
            }
            Literal::String(value) => {
                let text = escape_string_literal(value);
                self.write(&text);
            }
        }
    }

    fn generate_template(&mut self, template: &TemplateLiteral) {
        self.write("`");
        for part in &template.parts {
            match part {
                TemplateElement::Chunk(text) => {
                    let escaped = escape_template_chunk(text);
                    self.write(&escaped);
                }
                TemplateElement::Expr(expr) => {
                    self.write("${");
                    self.generate_expression(expr);
                    self.write("}");
                }
            }
        }
        self.write("`");
    }

    fn generate_object(&mut self, properties: &[ObjectProperty]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match &property.key {
                PropertyKey::Identifier(name) => self.write(name),
                PropertyKey::String(value) => {
                    let text = escape_string_literal(value);
                    self.write(&text);
                }
                PropertyKey::Number(value) => {
                    let text = format_number(*value);
                    self.write(&text);
                }
            }
            self.write(": ");
            self.generate_expression(&property.value);
        }
        self.write(" }");
    }

    fn generate_function_expression(&mut self, func: &FunctionExpression) {
        self.write("function");
        if let Some(name) = &func.name {
            self.write(" ");
            self.write(&name.node);
        }
        self.generate_parameter_list(&func.params);
        self.write(" ");
        self.generate_block(&func.body);
    }

    fn generate_arrow_function(&mut self, arrow: &ArrowFunction) {
        self.generate_parameter_list(&arrow.params);
        self.write(" => ");
        match &arrow.body {
            ArrowBody::Expression(expr) => self.generate_expression(expr),
            ArrowBody::Block(block) => self.generate_block(block),
        }
    }

    pub(crate) fn generate_parameter_list(&mut self, params: &[Ident]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&param.node);
        }
        self.write(")");
    }

    fn generate_arguments(&mut self, arguments: &[Expression]) {
        self.write("(");
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_expression(argument);
        }
        self.write(")");
    }
}

/// Escape the cooked text of a template chunk back into raw template form
fn escape_template_chunk(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '`' => escaped.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => escaped.push_str("\\$"),
            ch => escaped.push(ch),
        }
    }
    escaped
}
