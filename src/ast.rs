use std::fmt::Display;

#[derive(Debug)]
pub struct Program(pub Vec<Statement>);

#[derive(Debug, Clone)]
pub enum Statement {
    Expression(Expression),
    VarDeclaration(String, Option<Expression>),
    Assignment(AssignTarget, Expression),
    FunctionDeclaration(String, Vec<String>, Box<Statement>),
    Print(Expression),
    Block(Vec<Statement>),
    If(Expression, Box<Statement>, Option<Box<Statement>>),
    While(Expression, Box<Statement>),
    For(
        Option<Box<Statement>>,
        Option<Expression>,
        Option<Box<Statement>>,
        Box<Statement>,
    ),
    Return(Option<Expression>),
}

/// Left-hand side of an assignment statement.
#[derive(Debug, Clone)]
pub enum AssignTarget {
    Variable(String),
    Index(Expression, Expression),
    Property(Expression, String),
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(String),
    Literal(Literal),
    Binary(Box<Expression>, InfixOperator, Box<Expression>),
    Unary(UnaryOperator, Box<Expression>),
    Call(String, Vec<Expression>),
    Array(Vec<Expression>),
    Object(Vec<(String, Expression)>),
    Index(Box<Expression>, Box<Expression>),
    Property(Box<Expression>, String),
}

#[derive(Debug, Clone)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone)]
pub enum InfixOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    And,
    Or,
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.0 {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Expression(expr) => write!(f, "{};", expr),
            Statement::Print(expr) => write!(f, "print {};", expr),
            Statement::VarDeclaration(name, Some(expr)) => write!(f, "let {} = {};", name, expr),
            Statement::VarDeclaration(name, None) => write!(f, "let {};", name),
            Statement::Assignment(target, expr) => write!(f, "{} = {};", target, expr),
            Statement::Block(statements) => {
                writeln!(f, "{{")?;
                for statement in statements {
                    writeln!(f, "{}", statement)?;
                }
                write!(f, "}}")
            }
            Statement::If(condition, then_block, else_block) => {
                write!(f, "if ({}) ", condition)?;
                write!(f, "{}", then_block)?;
                if let Some(else_block) = else_block {
                    write!(f, " else {}", else_block)?;
                }
                Ok(())
            }
            Statement::While(condition, body) => {
                write!(f, "while ({}) ", condition)?;
                write!(f, "{}", body)
            }
            Statement::For(initializer, condition, increment, body) => {
                write!(f, "for (")?;
                match initializer {
                    Some(initializer) => write!(f, "{}", initializer)?,
                    None => write!(f, ";")?,
                }
                if let Some(condition) = condition {
                    write!(f, " {}", condition)?;
                }
                write!(f, ";")?;
                if let Some(increment) = increment {
                    write!(f, " {}", increment)?;
                }
                write!(f, ") {}", body)
            }
            Statement::FunctionDeclaration(name, params, body) => {
                write!(f, "fun {name}(")?;
                for (i, param) in params.iter().enumerate() {
                    write!(f, "{param}")?;
                    if i != params.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, ") {body}")
            }
            Statement::Return(expr) => {
                if let Some(expr) = expr {
                    write!(f, "return {};", expr)
                } else {
                    write!(f, "return;")
                }
            }
        }
    }
}

impl Display for AssignTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignTarget::Variable(name) => write!(f, "{}", name),
            AssignTarget::Index(object, index) => write!(f, "{}[{}]", object, index),
            AssignTarget::Property(object, name) => write!(f, "{}.{}", object, name),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Binary(left, op, right) => write!(f, "({} {} {})", left, op, right),
            Expression::Unary(op, right) => write!(f, "({} {})", op, right),
            Expression::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    write!(f, "{}", arg)?;
                    if i != args.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, ")")
            }
            Expression::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    write!(f, "{}", element)?;
                    if i != elements.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Expression::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    write!(f, "{}: {}", key, value)?;
                    if i != entries.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
            Expression::Index(object, index) => write!(f, "{}[{}]", object, index),
            Expression::Property(object, name) => write!(f, "{}.{}", object, name),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfixOperator::Equal => write!(f, "=="),
            InfixOperator::NotEqual => write!(f, "!="),
            InfixOperator::LessThan => write!(f, "<"),
            InfixOperator::LessThanOrEqual => write!(f, "<="),
            InfixOperator::GreaterThan => write!(f, ">"),
            InfixOperator::GreaterThanOrEqual => write!(f, ">="),
            InfixOperator::Plus => write!(f, "+"),
            InfixOperator::Minus => write!(f, "-"),
            InfixOperator::Multiply => write!(f, "*"),
            InfixOperator::Divide => write!(f, "/"),
            InfixOperator::And => write!(f, "and"),
            InfixOperator::Or => write!(f, "or"),
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "not"),
        }
    }
}
