pub mod scope;
pub mod value;

use std::{cell::RefCell, fmt::Debug, io::Write, rc::Rc};

use rustc_hash::FxHashMap;

use crate::ast::{
    AssignTarget, Expression, InfixOperator, Literal, Program, Statement, UnaryOperator,
};

use self::{
    scope::Scope,
    value::{Function, Value},
};

pub struct Interpreter {
    globals: Rc<RefCell<Scope>>,
    scope: Rc<RefCell<Scope>>,
    stdout: Rc<RefCell<dyn std::io::Write>>,
}

impl Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("scope", &self.scope)
            .finish()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Rc::new(RefCell::new(std::io::stdout())))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Error executing statement: {current_statement} - {kind}")]
    Execution {
        kind: RuntimeError,
        current_statement: Statement,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("Property not found: {0}")]
    PropertyNotFound(String),
    #[error("Function {name} called with {got} arguments, expected {expected}")]
    ArityMismatch {
        name: String,
        got: usize,
        expected: usize,
    },
    #[error("Not a function: {0}")]
    NotAFunction(String),
}

impl Interpreter {
    pub fn new(stdout: Rc<RefCell<dyn std::io::Write>>) -> Self {
        let globals = Scope::boxed(None);
        Self {
            scope: globals.clone(),
            globals,
            stdout,
        }
    }

    /// Pre-seeds a binding in the global frame, before or between
    /// `interpret` calls.
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.borrow_mut().define(name.to_string(), value);
    }

    /// Executes all top-level statements against the persistent global
    /// scope. The first failure aborts this invocation; the global scope
    /// keeps whatever bindings were established before the failure, so a
    /// caller may keep going with further programs (REPL style).
    pub fn interpret(&mut self, program: &Program) -> Result<(), ExecutionError> {
        for stmt in program.0.iter() {
            match self.execute(stmt) {
                Ok(None) => {}
                // a top-level `return` ends the run
                Ok(Some(_)) => break,
                Err(kind) => {
                    return Err(ExecutionError::Execution {
                        kind,
                        current_statement: stmt.clone(),
                    })
                }
            }
        }

        Ok(())
    }

    /// Executes one statement. `Some(value)` is the `return` signal on
    /// its way up to the nearest call boundary; `None` is normal
    /// completion.
    fn execute(&mut self, stmt: &Statement) -> Result<Option<Value>, RuntimeError> {
        let result = match stmt {
            Statement::Expression(expression) => {
                self.evaluate(expression)?;
                None
            }
            Statement::Print(expression) => {
                let value = self.evaluate(expression)?;
                writeln!(self.stdout.borrow_mut(), "{}", value)?;
                None
            }
            Statement::VarDeclaration(name, initializer) => {
                let value = match initializer {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                self.scope.borrow_mut().define(name.clone(), value);
                None
            }
            Statement::Assignment(target, expression) => {
                let value = self.evaluate(expression)?;
                match target {
                    AssignTarget::Variable(name) => {
                        let assigned = self.scope.borrow_mut().set(name, &value);
                        if assigned.is_none() {
                            return Err(RuntimeError::UndefinedVariable(name.clone()));
                        }
                    }
                    AssignTarget::Index(object, index) => {
                        let object = self.evaluate(object)?;
                        let index = self.evaluate(index)?;
                        match (object, index) {
                            (Value::Array(items), Value::Number(n)) => {
                                let index = n.trunc() as i64;
                                let mut items = items.borrow_mut();
                                if index < 0 || index as usize >= items.len() {
                                    return Err(RuntimeError::IndexOutOfBounds {
                                        index,
                                        len: items.len(),
                                    });
                                }
                                items[index as usize] = value;
                            }
                            (Value::Array(_), index) => {
                                return Err(RuntimeError::TypeMismatch(format!(
                                    "array index must be a number, got {}",
                                    index.type_name()
                                )))
                            }
                            (object, _) => {
                                return Err(RuntimeError::TypeMismatch(format!(
                                    "cannot index into {}",
                                    object.type_name()
                                )))
                            }
                        }
                    }
                    AssignTarget::Property(object, name) => {
                        let object = self.evaluate(object)?;
                        match object {
                            Value::Object(fields) => {
                                fields.borrow_mut().insert(name.clone(), value);
                            }
                            object => {
                                return Err(RuntimeError::TypeMismatch(format!(
                                    "cannot access properties of {}",
                                    object.type_name()
                                )))
                            }
                        }
                    }
                }
                None
            }
            Statement::Block(statements) => {
                self.execute_in_scope(Scope::boxed(Some(self.scope.clone())), |interpreter| {
                    for statement in statements.iter() {
                        let result = interpreter.execute(statement)?;
                        if result.is_some() {
                            return Ok(result);
                        }
                    }
                    Ok(None)
                })?
            }
            Statement::If(condition, then_block, else_block) => {
                if self.condition_boolean(condition)? {
                    self.execute(then_block)?
                } else if let Some(else_block) = else_block {
                    self.execute(else_block)?
                } else {
                    None
                }
            }
            Statement::While(condition, body) => {
                let mut res = None;
                while self.condition_boolean(condition)? {
                    res = self.execute(body)?;
                    if res.is_some() {
                        break;
                    }
                }
                res
            }
            Statement::For(initializer, condition, increment, body) => {
                // The initializer's frame encloses the whole loop, so the
                // loop variable spans iterations and vanishes afterwards.
                self.execute_in_scope(Scope::boxed(Some(self.scope.clone())), |interpreter| {
                    if let Some(initializer) = initializer {
                        interpreter.execute(initializer)?;
                    }
                    let mut res = None;
                    loop {
                        let keep_going = match condition {
                            Some(condition) => interpreter.condition_boolean(condition)?,
                            None => true,
                        };
                        if !keep_going {
                            break;
                        }
                        res = interpreter.execute(body)?;
                        if res.is_some() {
                            break;
                        }
                        if let Some(increment) = increment {
                            interpreter.execute(increment)?;
                        }
                    }
                    Ok(res)
                })?
            }
            Statement::FunctionDeclaration(name, params, body) => {
                let function = Function {
                    params: params.clone(),
                    body: body.as_ref().clone(),
                };
                self.scope
                    .borrow_mut()
                    .define(name.clone(), Value::Function(Rc::new(function)));
                None
            }
            Statement::Return(expression) => {
                let value = match expression {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                Some(value)
            }
        };

        Ok(result)
    }

    fn execute_in_scope<T>(
        &mut self,
        scope: Rc<RefCell<Scope>>,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let prev = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = prev;
        result
    }

    fn condition_boolean(&mut self, condition: &Expression) -> Result<bool, RuntimeError> {
        match self.evaluate(condition)? {
            Value::Boolean(b) => Ok(b),
            value => Err(RuntimeError::TypeMismatch(format!(
                "condition must be a boolean, got {}",
                value.type_name()
            ))),
        }
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        let res = match expression {
            Expression::Identifier(name) => self
                .scope
                .borrow()
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
            Expression::Literal(literal) => match literal {
                Literal::Number(n) => Ok(Value::Number(*n)),
                Literal::String(s) => Ok(Value::String(s.clone())),
                Literal::Boolean(b) => Ok(Value::Boolean(*b)),
                Literal::Null => Ok(Value::Nil),
            },
            Expression::Binary(left, op, right) => {
                // Both operands always evaluate, `and`/`or` included.
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                match op {
                    InfixOperator::Plus => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                        (a, b)
                            if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) =>
                        {
                            Ok(Value::String(format!("{}{}", a, b)))
                        }
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot add {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::Minus => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot subtract {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::Multiply => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot multiply {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::Divide => match (left, right) {
                        (Value::Number(_), Value::Number(b)) if b == 0.0 => {
                            Err(RuntimeError::DivisionByZero)
                        }
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot divide {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::Equal => {
                        Ok(Value::Boolean(left.to_string() == right.to_string()))
                    }
                    InfixOperator::NotEqual => {
                        Ok(Value::Boolean(left.to_string() != right.to_string()))
                    }
                    InfixOperator::LessThan => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a < b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot compare {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::LessThanOrEqual => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a <= b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot compare {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::GreaterThan => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a > b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot compare {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::GreaterThanOrEqual => match (left, right) {
                        (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a >= b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "cannot compare {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::And => match (left, right) {
                        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a && b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "'and' requires boolean operands, got {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                    InfixOperator::Or => match (left, right) {
                        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a || b)),
                        (a, b) => Err(RuntimeError::TypeMismatch(format!(
                            "'or' requires boolean operands, got {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))),
                    },
                }
            }
            Expression::Unary(op, operand) => {
                let operand = self.evaluate(operand)?;
                match op {
                    UnaryOperator::Negate => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        operand => Err(RuntimeError::TypeMismatch(format!(
                            "cannot negate {}",
                            operand.type_name()
                        ))),
                    },
                    UnaryOperator::Not => match operand {
                        Value::Boolean(b) => Ok(Value::Boolean(!b)),
                        operand => Err(RuntimeError::TypeMismatch(format!(
                            "'not' requires a boolean operand, got {}",
                            operand.type_name()
                        ))),
                    },
                }
            }
            Expression::Call(name, args) => {
                if name == "print" {
                    let mut parts = Vec::with_capacity(args.len());
                    for arg in args {
                        parts.push(self.evaluate(arg)?.to_string());
                    }
                    writeln!(self.stdout.borrow_mut(), "{}", parts.join(" "))?;
                    return Ok(Value::Nil);
                }

                let value = self
                    .scope
                    .borrow()
                    .get(name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))?;
                let Value::Function(function) = value else {
                    return Err(RuntimeError::NotAFunction(name.clone()));
                };

                if args.len() != function.params.len() {
                    return Err(RuntimeError::ArityMismatch {
                        name: name.clone(),
                        got: args.len(),
                        expected: function.params.len(),
                    });
                }

                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.evaluate(arg)?);
                }

                // The call frame hangs off the global frame: a body sees
                // its parameters and globals, nothing from the call site.
                let call_scope = Scope::boxed(Some(self.globals.clone()));
                for (param, argument) in function.params.iter().zip(arguments) {
                    call_scope.borrow_mut().define(param.clone(), argument);
                }

                let res = self
                    .execute_in_scope(call_scope, |interpreter| interpreter.execute(&function.body))?;
                Ok(res.unwrap_or(Value::Nil))
            }
            Expression::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(Value::array(items))
            }
            Expression::Object(entries) => {
                let mut fields = FxHashMap::default();
                for (key, expression) in entries {
                    fields.insert(key.clone(), self.evaluate(expression)?);
                }
                Ok(Value::object(fields))
            }
            Expression::Index(object, index) => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                match (object, index) {
                    (Value::Array(items), Value::Number(n)) => {
                        let index = n.trunc() as i64;
                        let items = items.borrow();
                        if index < 0 || index as usize >= items.len() {
                            Err(RuntimeError::IndexOutOfBounds {
                                index,
                                len: items.len(),
                            })
                        } else {
                            Ok(items[index as usize].clone())
                        }
                    }
                    (Value::Array(_), index) => Err(RuntimeError::TypeMismatch(format!(
                        "array index must be a number, got {}",
                        index.type_name()
                    ))),
                    (object, _) => Err(RuntimeError::TypeMismatch(format!(
                        "cannot index into {}",
                        object.type_name()
                    ))),
                }
            }
            Expression::Property(object, name) => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Object(fields) => fields
                        .borrow()
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::PropertyNotFound(name.clone())),
                    object => Err(RuntimeError::TypeMismatch(format!(
                        "cannot access properties of {}",
                        object.type_name()
                    ))),
                }
            }
        }?;

        Ok(res)
    }
}
