use std::{cell::RefCell, fmt::Display, rc::Rc};

use rustc_hash::FxHashMap;

use crate::ast::Statement;

/// A runtime value. Arrays and objects are handles onto shared backing
/// storage, so copying a `Value` copies the handle and mutation through
/// one alias is visible through all of them.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<FxHashMap<String, Value>>>),
    Function(Rc<Function>),
}

/// A user-declared function: parameter names plus its own copy of the
/// declaration's body block.
#[derive(Debug)]
pub struct Function {
    pub params: Vec<String>,
    pub body: Statement,
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(fields: FxHashMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(fields)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Nil => "null",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "null"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_string_is_total() {
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::String("hi".to_string()).to_string(), "hi");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Nil.to_string(), "null");
        assert_eq!(
            Value::array(vec![Value::Number(1.0), Value::String("a".to_string())]).to_string(),
            "[1, a]"
        );
        let mut fields = FxHashMap::default();
        fields.insert("a".to_string(), Value::Number(1.0));
        assert_eq!(Value::object(fields).to_string(), "{a: 1}");
    }

    #[test]
    fn test_clone_shares_array_storage() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = a.clone();
        if let Value::Array(items) = &b {
            items.borrow_mut()[0] = Value::Number(9.0);
        }
        assert_eq!(a.to_string(), "[9]");
    }
}
