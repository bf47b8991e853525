use std::{cell::RefCell, collections::HashMap, fmt::Debug, rc::Rc};

use super::value::Value;

/// One frame of the scope chain: bindings for this frame plus a link to
/// the enclosing frame. Frames are never re-parented.
#[derive(Clone)]
pub struct Scope {
    variables: HashMap<String, Value>,
    parent: Option<Rc<RefCell<Scope>>>,
}

impl Scope {
    pub fn boxed(parent: Option<Rc<RefCell<Scope>>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(parent)))
    }

    pub fn new(parent: Option<Rc<RefCell<Scope>>>) -> Self {
        Self {
            variables: HashMap::new(),
            parent,
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding of the
    /// same name and overwriting a same-frame one.
    pub fn define(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.variables.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    /// Mutates the nearest enclosing binding of `name`. Unlike `define`
    /// this never creates a binding; `None` means the name is unbound
    /// through the whole chain.
    pub fn set(&mut self, name: &str, value: &Value) -> Option<Value> {
        if let Some(bound) = self.variables.get_mut(name) {
            *bound = value.clone();
            Some(bound.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().set(name, value)
        } else {
            None
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.variables.contains_key(name)
            || self
                .parent
                .as_ref()
                .map_or(false, |p| p.borrow().exists(name))
    }
}

impl Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(format!("Scope<{:?}>", std::ptr::from_ref(self)).as_str())
            .field(
                "variables",
                &self
                    .variables
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect::<Vec<_>>(),
            )
            .field("parent", &self.parent.as_ref().map(|p| p.as_ptr()))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let mut scope = Scope::new(None);
        scope.define("x".to_string(), Value::Number(1.0));
        assert!(matches!(scope.get("x"), Some(Value::Number(n)) if n == 1.0));
        assert!(scope.get("y").is_none());
    }

    #[test]
    fn test_get_walks_chain() {
        let global = Scope::boxed(None);
        global
            .borrow_mut()
            .define("x".to_string(), Value::Number(1.0));
        let inner = Scope::boxed(Some(global));
        assert!(matches!(
            inner.borrow().get("x"),
            Some(Value::Number(n)) if n == 1.0
        ));
    }

    #[test]
    fn test_define_shadows_outer_binding() {
        let global = Scope::boxed(None);
        global
            .borrow_mut()
            .define("x".to_string(), Value::Number(1.0));
        let inner = Scope::boxed(Some(global.clone()));
        inner
            .borrow_mut()
            .define("x".to_string(), Value::Number(2.0));
        assert!(matches!(
            inner.borrow().get("x"),
            Some(Value::Number(n)) if n == 2.0
        ));
        assert!(matches!(
            global.borrow().get("x"),
            Some(Value::Number(n)) if n == 1.0
        ));
    }

    #[test]
    fn test_set_mutates_nearest_binding() {
        let global = Scope::boxed(None);
        global
            .borrow_mut()
            .define("x".to_string(), Value::Number(1.0));
        let inner = Scope::boxed(Some(global.clone()));
        assert!(inner.borrow_mut().set("x", &Value::Number(5.0)).is_some());
        assert!(matches!(
            global.borrow().get("x"),
            Some(Value::Number(n)) if n == 5.0
        ));
    }

    #[test]
    fn test_set_unbound_name_fails() {
        let mut scope = Scope::new(None);
        assert!(scope.set("missing", &Value::Nil).is_none());
    }

    #[test]
    fn test_exists() {
        let global = Scope::boxed(None);
        global.borrow_mut().define("x".to_string(), Value::Nil);
        let inner = Scope::boxed(Some(global));
        assert!(inner.borrow().exists("x"));
        assert!(!inner.borrow().exists("y"));
    }
}
