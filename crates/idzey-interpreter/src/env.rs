//! Environments: chained name-to-value scopes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use idzey_syntax::error::{error, Result};

use crate::value::Value;

/// Shared handle to an environment; function values and the evaluator hold
/// these, so a scope lives as long as anything that can still reach it.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope in the chain. Lookup walks outward; the innermost binding
/// shadows outer ones.
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            enclosing: None,
        }))
    }

    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(parent)),
        }))
    }

    /// Bind in this scope, shadowing any outer binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(parent) => parent.borrow().get(name),
            None => error(format!("Undefined variable '{}'", name)),
        }
    }

    /// Update the binding in the nearest scope that has one.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => error(format!("Undefined variable '{}'", name)),
        }
    }
}
