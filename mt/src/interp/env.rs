//! Environment for variable and function bindings
//!
//! A scope is a chain of frames. Lookups walk from the innermost frame
//! outwards; bindings always go into the frame they are made in.

use super::error::{EvalError, EvalResult};
use super::Value;
use crate::ast::Block;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// User-defined function (closure)
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    /// Frame the function was declared in. The function binding lives in
    /// this frame (or one of its children), so it outlives every call.
    pub env: Weak<RefCell<Environment>>,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// What an identifier is bound to
#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Function(Rc<Function>),
}

impl Binding {
    pub fn as_value(&self) -> Option<Value> {
        match self {
            Binding::Value(v) => Some(*v),
            Binding::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match self {
            Binding::Value(_) => None,
            Binding::Function(f) => Some(f),
        }
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Binding::Value(a), Binding::Value(b)) => a == b,
            (Binding::Function(a), Binding::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Previous bindings of the names written while journaling, oldest first
pub type Journal = Vec<(String, Option<Binding>)>;

/// One frame of bindings
#[derive(Debug, Clone)]
pub struct Environment {
    /// Bindings in this frame
    bindings: HashMap<String, Binding>,
    /// Enclosing frame for lexical lookup
    parent: Option<EnvRef>,
    /// Undo log, active between `begin` and `commit`/`rollback`
    journal: Option<Journal>,
}

impl Environment {
    /// Create a new root environment
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
            journal: None,
        }
    }

    /// Create a new environment with a parent
    pub fn with_parent(parent: EnvRef) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
            journal: None,
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind a name in this frame; last write wins
    pub fn define(&mut self, name: String, binding: Binding) {
        match &mut self.journal {
            Some(journal) => {
                let previous = self.bindings.insert(name.clone(), binding);
                journal.push((name, previous));
            }
            None => {
                self.bindings.insert(name, binding);
            }
        }
    }

    pub fn define_value(&mut self, name: String, value: Value) {
        self.define(name, Binding::Value(value));
    }

    /// Look up a binding in the scope chain
    pub fn get(&self, name: &str) -> Option<Binding> {
        if let Some(binding) = self.bindings.get(name) {
            Some(binding.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    /// Like [`Environment::get`], failing with `UndefinedIdentifier`
    pub fn resolve(&self, name: &str) -> EvalResult<Binding> {
        self.get(name)
            .ok_or_else(|| EvalError::undefined_identifier(name))
    }

    /// Look up a plain value; a function binding yields None
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(|b| b.as_value())
    }

    /// Nearest function bound to `name`, skipping values that shadow it
    pub fn get_function(&self, name: &str) -> Option<Rc<Function>> {
        match self.bindings.get(name).and_then(Binding::as_function) {
            Some(func) => Some(Rc::clone(func)),
            None => self.parent.as_ref()?.borrow().get_function(name),
        }
    }

    /// Sorted names bound in this frame
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    /// Start recording every write to this frame
    pub fn begin(&mut self) {
        self.journal = Some(Journal::new());
    }

    /// Keep the writes made since `begin`
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Undo the writes made since `begin`, newest first
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for (name, previous) in journal.into_iter().rev() {
            match previous {
                Some(binding) => {
                    self.bindings.insert(name, binding);
                }
                None => {
                    self.bindings.remove(&name);
                }
            }
        }
    }

    /// Drop every binding of this frame
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.journal = None;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Push a child frame onto `parent`. The frame is released when the
/// returned reference (and any closure frames below it) are dropped.
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}
