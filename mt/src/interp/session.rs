//! Evaluation sessions
//!
//! A session owns one root frame and one evaluator. Every top-level
//! statement is all-or-nothing: if it fails, the root frame is put back
//! exactly as it was before the statement started.

use super::builtins::Registry;
use super::env::{Binding, EnvRef, Environment};
use super::error::EvalResult;
use super::eval::{Flow, Interpreter};
use super::value::Value;
use crate::ast::{Expr, Program, Stmt};
use crate::config::Config;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One interactive evaluation context
pub struct Session {
    id: u64,
    root: EnvRef,
    interp: Interpreter,
}

impl Session {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::from_interpreter(Interpreter::new(registry))
    }

    pub fn with_config(registry: Arc<Registry>, config: &Config) -> Self {
        Self::from_interpreter(Interpreter::with_max_depth(
            registry,
            config.max_recursion_depth,
        ))
    }

    fn from_interpreter(interp: Interpreter) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, max_depth = interp.max_depth(), "session created");
        Session {
            id,
            root: Environment::new().into_ref(),
            interp,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run every statement of `program` in order, stopping at the first
    /// failure. Statements before the failing one keep their effects.
    /// Returns the value of the last statement that produced one.
    pub fn run(&mut self, program: &Program) -> EvalResult<Option<Value>> {
        let mut last = None;
        for stmt in &program.statements {
            if let Some(value) = self.exec_stmt(stmt)? {
                last = Some(value);
            }
        }
        Ok(last)
    }

    /// Execute a single top-level statement atomically
    pub fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Option<Value>> {
        self.root.borrow_mut().begin();
        match self.interp.exec(stmt, &self.root) {
            Ok(flow) => {
                self.root.borrow_mut().commit();
                match flow {
                    Flow::Normal(value) => Ok(value),
                    Flow::Return(value) => Ok(Some(value)),
                }
            }
            Err(err) => {
                self.root.borrow_mut().rollback();
                tracing::debug!(session = self.id, kind = err.kind(), %err, "statement failed");
                Err(err)
            }
        }
    }

    /// Evaluate a bare expression atomically
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.root.borrow_mut().begin();
        let result = self.interp.eval(expr, &self.root);
        match &result {
            Ok(_) => self.root.borrow_mut().commit(),
            Err(err) => {
                self.root.borrow_mut().rollback();
                tracing::debug!(session = self.id, kind = err.kind(), %err, "expression failed");
            }
        }
        result
    }

    /// Top-level binding of `name`
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.root.borrow().get(name)
    }

    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.root.borrow().get_value(name)
    }

    /// Sorted top-level names
    pub fn names(&self) -> Vec<String> {
        self.root.borrow().names()
    }

    /// Drop every top-level binding
    pub fn clear(&mut self) {
        self.root.borrow_mut().clear();
        tracing::debug!(session = self.id, "session cleared");
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.interp.registry()
    }

    pub fn root(&self) -> &EnvRef {
        &self.root
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!(session = self.id, "session dropped");
    }
}
