//! Interpreter for SML
//!
//! Values, scopes, the evaluator, the built-in registry, and the sessions
//! that tie them together.

pub mod builtins;
mod env;
mod error;
mod eval;
mod session;
mod value;

pub use builtins::{Builtin, NativeFn, Registry, RegistryBuilder};
pub use env::{child_env, Binding, EnvRef, Environment, Function, Journal};
pub use error::{EvalError, EvalResult};
pub use eval::{eval_binary, Flow, Interpreter, DEFAULT_MAX_RECURSION_DEPTH};
pub use session::Session;
pub use value::Value;
