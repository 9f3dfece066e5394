//! Built-in function registry
//!
//! The registry is assembled with a [`RegistryBuilder`] while extension
//! packages load, then frozen into an immutable [`Registry`] shared by every
//! session through an `Arc`. Nothing can be registered after freezing, so
//! lookups need no synchronization.

use super::error::{EvalError, EvalResult};
use super::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Native implementation of a built-in
pub type NativeFn = fn(&[Value]) -> EvalResult<Value>;

/// A registered built-in
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub arity: usize,
    pub func: NativeFn,
}

/// Mutable registry used during the extension-load phase
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Builtin>,
}

impl RegistryBuilder {
    /// Empty builder with no built-ins at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated with the core math package
    pub fn with_core() -> Self {
        let mut builder = Self::new();
        for (name, arity, func) in CORE_BUILTINS {
            builder
                .entries
                .insert(name.to_string(), Builtin { arity: *arity, func: *func });
        }
        builder
    }

    /// Register a built-in. Names are unique for the life of the process.
    pub fn register(&mut self, name: &str, arity: usize, func: NativeFn) -> EvalResult<()> {
        if self.contains(name) {
            return Err(EvalError::duplicate_builtin(name));
        }
        tracing::trace!(name, arity, "registered builtin");
        self.entries.insert(name.to_string(), Builtin { arity, func });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End the registration phase
    pub fn freeze(self) -> Arc<Registry> {
        tracing::debug!(builtins = self.entries.len(), "registry frozen");
        Arc::new(Registry {
            entries: self.entries,
        })
    }
}

/// Frozen, read-only registry
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<String, Builtin>,
}

impl Registry {
    pub fn lookup(&self, name: &str) -> Option<&Builtin> {
        self.entries.get(name)
    }

    /// Sorted built-in names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

/// Install the process-wide registry. Fails (returning the registry back)
/// when one is already installed or [`global`] has already been consulted.
pub fn install(registry: Arc<Registry>) -> Result<(), Arc<Registry>> {
    GLOBAL.set(registry)
}

/// The process-wide registry; core built-ins only if none was installed
pub fn global() -> Arc<Registry> {
    Arc::clone(GLOBAL.get_or_init(|| RegistryBuilder::with_core().freeze()))
}

// ============ Core Package ============

const CORE_BUILTINS: &[(&str, usize, NativeFn)] = &[
    ("abs", 1, builtin_abs),
    ("sqrt", 1, builtin_sqrt),
    ("exp", 1, builtin_exp),
    ("ln", 1, builtin_ln),
    ("pow", 2, builtin_pow),
    ("floor", 1, builtin_floor),
    ("ceil", 1, builtin_ceil),
    ("min", 2, builtin_min),
    ("max", 2, builtin_max),
];

/// Fetch argument `index`, failing with an arity error if it is missing
pub fn arg(name: &str, args: &[Value], index: usize, arity: usize) -> EvalResult<Value> {
    args.get(index)
        .copied()
        .ok_or_else(|| EvalError::arity_mismatch(name, arity, args.len()))
}

/// Fetch a real argument; complex arguments are rejected
pub fn real_arg(name: &str, args: &[Value], index: usize, arity: usize) -> EvalResult<f64> {
    let value = arg(name, args, index, arity)?;
    value
        .as_real()
        .ok_or_else(|| EvalError::unsupported(name, value.kind_name()))
}

fn complex_exp(re: f64, im: f64) -> Value {
    let scale = re.exp();
    Value::Complex(scale * im.cos(), scale * im.sin())
}

fn complex_ln(z: Value) -> Value {
    Value::Complex(z.modulus().ln(), z.argument())
}

/// |z| for complex, absolute value for real
fn builtin_abs(args: &[Value]) -> EvalResult<Value> {
    let z = arg("abs", args, 0, 1)?;
    Ok(Value::Real(z.modulus()))
}

/// Principal square root; negative reals yield a purely imaginary result
fn builtin_sqrt(args: &[Value]) -> EvalResult<Value> {
    match arg("sqrt", args, 0, 1)? {
        Value::Real(x) if x >= 0.0 => Ok(Value::Real(x.sqrt())),
        Value::Real(x) => Ok(Value::Complex(0.0, (-x).sqrt())),
        z @ Value::Complex(re, im) => {
            let r = z.modulus();
            let real = ((r + re) / 2.0).sqrt();
            let imag = ((r - re) / 2.0).sqrt().copysign(im);
            Ok(Value::Complex(real, imag))
        }
    }
}

fn builtin_exp(args: &[Value]) -> EvalResult<Value> {
    match arg("exp", args, 0, 1)? {
        Value::Real(x) => Ok(Value::Real(x.exp())),
        Value::Complex(re, im) => Ok(complex_exp(re, im)),
    }
}

/// Natural logarithm; negative reals take the principal complex branch
fn builtin_ln(args: &[Value]) -> EvalResult<Value> {
    match arg("ln", args, 0, 1)? {
        Value::Real(x) if x >= 0.0 => Ok(Value::Real(x.ln())),
        z => Ok(complex_ln(z)),
    }
}

fn builtin_pow(args: &[Value]) -> EvalResult<Value> {
    let base = arg("pow", args, 0, 2)?;
    let exponent = arg("pow", args, 1, 2)?;
    match (base, exponent) {
        (Value::Real(b), Value::Real(e)) if b >= 0.0 || e.fract() == 0.0 => {
            Ok(Value::Real(b.powf(e)))
        }
        _ if base.is_zero() => {
            if exponent.is_zero() {
                Ok(Value::Real(1.0))
            } else {
                Ok(Value::Real(0.0))
            }
        }
        _ => {
            // base^e = exp(e * ln(base))
            let w = exponent.mul(complex_ln(base));
            Ok(complex_exp(w.re(), w.im()))
        }
    }
}

fn builtin_floor(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(real_arg("floor", args, 0, 1)?.floor()))
}

fn builtin_ceil(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(real_arg("ceil", args, 0, 1)?.ceil()))
}

fn builtin_min(args: &[Value]) -> EvalResult<Value> {
    let a = real_arg("min", args, 0, 2)?;
    let b = real_arg("min", args, 1, 2)?;
    Ok(Value::Real(a.min(b)))
}

fn builtin_max(args: &[Value]) -> EvalResult<Value> {
    let a = real_arg("max", args, 0, 2)?;
    let b = real_arg("max", args, 1, 2)?;
    Ok(Value::Real(a.max(b)))
}
