//! Compiled-in extension packages

use super::Extension;
use crate::interp::builtins::{arg, real_arg};
use crate::interp::{EvalResult, RegistryBuilder, Value};

/// Trigonometry: `sin cos tan asin acos atan pi`
pub struct Trig;

impl Extension for Trig {
    fn name(&self) -> &'static str {
        "trig"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> EvalResult<()> {
        registry.register("sin", 1, sin)?;
        registry.register("cos", 1, cos)?;
        registry.register("tan", 1, tan)?;
        registry.register("asin", 1, asin)?;
        registry.register("acos", 1, acos)?;
        registry.register("atan", 1, atan)?;
        registry.register("pi", 0, pi)?;
        Ok(())
    }
}

fn sin(args: &[Value]) -> EvalResult<Value> {
    match arg("sin", args, 0, 1)? {
        Value::Real(x) => Ok(Value::Real(x.sin())),
        Value::Complex(a, b) => Ok(Value::Complex(a.sin() * b.cosh(), a.cos() * b.sinh())),
    }
}

fn cos(args: &[Value]) -> EvalResult<Value> {
    match arg("cos", args, 0, 1)? {
        Value::Real(x) => Ok(Value::Real(x.cos())),
        Value::Complex(a, b) => Ok(Value::Complex(a.cos() * b.cosh(), -a.sin() * b.sinh())),
    }
}

fn tan(args: &[Value]) -> EvalResult<Value> {
    match arg("tan", args, 0, 1)? {
        Value::Real(x) => Ok(Value::Real(x.tan())),
        z => sin(&[z])?.div(cos(&[z])?),
    }
}

fn asin(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(real_arg("asin", args, 0, 1)?.asin()))
}

fn acos(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(real_arg("acos", args, 0, 1)?.acos()))
}

fn atan(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(real_arg("atan", args, 0, 1)?.atan()))
}

fn pi(_args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(std::f64::consts::PI))
}

/// Complex helpers: `re im conj arg polar`
pub struct Complex;

impl Extension for Complex {
    fn name(&self) -> &'static str {
        "complex"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> EvalResult<()> {
        registry.register("re", 1, re)?;
        registry.register("im", 1, im)?;
        registry.register("conj", 1, conj)?;
        registry.register("arg", 1, argument)?;
        registry.register("polar", 2, polar)?;
        Ok(())
    }
}

fn re(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(arg("re", args, 0, 1)?.re()))
}

fn im(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(arg("im", args, 0, 1)?.im()))
}

fn conj(args: &[Value]) -> EvalResult<Value> {
    Ok(arg("conj", args, 0, 1)?.conjugate())
}

fn argument(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Real(arg("arg", args, 0, 1)?.argument()))
}

/// `polar(r, theta)` = r(cos theta + i sin theta)
fn polar(args: &[Value]) -> EvalResult<Value> {
    let r = real_arg("polar", args, 0, 2)?;
    let theta = real_arg("polar", args, 1, 2)?;
    Ok(Value::Complex(r * theta.cos(), r * theta.sin()))
}
