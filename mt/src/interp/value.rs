//! Runtime values for the interpreter

use super::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value
///
/// Values are plain data: every operation returns a fresh `Value` and
/// nothing is ever updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Real scalar
    Real(f64),
    /// Complex number: (real part, imaginary part)
    Complex(f64, f64),
}

/// Operand pair after promotion
enum Promoted {
    Real(f64, f64),
    Complex((f64, f64), (f64, f64)),
}

impl Value {
    /// Comparison result encoding: 1 for true, 0 for false
    pub fn from_bool(b: bool) -> Self {
        Value::Real(if b { 1.0 } else { 0.0 })
    }

    /// Get kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Real(_) => "real",
            Value::Complex(_, _) => "complex",
        }
    }

    /// Try to get the real scalar
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(x) => Some(*x),
            Value::Complex(_, _) => None,
        }
    }

    /// Real part (a Real is its own real part)
    pub fn re(&self) -> f64 {
        match self {
            Value::Real(x) => *x,
            Value::Complex(re, _) => *re,
        }
    }

    /// Imaginary part (zero for a Real)
    pub fn im(&self) -> f64 {
        match self {
            Value::Real(_) => 0.0,
            Value::Complex(_, im) => *im,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.re() == 0.0 && self.im() == 0.0
    }

    /// |z|
    pub fn modulus(&self) -> f64 {
        match self {
            Value::Real(x) => x.abs(),
            Value::Complex(re, im) => re.hypot(*im),
        }
    }

    /// Phase angle in radians
    pub fn argument(&self) -> f64 {
        self.im().atan2(self.re())
    }

    pub fn conjugate(&self) -> Value {
        match self {
            Value::Real(x) => Value::Real(*x),
            Value::Complex(re, im) => Value::Complex(*re, -im),
        }
    }

    fn promote(self, rhs: Value) -> Promoted {
        match (self, rhs) {
            (Value::Real(a), Value::Real(b)) => Promoted::Real(a, b),
            (lhs, rhs) => Promoted::Complex((lhs.re(), lhs.im()), (rhs.re(), rhs.im())),
        }
    }

    pub fn add(self, rhs: Value) -> Value {
        match self.promote(rhs) {
            Promoted::Real(a, b) => Value::Real(a + b),
            Promoted::Complex((a, b), (c, d)) => Value::Complex(a + c, b + d),
        }
    }

    pub fn sub(self, rhs: Value) -> Value {
        match self.promote(rhs) {
            Promoted::Real(a, b) => Value::Real(a - b),
            Promoted::Complex((a, b), (c, d)) => Value::Complex(a - c, b - d),
        }
    }

    pub fn mul(self, rhs: Value) -> Value {
        match self.promote(rhs) {
            Promoted::Real(a, b) => Value::Real(a * b),
            Promoted::Complex((a, b), (c, d)) => Value::Complex(a * c - b * d, a * d + b * c),
        }
    }

    pub fn div(self, rhs: Value) -> EvalResult<Value> {
        match self.promote(rhs) {
            Promoted::Real(_, b) if b == 0.0 => Err(EvalError::DivisionByZero),
            Promoted::Real(a, b) => Ok(Value::Real(a / b)),
            Promoted::Complex(_, (c, d)) if c == 0.0 && d == 0.0 => Err(EvalError::DivisionByZero),
            // Smith's algorithm: scale by the larger divisor component
            Promoted::Complex((a, b), (c, d)) if c.abs() >= d.abs() => {
                let r = d / c;
                let denom = c + d * r;
                Ok(Value::Complex((a + b * r) / denom, (b - a * r) / denom))
            }
            Promoted::Complex((a, b), (c, d)) => {
                let r = c / d;
                let denom = c * r + d;
                Ok(Value::Complex((a * r + b) / denom, (b * r - a) / denom))
            }
        }
    }

    /// `mod`: defined for real scalars only
    pub fn rem(self, rhs: Value) -> EvalResult<Value> {
        match (self, rhs) {
            (Value::Real(_), Value::Real(b)) if b == 0.0 => Err(EvalError::DivisionByZero),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a % b)),
            _ => Err(EvalError::unsupported(
                "%",
                &format!("{} % {}", self.kind_name(), rhs.kind_name()),
            )),
        }
    }

    pub fn negate(self) -> Value {
        match self {
            Value::Real(x) => Value::Real(-x),
            Value::Complex(re, im) => Value::Complex(-re, -im),
        }
    }

    pub fn identity(self) -> Value {
        self
    }

    /// Exact component-wise equality after promotion
    pub fn equals(self, rhs: Value) -> bool {
        match self.promote(rhs) {
            Promoted::Real(a, b) => a == b,
            Promoted::Complex((a, b), (c, d)) => a == c && b == d,
        }
    }

    /// Order two values. Complex numbers have no total order.
    pub fn compare<F>(self, rhs: Value, op: &str, f: F) -> EvalResult<bool>
    where
        F: Fn(f64, f64) -> bool,
    {
        match (self, rhs) {
            (Value::Real(a), Value::Real(b)) => Ok(f(a, b)),
            _ => Err(EvalError::unsupported(
                op,
                &format!("{} {op} {}", self.kind_name(), rhs.kind_name()),
            )),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(x) => write!(f, "{x}"),
            Value::Complex(re, im) => write!(f, "{re} {im}i"),
        }
    }
}
