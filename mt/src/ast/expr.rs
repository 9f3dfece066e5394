//! Expression AST nodes

use super::{Block, Stmt};
use crate::interp::Value;
use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal (real or imaginary)
    Literal(Value),

    /// Variable reference
    Identifier(String),

    /// `lhs = rhs`, binds in the current frame
    Assignment { lhs: String, rhs: Box<Expr> },

    /// Binary operation
    BinaryOperator {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
    },

    /// Prefix operation
    UnaryOperator { op: UnOp, operand: Box<Expr> },

    /// Function call
    MethodCall { id: String, args: Vec<Expr> },

    /// Block: { stmt1; stmt2; ... }
    Block(Block),
}

impl Expr {
    pub fn real(x: f64) -> Self {
        Expr::Literal(Value::Real(x))
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Expr::Literal(Value::Complex(re, im))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn assign(lhs: impl Into<String>, rhs: Expr) -> Self {
        Expr::Assignment {
            lhs: lhs.into(),
            rhs: Box::new(rhs),
        }
    }

    pub fn binary(lhs: Expr, op: BinOp, rhs: Expr) -> Self {
        Expr::BinaryOperator {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnOp, operand: Expr) -> Self {
        Expr::UnaryOperator {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(id: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            id: id.into(),
            args,
        }
    }

    pub fn block(statements: Vec<Stmt>) -> Self {
        Expr::Block(Block::new(statements))
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Negation (-)
    Neg,
    /// Identity (+)
    Pos,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Pos => write!(f, "+"),
        }
    }
}
