//! Abstract Syntax Tree definitions
//!
//! Trees are built bottom-up by the parser and handed to the evaluator
//! finished. Nothing here has behavior beyond construction.

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// One submitted unit of input: the top-level statements of a line or file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

/// Ordered statement list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `id := init`; without an initializer the variable is bound to 0
    VariableDeclaration { id: String, init: Option<Expr> },

    /// An expression evaluated for its value
    ExpressionStatement(Expr),

    /// `id := (params) { body }`
    FunctionDeclaration(FunctionDecl),

    /// `ret expr`
    Return(Option<Expr>),
}

impl Stmt {
    pub fn declare(id: impl Into<String>, init: Expr) -> Self {
        Stmt::VariableDeclaration {
            id: id.into(),
            init: Some(init),
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::ExpressionStatement(expr)
    }

    pub fn function(id: impl Into<String>, params: &[&str], body: Vec<Stmt>) -> Self {
        Stmt::FunctionDeclaration(FunctionDecl {
            id: id.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Block::new(body),
        })
    }
}

/// Function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: String,
    pub params: Vec<String>,
    pub body: Block,
}
