//! Tree-walking evaluator

use super::builtins::{Builtin, Registry};
use super::env::{child_env, Binding, EnvRef, Function};
use super::error::{EvalError, EvalResult};
use super::value::Value;
use crate::ast::{BinOp, Block, Expr, FunctionDecl, Stmt, UnOp};
use std::rc::Rc;
use std::sync::Arc;

/// Default limit on nested user-function calls
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Outcome of executing a statement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    /// Ran to completion, possibly producing a value
    Normal(Option<Value>),
    /// `ret` unwinding to the enclosing call
    Return(Value),
}

/// What a call site resolved to
enum Callee {
    User(Rc<Function>),
    Native(Builtin),
}

/// The interpreter
pub struct Interpreter {
    /// Frozen built-in table shared with other sessions
    registry: Arc<Registry>,
    /// Maximum nested user calls
    max_depth: usize,
    /// Current recursion depth
    depth: usize,
}

impl Interpreter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_max_depth(registry, DEFAULT_MAX_RECURSION_DEPTH)
    }

    pub fn with_max_depth(registry: Arc<Registry>, max_depth: usize) -> Self {
        Interpreter {
            registry,
            max_depth,
            depth: 0,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Current call nesting; zero between statements
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Evaluate an expression with automatic stack growth for deep nesting
    pub fn eval(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        match expr {
            Expr::Literal(v) => Ok(*v),

            Expr::Identifier(name) => {
                let binding = env.borrow().resolve(name)?;
                match binding {
                    Binding::Value(v) => Ok(v),
                    Binding::Function(_) => Err(EvalError::unsupported("read", "function")),
                }
            }

            Expr::Assignment { lhs, rhs } => {
                let value = self.eval(rhs, env)?;
                env.borrow_mut().define_value(lhs.clone(), value);
                Ok(value)
            }

            Expr::BinaryOperator { lhs, op, rhs } => {
                let l = self.eval(lhs, env)?;
                let r = self.eval(rhs, env)?;
                eval_binary(*op, l, r)
            }

            Expr::UnaryOperator { op, operand } => {
                let v = self.eval(operand, env)?;
                Ok(match op {
                    UnOp::Neg => v.negate(),
                    UnOp::Pos => v.identity(),
                })
            }

            Expr::MethodCall { id, args } => self.eval_call(id, args, env),

            Expr::Block(block) => match self.exec_block(block, env)? {
                Flow::Return(v) | Flow::Normal(Some(v)) => Ok(v),
                Flow::Normal(None) => Ok(Value::Real(0.0)),
            },
        }
    }

    /// Execute one statement in `env`
    pub fn exec(&mut self, stmt: &Stmt, env: &EnvRef) -> EvalResult<Flow> {
        match stmt {
            Stmt::VariableDeclaration { id, init } => {
                let value = match init {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Real(0.0),
                };
                env.borrow_mut().define_value(id.clone(), value);
                Ok(Flow::Normal(Some(value)))
            }

            // A statement-level block lets `ret` reach the enclosing call
            Stmt::ExpressionStatement(Expr::Block(block)) => self.exec_block(block, env),

            Stmt::ExpressionStatement(expr) => Ok(Flow::Normal(Some(self.eval(expr, env)?))),

            Stmt::FunctionDeclaration(decl) => {
                self.declare_function(decl, env);
                Ok(Flow::Normal(None))
            }

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Real(0.0),
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn declare_function(&mut self, decl: &FunctionDecl, env: &EnvRef) {
        tracing::trace!(name = %decl.id, arity = decl.params.len(), "declare function");
        let func = Function {
            name: decl.id.clone(),
            params: decl.params.clone(),
            body: decl.body.clone(),
            env: Rc::downgrade(env),
        };
        env.borrow_mut()
            .define(decl.id.clone(), Binding::Function(Rc::new(func)));
    }

    /// Run `block` in a fresh child frame of `env`
    pub fn exec_block(&mut self, block: &Block, env: &EnvRef) -> EvalResult<Flow> {
        let frame = child_env(env);
        self.run_statements(&block.statements, &frame)
    }

    /// Run statements in order. The result is the first `ret` hit, else the
    /// value of the last expression statement (zero if there was none).
    fn run_statements(&mut self, statements: &[Stmt], env: &EnvRef) -> EvalResult<Flow> {
        let mut last = Value::Real(0.0);
        for stmt in statements {
            match self.exec(stmt, env)? {
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Normal(Some(v)) if matches!(stmt, Stmt::ExpressionStatement(_)) => last = v,
                Flow::Normal(_) => {}
            }
        }
        Ok(Flow::Normal(Some(last)))
    }

    fn eval_call(&mut self, id: &str, args: &[Expr], env: &EnvRef) -> EvalResult<Value> {
        let found = env.borrow().get_function(id);
        let callee = match found {
            Some(func) => Callee::User(func),
            None => match self.registry.lookup(id) {
                Some(builtin) => Callee::Native(*builtin),
                None => return Err(EvalError::undefined_function(id)),
            },
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, env)?);
        }

        match callee {
            Callee::User(func) => self.call_function(&func, &values),
            Callee::Native(builtin) => {
                if builtin.arity != values.len() {
                    return Err(EvalError::arity_mismatch(id, builtin.arity, values.len()));
                }
                (builtin.func)(&values)
            }
        }
    }

    /// Call a user-defined function with automatic stack growth
    pub fn call_function(&mut self, func: &Function, args: &[Value]) -> EvalResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(func, args)
        })
    }

    fn call_function_inner(&mut self, func: &Function, args: &[Value]) -> EvalResult<Value> {
        // Check arity
        if func.arity() != args.len() {
            return Err(EvalError::arity_mismatch(&func.name, func.arity(), args.len()));
        }

        let defining = func
            .env
            .upgrade()
            .ok_or_else(|| EvalError::undefined_function(&func.name))?;

        // Check recursion depth
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            tracing::debug!(name = %func.name, limit = self.max_depth, "recursion limit hit");
            return Err(EvalError::RecursionLimitExceeded(self.max_depth));
        }
        tracing::trace!(name = %func.name, depth = self.depth, "call");

        // Call frame hangs off the defining frame (lexical scoping)
        let frame = child_env(&defining);
        for (param, arg) in func.params.iter().zip(args) {
            frame.borrow_mut().define_value(param.clone(), *arg);
        }

        let result = self.run_statements(&func.body.statements, &frame);
        self.depth -= 1;

        match result? {
            Flow::Return(v) | Flow::Normal(Some(v)) => Ok(v),
            Flow::Normal(None) => Ok(Value::Real(0.0)),
        }
    }
}

/// Apply a binary operator to two evaluated operands
pub fn eval_binary(op: BinOp, l: Value, r: Value) -> EvalResult<Value> {
    match op {
        BinOp::Add => Ok(l.add(r)),
        BinOp::Sub => Ok(l.sub(r)),
        BinOp::Mul => Ok(l.mul(r)),
        BinOp::Div => l.div(r),
        BinOp::Mod => l.rem(r),
        BinOp::Eq => Ok(Value::from_bool(l.equals(r))),
        BinOp::Ne => Ok(Value::from_bool(!l.equals(r))),
        BinOp::Lt => l.compare(r, "<", |a, b| a < b).map(Value::from_bool),
        BinOp::Gt => l.compare(r, ">", |a, b| a > b).map(Value::from_bool),
        BinOp::Le => l.compare(r, "<=", |a, b| a <= b).map(Value::from_bool),
        BinOp::Ge => l.compare(r, ">=", |a, b| a >= b).map(Value::from_bool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::builtins::RegistryBuilder;
    use crate::interp::env::Environment;

    fn setup() -> (Interpreter, EnvRef) {
        let interp = Interpreter::new(RegistryBuilder::with_core().freeze());
        (interp, Environment::new().into_ref())
    }

    fn run(interp: &mut Interpreter, env: &EnvRef, stmts: &[Stmt]) -> EvalResult<Value> {
        let mut last = Value::Real(0.0);
        for stmt in stmts {
            match interp.exec(stmt, env)? {
                Flow::Normal(Some(v)) | Flow::Return(v) => last = v,
                Flow::Normal(None) => {}
            }
        }
        Ok(last)
    }

    /// `F := (x) { ret x + 1 }`
    fn increment_fn() -> Stmt {
        Stmt::function(
            "F",
            &["x"],
            vec![Stmt::Return(Some(Expr::binary(
                Expr::ident("x"),
                BinOp::Add,
                Expr::real(1.0),
            )))],
        )
    }

    #[test]
    fn test_eval_literals() {
        let (mut interp, env) = setup();
        for x in [0.0, -3.5, 1e300, f64::MIN_POSITIVE] {
            assert_eq!(interp.eval(&Expr::real(x), &env).unwrap(), Value::Real(x));
        }
        assert_eq!(
            interp.eval(&Expr::complex(0.0, 3.0), &env).unwrap(),
            Value::Complex(0.0, 3.0)
        );
    }

    #[test]
    fn test_eval_binary() {
        let (mut interp, env) = setup();
        let e = Expr::binary(Expr::real(7.0), BinOp::Div, Expr::real(2.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(3.5));

        let e = Expr::binary(Expr::real(7.0), BinOp::Div, Expr::real(0.0));
        assert_eq!(interp.eval(&e, &env), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_promotion() {
        let (mut interp, env) = setup();
        let e = Expr::binary(Expr::real(2.0), BinOp::Add, Expr::complex(1.0, 3.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Complex(3.0, 3.0));
    }

    #[test]
    fn test_complex_ordering_unsupported() {
        let (mut interp, env) = setup();
        let e = Expr::binary(Expr::complex(1.0, 1.0), BinOp::Gt, Expr::complex(0.0, 0.0));
        assert!(matches!(
            interp.eval(&e, &env),
            Err(EvalError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_comparison_yields_real() {
        let (mut interp, env) = setup();
        let e = Expr::binary(Expr::real(1.0), BinOp::Lt, Expr::real(2.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(1.0));
        let e = Expr::binary(Expr::real(2.0), BinOp::Eq, Expr::complex(2.0, 0.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(1.0));
        let e = Expr::binary(Expr::real(2.0), BinOp::Ne, Expr::real(2.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(0.0));
    }

    #[test]
    fn test_unary() {
        let (mut interp, env) = setup();
        let e = Expr::unary(UnOp::Neg, Expr::complex(1.0, -2.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Complex(-1.0, 2.0));
        let e = Expr::unary(UnOp::Pos, Expr::real(4.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(4.0));
    }

    #[test]
    fn test_undefined_identifier() {
        let (mut interp, env) = setup();
        assert_eq!(
            interp.eval(&Expr::ident("z"), &env),
            Err(EvalError::UndefinedIdentifier("z".to_string()))
        );
    }

    #[test]
    fn test_declaration_without_init_is_zero() {
        let (mut interp, env) = setup();
        let stmt = Stmt::VariableDeclaration {
            id: "v".to_string(),
            init: None,
        };
        assert_eq!(interp.exec(&stmt, &env).unwrap(), Flow::Normal(Some(Value::Real(0.0))));
        assert_eq!(env.borrow().get_value("v"), Some(Value::Real(0.0)));
    }

    #[test]
    fn test_assignment_yields_value() {
        let (mut interp, env) = setup();
        let e = Expr::assign("a", Expr::real(5.0));
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(5.0));
        assert_eq!(env.borrow().get_value("a"), Some(Value::Real(5.0)));
    }

    #[test]
    fn test_call_pops_frame() {
        let (mut interp, env) = setup();
        let result = run(
            &mut interp,
            &env,
            &[increment_fn(), Stmt::expr(Expr::call("F", vec![Expr::real(5.0)]))],
        )
        .unwrap();
        assert_eq!(result, Value::Real(6.0));
        assert_eq!(env.borrow().get("x"), None);
        assert_eq!(interp.depth(), 0);
    }

    #[test]
    fn test_shadowing_in_block() {
        let (mut interp, env) = setup();
        let inner = Expr::block(vec![
            Stmt::declare("x", Expr::real(2.0)),
            Stmt::expr(Expr::ident("x")),
        ]);
        let stmts = [Stmt::declare("x", Expr::real(1.0)), Stmt::expr(inner)];
        assert_eq!(run(&mut interp, &env, &stmts).unwrap(), Value::Real(2.0));
        assert_eq!(interp.eval(&Expr::ident("x"), &env).unwrap(), Value::Real(1.0));
    }

    #[test]
    fn test_block_value_is_last_expression() {
        let (mut interp, env) = setup();
        let e = Expr::block(vec![
            Stmt::expr(Expr::real(1.0)),
            Stmt::expr(Expr::real(2.0)),
            Stmt::declare("q", Expr::real(9.0)),
        ]);
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(2.0));
        assert_eq!(interp.eval(&Expr::block(vec![]), &env).unwrap(), Value::Real(0.0));
    }

    #[test]
    fn test_ret_inside_nested_block_leaves_function() {
        let (mut interp, env) = setup();
        // G := (n) { { ret n * 2 }; 99 }
        let g = Stmt::function(
            "G",
            &["n"],
            vec![
                Stmt::expr(Expr::block(vec![Stmt::Return(Some(Expr::binary(
                    Expr::ident("n"),
                    BinOp::Mul,
                    Expr::real(2.0),
                )))])),
                Stmt::expr(Expr::real(99.0)),
            ],
        );
        let call = Stmt::expr(Expr::call("G", vec![Expr::real(4.0)]));
        assert_eq!(run(&mut interp, &env, &[g, call]).unwrap(), Value::Real(8.0));
    }

    #[test]
    fn test_function_without_ret_returns_last_expression() {
        let (mut interp, env) = setup();
        let h = Stmt::function(
            "H",
            &["a", "b"],
            vec![Stmt::expr(Expr::binary(Expr::ident("a"), BinOp::Sub, Expr::ident("b")))],
        );
        let call = Stmt::expr(Expr::call("H", vec![Expr::real(10.0), Expr::real(4.0)]));
        assert_eq!(run(&mut interp, &env, &[h, call]).unwrap(), Value::Real(6.0));
    }

    #[test]
    fn test_closure_sees_defining_scope() {
        let (mut interp, env) = setup();
        let stmts = [
            Stmt::declare("k", Expr::real(10.0)),
            Stmt::function(
                "addk",
                &["x"],
                vec![Stmt::Return(Some(Expr::binary(
                    Expr::ident("x"),
                    BinOp::Add,
                    Expr::ident("k"),
                )))],
            ),
            Stmt::expr(Expr::assign("k", Expr::real(20.0))),
            Stmt::expr(Expr::call("addk", vec![Expr::real(1.0)])),
        ];
        assert_eq!(run(&mut interp, &env, &stmts).unwrap(), Value::Real(21.0));
    }

    #[test]
    fn test_arity_mismatch() {
        let (mut interp, env) = setup();
        interp.exec(&increment_fn(), &env).unwrap();
        let e = Expr::call("F", vec![Expr::real(1.0), Expr::real(2.0)]);
        assert_eq!(
            interp.eval(&e, &env),
            Err(EvalError::arity_mismatch("F", 1, 2))
        );
        let e = Expr::call("sqrt", vec![]);
        assert_eq!(
            interp.eval(&e, &env),
            Err(EvalError::arity_mismatch("sqrt", 1, 0))
        );
    }

    #[test]
    fn test_undefined_function_skips_arguments() {
        let (mut interp, env) = setup();
        let e = Expr::call("nope", vec![Expr::assign("side", Expr::real(1.0))]);
        assert_eq!(
            interp.eval(&e, &env),
            Err(EvalError::UndefinedFunction("nope".to_string()))
        );
        assert_eq!(env.borrow().get("side"), None);
    }

    #[test]
    fn test_user_function_shadows_builtin() {
        let (mut interp, env) = setup();
        let sqrt = Stmt::function("sqrt", &["x"], vec![Stmt::Return(Some(Expr::real(42.0)))]);
        interp.exec(&sqrt, &env).unwrap();
        let e = Expr::call("sqrt", vec![Expr::real(4.0)]);
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(42.0));
    }

    #[test]
    fn test_value_shadowing_builtin_still_calls_builtin() {
        let (mut interp, env) = setup();
        interp.exec(&Stmt::declare("sqrt", Expr::real(1.0)), &env).unwrap();
        let e = Expr::call("sqrt", vec![Expr::real(9.0)]);
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(3.0));
    }

    #[test]
    fn test_local_value_does_not_hide_outer_function() {
        let (mut interp, env) = setup();
        let ident = Stmt::function("f", &["x"], vec![Stmt::Return(Some(Expr::ident("x")))]);
        interp.exec(&ident, &env).unwrap();
        let e = Expr::block(vec![
            Stmt::declare("f", Expr::real(1.0)),
            Stmt::expr(Expr::binary(
                Expr::call("f", vec![Expr::real(2.0)]),
                BinOp::Add,
                Expr::ident("f"),
            )),
        ]);
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(3.0));
    }

    #[test]
    fn test_function_read_as_value() {
        let (mut interp, env) = setup();
        interp.exec(&increment_fn(), &env).unwrap();
        assert_eq!(
            interp.eval(&Expr::ident("F"), &env),
            Err(EvalError::unsupported("read", "function"))
        );
    }

    #[test]
    fn test_recursion_limit() {
        let registry = RegistryBuilder::with_core().freeze();
        let mut interp = Interpreter::with_max_depth(registry, 50);
        let env = Environment::new().into_ref();
        let loop_fn = Stmt::function(
            "f",
            &["n"],
            vec![Stmt::Return(Some(Expr::call("f", vec![Expr::ident("n")])))],
        );
        interp.exec(&loop_fn, &env).unwrap();
        let e = Expr::call("f", vec![Expr::real(1.0)]);
        assert_eq!(interp.eval(&e, &env), Err(EvalError::RecursionLimitExceeded(50)));
        assert_eq!(interp.depth(), 0);
    }

    #[test]
    fn test_bounded_recursion() {
        let (mut interp, env) = setup();
        // No conditionals in the language, so nest through a chain c0..c199
        let chain = Stmt::function("c0", &[], vec![Stmt::expr(Expr::real(1.0))]);
        interp.exec(&chain, &env).unwrap();
        for i in 1..200 {
            let prev = format!("c{}", i - 1);
            let stmt = Stmt::function(
                format!("c{i}"),
                &[],
                vec![Stmt::expr(Expr::binary(
                    Expr::call(prev, vec![]),
                    BinOp::Add,
                    Expr::real(1.0),
                ))],
            );
            interp.exec(&stmt, &env).unwrap();
        }
        let e = Expr::call("c199", vec![]);
        assert_eq!(interp.eval(&e, &env).unwrap(), Value::Real(200.0));
    }

    #[test]
    fn test_top_level_return_is_value() {
        let (mut interp, env) = setup();
        let flow = interp.exec(&Stmt::Return(Some(Expr::real(3.0))), &env).unwrap();
        assert_eq!(flow, Flow::Return(Value::Real(3.0)));
        let flow = interp.exec(&Stmt::Return(None), &env).unwrap();
        assert_eq!(flow, Flow::Return(Value::Real(0.0)));
    }

    #[test]
    fn test_function_declaration_has_no_value() {
        let (mut interp, env) = setup();
        assert_eq!(interp.exec(&increment_fn(), &env).unwrap(), Flow::Normal(None));
    }
}
