//! Expression language for watchers, bindings and event handlers.
//!
//! A small, explicit evaluator: literals, member/index access, calls,
//! arithmetic, comparison, logical operators, the conditional operator and
//! assignment to a scope field. Expressions are compiled once into an
//! [`Expression`]; a syntax error is kept and reported when the expression is
//! evaluated, so malformed bindings behave like any other evaluation failure.

use std::fmt;
use std::rc::Rc;

use crate::error::{EvalError, RtResult};
use crate::scope::Scope;
use crate::value::Value;

mod eval;
mod lexer;
mod parser;

pub use eval::{evaluate, Namespace};
pub use parser::{parse, BinaryOp, Expr, LogicalOp, UnaryOp};

/// Signature of a Rust closure used as a watch expression.
pub type ExprFn = dyn Fn(&Scope) -> RtResult<Value>;

/// Expression source together with its parse outcome.
#[derive(Debug)]
pub struct CompiledExpression {
    text: String,
    parsed: Result<Expr, EvalError>,
}

impl CompiledExpression {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> Result<&Expr, &EvalError> {
        self.parsed.as_ref()
    }
}

/// Something a scope can evaluate: compiled source text or a Rust closure.
///
/// # Examples
///
/// ```rust
/// use nglite::{Expression, Scope, Value};
///
/// let scope = Scope::root();
/// scope.set("price", 3);
///
/// let text: Expression = "price * 2".into();
/// let closure = Expression::callable(|s| Ok(Value::from(s.get("price").as_f64().unwrap_or(0.0) * 2.0)));
///
/// assert_eq!(scope.eval(&text).unwrap(), Value::from(6));
/// assert_eq!(scope.eval(&closure).unwrap(), Value::from(6));
/// ```
#[derive(Clone)]
pub enum Expression {
    Source(Rc<CompiledExpression>),
    Callable(Rc<ExprFn>),
}

impl Expression {
    /// Compiles source text. Never fails; syntax errors surface on evaluation.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let parsed = parse(&text);
        Expression::Source(Rc::new(CompiledExpression { text, parsed }))
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Scope) -> RtResult<Value> + 'static,
    {
        Expression::Callable(Rc::new(f))
    }

    /// Source text, or `<callable>` for closures.
    pub fn text(&self) -> &str {
        match self {
            Expression::Source(compiled) => compiled.text(),
            Expression::Callable(_) => "<callable>",
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Source(compiled) => f.debug_tuple("Source").field(&compiled.text).finish(),
            Expression::Callable(_) => f.write_str("Callable"),
        }
    }
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        Expression::parse(text)
    }
}

impl From<String> for Expression {
    fn from(text: String) -> Self {
        Expression::parse(text)
    }
}

impl From<&String> for Expression {
    fn from(text: &String) -> Self {
        Expression::parse(text.as_str())
    }
}

impl From<&Expression> for Expression {
    fn from(expr: &Expression) -> Self {
        expr.clone()
    }
}
