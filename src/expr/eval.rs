//! Tree-walking evaluator bound to a field namespace.

use std::collections::BTreeMap;

use crate::error::{EvalError, RtResult};
use crate::value::{Function, Value};

use super::parser::{BinaryOp, Expr, LogicalOp, UnaryOp};

/// Field lookup capability an expression is evaluated against.
///
/// [`Scope`](crate::Scope) implements this with inherited reads and local
/// writes.
pub trait Namespace {
    /// Reads a field, `None` when no scope in the chain defines it.
    fn resolve(&self, name: &str) -> Option<Value>;

    /// Writes a field on the local namespace.
    fn assign(&self, name: &str, value: Value);

    /// Invokes a function value with this namespace as its context.
    fn call(&self, function: &Function, args: &[Value]) -> RtResult<Value>;
}

/// Evaluates a parsed expression.
pub fn evaluate<N: Namespace + ?Sized>(expr: &Expr, ns: &N) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(name) => ns
            .resolve(name)
            .ok_or_else(|| EvalError::UnknownReference(name.clone())),
        Expr::Array(items) => Ok(Value::Array(
            items.iter().map(|item| evaluate(item, ns)).collect::<Result<_, _>>()?,
        )),
        Expr::Object(entries) => Ok(Value::Object(
            entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), evaluate(item, ns)?)))
                .collect::<Result<BTreeMap<_, _>, EvalError>>()?,
        )),
        Expr::Member(target, name) => {
            let target = evaluate(target, ns)?;
            property(&target, &Value::String(name.clone()))
        }
        Expr::Index(target, index) => {
            let target = evaluate(target, ns)?;
            let index = evaluate(index, ns)?;
            property(&target, &index)
        }
        Expr::Call(callee, args) => {
            let function = evaluate(callee, ns)?;
            let Value::Function(function) = function else {
                return Err(EvalError::NotCallable(describe(callee)));
            };
            let args = args
                .iter()
                .map(|arg| evaluate(arg, ns))
                .collect::<Result<Vec<_>, _>>()?;
            ns.call(&function, &args)
                .map_err(|e| EvalError::Call(e.to_string()))
        }
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, ns)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Negate => Ok(Value::Number(-number(&value, "-")?)),
                UnaryOp::Plus => Ok(Value::Number(number(&value, "+")?)),
            }
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, ns)?;
            let right = evaluate(right, ns)?;
            binary(*op, &left, &right)
        }
        Expr::Logical(op, left, right) => {
            let left = evaluate(left, ns)?;
            match (op, left.is_truthy()) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                _ => evaluate(right, ns),
            }
        }
        Expr::Conditional(test, consequent, alternate) => {
            if evaluate(test, ns)?.is_truthy() {
                evaluate(consequent, ns)
            } else {
                evaluate(alternate, ns)
            }
        }
        Expr::Assign(name, value) => {
            let value = evaluate(value, ns)?;
            ns.assign(name, value.clone());
            Ok(value)
        }
    }
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member(target, name) => format!("{}.{}", describe(target), name),
        _ => "expression".to_string(),
    }
}

fn number(value: &Value, op: &str) -> Result<f64, EvalError> {
    value.as_f64().ok_or_else(|| {
        EvalError::Type(format!("operator {} expects a number, got {}", op, value.type_name()))
    })
}

fn property(target: &Value, key: &Value) -> Result<Value, EvalError> {
    match (target, key) {
        (Value::Undefined | Value::Null, _) => Err(EvalError::Type(format!(
            "cannot read property {} of {}",
            key,
            target.type_name()
        ))),
        (Value::Object(map), key) => Ok(map.get(&key.to_string()).cloned().unwrap_or_default()),
        (Value::Array(items), Value::String(name)) if name == "length" => {
            Ok(Value::Number(items.len() as f64))
        }
        (Value::Array(items), Value::Number(i)) => Ok(element(items, *i).cloned().unwrap_or_default()),
        (Value::String(s), Value::String(name)) if name == "length" => {
            Ok(Value::Number(s.chars().count() as f64))
        }
        (Value::String(s), Value::Number(i)) => Ok(index_usize(*i)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        _ => Ok(Value::Undefined),
    }
}

fn index_usize(i: f64) -> Option<usize> {
    (i >= 0.0 && i.fract() == 0.0).then_some(i as usize)
}

fn element(items: &[Value], i: f64) -> Option<&Value> {
    index_usize(i).and_then(|i| items.get(i))
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    use std::cmp::Ordering;

    let arithmetic = |symbol: &str, f: fn(f64, f64) -> f64| -> Result<Value, EvalError> {
        Ok(Value::Number(f(number(left, symbol)?, number(right, symbol)?)))
    };
    let compare = |accept: fn(Ordering) -> bool| -> Result<Value, EvalError> {
        let ordering = match (left, right) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                return Err(EvalError::Type(format!(
                    "cannot compare {} with {}",
                    left.type_name(),
                    right.type_name()
                )))
            }
        };
        Ok(Value::Bool(ordering.map_or(false, accept)))
    };

    match op {
        BinaryOp::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{}{}", left, right)))
            }
            _ => arithmetic("+", |a, b| a + b),
        },
        BinaryOp::Sub => arithmetic("-", |a, b| a - b),
        BinaryOp::Mul => arithmetic("*", |a, b| a * b),
        BinaryOp::Div => arithmetic("/", |a, b| a / b),
        BinaryOp::Rem => arithmetic("%", |a, b| a % b),
        BinaryOp::Lt => compare(|o| o == Ordering::Less),
        BinaryOp::Le => compare(|o| o != Ordering::Greater),
        BinaryOp::Gt => compare(|o| o == Ordering::Greater),
        BinaryOp::Ge => compare(|o| o != Ordering::Less),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use crate::scope::Scope;
    use std::cell::RefCell;

    /// Flat namespace without inheritance.
    #[derive(Default)]
    struct Fields(RefCell<BTreeMap<String, Value>>);

    impl Namespace for Fields {
        fn resolve(&self, name: &str) -> Option<Value> {
            self.0.borrow().get(name).cloned()
        }

        fn assign(&self, name: &str, value: Value) {
            self.0.borrow_mut().insert(name.to_string(), value);
        }

        fn call(&self, function: &Function, args: &[Value]) -> RtResult<Value> {
            function.call(&Scope::root(), args)
        }
    }

    fn eval(source: &str, ns: &Fields) -> Result<Value, EvalError> {
        evaluate(&parse(source)?, ns)
    }

    #[test]
    fn test_arithmetic_and_concatenation() {
        let ns = Fields::default();
        ns.assign("n", Value::from(4));
        assert_eq!(eval("n * 2 + 1", &ns).unwrap(), Value::from(9));
        assert_eq!(eval("7 % 4", &ns).unwrap(), Value::from(3));
        assert_eq!(eval("'n=' + n", &ns).unwrap(), Value::from("n=4"));
        assert_eq!(eval("-n", &ns).unwrap(), Value::from(-4));
    }

    #[test]
    fn test_logical_operators_return_operands() {
        let ns = Fields::default();
        ns.assign("name", Value::from(""));
        assert_eq!(eval("name || 'anon'", &ns).unwrap(), Value::from("anon"));
        assert_eq!(eval("0 && missing", &ns).unwrap(), Value::from(0));
        assert_eq!(eval("!name ? 'empty' : name", &ns).unwrap(), Value::from("empty"));
    }

    #[test]
    fn test_member_and_index_access() {
        let ns = Fields::default();
        ns.assign(
            "user",
            Value::object([("tags", Value::from(vec![Value::from("a"), Value::from("b")]))]),
        );
        assert_eq!(eval("user.tags[1]", &ns).unwrap(), Value::from("b"));
        assert_eq!(eval("user.tags.length", &ns).unwrap(), Value::from(2));
        assert_eq!(eval("user.missing", &ns).unwrap(), Value::Undefined);
        assert!(matches!(eval("user.missing.deeper", &ns), Err(EvalError::Type(_))));
    }

    #[test]
    fn test_equality_is_structural_without_coercion() {
        let ns = Fields::default();
        assert_eq!(eval("[1, 2] == [1, 2]", &ns).unwrap(), Value::Bool(true));
        assert_eq!(eval("1 == '1'", &ns).unwrap(), Value::Bool(false));
        assert_eq!(eval("null !== undefined", &ns).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_failures_are_typed() {
        let ns = Fields::default();
        ns.assign("n", Value::from(1));
        assert_eq!(
            eval("nope + 1", &ns).unwrap_err(),
            EvalError::UnknownReference("nope".into())
        );
        assert_eq!(eval("n()", &ns).unwrap_err(), EvalError::NotCallable("n".into()));
        assert!(matches!(eval("n - 'x'", &ns), Err(EvalError::Type(_))));
        assert!(matches!(eval("n < 'x'", &ns), Err(EvalError::Type(_))));
    }

    #[test]
    fn test_assignment_writes_namespace() {
        let ns = Fields::default();
        assert_eq!(eval("total = 2 + 3", &ns).unwrap(), Value::from(5));
        assert_eq!(ns.resolve("total"), Some(Value::from(5)));
    }
}
