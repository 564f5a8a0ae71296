//! Parser producing the expression AST.
//!
//! Precedence, lowest first: assignment, conditional, `||`, `&&`, equality,
//! relational, additive, multiplicative, unary, postfix (member, index, call).
//!
//! Every node carries its height while it is built. A sub-expression taller
//! than [`MAX_DEPTH`] is replaced by a syntax error on the spot, so neither the
//! evaluator nor `Drop` ever walks an unbounded chain such as `1 + 1 + ...`.

use chumsky::{input::ValueInput, pratt::*, prelude::*};

use crate::error::EvalError;
use crate::value::Value;

use super::lexer::{lexer, Span, Token};

/// Height limit for the AST and nesting limit for brackets, unary operators
/// and right-associative chains.
pub(crate) const MAX_DEPTH: usize = 128;

const TOO_DEEP: &str = "expression nested too deeply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Assign(String, Box<Expr>),
}

/// Parses expression source. Blank source parses to `undefined`.
///
/// # Examples
///
/// ```rust
/// use nglite::expr::{parse, Expr, BinaryOp};
///
/// let ast = parse("count + 1").unwrap();
/// assert!(matches!(ast, Expr::Binary(BinaryOp::Add, _, _)));
/// assert!(parse("count +").is_err());
/// ```
pub fn parse(source: &str) -> Result<Expr, EvalError> {
    let tokens = lexer()
        .parse(source)
        .into_result()
        .map_err(first_error)?;
    if tokens.is_empty() {
        return Ok(Expr::Literal(Value::Undefined));
    }
    check_nesting(&tokens)?;

    let eoi = Span::from(source.len()..source.len());
    let input = tokens.as_slice().map(eoi, |(token, span)| (token, span));
    let node = expression().parse(input).into_result().map_err(first_error)?;
    node.map(|(expr, _)| expr)
}

fn first_error<T: std::fmt::Display>(errors: Vec<Rich<'_, T, Span>>) -> EvalError {
    errors
        .into_iter()
        .next()
        .map(|error| EvalError::syntax(error.span().start, error.to_string()))
        .unwrap_or_else(|| EvalError::syntax(0, "invalid expression"))
}

/// Rejects input whose parse would recurse past [`MAX_DEPTH`]: open brackets,
/// runs of prefix operators and right-associative `=` / `?` chains.
fn check_nesting(tokens: &[(Token, Span)]) -> Result<(), EvalError> {
    // One chain counter per open bracket; `,` starts a new element.
    let mut chains: Vec<usize> = vec![0];
    let mut prefix_run = 0;
    for (token, span) in tokens {
        match token {
            Token::Punct("(" | "[" | "{") => chains.push(0),
            Token::Punct(")" | "]" | "}") if chains.len() > 1 => {
                chains.pop();
            }
            Token::Punct(",") => {
                if let Some(chain) = chains.last_mut() {
                    *chain = 0;
                }
            }
            Token::Punct("=" | "?") => {
                if let Some(chain) = chains.last_mut() {
                    *chain += 1;
                }
            }
            _ => {}
        }
        prefix_run = match token {
            Token::Punct("!" | "-" | "+") => prefix_run + 1,
            _ => 0,
        };
        let depth = chains.len() - 1 + chains.iter().sum::<usize>() + prefix_run;
        if depth > MAX_DEPTH {
            return Err(EvalError::syntax(span.start, TOO_DEEP));
        }
    }
    Ok(())
}

/// A sub-expression and its height, or the error that replaced it.
type Node = Result<(Expr, usize), EvalError>;

type ParseExtra<'src> = extra::Err<Rich<'src, Token, Span>>;

enum Suffix {
    Member(String),
    Index(Node),
    Call(Vec<Node>),
}

fn grow(height: usize, span: Span, expr: Expr) -> Node {
    if height > MAX_DEPTH {
        Err(EvalError::syntax(span.start, TOO_DEEP))
    } else {
        Ok((expr, height))
    }
}

fn leaf(expr: Expr) -> Node {
    Ok((expr, 1))
}

fn children(nodes: Vec<Node>) -> Result<(Vec<Expr>, usize), EvalError> {
    let mut height = 0;
    let mut exprs = Vec::with_capacity(nodes.len());
    for node in nodes {
        let (expr, h) = node?;
        height = height.max(h);
        exprs.push(expr);
    }
    Ok((exprs, height))
}

fn unary(op: UnaryOp, operand: Node, span: Span) -> Node {
    let (operand, h) = operand?;
    grow(h + 1, span, Expr::Unary(op, Box::new(operand)))
}

fn binary(op: BinaryOp, left: Node, right: Node, span: Span) -> Node {
    let (left, lh) = left?;
    let (right, rh) = right?;
    grow(lh.max(rh) + 1, span, Expr::Binary(op, Box::new(left), Box::new(right)))
}

fn logical(op: LogicalOp, left: Node, right: Node, span: Span) -> Node {
    let (left, lh) = left?;
    let (right, rh) = right?;
    grow(lh.max(rh) + 1, span, Expr::Logical(op, Box::new(left), Box::new(right)))
}

fn conditional(test: Node, consequent: Node, alternate: Node, span: Span) -> Node {
    let (test, th) = test?;
    let (consequent, ch) = consequent?;
    let (alternate, ah) = alternate?;
    grow(
        th.max(ch).max(ah) + 1,
        span,
        Expr::Conditional(Box::new(test), Box::new(consequent), Box::new(alternate)),
    )
}

fn assign(target: Node, value: Node, span: Span) -> Node {
    let (target, _) = target?;
    let (value, h) = value?;
    let Expr::Ident(name) = target else {
        return Err(EvalError::InvalidAssignment);
    };
    grow(h + 1, span, Expr::Assign(name, Box::new(value)))
}

fn suffix(target: Node, suffix: Suffix, span: Span) -> Node {
    let (target, th) = target?;
    let target = Box::new(target);
    match suffix {
        Suffix::Member(name) => grow(th + 1, span, Expr::Member(target, name)),
        Suffix::Index(index) => {
            let (index, ih) = index?;
            grow(th.max(ih) + 1, span, Expr::Index(target, Box::new(index)))
        }
        Suffix::Call(args) => {
            let (args, ah) = children(args)?;
            grow(th.max(ah) + 1, span, Expr::Call(target, args))
        }
    }
}

fn keyword_or_ident(name: String) -> Expr {
    match name.as_str() {
        "true" => Expr::Literal(Value::Bool(true)),
        "false" => Expr::Literal(Value::Bool(false)),
        "null" => Expr::Literal(Value::Null),
        "undefined" => Expr::Literal(Value::Undefined),
        _ => Expr::Ident(name),
    }
}

fn punct<'src, I>(punct: &'static str) -> impl Parser<'src, I, Token, ParseExtra<'src>> + Clone
where
    I: ValueInput<'src, Token = Token, Span = Span>,
{
    just(Token::Punct(punct))
}

fn expression<'src, I>() -> impl Parser<'src, I, Node, ParseExtra<'src>>
where
    I: ValueInput<'src, Token = Token, Span = Span>,
{
    recursive(|expression| {
        let list = |open: &'static str, close: &'static str| {
            expression
                .clone()
                .separated_by(punct(","))
                .collect::<Vec<Node>>()
                .delimited_by(punct(open), punct(close))
        };

        let literal = select! {
            Token::Number(number) => Expr::Literal(Value::Number(number)),
            Token::Str(text) => Expr::Literal(Value::String(text)),
            Token::Ident(name) => keyword_or_ident(name),
        }
        .map(leaf);

        let array = list("[", "]").map_with(|items, extra| {
            let (items, h) = children(items)?;
            grow(h + 1, extra.span(), Expr::Array(items))
        });

        let key = select! {
            Token::Ident(name) => name,
            Token::Str(text) => text,
            Token::Number(number) => Value::Number(number).to_string(),
        };
        let object = key
            .then_ignore(punct(":"))
            .then(expression.clone())
            .separated_by(punct(","))
            .collect::<Vec<(String, Node)>>()
            .delimited_by(punct("{"), punct("}"))
            .map_with(|entries, extra| {
                let (keys, values): (Vec<String>, Vec<Node>) = entries.into_iter().unzip();
                let (values, h) = children(values)?;
                grow(
                    h + 1,
                    extra.span(),
                    Expr::Object(keys.into_iter().zip(values).collect()),
                )
            });

        let grouped = expression
            .clone()
            .delimited_by(punct("("), punct(")"));

        let atom = choice((literal, array, object, grouped));

        let member = punct(".")
            .ignore_then(select! { Token::Ident(name) => name })
            .map(Suffix::Member);
        let index = expression
            .clone()
            .delimited_by(punct("["), punct("]"))
            .map(Suffix::Index);
        let call = list("(", ")").map(Suffix::Call);

        let prefix_op = choice((
            punct("!").to(UnaryOp::Not),
            punct("-").to(UnaryOp::Negate),
            punct("+").to(UnaryOp::Plus),
        ));
        let equality_op = choice((
            punct("===").to(BinaryOp::Eq),
            punct("!==").to(BinaryOp::Ne),
            punct("==").to(BinaryOp::Eq),
            punct("!=").to(BinaryOp::Ne),
        ));
        let relational_op = choice((
            punct("<=").to(BinaryOp::Le),
            punct(">=").to(BinaryOp::Ge),
            punct("<").to(BinaryOp::Lt),
            punct(">").to(BinaryOp::Gt),
        ));
        let additive_op = choice((
            punct("+").to(BinaryOp::Add),
            punct("-").to(BinaryOp::Sub),
        ));
        let multiplicative_op = choice((
            punct("*").to(BinaryOp::Mul),
            punct("/").to(BinaryOp::Div),
            punct("%").to(BinaryOp::Rem),
        ));
        // `? consequent :` acts as one infix operator carrying the middle operand.
        let conditional_op = punct("?")
            .ignore_then(expression.clone())
            .then_ignore(punct(":"));

        atom.pratt((
            infix(right(1), punct("="), |target, _, value, extra| {
                assign(target, value, extra.span())
            }),
            infix(right(2), conditional_op, |test, consequent, alternate, extra| {
                conditional(test, consequent, alternate, extra.span())
            }),
            infix(left(3), punct("||"), |l, _, r, extra| {
                logical(LogicalOp::Or, l, r, extra.span())
            }),
            infix(left(4), punct("&&"), |l, _, r, extra| {
                logical(LogicalOp::And, l, r, extra.span())
            }),
            infix(left(5), equality_op, |l, op, r, extra| binary(op, l, r, extra.span())),
            infix(left(6), relational_op, |l, op, r, extra| binary(op, l, r, extra.span())),
            infix(left(7), additive_op, |l, op, r, extra| binary(op, l, r, extra.span())),
            infix(left(8), multiplicative_op, |l, op, r, extra| {
                binary(op, l, r, extra.span())
            }),
            prefix(9, prefix_op, |op, operand, extra| unary(op, operand, extra.span())),
            postfix(10, choice((member, index, call)), |target, suffix_op, extra| {
                suffix(target, suffix_op, extra.span())
            }),
        ))
    })
}
