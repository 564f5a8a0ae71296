//! Tokenizer for the expression language.

use chumsky::prelude::*;
use std::fmt;

pub(crate) type Span = SimpleSpan;
pub(crate) type LexError<'src> = Rich<'src, char, Span>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{}", number),
            Self::Str(text) => write!(f, "'{}'", text),
            Self::Ident(name) => f.write_str(name),
            Self::Punct(punct) => f.write_str(punct),
        }
    }
}

// Longest first so `===` wins over `==` and `=`.
const PUNCTUATORS: [&str; 27] = [
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "<", ">", "!",
    "=", "(", ")", "[", "]", "{", "}", ".", ",", "?", ":",
];

fn quoted<'src>(
    quote: char,
) -> impl Parser<'src, &'src str, String, extra::Err<LexError<'src>>> + Clone {
    let escape = just('\\').ignore_then(any().map(|escaped| match escaped {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }));

    just(quote)
        .ignore_then(none_of([quote, '\\']).or(escape).repeated().collect::<String>())
        .then_ignore(just(quote))
}

pub(crate) fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token, Span)>, extra::Err<LexError<'src>>> {
    let exponent = one_of("eE")
        .then(one_of("+-").or_not())
        .then(text::digits(10));

    let number = text::digits(10)
        .then(just('.').then(text::digits(10).or_not()).or_not())
        .ignored()
        .or(just('.').then(text::digits(10)).ignored())
        .then(exponent.or_not())
        .to_slice()
        .try_map(|text: &str, span| {
            text.parse::<f64>()
                .map(Token::Number)
                .map_err(|_| Rich::custom(span, format!("invalid number `{}`", text)))
        });

    let string = quoted('\'').or(quoted('"')).map(Token::Str);

    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_' || *c == '$')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
                .repeated(),
        )
        .to_slice()
        .map(|name: &str| Token::Ident(name.to_string()));

    let punct = choice(PUNCTUATORS.map(|punct| just(punct).to(Token::Punct(punct))));

    choice((number, string, ident, punct))
        .map_with(|token, extra| (token, extra.span()))
        .padded()
        .repeated()
        .collect()
        .padded()
        .then_ignore(end())
}
