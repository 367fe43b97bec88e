//! Splits raw `argv` into flag and value tokens.

use crate::primitive::parse_bool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `--name` or `--name=value`.
    LongOption { name: String, raw: String, value: Option<String> },
    /// One letter out of `-x`, `-xyz` or `-xyz=value`.
    ShortOption { flag: char, raw: String, value: Option<String> },
    Value { value: String },
}

impl Token {
    /// The flag as it would be spelled on its own, `None` for values.
    pub fn flag_name(&self) -> Option<String> {
        match self {
            Token::LongOption { name, .. } => Some(format!("--{name}")),
            Token::ShortOption { flag, .. } => Some(format!("-{flag}")),
            Token::Value { .. } => None,
        }
    }

    pub fn inline_value(&self) -> Option<&str> {
        match self {
            Token::LongOption { value, .. } | Token::ShortOption { value, .. } => value.as_deref(),
            Token::Value { .. } => None,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Token::Value { value } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    /// Everything after the first bare `--`, verbatim.
    pub trailing_operands: Vec<String>,
}

pub fn lex(argv: &[String]) -> LexResult {
    let (args, trailing_operands) = match argv.iter().position(|it| it == "--") {
        Some(idx) => (&argv[..idx], argv[idx + 1..].to_vec()),
        None => (argv, Vec::new()),
    };

    let mut tokens = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(long) = arg.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (long, None),
            };
            tokens.push(Token::LongOption { name: name.to_string(), raw: arg.clone(), value });
        } else if let Some(short) = arg.strip_prefix('-').filter(|it| !it.is_empty()) {
            let (letters, value) = match short.split_once('=') {
                Some((letters, value)) => (letters, Some(value.to_string())),
                None => (short, None),
            };
            let count = letters.chars().count();
            for (idx, flag) in letters.chars().enumerate() {
                let value = if idx + 1 == count { value.clone() } else { None };
                tokens.push(Token::ShortOption { flag, raw: arg.clone(), value });
            }
        } else {
            tokens.push(Token::Value { value: arg.clone() });
        }
    }

    tracing::trace!(?tokens, ?trailing_operands, "lexed argv");
    LexResult { tokens, trailing_operands }
}

/// Finds the value for the flag at `tokens[idx]`, returning it together
/// with the number of tokens consumed after the flag itself.
///
/// A switch only takes the next token when it is a boolean literal, so
/// `--verbose file.txt` leaves `file.txt` alone.
pub(crate) fn flag_value(tokens: &[Token], idx: usize, switch: bool) -> (Option<String>, usize) {
    if let Some(value) = tokens[idx].inline_value() {
        return (Some(value.to_string()), 0);
    }
    let next = tokens.get(idx + 1).and_then(Token::as_value);
    match next {
        Some(value) if switch && parse_bool(value).is_some() => (Some(value.to_string()), 1),
        _ if switch => (Some("true".to_string()), 0),
        Some(value) => (Some(value.to_string()), 1),
        None => (None, 0),
    }
}
