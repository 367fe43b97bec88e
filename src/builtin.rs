//! Options every command understands: `--help`/`-h`, `--version` and
//! `--log-level`. They are recognized anywhere before a `--`.

use tracing::level_filters::LevelFilter;

use crate::{
    lexer::{flag_value, Token},
    param::ParamKind,
    CliError, Primitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    All,
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    None,
}

impl LogLevel {
    fn primitive() -> Primitive<LogLevel> {
        Primitive::choice([
            ("all", LogLevel::All),
            ("trace", LogLevel::Trace),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warning),
            ("warning", LogLevel::Warning),
            ("error", LogLevel::Error),
            ("fatal", LogLevel::Fatal),
            ("none", LogLevel::None),
        ])
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::All | LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
            LogLevel::None => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltIns {
    pub help: bool,
    pub version: bool,
    pub log_level: Option<LogLevel>,
}

/// Removes built-in options from `tokens`.
pub(crate) fn extract(tokens: Vec<Token>) -> (BuiltIns, Vec<Token>, Vec<CliError>) {
    let mut builtins = BuiltIns::default();
    let mut rest = Vec::with_capacity(tokens.len());
    let mut errors = Vec::new();

    let mut idx = 0;
    while idx < tokens.len() {
        let name = tokens[idx].flag_name();
        match name.as_deref() {
            Some("--help" | "-h") | Some("--version") => {
                let (value, consumed) = flag_value(&tokens, idx, true);
                let on = value
                    .as_deref()
                    .map_or(false, |it| Primitive::boolean().parse(it) == Ok(true));
                if name.as_deref() == Some("--version") {
                    builtins.version |= on;
                } else {
                    builtins.help |= on;
                }
                idx += 1 + consumed;
            }
            Some("--log-level") => {
                let (value, consumed) = flag_value(&tokens, idx, false);
                let value = value.unwrap_or_default();
                match LogLevel::primitive().parse(&value) {
                    Ok(level) => builtins.log_level = Some(level),
                    Err(expected) => errors.push(CliError::InvalidValue {
                        option: "log-level".to_string(),
                        value,
                        expected,
                        kind: ParamKind::Flag,
                    }),
                }
                idx += 1 + consumed;
            }
            _ => {
                rest.push(tokens[idx].clone());
                idx += 1;
            }
        }
    }
    (builtins, rest, errors)
}
