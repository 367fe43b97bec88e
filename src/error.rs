use std::fmt;

use crate::param::ParamKind;

/// Everything that can go wrong between `argv` and a handler invocation.
///
/// The message of every variant is a pure function of its fields and is
/// available through `Display` (or [`CliError::message`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error(
        "Unrecognized flag: {option} in command {}{}",
        .command.join(" "),
        did_you_mean(.suggestions)
    )]
    UnrecognizedOption { option: String, suggestions: Vec<String>, command: Vec<String> },

    #[error(
        "Duplicate flag name {option} in parent command `{parent_command}` and subcommand \
         `{child_command}`. Parent commands cannot share flag names with their subcommands"
    )]
    DuplicateOption { option: String, parent_command: String, child_command: String },

    #[error("Missing required flag: {}", dashed(.option))]
    MissingOption { option: String },

    #[error("Missing required argument: <{argument}>")]
    MissingArgument { argument: String },

    #[error(
        "Invalid value for {kind} {}: {value:?}. Expected: {expected}",
        display_name(.kind, .option)
    )]
    InvalidValue { option: String, value: String, expected: String, kind: ParamKind },

    #[error("Unknown subcommand `{subcommand}` for `{parent}`{}", did_you_mean(.suggestions))]
    UnknownSubcommand { subcommand: String, parent: String, suggestions: Vec<String> },

    #[error("Unexpected argument: {value:?} for command `{}`", .command.join(" "))]
    UnexpectedArgument { value: String, command: Vec<String> },

    #[error("Help requested for `{}`", .command.join(" "))]
    ShowHelp { command: Vec<String> },

    #[error("{message}")]
    UserError { message: String },
}

impl CliError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn user(message: impl fmt::Display) -> CliError {
        CliError::UserError { message: message.to_string() }
    }

    /// Errors a decoder is allowed to recover from by treating the param as
    /// absent.
    pub(crate) fn is_missing(&self) -> bool {
        matches!(self, CliError::MissingOption { .. } | CliError::MissingArgument { .. })
    }
}

/// Renders a flag name with the dash prefix its length calls for.
pub(crate) fn dashed(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

fn display_name(kind: &ParamKind, name: &str) -> String {
    match kind {
        ParamKind::Flag => dashed(name),
        ParamKind::Argument => format!("<{name}>"),
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [it] => format!(". Did you mean {it}?"),
        _ => format!(". Did you mean one of: {}?", suggestions.join(", ")),
    }
}

/// Formats accumulated errors the way they are printed to stderr.
pub(crate) fn error_block(errors: &[CliError]) -> String {
    match errors {
        [err] => format!("ERROR\n  {err}\n"),
        _ => {
            let mut buf = String::from("ERRORS\n");
            for err in errors {
                buf.push_str(&format!("  - {err}\n"));
            }
            buf
        }
    }
}
