use std::{ffi::OsString, fmt};

use tracing::instrument::WithSubscriber;

use crate::{
    builtin::{self, LogLevel},
    command::{parse_args, AnyCommand, Parents, ParseTree, Running},
    error::error_block,
    lexer::lex,
    CliError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub version: String,
}

impl RunConfig {
    pub fn new(version: &str) -> RunConfig {
        RunConfig { version: version.to_string() }
    }
}

/// What a run of `argv` amounts to, decided before anything is printed or
/// any handler runs.
pub enum Execution<E> {
    /// Help for the most specific command on the path; goes to stdout.
    Help(String),
    /// `{name} v{version}`; goes to stdout.
    Version(String),
    /// Help goes to stdout, the error block to stderr.
    Failed { help: String, errors: Vec<CliError> },
    Run { handler: Running<E>, log_level: Option<LogLevel> },
}

impl<E> fmt::Debug for Execution<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Execution::Help(text) => f.debug_tuple("Help").field(text).finish(),
            Execution::Version(text) => f.debug_tuple("Version").field(text).finish(),
            Execution::Failed { help, errors } => {
                f.debug_struct("Failed").field("help", help).field("errors", errors).finish()
            }
            Execution::Run { log_level, .. } => {
                f.debug_struct("Run").field("log_level", log_level).finish()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError<E> {
    /// Already reported on the console.
    #[error("{}", joined(.0))]
    Cli(Vec<CliError>),
    #[error("{0}")]
    Handler(E),
}

fn joined(errors: &[CliError]) -> String {
    errors.iter().map(CliError::message).collect::<Vec<_>>().join("; ")
}

/// Converts raw process arguments, reporting every one that is not valid
/// UTF-8.
pub(crate) fn decode_argv(
    args: impl IntoIterator<Item = OsString>,
) -> Result<Vec<String>, Vec<CliError>> {
    let mut argv = Vec::new();
    let mut errors = Vec::new();
    for arg in args {
        match arg.into_string() {
            Ok(it) => argv.push(it),
            Err(it) => {
                let lossy = it.to_string_lossy();
                errors.push(CliError::user(format!("Argument `{lossy}` is not valid UTF-8")))
            }
        }
    }
    if errors.is_empty() {
        Ok(argv)
    } else {
        Err(errors)
    }
}

/// Lexes and parses `argv`, and decodes every config on the resolved path.
/// Nothing is printed.
pub(crate) fn prepare<E>(
    root: &dyn AnyCommand<E>,
    argv: &[String],
    config: &RunConfig,
) -> Execution<E> {
    let lexed = lex(argv);
    let (builtins, tokens, mut errors) = builtin::extract(lexed.tokens);

    let mut tree = parse_args(root, &tokens, vec![root.name().to_string()], &mut errors);
    tree.args.arguments.extend(lexed.trailing_operands);

    let help = || resolve(root, &tree).help_doc(&tree.leaf().path).to_string();
    if builtins.help {
        return Execution::Help(help());
    }
    if builtins.version {
        return Execution::Version(format!("{} v{}", root.name(), config.version));
    }
    if !errors.is_empty() {
        return Execution::Failed { help: help(), errors };
    }

    match root.dispatch(&tree, Parents::default()) {
        Ok(handler) => Execution::Run { handler, log_level: builtins.log_level },
        Err(CliError::ShowHelp { .. }) => Execution::Help(help()),
        Err(err) => Execution::Failed { help: help(), errors: vec![err] },
    }
}

/// Prints help, version or errors, or awaits the handler.
pub(crate) async fn execute<E>(execution: Execution<E>) -> Result<(), RunError<E>> {
    match execution {
        Execution::Help(text) => {
            print!("{text}");
            Ok(())
        }
        Execution::Version(text) => {
            println!("{text}");
            Ok(())
        }
        Execution::Failed { help, errors } => {
            print!("{help}");
            eprint!("\n{}", error_block(&errors));
            Err(RunError::Cli(errors))
        }
        Execution::Run { handler, log_level } => {
            let res = match log_level {
                Some(level) => {
                    let subscriber = tracing_subscriber::fmt()
                        .with_max_level(level.filter())
                        .with_writer(std::io::stderr)
                        .finish();
                    handler.with_subscriber(subscriber).await
                }
                None => handler.await,
            };
            res.map_err(RunError::Handler)
        }
    }
}

fn resolve<'a, E>(root: &'a dyn AnyCommand<E>, tree: &ParseTree) -> &'a dyn AnyCommand<E> {
    let mut cmd = root;
    let mut node = tree;
    while let Some((idx, child)) = &node.child {
        cmd = cmd.subcommands()[*idx].as_ref();
        node = &**child;
    }
    cmd
}
