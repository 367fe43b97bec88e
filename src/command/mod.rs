//! Commands: a name and a [`Config`], plus an optional handler and
//! subcommands.

mod parse;
mod run;

use std::{any::Any, fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

use crate::{
    config::{Config, ConfigExt},
    error::dashed,
    param::{Input, ParamInfo, ParamKind},
    CliError, HelpDoc,
};

pub(crate) use self::parse::parse_args;
pub use self::{
    parse::{ParseTree, ParsedArgs},
    run::{Execution, RunConfig, RunError},
};

/// A started handler.
pub type Running<E> = BoxFuture<'static, Result<(), E>>;

type Handler<T, E> = Box<dyn Fn(T, Parents) -> Running<E> + Send + Sync>;

/// Decoded configs of the commands enclosing the one being run, looked up by
/// command name.
#[derive(Clone, Default)]
pub struct Parents {
    entries: Vec<(String, Arc<dyn Any + Send + Sync>)>,
}

impl Parents {
    pub fn get<T: 'static>(&self, command: &str) -> Option<&T> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == command)
            .and_then(|(_, value)| value.downcast_ref::<T>())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    fn push(&mut self, command: &str, value: Arc<dyn Any + Send + Sync>) {
        self.entries.push((command.to_string(), value))
    }
}

impl fmt::Debug for Parents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// The type-erased view of a [`Command`], which is what a command tree is
/// made of.
pub trait AnyCommand<E>: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str>;

    /// This command's own params, flattened in declaration order.
    fn params(&self) -> Vec<ParamInfo>;

    fn subcommands(&self) -> &[Box<dyn AnyCommand<E>>];

    /// Decodes the config of every command on `tree`'s path and hands the
    /// innermost one to its handler. A command without a handler yields
    /// [`CliError::ShowHelp`].
    fn dispatch(&self, tree: &ParseTree, parents: Parents) -> Result<Running<E>, CliError>;

    fn help_doc(&self, path: &[String]) -> HelpDoc {
        let subcommands = self
            .subcommands()
            .iter()
            .map(|it| (it.name().to_string(), it.description().map(String::from)))
            .collect::<Vec<_>>();
        HelpDoc::build(path, self.description(), &self.params(), &subcommands)
    }
}

pub struct Command<C: Config, E = anyhow::Error> {
    name: String,
    description: Option<String>,
    config: C,
    handler: Option<Handler<C::Output, E>>,
    subcommands: Vec<Box<dyn AnyCommand<E>>>,
}

impl<C: Config, E> fmt::Debug for Command<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("params", &self.config.flatten())
            .field("handler", &self.handler.is_some())
            .field("subcommands", &self.subcommands.iter().map(|it| it.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl<C, E> Command<C, E>
where
    C: Config,
    C::Output: Send + Sync + 'static,
    E: Send + 'static,
{
    pub fn new(name: &str, config: C) -> Self {
        Command {
            name: name.to_string(),
            description: None,
            config,
            handler: None,
            subcommands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(C::Output, Parents) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.handler = Some(Box::new(move |config, parents| handler(config, parents).boxed()));
        self
    }

    /// Attaches subcommands. Fails if a subcommand declares a flag with the
    /// same canonical name as one of ours: it would be impossible to tell
    /// whose flag an occurrence is.
    pub fn with_subcommands(
        mut self,
        subcommands: impl IntoIterator<Item = Box<dyn AnyCommand<E>>>,
    ) -> Result<Self, CliError> {
        let ours = flag_names(&self.config.flatten());
        for sub in subcommands {
            if let Some(name) = flag_names(&sub.params()).into_iter().find(|it| ours.contains(it)) {
                return Err(CliError::DuplicateOption {
                    option: dashed(&name),
                    parent_command: self.name.clone(),
                    child_command: sub.name().to_string(),
                });
            }
            self.subcommands.push(sub);
        }
        Ok(self)
    }

    pub fn boxed(self) -> Box<dyn AnyCommand<E>> {
        Box::new(self)
    }

    /// Decodes this command's own config. Positional values nothing bound to
    /// are an error.
    pub fn parse(&self, args: &ParsedArgs) -> Result<C::Output, CliError> {
        self.parse_at(args, std::slice::from_ref(&self.name))
    }

    fn parse_at(&self, args: &ParsedArgs, path: &[String]) -> Result<C::Output, CliError> {
        let (rest, value) = self.config.decode(Input::new(&args.flags, &args.arguments))?;
        match rest.first() {
            Some(extra) => {
                Err(CliError::UnexpectedArgument { value: extra.clone(), command: path.to_vec() })
            }
            None => Ok(value),
        }
    }

    /// Starts the handler on a decoded config.
    pub fn handle(&self, config: C::Output, parents: Parents) -> Result<Running<E>, CliError> {
        match &self.handler {
            Some(handler) => Ok(handler(config, parents)),
            None => Err(CliError::ShowHelp { command: vec![self.name.clone()] }),
        }
    }

    pub fn build_help_doc(&self) -> HelpDoc {
        self.help_doc(std::slice::from_ref(&self.name))
    }

    /// Decides what `argv` amounts to without printing or running anything.
    pub fn prepare(&self, argv: &[String], config: &RunConfig) -> Execution<E> {
        run::prepare(self, argv, config)
    }

    /// Prints help, the version or errors as `argv` asks, or runs the
    /// resolved handler to completion.
    pub async fn run(&self, argv: &[String], config: &RunConfig) -> Result<(), RunError<E>> {
        run::execute(self.prepare(argv, config)).await
    }

    /// [`Command::run`] on the process arguments, minus the program name.
    /// Arguments that are not valid UTF-8 are reported like any other
    /// command line error.
    pub async fn run_from_env(&self, config: &RunConfig) -> Result<(), RunError<E>> {
        let execution = match run::decode_argv(std::env::args_os().skip(1)) {
            Ok(argv) => self.prepare(&argv, config),
            Err(errors) => Execution::Failed { help: self.build_help_doc().to_string(), errors },
        };
        run::execute(execution).await
    }
}

impl<C, E> AnyCommand<E> for Command<C, E>
where
    C: Config,
    C::Output: Send + Sync + 'static,
    E: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn params(&self) -> Vec<ParamInfo> {
        self.config.flatten()
    }

    fn subcommands(&self) -> &[Box<dyn AnyCommand<E>>] {
        &self.subcommands
    }

    fn dispatch(&self, tree: &ParseTree, mut parents: Parents) -> Result<Running<E>, CliError> {
        let value = self.parse_at(&tree.args, &tree.path)?;
        match &tree.child {
            Some((idx, child)) => {
                parents.push(&self.name, Arc::new(value));
                self.subcommands[*idx].dispatch(child, parents)
            }
            None => {
                tracing::debug!(command = %tree.path.join(" "), "dispatching");
                self.handle(value, parents)
                    .map_err(|_| CliError::ShowHelp { command: tree.path.clone() })
            }
        }
    }
}

fn flag_names(params: &[ParamInfo]) -> Vec<String> {
    params
        .iter()
        .filter(|it| it.single.kind == ParamKind::Flag)
        .map(|it| it.single.name.clone())
        .collect()
}
