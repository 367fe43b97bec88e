//! Typed, composable command line parsing.
//!
//! Params are declared with [`flag`] and [`argument`] constructors, refined
//! with combinators on [`Param`], grouped into a [`Config`] and bound to a
//! [`Command`]:
//!
//! ```
//! use argtree::{argument, flag, Command, RunConfig};
//!
//! let config = (flag::boolean("force").with_alias("f"), argument::string("file"));
//! let add = Command::new("add", config)
//!     .with_handler(|(force, file), _| async move {
//!         println!("adding {file} (force: {force})");
//!         Ok::<(), anyhow::Error>(())
//!     });
//! let git = Command::new("git", flag::boolean("verbose"))
//!     .with_subcommands([add.boxed()])
//!     .unwrap();
//!
//! let argv = ["add", "-f", "README.md"].map(String::from);
//! futures::executor::block_on(git.run(&argv, &RunConfig::new("1.0.0"))).unwrap();
//! ```

mod builtin;
mod command;
mod config;
mod error;
mod help;
mod lexer;
mod param;
mod primitive;
mod suggest;

pub mod argument;
pub mod flag;

pub use crate::{
    builtin::{BuiltIns, LogLevel},
    command::{
        AnyCommand, Command, Execution, Parents, ParseTree, ParsedArgs, RunConfig, RunError,
        Running,
    },
    config::{Config, ConfigExt, MapOutput},
    error::CliError,
    help::{HelpDoc, Section},
    lexer::{lex, LexResult, Token},
    param::{
        Argument, ArgumentKind, Flag, FlagKind, FlagMap, Input, Kind, Param, ParamInfo, ParamKind,
        ParseResult, SingleParam,
    },
    primitive::{Primitive, PrimitiveTag, Redacted},
    suggest::suggest,
};
