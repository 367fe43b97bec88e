use std::collections::BTreeMap;

use crate::{
    error::dashed,
    lexer::{flag_value, Token},
    param::{FlagMap, ParamInfo, ParamKind, SingleParam},
    suggest::suggest,
    AnyCommand, CliError,
};

/// Flag occurrences and positional values collected for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub flags: FlagMap,
    pub arguments: Vec<String>,
}

/// The arguments of every command on the resolved path, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub path: Vec<String>,
    pub args: ParsedArgs,
    /// Index into the parent's subcommands and the child's own tree.
    pub child: Option<(usize, Box<ParseTree>)>,
}

impl ParseTree {
    pub fn leaf(&self) -> &ParseTree {
        match &self.child {
            Some((_, child)) => child.leaf(),
            None => self,
        }
    }
}

/// Dashed flag spelling (`--name`, `-n`) to declaration, for one command.
struct Registry {
    flags: BTreeMap<String, SingleParam>,
}

impl Registry {
    fn new(params: &[ParamInfo]) -> Registry {
        let mut flags = BTreeMap::new();
        for info in params.iter().filter(|it| it.single.kind == ParamKind::Flag) {
            for name in info.single.names() {
                flags.insert(dashed(name), info.single.clone());
            }
        }
        Registry { flags }
    }

    fn get(&self, token: &Token) -> Option<&SingleParam> {
        token.flag_name().and_then(|name| self.flags.get(&name))
    }

    /// Records the occurrence at `tokens[idx]`, returns how many tokens after
    /// it were used as its value. An occurrence without a value is an error.
    fn bind(
        single: &SingleParam,
        tokens: &[Token],
        idx: usize,
        flags: &mut FlagMap,
        errors: &mut Vec<CliError>,
    ) -> usize {
        let (value, consumed) = flag_value(tokens, idx, single.primitive.is_boolean());
        let occurrences = flags.entry(single.name.clone()).or_default();
        match value {
            Some(value) => occurrences.push(value),
            None => errors.push(single.missing_value()),
        }
        consumed
    }
}

/// Binds `tokens` against `cmd`, descending into a subcommand when its name
/// shows up before any positional value. Unknown flags and subcommands are
/// pushed to `errors` and parsing carries on.
pub(crate) fn parse_args<E>(
    cmd: &dyn AnyCommand<E>,
    tokens: &[Token],
    path: Vec<String>,
    errors: &mut Vec<CliError>,
) -> ParseTree {
    let params = cmd.params();
    let registry = Registry::new(&params);
    let has_arguments = params.iter().any(|it| it.single.kind == ParamKind::Argument);

    let mut args = ParsedArgs::default();
    let mut collecting = false;
    let mut child = None;

    let mut idx = 0;
    while idx < tokens.len() {
        let token = &tokens[idx];
        let value = match token {
            Token::Value { value } => value,
            _ => {
                match registry.get(token) {
                    Some(single) => {
                        idx += Registry::bind(single, tokens, idx, &mut args.flags, errors)
                    }
                    None => {
                        let option = token.flag_name().unwrap_or_default();
                        let candidates = registry.flags.keys().map(String::as_str);
                        let suggestions = suggest(&option, candidates);
                        let command = path.clone();
                        errors.push(CliError::UnrecognizedOption { option, suggestions, command });
                    }
                }
                idx += 1;
                continue;
            }
        };

        if !collecting {
            let subcommand = cmd.subcommands().iter().position(|it| it.name() == value);
            if let Some(pos) = subcommand {
                let sub = cmd.subcommands()[pos].as_ref();
                // Our own flags may still follow the subcommand name.
                let mut rest = Vec::new();
                let mut next = idx + 1;
                while next < tokens.len() {
                    match registry.get(&tokens[next]) {
                        Some(single) => {
                            let consumed =
                                Registry::bind(single, tokens, next, &mut args.flags, errors);
                            next += 1 + consumed
                        }
                        None => {
                            rest.push(tokens[next].clone());
                            next += 1;
                        }
                    }
                }
                let mut child_path = path.clone();
                child_path.push(sub.name().to_string());
                tracing::debug!(command = %child_path.join(" "), "entering subcommand");
                child = Some((pos, Box::new(parse_args(sub, &rest, child_path, errors))));
                break;
            }
            if !has_arguments && !cmd.subcommands().is_empty() {
                let names = cmd.subcommands().iter().map(|it| it.name());
                errors.push(CliError::UnknownSubcommand {
                    subcommand: value.clone(),
                    parent: path.join(" "),
                    suggestions: suggest(value, names),
                });
            }
            collecting = true;
        }
        args.arguments.push(value.clone());
        idx += 1;
    }

    ParseTree { path, args, child }
}
