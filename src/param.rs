//! The composable param algebra.
//!
//! A [`Param`] is a tree of nodes whose leaves are [`SingleParam`]
//! declarations bound to a [`Primitive`]. Combinators wrap the tree in
//! `Map`, `TryMap`, `Optional`, `Variadic` or `OrElse` nodes; the metadata
//! combinators (`with_alias` and friends) rewrite the leaves in place and
//! keep every wrapper intact.

use std::{collections::BTreeMap, fmt, marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};

use crate::{primitive::PrimitiveTag, CliError, Primitive};

/// Occurrences of every flag, keyed by canonical name.
pub type FlagMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Argument,
    Flag,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::Argument => "argument",
            ParamKind::Flag => "flag",
        })
    }
}

/// Type level tag for [`ParamKind`].
pub trait Kind: Send + Sync + 'static {
    const KIND: ParamKind;
}

#[derive(Debug)]
pub enum FlagKind {}

#[derive(Debug)]
pub enum ArgumentKind {}

impl Kind for FlagKind {
    const KIND: ParamKind = ParamKind::Flag;
}

impl Kind for ArgumentKind {
    const KIND: ParamKind = ParamKind::Argument;
}

/// The atomic declaration: one name, one primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleParam {
    pub kind: ParamKind,
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub primitive: PrimitiveTag,
    pub metavar: Option<String>,
}

impl SingleParam {
    pub fn type_name(&self) -> String {
        self.metavar.clone().unwrap_or_else(|| self.primitive.type_name())
    }

    /// Canonical name followed by the aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// The error for a flag that was given without a value.
    pub(crate) fn missing_value(&self) -> CliError {
        CliError::InvalidValue {
            option: self.name.clone(),
            value: String::new(),
            expected: self.type_name(),
            kind: self.kind,
        }
    }
}

/// A flattened leaf together with what its wrappers say about it, used for
/// registries and help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub single: SingleParam,
    pub optional: bool,
    pub variadic: bool,
}

/// What a param parses from: all flag occurrences plus the positional
/// values that are still unbound.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    pub flags: &'a FlagMap,
    pub arguments: &'a [String],
}

impl<'a> Input<'a> {
    pub fn new(flags: &'a FlagMap, arguments: &'a [String]) -> Input<'a> {
        Input { flags, arguments }
    }

    fn with_arguments(self, arguments: &'a [String]) -> Input<'a> {
        Input { flags: self.flags, arguments }
    }
}

/// The value plus the positional values left for the params after this one.
pub type ParseResult<'a, A> = Result<(&'a [String], A), CliError>;

type Rewrite<'r> = &'r dyn Fn(SingleParam) -> SingleParam;

trait Node<A>: Send + Sync {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, A>;
    fn params(&self, out: &mut Vec<ParamInfo>);
    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<A>>;
}

/// A declared flag or positional argument with its decoding logic.
///
/// Params are immutable; every combinator returns a new value.
pub struct Param<K, A> {
    node: Arc<dyn Node<A>>,
    _kind: PhantomData<fn() -> K>,
}

pub type Flag<A> = Param<FlagKind, A>;
pub type Argument<A> = Param<ArgumentKind, A>;

impl<K, A> Clone for Param<K, A> {
    fn clone(&self) -> Self {
        Param { node: Arc::clone(&self.node), _kind: PhantomData }
    }
}

impl<K: Kind, A: 'static> fmt::Debug for Param<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param").field("kind", &K::KIND).field("params", &self.params()).finish()
    }
}

impl<K: Kind, A: 'static> Param<K, A> {
    fn from_node(node: impl Node<A> + 'static) -> Self {
        Param { node: Arc::new(node), _kind: PhantomData }
    }

    pub(crate) fn single(name: &str, primitive: Primitive<A>) -> Self {
        let decl = SingleParam {
            kind: K::KIND,
            name: name.to_string(),
            description: None,
            aliases: Vec::new(),
            primitive: primitive.tag().clone(),
            metavar: None,
        };
        Param::from_node(Single { decl, primitive })
    }

    pub fn kind(&self) -> ParamKind {
        K::KIND
    }

    pub fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, A> {
        self.node.parse(input)
    }

    /// Every underlying [`SingleParam`] with its optional/variadic markers.
    pub fn params(&self) -> Vec<ParamInfo> {
        let mut res = Vec::new();
        self.node.params(&mut res);
        res
    }

    pub fn single_params(&self) -> Vec<SingleParam> {
        self.params().into_iter().map(|it| it.single).collect()
    }

    pub fn transform_single(&self, f: impl Fn(SingleParam) -> SingleParam) -> Self {
        Param { node: self.node.transform_single(&f), _kind: PhantomData }
    }

    pub fn with_alias(self, alias: &str) -> Self {
        self.transform_single(|mut single| {
            single.aliases.push(alias.to_string());
            single
        })
    }

    /// Appends to the existing description, if any.
    pub fn with_description(self, description: &str) -> Self {
        self.transform_single(|mut single| {
            single.description = Some(match single.description.take() {
                Some(it) => format!("{it}\n{description}"),
                None => description.to_string(),
            });
            single
        })
    }

    pub fn with_metavar(self, metavar: &str) -> Self {
        self.transform_single(|mut single| {
            single.metavar = Some(metavar.to_string());
            single
        })
    }

    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> Param<K, B> {
        Param::from_node(Map { inner: self.node, f: Arc::new(f) })
    }

    /// Like [`Param::map`], but the function may reject the value.
    pub fn try_map<B: 'static>(
        self,
        f: impl Fn(A) -> Result<B, CliError> + Send + Sync + 'static,
    ) -> Param<K, B> {
        let f = move |a, _: &Origin| f(a);
        Param::from_node(TryMap { kind: K::KIND, inner: self.node, f: Arc::new(f) })
    }

    /// Rejects values for which `predicate` is false; `on_false` produces
    /// the expected-value text of the resulting error.
    pub fn filter(
        self,
        predicate: impl Fn(&A) -> bool + Send + Sync + 'static,
        on_false: impl Fn(&A) -> String + Send + Sync + 'static,
    ) -> Self {
        let f = move |a: A, origin: &Origin| {
            if predicate(&a) {
                Ok(a)
            } else {
                Err(origin.invalid(on_false(&a)))
            }
        };
        Param::from_node(TryMap { kind: K::KIND, inner: self.node, f: Arc::new(f) })
    }

    /// Re-decodes the value into `B` through serde.
    pub fn with_schema<B>(self) -> Param<K, B>
    where
        A: Serialize,
        B: DeserializeOwned + 'static,
    {
        let f = |a: A, origin: &Origin| {
            serde_json::to_value(&a)
                .and_then(serde_json::from_value::<B>)
                .map_err(|err| origin.invalid(err.to_string()))
        };
        Param::from_node(TryMap { kind: K::KIND, inner: self.node, f: Arc::new(f) })
    }

    /// Absent params decode to `None`; any other failure still fails.
    pub fn optional(self) -> Param<K, Option<A>> {
        Param::from_node(Optional { inner: self.node })
    }

    pub fn with_default(self, default: A) -> Self
    where
        A: Clone + Send + Sync,
    {
        self.optional().map(move |it| it.unwrap_or_else(|| default.clone()))
    }

    pub fn variadic(self, min: Option<usize>, max: Option<usize>) -> Param<K, Vec<A>> {
        Param::from_node(Variadic { kind: K::KIND, inner: self.node, min, max })
    }

    pub fn repeated(self) -> Param<K, Vec<A>> {
        self.variadic(None, None)
    }

    pub fn at_least(self, min: usize) -> Param<K, Vec<A>> {
        self.variadic(Some(min), None)
    }

    pub fn at_most(self, max: usize) -> Param<K, Vec<A>> {
        self.variadic(None, Some(max))
    }

    pub fn between(self, min: usize, max: usize) -> Param<K, Vec<A>> {
        self.variadic(Some(min), Some(max))
    }

    /// Tries `self`, and on any failure tries `that()` against the same
    /// input.
    pub fn or_else(self, that: impl Fn() -> Param<K, A> + Send + Sync + 'static) -> Self {
        let fallback = move || that().node;
        Param::from_node(OrElse { first: self.node, second: Arc::new(fallback) })
    }
}

struct Single<A> {
    decl: SingleParam,
    primitive: Primitive<A>,
}

impl<A> Single<A> {
    fn decode(&self, raw: &str) -> Result<A, CliError> {
        self.primitive.parse(raw).map_err(|expected| CliError::InvalidValue {
            option: self.decl.name.clone(),
            value: raw.to_string(),
            expected,
            kind: self.decl.kind,
        })
    }
}

impl<A: 'static> Node<A> for Single<A> {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, A> {
        match self.decl.kind {
            ParamKind::Argument => match input.arguments.split_first() {
                Some((head, rest)) => Ok((rest, self.decode(head)?)),
                None => Err(CliError::MissingArgument { argument: self.decl.name.clone() }),
            },
            // An entry without values is a flag that was given but got none.
            ParamKind::Flag => match input.flags.get(&self.decl.name).map(|it| it.first()) {
                Some(Some(raw)) => Ok((input.arguments, self.decode(raw)?)),
                Some(None) => Err(self.decl.missing_value()),
                None if self.decl.primitive.is_boolean() => {
                    Ok((input.arguments, self.decode("false")?))
                }
                None => Err(CliError::MissingOption { option: self.decl.name.clone() }),
            },
        }
    }

    fn params(&self, out: &mut Vec<ParamInfo>) {
        out.push(ParamInfo { single: self.decl.clone(), optional: false, variadic: false })
    }

    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<A>> {
        Arc::new(Single { decl: f(self.decl.clone()), primitive: self.primitive.clone() })
    }
}

struct Map<A, B> {
    inner: Arc<dyn Node<A>>,
    f: Arc<dyn Fn(A) -> B + Send + Sync>,
}

impl<A: 'static, B: 'static> Node<B> for Map<A, B> {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, B> {
        let (rest, a) = self.inner.parse(input)?;
        Ok((rest, (self.f)(a)))
    }

    fn params(&self, out: &mut Vec<ParamInfo>) {
        self.inner.params(out)
    }

    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<B>> {
        Arc::new(Map { inner: self.inner.transform_single(f), f: Arc::clone(&self.f) })
    }
}

/// Where a decoded value came from, for errors raised after decoding.
struct Origin {
    option: String,
    kind: ParamKind,
    raw: String,
}

impl Origin {
    fn invalid(&self, expected: String) -> CliError {
        CliError::InvalidValue {
            option: self.option.clone(),
            value: self.raw.clone(),
            expected,
            kind: self.kind,
        }
    }
}

struct TryMap<A, B> {
    kind: ParamKind,
    inner: Arc<dyn Node<A>>,
    f: Arc<dyn Fn(A, &Origin) -> Result<B, CliError> + Send + Sync>,
}

impl<A: 'static, B: 'static> TryMap<A, B> {
    fn origin(&self, before: Input<'_>, rest: &[String]) -> Origin {
        let mut params = Vec::new();
        self.inner.params(&mut params);
        let single = params.into_iter().next().map(|it| it.single);
        let option = single.as_ref().map(|it| it.name.clone()).unwrap_or_default();
        let raw = match self.kind {
            ParamKind::Argument => {
                let consumed = before.arguments.len() - rest.len();
                before.arguments[..consumed].join(" ")
            }
            ParamKind::Flag => single
                .iter()
                .flat_map(|single| single.names().collect::<Vec<_>>())
                .filter_map(|name| before.flags.get(name))
                .flatten()
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
        };
        Origin { option, kind: self.kind, raw }
    }
}

impl<A: 'static, B: 'static> Node<B> for TryMap<A, B> {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, B> {
        let (rest, a) = self.inner.parse(input)?;
        let origin = self.origin(input, rest);
        Ok((rest, (self.f)(a, &origin)?))
    }

    fn params(&self, out: &mut Vec<ParamInfo>) {
        self.inner.params(out)
    }

    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<B>> {
        Arc::new(TryMap {
            kind: self.kind,
            inner: self.inner.transform_single(f),
            f: Arc::clone(&self.f),
        })
    }
}

struct Optional<A> {
    inner: Arc<dyn Node<A>>,
}

impl<A: 'static> Node<Option<A>> for Optional<A> {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, Option<A>> {
        match self.inner.parse(input) {
            Ok((rest, a)) => Ok((rest, Some(a))),
            Err(err) if err.is_missing() => Ok((input.arguments, None)),
            Err(err) => Err(err),
        }
    }

    fn params(&self, out: &mut Vec<ParamInfo>) {
        let start = out.len();
        self.inner.params(out);
        out[start..].iter_mut().for_each(|it| it.optional = true);
    }

    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<Option<A>>> {
        Arc::new(Optional { inner: self.inner.transform_single(f) })
    }
}

struct Variadic<A> {
    kind: ParamKind,
    inner: Arc<dyn Node<A>>,
    min: Option<usize>,
    max: Option<usize>,
}

impl<A: 'static> Variadic<A> {
    fn leader(&self) -> Option<SingleParam> {
        let mut params = Vec::new();
        self.inner.params(&mut params);
        params.into_iter().next().map(|it| it.single)
    }

    fn count_error(&self, name: &str, raw: String, count: usize) -> Option<CliError> {
        let expected = match (self.min, self.max) {
            (Some(min), _) if count < min => format!("at least {min} value(s)"),
            (_, Some(max)) if count > max => format!("at most {max} value(s)"),
            _ => return None,
        };
        Some(CliError::InvalidValue {
            option: name.to_string(),
            value: raw,
            expected,
            kind: self.kind,
        })
    }

    fn parse_arguments<'a>(&self, input: Input<'a>) -> ParseResult<'a, Vec<A>> {
        let mut rest = input.arguments;
        let mut res = Vec::new();
        while !rest.is_empty() && self.max.map_or(true, |max| res.len() < max) {
            let (next, a) = self.inner.parse(input.with_arguments(rest))?;
            if next.len() == rest.len() {
                break;
            }
            rest = next;
            res.push(a);
        }
        let name = self.leader().map(|it| it.name).unwrap_or_default();
        let consumed = input.arguments.len() - rest.len();
        let raw = input.arguments[..consumed].join(" ");
        if let Some(err) = self.count_error(&name, raw, res.len()) {
            return Err(err);
        }
        Ok((rest, res))
    }

    fn parse_flags<'a>(&self, input: Input<'a>) -> ParseResult<'a, Vec<A>> {
        let leader = match self.leader() {
            Some(it) => it,
            None => return Ok((input.arguments, Vec::new())),
        };
        let entries = leader.names().filter_map(|name| input.flags.get(name)).collect::<Vec<_>>();
        if entries.iter().any(|it| it.is_empty()) {
            return Err(leader.missing_value());
        }
        let occurrences = entries.into_iter().flatten().cloned().collect::<Vec<_>>();

        if occurrences.is_empty() && self.min.map_or(false, |min| min >= 1) {
            return Err(CliError::MissingOption { option: leader.name });
        }
        let count = occurrences.len();
        if let Some(err) = self.count_error(&leader.name, occurrences.join(" "), count) {
            return Err(err);
        }

        let mut res = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            let mut flags = FlagMap::new();
            flags.insert(leader.name.clone(), vec![occurrence]);
            let (_, a) = self.inner.parse(Input::new(&flags, &[]))?;
            res.push(a);
        }
        Ok((input.arguments, res))
    }
}

impl<A: 'static> Node<Vec<A>> for Variadic<A> {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, Vec<A>> {
        match self.kind {
            ParamKind::Argument => self.parse_arguments(input),
            ParamKind::Flag => self.parse_flags(input),
        }
    }

    fn params(&self, out: &mut Vec<ParamInfo>) {
        let start = out.len();
        self.inner.params(out);
        let optional = self.min.map_or(true, |min| min == 0);
        for it in &mut out[start..] {
            it.variadic = true;
            it.optional |= optional;
        }
    }

    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<Vec<A>>> {
        Arc::new(Variadic {
            kind: self.kind,
            inner: self.inner.transform_single(f),
            min: self.min,
            max: self.max,
        })
    }
}

type Fallback<A> = Arc<dyn Fn() -> Arc<dyn Node<A>> + Send + Sync>;

struct OrElse<A> {
    first: Arc<dyn Node<A>>,
    second: Fallback<A>,
}

impl<A: 'static> Node<A> for OrElse<A> {
    fn parse<'a>(&self, input: Input<'a>) -> ParseResult<'a, A> {
        self.first.parse(input).or_else(|_| (self.second)().parse(input))
    }

    /// Both alternatives are registered so that either one can be spelled
    /// on the command line; names the fallback shares with `first` are
    /// listed once.
    fn params(&self, out: &mut Vec<ParamInfo>) {
        let start = out.len();
        self.first.params(out);
        let mut fallback = Vec::new();
        (self.second)().params(&mut fallback);
        for it in fallback {
            if !out[start..].iter().any(|seen| seen.single.name == it.single.name) {
                out.push(it);
            }
        }
    }

    // The fallback is built lazily and keeps its own metadata.
    fn transform_single(&self, f: Rewrite<'_>) -> Arc<dyn Node<A>> {
        Arc::new(OrElse { first: self.first.transform_single(f), second: Arc::clone(&self.second) })
    }
}
