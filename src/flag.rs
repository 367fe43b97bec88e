//! Constructors for named params (`--name`, `-n`).
//!
//! A one-letter name is spelled with a single dash, anything longer with two.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{param::Flag, primitive::Redacted, Primitive};

/// A switch: absent means `false`, present without a value means `true`.
pub fn boolean(name: &str) -> Flag<bool> {
    Flag::single(name, Primitive::boolean())
}

pub fn string(name: &str) -> Flag<String> {
    Flag::single(name, Primitive::string())
}

pub fn integer(name: &str) -> Flag<i64> {
    Flag::single(name, Primitive::integer())
}

pub fn float(name: &str) -> Flag<f64> {
    Flag::single(name, Primitive::float())
}

pub fn date(name: &str) -> Flag<DateTime<Utc>> {
    Flag::single(name, Primitive::date())
}

pub fn redacted(name: &str) -> Flag<Redacted> {
    Flag::single(name, Primitive::redacted())
}

pub fn choice<A, L>(name: &str, choices: impl IntoIterator<Item = (L, A)>) -> Flag<A>
where
    A: Clone + Send + Sync + 'static,
    L: Into<String>,
{
    Flag::single(name, Primitive::choice(choices))
}

pub fn key_value(name: &str) -> Flag<(String, String)> {
    Flag::single(name, Primitive::key_value_pair())
}

/// A repeatable `--name key=value` flag collected into a map; later keys
/// win.
pub fn key_value_map(name: &str) -> Flag<BTreeMap<String, String>> {
    key_value(name).repeated().map(|pairs| pairs.into_iter().collect())
}

pub fn none(name: &str) -> Flag<()> {
    Flag::single(name, Primitive::none())
}
