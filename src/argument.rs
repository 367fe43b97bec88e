//! Constructors for positional params, bound in declaration order.

use chrono::{DateTime, Utc};

use crate::{param::Argument, primitive::Redacted, Primitive};

pub fn string(name: &str) -> Argument<String> {
    Argument::single(name, Primitive::string())
}

pub fn integer(name: &str) -> Argument<i64> {
    Argument::single(name, Primitive::integer())
}

pub fn float(name: &str) -> Argument<f64> {
    Argument::single(name, Primitive::float())
}

pub fn date(name: &str) -> Argument<DateTime<Utc>> {
    Argument::single(name, Primitive::date())
}

pub fn redacted(name: &str) -> Argument<Redacted> {
    Argument::single(name, Primitive::redacted())
}

pub fn choice<A, L>(name: &str, choices: impl IntoIterator<Item = (L, A)>) -> Argument<A>
where
    A: Clone + Send + Sync + 'static,
    L: Into<String>,
{
    Argument::single(name, Primitive::choice(choices))
}

pub fn key_value(name: &str) -> Argument<(String, String)> {
    Argument::single(name, Primitive::key_value_pair())
}
