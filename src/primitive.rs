//! Leaf decoders turning a single raw string into a typed value.

use std::{fmt, sync::Arc};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Which decoder a [`Primitive`] is. Carried by every
/// [`SingleParam`](crate::param::SingleParam) so that parsing and help
/// rendering can reason about a param without knowing its value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveTag {
    Boolean,
    String,
    Integer,
    Float,
    Date,
    Redacted,
    Choice(Vec<String>),
    KeyValuePair,
    None,
}

impl PrimitiveTag {
    pub fn type_name(&self) -> String {
        match self {
            PrimitiveTag::Boolean => "boolean".to_string(),
            PrimitiveTag::String => "string".to_string(),
            PrimitiveTag::Integer => "integer".to_string(),
            PrimitiveTag::Float => "float".to_string(),
            PrimitiveTag::Date => "date".to_string(),
            PrimitiveTag::Redacted => "redacted".to_string(),
            PrimitiveTag::Choice(labels) => labels.join("|"),
            PrimitiveTag::KeyValuePair => "key=value".to_string(),
            PrimitiveTag::None => "none".to_string(),
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, PrimitiveTag::Boolean)
    }
}

type Decode<A> = Arc<dyn Fn(&str) -> Result<A, String> + Send + Sync>;

/// A `string -> A` decoder. The error is a short description of what was
/// expected, it ends up in [`CliError::InvalidValue`](crate::CliError).
pub struct Primitive<A> {
    tag: PrimitiveTag,
    decode: Decode<A>,
}

impl<A> Clone for Primitive<A> {
    fn clone(&self) -> Self {
        Primitive { tag: self.tag.clone(), decode: Arc::clone(&self.decode) }
    }
}

impl<A> fmt::Debug for Primitive<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Primitive").field(&self.tag).finish()
    }
}

impl<A> Primitive<A> {
    fn new(
        tag: PrimitiveTag,
        decode: impl Fn(&str) -> Result<A, String> + Send + Sync + 'static,
    ) -> Self {
        Primitive { tag, decode: Arc::new(decode) }
    }

    pub fn tag(&self) -> &PrimitiveTag {
        &self.tag
    }

    pub fn parse(&self, raw: &str) -> Result<A, String> {
        (self.decode)(raw)
    }
}

const TRUE_LITERALS: &[&str] = &["true", "1", "y", "yes", "on"];
const FALSE_LITERALS: &[&str] = &["false", "0", "n", "no", "off"];

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    let lower = raw.to_ascii_lowercase();
    if TRUE_LITERALS.contains(&lower.as_str()) {
        Some(true)
    } else if FALSE_LITERALS.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

impl Primitive<bool> {
    pub fn boolean() -> Self {
        Primitive::new(PrimitiveTag::Boolean, |raw| {
            parse_bool(raw).ok_or_else(|| "boolean".to_string())
        })
    }
}

impl Primitive<String> {
    pub fn string() -> Self {
        Primitive::new(PrimitiveTag::String, |raw| Ok(raw.to_string()))
    }
}

impl Primitive<i64> {
    pub fn integer() -> Self {
        Primitive::new(PrimitiveTag::Integer, |raw| {
            let raw = raw.trim();
            if let Ok(it) = raw.parse::<i64>() {
                return Ok(it);
            }
            // Accept integral floats such as `1e3`.
            match raw.parse::<f64>() {
                Ok(it) if it.is_finite() && it.fract() == 0.0 && it.abs() < i64::MAX as f64 => {
                    Ok(it as i64)
                }
                _ => Err("integer".to_string()),
            }
        })
    }
}

impl Primitive<f64> {
    pub fn float() -> Self {
        Primitive::new(PrimitiveTag::Float, |raw| match raw.trim().parse::<f64>() {
            Ok(it) if it.is_finite() => Ok(it),
            _ => Err("float".to_string()),
        })
    }
}

impl Primitive<DateTime<Utc>> {
    /// RFC 3339 timestamps, plus naive `YYYY-MM-DD[( |T)HH:MM:SS]` read as UTC.
    pub fn date() -> Self {
        Primitive::new(PrimitiveTag::Date, |raw| {
            let raw = raw.trim();
            if let Ok(it) = DateTime::parse_from_rfc3339(raw) {
                return Ok(it.with_timezone(&Utc));
            }
            for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(it) = NaiveDateTime::parse_from_str(raw, fmt) {
                    return Ok(it.and_utc());
                }
            }
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|it| it.and_hms_opt(0, 0, 0))
                .map(|it| it.and_utc())
                .ok_or_else(|| "date".to_string())
        })
    }
}

/// A value that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Redacted {
        Redacted(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl Primitive<Redacted> {
    pub fn redacted() -> Self {
        Primitive::new(PrimitiveTag::Redacted, |raw| Ok(Redacted::new(raw)))
    }
}

impl Primitive<(String, String)> {
    /// `key=value`, split on the first `=`. Both sides must be non-empty.
    pub fn key_value_pair() -> Self {
        Primitive::new(PrimitiveTag::KeyValuePair, |raw| match raw.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                Ok((key.to_string(), value.to_string()))
            }
            _ => Err("key=value".to_string()),
        })
    }
}

impl Primitive<()> {
    /// Placeholder decoder for params that take no value at all.
    pub fn none() -> Self {
        Primitive::new(PrimitiveTag::None, |_| Err("does not accept values".to_string()))
    }
}

impl<A: Clone + Send + Sync + 'static> Primitive<A> {
    /// Matches the raw string exactly against `choices`' labels, in order.
    pub fn choice<L: Into<String>>(choices: impl IntoIterator<Item = (L, A)>) -> Self {
        let choices: Vec<(String, A)> =
            choices.into_iter().map(|(label, value)| (label.into(), value)).collect();
        let labels = choices.iter().map(|(label, _)| label.clone()).collect::<Vec<_>>();
        let expected = format!("one of {}", labels.join(" | "));
        Primitive::new(PrimitiveTag::Choice(labels), move |raw| {
            choices
                .iter()
                .find(|(label, _)| label == raw)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| expected.clone())
        })
    }
}
