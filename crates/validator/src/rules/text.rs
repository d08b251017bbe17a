//! Text content rules and `oneof`.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::{BindError, Check, Rule, check, require_no_param, require_string};
use crate::value::{FieldKind, Value};

static ONEOF_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[^']*'|\S+").unwrap());

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

// ============================================================================
// ONEOF
// ============================================================================

/// `oneof='red green' blue`: the value must equal one of the listed items.
///
/// Items are separated by whitespace; single quotes group an item that
/// contains spaces.
pub(crate) struct OneOf;

fn split_items(param: &str) -> Vec<String> {
    ONEOF_SPLIT_REGEX
        .find_iter(param)
        .map(|m| {
            let item = m.as_str();
            item.strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(item)
                .to_owned()
        })
        .collect()
}

impl Rule for OneOf {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        let items = split_items(param);
        if items.is_empty() {
            return Err(BindError::invalid_param("expected at least one value"));
        }

        match kind {
            FieldKind::String => Ok(check(move |value| match value {
                Value::Absent => true,
                Value::Str(s) => items.iter().any(|item| *item == **s),
                _ => false,
            })),
            FieldKind::Int => {
                let allowed = parse_all::<i64>(&items)?;
                Ok(check(move |value| match value {
                    Value::Absent => true,
                    Value::Int(n) => allowed.contains(n),
                    _ => false,
                }))
            }
            FieldKind::Uint => {
                let allowed = parse_all::<u64>(&items)?;
                Ok(check(move |value| match value {
                    Value::Absent => true,
                    Value::Uint(n) => allowed.contains(n),
                    _ => false,
                }))
            }
            other => Err(BindError::KindMismatch { kind: other.name() }),
        }
    }
}

fn parse_all<T>(items: &[String]) -> Result<Vec<T>, BindError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    items
        .iter()
        .map(|item| {
            item.parse()
                .map_err(|e| BindError::invalid_param(format!("`{item}` is not a valid number: {e}")))
        })
        .collect()
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

/// `alpha`, `alphanum`, `numeric`. Empty text fails.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CharClass {
    Alpha,
    Alphanumeric,
    Numeric,
}

impl CharClass {
    fn matches(self, s: &str) -> bool {
        match self {
            Self::Alpha => !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()),
            Self::Alphanumeric => !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()),
            Self::Numeric => NUMERIC_REGEX.is_match(s),
        }
    }
}

impl Rule for CharClass {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        require_string(kind)?;
        require_no_param(param)?;
        let class = *self;
        Ok(check(move |value| match value {
            Value::Absent => true,
            Value::Str(s) => class.matches(s),
            _ => false,
        }))
    }
}

/// `lowercase`, `uppercase`. Empty text fails.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Case {
    Lower,
    Upper,
}

impl Rule for Case {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        require_string(kind)?;
        require_no_param(param)?;
        let case = *self;
        Ok(check(move |value| match value {
            Value::Absent => true,
            Value::Str(s) if s.is_empty() => false,
            Value::Str(s) => match case {
                Case::Lower => s.to_lowercase() == **s,
                Case::Upper => s.to_uppercase() == **s,
            },
            _ => false,
        }))
    }
}

// ============================================================================
// SUBSTRINGS
// ============================================================================

/// `contains`, `startswith`, `endswith`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Substring {
    Contains,
    StartsWith,
    EndsWith,
}

impl Rule for Substring {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        require_string(kind)?;
        if param.is_empty() {
            return Err(BindError::invalid_param("expected the text to look for"));
        }
        let needle = param.to_owned();
        let mode = *self;
        Ok(check(move |value| match value {
            Value::Absent => true,
            Value::Str(s) => match mode {
                Substring::Contains => s.contains(needle.as_str()),
                Substring::StartsWith => s.starts_with(needle.as_str()),
                Substring::EndsWith => s.ends_with(needle.as_str()),
            },
            _ => false,
        }))
    }
}
