//! Ordering and equality rules.
//!
//! Numbers compare by value. Text and collections compare by length, text
//! length being counted in characters.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{BindError, Check, Rule, check};
use crate::value::{FieldKind, Value};

/// A parsed comparison operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Threshold {
    Len(usize),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Threshold {
    /// Parses `param` according to what `kind` is compared by.
    pub(crate) fn parse(param: &str, kind: &FieldKind) -> Result<Self, BindError> {
        let param = param.trim();
        if param.is_empty() {
            return Err(BindError::invalid_param("missing comparison value"));
        }
        match kind {
            FieldKind::String | FieldKind::Seq(_) | FieldKind::Map { .. } => param
                .parse()
                .map(Self::Len)
                .map_err(|e| BindError::invalid_param(format!("expected a length: {e}"))),
            FieldKind::Int => param
                .parse()
                .map(Self::Int)
                .map_err(|e| BindError::invalid_param(format!("expected an integer: {e}"))),
            FieldKind::Uint => param
                .parse()
                .map(Self::Uint)
                .map_err(|e| BindError::invalid_param(format!("expected an unsigned integer: {e}"))),
            FieldKind::Float => match param.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Self::Float(n)),
                Ok(_) => Err(BindError::invalid_param("expected a finite number")),
                Err(e) => Err(BindError::invalid_param(format!("expected a number: {e}"))),
            },
            other => Err(BindError::KindMismatch { kind: other.name() }),
        }
    }
}

/// Orders `value` against `threshold`; `None` if they are not comparable.
pub(crate) fn compare(value: &Value<'_>, threshold: Threshold) -> Option<Ordering> {
    match (value, threshold) {
        (Value::Str(_) | Value::Seq(_) | Value::Map(_), Threshold::Len(n)) => {
            value.len().map(|len| len.cmp(&n))
        }
        (Value::Int(v), Threshold::Int(n)) => Some(v.cmp(&n)),
        (Value::Uint(v), Threshold::Uint(n)) => Some(v.cmp(&n)),
        (Value::Int(v), Threshold::Uint(n)) => Some(i128::from(*v).cmp(&i128::from(n))),
        (Value::Uint(v), Threshold::Int(n)) => Some(i128::from(*v).cmp(&i128::from(n))),
        (Value::Float(v), Threshold::Float(n)) => v.partial_cmp(&n),
        (Value::Int(v), Threshold::Float(n)) => (*v as f64).partial_cmp(&n),
        (Value::Uint(v), Threshold::Float(n)) => (*v as f64).partial_cmp(&n),
        (Value::Float(v), Threshold::Int(n)) => v.partial_cmp(&(n as f64)),
        (Value::Float(v), Threshold::Uint(n)) => v.partial_cmp(&(n as f64)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Gte,
    Lte,
    Gt,
    Lt,
    Eq,
}

impl Op {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Gte => ordering.is_ge(),
            Self::Lte => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Lt => ordering.is_lt(),
            Self::Eq => ordering.is_eq(),
        }
    }
}

/// `gte`, `lte`, `gt`, `lt`, `len` and their aliases.
pub(crate) struct Compare {
    op: Op,
}

impl Compare {
    pub(crate) fn new(op: Op) -> Self {
        Self { op }
    }
}

impl Rule for Compare {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        let threshold = Threshold::parse(param, kind)?;
        let op = self.op;
        Ok(check(move |value| match value {
            Value::Absent => true,
            value => compare(value, threshold).is_some_and(|o| op.accepts(o)),
        }))
    }
}

/// `eq` and `ne`.
pub(crate) struct Equality {
    negate: bool,
}

impl Equality {
    pub(crate) fn new(negate: bool) -> Self {
        Self { negate }
    }
}

impl Rule for Equality {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        let negate = self.negate;
        match kind {
            FieldKind::String => {
                let expected = param.to_owned();
                Ok(check(move |value| match value {
                    Value::Absent => true,
                    Value::Str(s) => (&**s == expected.as_str()) != negate,
                    _ => false,
                }))
            }
            FieldKind::Bool => {
                let expected: bool = param.trim().parse().map_err(|e| {
                    BindError::invalid_param(format!("expected `true` or `false`: {e}"))
                })?;
                Ok(check(move |value| match value {
                    Value::Absent => true,
                    Value::Bool(b) => (*b == expected) != negate,
                    _ => false,
                }))
            }
            _ => {
                let threshold = Threshold::parse(param, kind)?;
                Ok(check(move |value| match value {
                    Value::Absent => true,
                    value => compare(value, threshold).is_some_and(|o| o.is_eq() != negate),
                }))
            }
        }
    }
}
