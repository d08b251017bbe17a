//! Rules and the built-in rule set.
//!
//! A [`Rule`] is registered under a name. When a schema is derived, each tag
//! token is *bound*: the rule receives the raw parameter and the field's
//! effective kind, and returns a [`Check`] ready to run against values, or a
//! [`BindError`] that becomes a [`SchemaError`](crate::SchemaError).
//!
//! Checks treat [`Value::Absent`] as vacuously valid. Whether a missing value
//! is acceptable is decided by `required` alone.
//!
//! # Built-in rules
//!
//! | Rule | Kinds | Meaning |
//! |------|-------|---------|
//! | `gte` / `min`, `lte` / `max`, `gt`, `lt` | numbers, text, collections | compare value or length |
//! | `len` | numbers, text, collections | exact value or length |
//! | `eq`, `ne` | bool, numbers, text, collections | equality (text compares content) |
//! | `oneof` | text, integers | value is one of a space-separated list |
//! | `email`, `url`, `uuid` | text | format |
//! | `hexcolor`, `rgb`, `rgba`, `hsl`, `hsla` | text | color notations |
//! | `alpha`, `alphanum`, `numeric` | text | character classes |
//! | `lowercase`, `uppercase` | text | letter case |
//! | `contains`, `startswith`, `endswith` | text | substring |
//!
//! Built-in alias: `iscolor` = `hexcolor|rgb|rgba|hsl|hsla`.

mod compare;
mod format;
mod text;

use std::sync::Arc;

pub use crate::error::BindError;
use crate::registry::Registry;
use crate::value::{FieldKind, Value};

/// A named constraint that can be bound to a field.
pub trait Rule: Send + Sync {
    /// Binds the rule to a parameter and effective field kind.
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError>;
}

/// A bound rule, ready to evaluate values.
pub trait Check: Send + Sync {
    /// `true` if `value` satisfies the rule.
    fn check(&self, value: &Value<'_>) -> bool;
}

impl<F> Check for F
where
    F: Fn(&Value<'_>) -> bool + Send + Sync,
{
    fn check(&self, value: &Value<'_>) -> bool {
        self(value)
    }
}

/// Wraps a closure as a [`Check`].
pub fn check<F>(f: F) -> Arc<dyn Check>
where
    F: Fn(&Value<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A rule backed by a plain function of value and parameter.
///
/// Binds to every kind; the function sees the raw parameter on each call.
pub struct FnRule<F> {
    f: Arc<F>,
}

impl<F> FnRule<F>
where
    F: Fn(&Value<'_>, &str) -> bool + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Value<'_>, &str) -> bool + Send + Sync + 'static,
{
    fn bind(&self, param: &str, _kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        let f = Arc::clone(&self.f);
        let param = param.to_owned();
        Ok(check(move |value| (*f)(value, &param)))
    }
}

/// Installs the built-in rules and aliases.
pub(crate) fn register_builtins(registry: &mut Registry) {
    use compare::{Compare, Equality, Op};
    use format::Format;
    use text::{CharClass, Case, OneOf, Substring};

    registry.install_rule("gte", Compare::new(Op::Gte));
    registry.install_rule("min", Compare::new(Op::Gte));
    registry.install_rule("lte", Compare::new(Op::Lte));
    registry.install_rule("max", Compare::new(Op::Lte));
    registry.install_rule("gt", Compare::new(Op::Gt));
    registry.install_rule("lt", Compare::new(Op::Lt));
    registry.install_rule("len", Compare::new(Op::Eq));
    registry.install_rule("eq", Equality::new(false));
    registry.install_rule("ne", Equality::new(true));
    registry.install_rule("oneof", OneOf);

    for format in Format::ALL {
        registry.install_rule(format.name(), *format);
    }

    registry.install_rule("alpha", CharClass::Alpha);
    registry.install_rule("alphanum", CharClass::Alphanumeric);
    registry.install_rule("numeric", CharClass::Numeric);
    registry.install_rule("lowercase", Case::Lower);
    registry.install_rule("uppercase", Case::Upper);
    registry.install_rule("contains", Substring::Contains);
    registry.install_rule("startswith", Substring::StartsWith);
    registry.install_rule("endswith", Substring::EndsWith);

    registry.install_alias("iscolor", "hexcolor|rgb|rgba|hsl|hsla");
}

/// Fails binding unless the kind is text.
fn require_string(kind: &FieldKind) -> Result<(), BindError> {
    match kind {
        FieldKind::String => Ok(()),
        other => Err(BindError::KindMismatch { kind: other.name() }),
    }
}

/// Fails binding when a parameter-less rule is given one.
fn require_no_param(param: &str) -> Result<(), BindError> {
    if param.is_empty() {
        Ok(())
    } else {
        Err(BindError::invalid_param("rule takes no parameter"))
    }
}
