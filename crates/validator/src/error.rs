//! Error types.
//!
//! Three failure families are kept apart:
//!
//! - [`ValidationErrors`]: the input was walked and broke one or more rules.
//! - [`InvalidInputError`]: the input could not be walked at all.
//! - [`SchemaError`]: a declaration is malformed; detected when the record's
//!   schema is first derived, never per-violation.
//!
//! [`RegistrationError`] and [`ConfigError`] are reported while a
//! [`ValidatorBuilder`](crate::ValidatorBuilder) is being assembled.

use crate::violation::ValidationErrors;

/// Top-level error returned by every validation entry point.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input broke at least one rule.
    #[error(transparent)]
    Violations(#[from] ValidationErrors),

    /// The input could not be validated.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// A record declaration is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Error {
    /// The collected violations, if this is a rule failure.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Violations(errors) => Some(errors),
            _ => None,
        }
    }

    /// Consumes the error and returns the violations, if any.
    pub fn into_violations(self) -> Option<ValidationErrors> {
        match self {
            Self::Violations(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns `true` for malformed-input failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` for declaration failures.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

/// The validated input cannot be walked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInputError {
    /// `validate_dyn` was handed an absent value.
    #[error("cannot validate an absent value")]
    AbsentRoot,

    /// `validate_dyn` was handed something other than a record.
    #[error("expected a record, got a {kind} value")]
    NotARecord {
        /// Runtime kind of the value that was passed.
        kind: &'static str,
    },

    /// A `dive` reached an absent collection.
    #[error("cannot dive into absent value at '{namespace}'")]
    AbsentDiveTarget {
        /// Namespace of the absent field.
        namespace: String,
    },

    /// A `dive` reached a value that is not a collection.
    #[error("cannot dive into {kind} value at '{namespace}'")]
    NotDivable {
        /// Namespace of the offending field.
        namespace: String,
        /// Runtime kind found there.
        kind: &'static str,
    },

    /// A record reference did not match the schema it was walked with.
    #[error("record value at '{namespace}' is not a `{expected}`")]
    TypeMismatch {
        /// Namespace of the record.
        namespace: String,
        /// Record name the schema was derived for.
        expected: &'static str,
    },
}

/// A record declaration cannot be turned into a schema.
///
/// Every variant names the record and field so the offending declaration can
/// be located without a backtrace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The tag references a rule nobody registered.
    #[error("{record}.{field}: unknown rule `{rule}` in tag \"{tag}\"")]
    UnknownRule {
        /// Record name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The full tag.
        tag: String,
        /// The rule name that failed to resolve.
        rule: String,
    },

    /// A rule parameter cannot be parsed for the field's kind.
    #[error(
        "{record}.{field}: invalid parameter \"{param}\" for rule `{rule}` in tag \"{tag}\": {reason}"
    )]
    InvalidParam {
        /// Record name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The full tag.
        tag: String,
        /// Rule name.
        rule: String,
        /// Raw parameter text.
        param: String,
        /// Why the parameter was rejected.
        reason: String,
    },

    /// A rule was applied to a field kind it cannot check.
    #[error("{record}.{field}: rule `{rule}` in tag \"{tag}\" cannot be applied to a {kind} field")]
    KindMismatch {
        /// Record name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The full tag.
        tag: String,
        /// Rule name.
        rule: String,
        /// Effective kind of the field.
        kind: &'static str,
    },

    /// `dive` on a field that is not a sequence or map.
    #[error("{record}.{field}: `dive` in tag \"{tag}\" requires a sequence or map, found {kind}")]
    InvalidDive {
        /// Record name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The full tag.
        tag: String,
        /// Effective kind of the field.
        kind: &'static str,
    },

    /// The tag violates the tag grammar.
    #[error("{record}.{field}: malformed tag \"{tag}\": {reason}")]
    Malformed {
        /// Record name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The full tag.
        tag: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Records reference each other by value in a loop.
    #[error("record cycle detected: {path}")]
    Cycle {
        /// The loop, e.g. `Node -> Node`.
        path: String,
    },
}

/// A registration was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Name already taken and the policy is
    /// [`Reject`](crate::config::RegistrationPolicy::Reject).
    #[error("{what} `{name}` is already registered")]
    Duplicate {
        /// What was being registered (`rule`, `alias`, `custom type`).
        what: &'static str,
        /// The conflicting name.
        name: String,
    },

    /// Name collides with a structural keyword or contains a tag delimiter.
    #[error("`{name}` cannot be used as a rule name")]
    Reserved {
        /// The rejected name.
        name: String,
    },

    /// Alias expansion text is unusable.
    #[error("alias `{name}` has invalid expansion \"{expansion}\": {reason}")]
    InvalidAlias {
        /// Alias name.
        name: String,
        /// Expansion text.
        expansion: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A custom type was mapped onto another opaque custom type.
    #[error("custom type `{type_name}` must map onto a concrete kind, not {kind}")]
    OpaqueUnderlying {
        /// Rust type name being registered.
        type_name: &'static str,
        /// Kind that was given.
        kind: &'static str,
    },
}

/// Validator configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document is malformed or has unknown fields.
    #[error("invalid validator configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field value is out of range.
    #[error("invalid validator configuration: {0}")]
    Invalid(String),
}

/// A custom-type extraction function could not produce a value.
///
/// The walker treats the field as absent and logs the reason at `debug`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CoercionError(String);

impl CoercionError {
    /// Creates an extraction error with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Why a rule refused to bind to a field.
///
/// Returned by [`Rule::bind`](crate::rules::Rule::bind); the schema deriver
/// attaches record and field context and converts it into a [`SchemaError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// The rule does not apply to this kind.
    #[error("rule cannot be applied to a {kind} field")]
    KindMismatch {
        /// Effective kind of the field.
        kind: &'static str,
    },

    /// The parameter does not parse.
    #[error("{0}")]
    InvalidParam(String),
}

impl BindError {
    /// Shorthand for [`BindError::InvalidParam`].
    pub fn invalid_param(reason: impl Into<String>) -> Self {
        Self::InvalidParam(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_record_and_field() {
        let err = SchemaError::UnknownRule {
            record: "User",
            field: "Email",
            tag: "required,emial".to_owned(),
            rule: "emial".to_owned(),
        };

        let rendered = err.to_string();
        assert!(rendered.contains("User.Email"));
        assert!(rendered.contains("`emial`"));
    }

    #[test]
    fn error_classification() {
        let err = Error::from(InvalidInputError::AbsentRoot);
        assert!(err.is_invalid_input());
        assert!(!err.is_schema());
        assert!(err.violations().is_none());
    }
}
