//! Violations and their ordered collection.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validator::Validator;

// ============================================================================
// VIOLATION
// ============================================================================

/// One failed rule at one location.
///
/// `namespace` starts at the root record's name and uses display names
/// (after the tag-name function); `struct_namespace` uses declared names.
/// Both index into collections with `[i]` or `[key]`:
///
/// ```text
/// User.Addresses[0].Planet
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub(crate) namespace: String,
    pub(crate) struct_namespace: String,
    pub(crate) field: String,
    pub(crate) struct_field: String,
    pub(crate) tag: String,
    pub(crate) actual_tag: String,
    pub(crate) kind: &'static str,
    pub(crate) type_name: String,
    pub(crate) value: String,
    pub(crate) param: String,
    pub(crate) message: Option<String>,
}

impl Violation {
    /// Full path with display names, e.g. `User.Addresses[0].Planet`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Full path with declared names.
    pub fn struct_namespace(&self) -> &str {
        &self.struct_namespace
    }

    /// Path below the root record, e.g. `Addresses[0].Planet`.
    pub fn field_path(&self) -> &str {
        strip_root(&self.namespace)
    }

    /// Path below the root record, with declared names.
    pub fn struct_field_path(&self) -> &str {
        strip_root(&self.struct_namespace)
    }

    /// Last path segment with display name, e.g. `Planet` or `Tags[2]`.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Last path segment with declared name.
    pub fn struct_field(&self) -> &str {
        &self.struct_field
    }

    /// Tag reported for the failure; the alias name for alias expansions.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The tag that actually ran.
    pub fn actual_tag(&self) -> &str {
        &self.actual_tag
    }

    /// Runtime kind of the offending value (`string`, `int`, `seq`, ...).
    pub fn kind(&self) -> &str {
        self.kind
    }

    /// Declared type of the field, e.g. `u8` or `Vec<Address>`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Rendered offending value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rule parameter, empty if none.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Localized message, once translated.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The locale-independent message.
    pub fn canonical_message(&self) -> String {
        format!(
            "Key: '{}' Error:Field validation for '{}' failed on the '{}' tag",
            self.namespace, self.field, self.tag
        )
    }

    /// Returns the violation carrying a localized `message`.
    pub fn translated(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => f.write_str(&self.canonical_message()),
        }
    }
}

fn strip_root(namespace: &str) -> &str {
    match namespace.find(['.', '[']) {
        Some(i) if namespace.as_bytes()[i] == b'.' => &namespace[i + 1..],
        Some(i) => &namespace[i..],
        None => namespace,
    }
}

// ============================================================================
// WIRE FORM
// ============================================================================

/// Serializable form of a [`Violation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireViolation {
    /// Display-name path.
    pub namespace: String,
    /// Last display-name segment.
    pub field: String,
    /// Declared-name path.
    pub struct_namespace: String,
    /// Last declared-name segment.
    pub struct_field: String,
    /// Reported tag.
    pub tag: String,
    /// Tag that ran.
    pub actual_tag: String,
    /// Runtime kind.
    pub kind: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Rendered value.
    pub value: String,
    /// Rule parameter.
    pub param: String,
    /// Localized message, or the canonical one.
    pub message: String,
}

impl From<&Violation> for WireViolation {
    fn from(v: &Violation) -> Self {
        Self {
            namespace: v.namespace.clone(),
            field: v.field.clone(),
            struct_namespace: v.struct_namespace.clone(),
            struct_field: v.struct_field.clone(),
            tag: v.tag.clone(),
            actual_tag: v.actual_tag.clone(),
            kind: v.kind.to_owned(),
            type_name: v.type_name.clone(),
            value: v.value.clone(),
            param: v.param.clone(),
            message: v.to_string(),
        }
    }
}

// ============================================================================
// COLLECTION
// ============================================================================

/// Ordered violations from one validation call.
///
/// Order is walk order: fields in declaration order, rules in tag order,
/// collection elements in index (or sorted key) order, and struct-level
/// findings after the record's own fields. Never empty when returned inside
/// [`Error::Violations`](crate::Error::Violations).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Appends several violations, keeping their order.
    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    /// Returns `true` if anything was collected.
    pub fn has_errors(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns `true` if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Iterates in walk order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// All violations as a slice.
    pub fn as_slice(&self) -> &[Violation] {
        &self.violations
    }

    /// First violation whose namespace equals `namespace`.
    pub fn find(&self, namespace: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.namespace == namespace)
    }

    /// Violations grouped by namespace, groups in first-seen order.
    pub fn by_namespace(&self) -> IndexMap<&str, Vec<&Violation>> {
        let mut groups: IndexMap<&str, Vec<&Violation>> = IndexMap::new();
        for v in &self.violations {
            groups.entry(v.namespace.as_str()).or_default().push(v);
        }
        groups
    }

    /// Serializable form, one entry per violation.
    pub fn to_wire(&self) -> Vec<WireViolation> {
        self.violations.iter().map(WireViolation::from).collect()
    }

    /// Localized messages grouped by namespace, in walk order.
    ///
    /// A namespace with several violations keeps every message, in the
    /// order the rules failed.
    pub fn translate(&self, validator: &Validator, locale: &str) -> IndexMap<String, Vec<String>> {
        let mut messages: IndexMap<String, Vec<String>> = IndexMap::new();
        for v in &self.violations {
            messages
                .entry(v.namespace.clone())
                .or_default()
                .push(validator.translate(v, locale));
        }
        messages
    }

    /// Every violation with its message populated for `locale`.
    pub fn translated(self, validator: &Validator, locale: &str) -> Self {
        self.violations
            .into_iter()
            .map(|v| {
                let message = validator.translate(&v, locale);
                v.translated(message)
            })
            .collect()
    }

    /// `Ok(value)` when empty, `Err(self)` otherwise.
    pub fn into_result<T>(self, ok_value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(ok_value)
        } else {
            Err(self)
        }
    }
}

impl FromIterator<Violation> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn violation(namespace: &str, field: &str, tag: &str) -> Violation {
        Violation {
            namespace: namespace.to_owned(),
            struct_namespace: namespace.to_owned(),
            field: field.to_owned(),
            struct_field: field.to_owned(),
            tag: tag.to_owned(),
            actual_tag: tag.to_owned(),
            kind: "string",
            type_name: "String".to_owned(),
            value: String::new(),
            param: String::new(),
            message: None,
        }
    }

    #[test]
    fn field_path_strips_root_segment() {
        let v = violation("User.Addresses[0].Street", "Street", "required");
        assert_eq!(v.field_path(), "Addresses[0].Street");

        let v = violation("[2]", "[2]", "email");
        assert_eq!(v.field_path(), "[2]");
    }

    #[test]
    fn canonical_message() {
        let v = violation("User.Age", "Age", "lte");
        assert_eq!(
            v.to_string(),
            "Key: 'User.Age' Error:Field validation for 'Age' failed on the 'lte' tag"
        );
        assert_eq!(v.clone().translated("too old").to_string(), "too old");
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let errors: ValidationErrors = [
            violation("User.Email", "Email", "required"),
            violation("User.Age", "Age", "gte"),
            violation("User.Email", "Email", "email"),
        ]
        .into_iter()
        .collect();

        let groups = errors.by_namespace();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["User.Email", "User.Age"]);
        assert_eq!(groups["User.Email"].len(), 2);
    }

    #[test]
    fn wire_form_uses_type_key() {
        let errors: ValidationErrors = std::iter::once(violation("User.Age", "Age", "lte")).collect();
        let json = serde_json::to_value(errors.to_wire()).unwrap();

        assert_eq!(json[0]["type"], "String");
        assert_eq!(json[0]["structNamespace"], "User.Age");
        assert_eq!(json[0]["actualTag"], "lte");
    }

    #[test]
    fn into_result() {
        assert!(ValidationErrors::new().into_result(1).is_ok());
        let errors: ValidationErrors = std::iter::once(violation("X.a", "a", "required")).collect();
        assert!(errors.into_result(()).is_err());
    }
}
