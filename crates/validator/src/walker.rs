//! Walks a record graph against its schemas and collects violations.
//!
//! Per field, in order:
//!
//! 1. custom values are coerced through their registered extraction;
//! 2. an empty value fails `required` and nothing else runs, or is skipped
//!    entirely under `omitempty`;
//! 3. every other rule runs, each failure recorded independently;
//! 4. `dive` walks each element (and key block) with the element chain;
//!    otherwise a nested record is walked with its own schema.
//!
//! Struct-level functions for a record run after all its fields.

use tracing::trace;

use crate::error::{Error, InvalidInputError};
use crate::registry::Registry;
use crate::schema::{DiveSpec, RuleChain, RuleSpec, SchemaCache};
use crate::struct_level::StructLevel;
use crate::value::{RecordRef, Value};
use crate::violation::{ValidationErrors, Violation};

/// Where the walker currently is.
#[derive(Debug, Clone, Default)]
pub(crate) struct Location {
    pub(crate) namespace: String,
    pub(crate) struct_namespace: String,
    pub(crate) field: String,
    pub(crate) struct_field: String,
}

impl Location {
    /// The root of a record walk.
    pub(crate) fn root(name: &str) -> Self {
        Self {
            namespace: name.to_owned(),
            struct_namespace: name.to_owned(),
            field: String::new(),
            struct_field: String::new(),
        }
    }

    /// A named field below this location.
    pub(crate) fn field(&self, display: &str, declared: &str) -> Self {
        Self {
            namespace: join(&self.namespace, display),
            struct_namespace: join(&self.struct_namespace, declared),
            field: display.to_owned(),
            struct_field: declared.to_owned(),
        }
    }

    /// A collection element (`[i]` or `[key]`) below this location.
    fn element(&self, segment: &str) -> Self {
        let segment = format!("[{segment}]");
        Self {
            namespace: format!("{}{segment}", self.namespace),
            struct_namespace: format!("{}{segment}", self.struct_namespace),
            field: format!("{}{segment}", self.field),
            struct_field: format!("{}{segment}", self.struct_field),
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

pub(crate) struct Walker<'v> {
    registry: &'v Registry,
    schemas: &'v SchemaCache,
    errors: ValidationErrors,
}

impl<'v> Walker<'v> {
    pub(crate) fn new(registry: &'v Registry, schemas: &'v SchemaCache) -> Self {
        Self {
            registry,
            schemas,
            errors: ValidationErrors::new(),
        }
    }

    /// Violations collected so far, as the final result.
    pub(crate) fn finish(self) -> Result<(), Error> {
        self.errors.into_result(()).map_err(Error::Violations)
    }

    /// Walks every field of `record`, then its struct-level functions.
    pub(crate) fn record(&mut self, record: RecordRef<'_>, at: &Location) -> Result<(), Error> {
        let schema = self.schemas.get_or_derive(record.ty, self.registry)?;
        trace!(record = schema.name(), namespace = %at.namespace, "walking record");

        for field in schema.fields().iter().filter(|f| !f.is_skipped()) {
            let Some(value) = field.accessor.get(record.any) else {
                return Err(InvalidInputError::TypeMismatch {
                    namespace: at.namespace.clone(),
                    expected: schema.name(),
                }
                .into());
            };
            let here = at.field(field.display_name(), field.name());
            self.value(field.chain(), value, &here, field.type_name())?;
        }

        let registry = self.registry;
        let checks = registry.struct_levels(record.ty.id());
        if !checks.is_empty() {
            let mut level = StructLevel::new(at, &mut self.errors);
            for check in checks {
                check.run(record.any, &mut level);
            }
        }
        Ok(())
    }

    /// Applies `chain` to one value at `at`.
    pub(crate) fn value(
        &mut self,
        chain: &RuleChain,
        value: Value<'_>,
        at: &Location,
        type_name: &str,
    ) -> Result<(), Error> {
        let value = self.registry.coerce(value);

        if value.is_empty() {
            if let Some(required) = chain.required() {
                self.report(required, &value, at, type_name);
                return Ok(());
            }
            if chain.omits_empty() {
                return Ok(());
            }
        }

        for rule in chain.checks() {
            if !rule.passes(&value) {
                self.report(rule, &value, at, type_name);
            }
        }

        if let Some(dive) = chain.dive() {
            return self.dive(dive, value, at);
        }
        if let Value::Record(record) = value {
            self.record(record, at)?;
        }
        Ok(())
    }

    fn dive(&mut self, dive: &DiveSpec, value: Value<'_>, at: &Location) -> Result<(), Error> {
        match value {
            Value::Seq(items) => {
                for (i, item) in items.into_iter().enumerate() {
                    let here = at.element(&i.to_string());
                    self.value(dive.elements(), item, &here, dive.element_type())?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                for (key, item) in entries {
                    let here = at.element(&key.to_string());
                    if let Some(keys) = dive.keys() {
                        self.value(keys, key, &here, dive.key_type().unwrap_or_default())?;
                    }
                    self.value(dive.elements(), item, &here, dive.element_type())?;
                }
                Ok(())
            }
            Value::Absent => Err(InvalidInputError::AbsentDiveTarget {
                namespace: at.namespace.clone(),
            }
            .into()),
            other => Err(InvalidInputError::NotDivable {
                namespace: at.namespace.clone(),
                kind: other.kind_name(),
            }
            .into()),
        }
    }

    fn report(&mut self, rule: &RuleSpec, value: &Value<'_>, at: &Location, type_name: &str) {
        trace!(namespace = %at.namespace, tag = rule.tag(), "rule failed");
        self.errors.add(Violation {
            namespace: at.namespace.clone(),
            struct_namespace: at.struct_namespace.clone(),
            field: at.field.clone(),
            struct_field: at.struct_field.clone(),
            tag: rule.tag().to_owned(),
            actual_tag: rule.actual_tag().to_owned(),
            kind: value.kind_name(),
            type_name: type_name.to_owned(),
            value: value.to_string(),
            param: rule.param().to_owned(),
            message: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_extend_both_namespaces() {
        let root = Location::root("User");
        let field = root.field("fname", "FirstName");
        assert_eq!(field.namespace, "User.fname");
        assert_eq!(field.struct_namespace, "User.FirstName");

        let element = root.field("Addresses", "Addresses").element("1");
        assert_eq!(element.namespace, "User.Addresses[1]");
        assert_eq!(element.field, "Addresses[1]");
    }

    #[test]
    fn detached_root_has_no_leading_dot() {
        let field = Location::default().field("email", "email");
        assert_eq!(field.namespace, "email");
        assert_eq!(Location::default().element("0").namespace, "[0]");
    }
}
