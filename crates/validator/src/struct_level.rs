//! Record-level (cross-field) validation.
//!
//! A struct-level function runs after all of a record's fields have been
//! walked and can report additional violations:
//!
//! ```rust,ignore
//! builder.register_struct_level(|user: &User, level: &mut StructLevel<'_>| {
//!     if user.first_name.is_empty() && user.last_name.is_empty() {
//!         level.report_error(&user.first_name, "fname", "FirstName", "fnameorlname", "");
//!         level.report_error(&user.last_name, "lname", "LastName", "fnameorlname", "");
//!     }
//! });
//! ```

use crate::value::{FieldType, Value, short_type_name};
use crate::violation::{ValidationErrors, Violation};
use crate::walker::Location;

/// Reporting handle passed to struct-level functions.
pub struct StructLevel<'w> {
    at: &'w Location,
    errors: &'w mut ValidationErrors,
}

impl<'w> StructLevel<'w> {
    pub(crate) fn new(at: &'w Location, errors: &'w mut ValidationErrors) -> Self {
        Self { at, errors }
    }

    /// Namespace of the record being validated.
    pub fn namespace(&self) -> &str {
        &self.at.namespace
    }

    /// Struct namespace of the record being validated.
    pub fn struct_namespace(&self) -> &str {
        &self.at.struct_namespace
    }

    /// Reports a violation against a field of the current record.
    ///
    /// `field` extends the namespace and `struct_field` the struct
    /// namespace; either may be empty, in which case the other is used.
    pub fn report_error<V: FieldType>(
        &mut self,
        value: &V,
        field: &str,
        struct_field: &str,
        tag: &str,
        param: &str,
    ) {
        let type_name = short_type_name(std::any::type_name::<V>());
        self.report_value(&value.value(), &type_name, field, struct_field, tag, param);
    }

    /// Like [`report_error`](Self::report_error), for an already-built value.
    pub fn report_value(
        &mut self,
        value: &Value<'_>,
        type_name: &str,
        field: &str,
        struct_field: &str,
        tag: &str,
        param: &str,
    ) {
        let (field, struct_field) = match (field.is_empty(), struct_field.is_empty()) {
            (true, false) => (struct_field, struct_field),
            (false, true) => (field, field),
            _ => (field, struct_field),
        };
        let at = self.at.field(field, struct_field);
        self.errors.add(Violation {
            namespace: at.namespace,
            struct_namespace: at.struct_namespace,
            field: at.field,
            struct_field: at.struct_field,
            tag: tag.to_owned(),
            actual_tag: tag.to_owned(),
            kind: value.kind_name(),
            type_name: type_name.to_owned(),
            value: value.to_string(),
            param: param.to_owned(),
            message: None,
        });
    }
}
