//! Macros for declaring field types with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`record_field_type!`]: let a hand-written [`Record`](crate::Record) be
//!   used as a field (nested, in collections, optional)
//! - [`custom_field_type!`]: mark a type as a custom value, resolved through
//!   [`ValidatorBuilder::register_custom_type`](crate::ValidatorBuilder::register_custom_type)
//!
//! `#[derive(Record)]` already implements [`FieldType`](crate::FieldType) for
//! the record, so [`record_field_type!`] is only needed for manual impls.
//!
//! # Examples
//!
//! ```rust,ignore
//! use tagcheck::{Record, SchemaBuilder, custom_field_type, record_field_type};
//!
//! struct Address { city: String }
//!
//! impl Record for Address {
//!     const NAME: &'static str = "Address";
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.field("City", |a| &a.city).rules("required");
//!     }
//! }
//! record_field_type!(Address);
//!
//! struct NullString { value: String, valid: bool }
//! custom_field_type!(NullString);
//! ```

// ============================================================================
// RECORD FIELDS
// ============================================================================

/// Implements [`FieldType`](crate::FieldType) for one or more record types.
#[macro_export]
macro_rules! record_field_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::FieldType for $ty {
                fn kind() -> $crate::FieldKind {
                    $crate::FieldKind::record::<Self>()
                }

                fn value(&self) -> $crate::Value<'_> {
                    $crate::Value::record(self)
                }
            }
        )+
    };
}

// ============================================================================
// CUSTOM FIELDS
// ============================================================================

/// Implements [`FieldType`](crate::FieldType) for one or more custom types.
///
/// Without a registered coercion the type is opaque: only `required`,
/// `omitempty` and user rules apply to it, and `required` treats it as
/// always present.
#[macro_export]
macro_rules! custom_field_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::FieldType for $ty {
                fn kind() -> $crate::FieldKind {
                    $crate::FieldKind::custom::<Self>()
                }

                fn value(&self) -> $crate::Value<'_> {
                    $crate::Value::custom(self)
                }
            }
        )+
    };
}
