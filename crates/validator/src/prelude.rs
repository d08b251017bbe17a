//! Prelude module for convenient imports.
//!
//! Provides a single `use tagcheck::prelude::*;` import that brings in the
//! validator, record declaration types, violations and translation types.
//!
//! # Examples
//!
//! ```rust,ignore
//! use tagcheck::prelude::*;
//!
//! let validator = Validator::new();
//! validator.validate_value(&"a@b.co".to_owned(), "required,email")?;
//! ```

// ============================================================================
// VALIDATOR
// ============================================================================

pub use crate::config::{RegistrationPolicy, ValidatorConfig};
pub use crate::validator::{Validator, ValidatorBuilder};

// ============================================================================
// RECORDS AND VALUES
// ============================================================================

pub use crate::schema::{FieldDecl, Record, RecordSchema, SchemaBuilder};
pub use crate::struct_level::StructLevel;
pub use crate::value::{FieldKind, FieldType, Value};
pub use crate::{custom_field_type, record_field_type};

// ============================================================================
// RULES
// ============================================================================

pub use crate::rules::{Check, FnRule, Rule, check};

// ============================================================================
// ERRORS AND MESSAGES
// ============================================================================

pub use crate::error::{
    BindError, CoercionError, Error, InvalidInputError, RegistrationError, SchemaError,
};
pub use crate::translation::{Locale, MessageContext, MessageTemplate};
pub use crate::violation::{ValidationErrors, Violation};

#[cfg(feature = "derive")]
pub use tagcheck_macros::Record;
