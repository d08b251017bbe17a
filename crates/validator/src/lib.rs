//! # tagcheck
//!
//! Declarative validation of structured records from per-field rule tags.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tagcheck::prelude::*;
//!
//! #[derive(Record)]
//! struct User {
//!     #[validate("required")]
//!     first_name: String,
//!     #[validate("gte=0,lte=130")]
//!     age: u8,
//!     #[validate("required,email")]
//!     email: String,
//!     #[validate("required,dive,required")]
//!     addresses: Vec<Address>,
//! }
//!
//! let validator = Validator::new();
//! if let Err(Error::Violations(errors)) = validator.validate_record(&user) {
//!     for v in &errors {
//!         println!("{}: {}", v.namespace(), v.tag()); // User.addresses[0].city: required
//!     }
//! }
//! ```
//!
//! ## How it works
//!
//! - A [`Record`] declares its fields and tags once. The first validation
//!   parses and binds them into a cached [`RecordSchema`]; tag mistakes
//!   surface there as [`SchemaError`].
//! - Validation walks the record graph and collects every failed rule as a
//!   [`Violation`], in walk order.
//! - [`ValidatorBuilder`] registers custom rules, aliases, custom types,
//!   struct-level functions and translations before [`ValidatorBuilder::build`]
//!   freezes them.
//!
//! See [`rules`] for the built-in rule set and [`translation`] for messages.

// Violations and schema errors carry owned paths; boxing them would only
// move the allocation.
#![allow(clippy::result_large_err)]

extern crate self as tagcheck;

pub mod config;
pub mod error;
pub mod global;
mod macros;
pub mod prelude;
mod registry;
pub mod rules;
pub mod schema;
pub mod struct_level;
pub mod translation;
pub mod validator;
pub mod value;
pub mod violation;
mod walker;

pub use config::{RegistrationPolicy, ValidatorConfig};
pub use error::{
    BindError, CoercionError, ConfigError, Error, InvalidInputError, RegistrationError,
    SchemaError,
};
pub use rules::{Check, FnRule, Rule, check};
pub use schema::{
    DiveSpec, FieldBuilder, FieldDecl, FieldSpec, Record, RecordSchema, RecordType, RuleChain,
    RuleSpec, SchemaBuilder,
};
pub use struct_level::StructLevel;
pub use translation::{Locale, MessageContext, MessageTemplate, PluralCategory, RenderFn};
pub use validator::{Validator, ValidatorBuilder};
pub use value::{CustomRef, CustomType, FieldKind, FieldType, RecordRef, Value};
pub use violation::{ValidationErrors, Violation, WireViolation};

#[cfg(feature = "derive")]
pub use tagcheck_macros::Record;
