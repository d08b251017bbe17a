//! # tagcheck-macros
//!
//! `#[derive(Record)]` for the `tagcheck` validation engine.
//!
//! The derive generates a `Record` implementation that declares every field
//! with its rule tag, plus the `FieldType` implementation that lets the
//! record be nested inside other records, `Vec`s, `Option`s and maps.
//!
//! ```ignore
//! use tagcheck::Record;
//!
//! #[derive(Record)]
//! #[validate(name = "User")]
//! pub struct User {
//!     #[validate("required")]
//!     #[serde(rename = "fname")]
//!     first_name: String,
//!
//!     #[validate("required,dive")]
//!     addresses: Vec<Address>,
//!
//!     #[validate(skip)]
//!     internal_id: u64,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod record;
mod support;

/// Derive macro for the `tagcheck::Record` trait.
///
/// # Attributes
///
/// ## Container attributes (`#[validate(...)]` on the struct)
///
/// - `name = "..."` - Root namespace segment (default: the struct ident)
///
/// ## Field attributes
///
/// - `#[validate("...")]` - Rule tag for the field, e.g. `"required,gte=1"`
/// - `#[validate(rules = "...")]` - Same, in key-value form
/// - `#[validate(rename = "...")]` - Declared field name (default: the field ident)
/// - `#[validate(label(key = "value", ...))]` - Extra labels for tag-name functions
/// - `#[validate(skip)]` - Leave the field out of the schema entirely
/// - `#[serde(rename = "...")]` - Recorded as the `serde` label
///
/// Fields without a `#[validate]` attribute are still declared (with an empty
/// tag) so nested records are walked. Their types must implement `FieldType`
/// unless they are skipped.
#[proc_macro_derive(Record, attributes(validate))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive(input)
}
