//! Record declarations and derived schemas.
//!
//! A record type describes its fields once, through [`Record::describe`]:
//!
//! ```rust,ignore
//! use tagcheck::{Record, SchemaBuilder};
//!
//! struct User { first_name: String, age: u8 }
//!
//! impl Record for User {
//!     const NAME: &'static str = "User";
//!
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.field("FirstName", |u| &u.first_name).rules("required");
//!         schema.field("Age", |u| &u.age).rules("gte=0,lte=130");
//!     }
//! }
//! ```
//!
//! The declaration is turned into a [`RecordSchema`] the first time the type
//! is validated: tags are parsed, rules are bound to the field kinds and the
//! result is cached for the lifetime of the
//! [`Validator`](crate::Validator). Every declaration mistake surfaces then,
//! as a [`SchemaError`](crate::SchemaError).

mod cache;
mod tag;

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) use cache::SchemaCache;
pub use tag::{DiveSpec, RuleChain, RuleSpec};
pub(crate) use tag::{RuleClass, TagParser};

use crate::value::{FieldKind, FieldType, Value, short_type_name};

// ============================================================================
// RECORD
// ============================================================================

/// A type whose fields are validated from declared rule tags.
///
/// Usually implemented with `#[derive(Record)]`.
pub trait Record: Any + Sized {
    /// Root namespace segment, e.g. `"User"` in `User.Addresses[0].City`.
    const NAME: &'static str;

    /// Declares the record's fields in walk order.
    fn describe(schema: &mut SchemaBuilder<Self>);
}

/// Type identity of a record, usable without the type parameter.
#[derive(Clone, Copy)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
    full_name: &'static str,
    declare: fn() -> Declaration,
}

impl RecordType {
    /// Identity of `R`.
    pub fn of<R: Record>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: R::NAME,
            full_name: std::any::type_name::<R>(),
            declare: declare::<R>,
        }
    }

    /// The Rust type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The record's declared name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Short Rust type name.
    pub fn type_name(&self) -> String {
        short_type_name(self.full_name)
    }

    pub(crate) fn declaration(&self) -> Declaration {
        (self.declare)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("type", &self.full_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn declare<R: Record>() -> Declaration {
    let mut builder = SchemaBuilder::<R>::new();
    R::describe(&mut builder);
    Declaration {
        fields: builder.fields,
    }
}

// ============================================================================
// DECLARATION
// ============================================================================

/// Raw field declarations of one record, before tag parsing.
pub(crate) struct Declaration {
    pub(crate) fields: Vec<FieldDecl>,
}

/// Collects field declarations for a record type.
pub struct SchemaBuilder<R> {
    fields: Vec<FieldDecl>,
    _record: PhantomData<fn(&R)>,
}

impl<R: Record> SchemaBuilder<R> {
    fn new() -> Self {
        Self {
            fields: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Declares a field with an accessor that borrows it from the record.
    ///
    /// The field starts with an empty tag; chain [`FieldBuilder::rules`] to
    /// attach one.
    pub fn field<V, F>(&mut self, name: &'static str, accessor: F) -> FieldBuilder<'_>
    where
        V: FieldType + 'static,
        F: Fn(&R) -> &V + Send + Sync + 'static,
    {
        self.fields.push(FieldDecl {
            name,
            tag: String::new(),
            labels: Vec::new(),
            kind: V::kind(),
            type_name: short_type_name(std::any::type_name::<V>()),
            accessor: Arc::new(FieldAccessor {
                accessor,
                _types: PhantomData,
            }),
        });
        let index = self.fields.len() - 1;
        FieldBuilder {
            decl: &mut self.fields[index],
        }
    }
}

/// Fluent configuration of one declared field.
pub struct FieldBuilder<'s> {
    decl: &'s mut FieldDecl,
}

impl FieldBuilder<'_> {
    /// Sets the rule tag, e.g. `"required,dive,required"`.
    pub fn rules(self, tag: impl Into<String>) -> Self {
        self.decl.tag = tag.into();
        self
    }

    /// Attaches a label, e.g. the serialized name, for tag-name functions.
    pub fn label(self, key: &'static str, value: impl Into<String>) -> Self {
        self.decl.labels.push((key, value.into()));
        self
    }
}

/// A declared field as seen by a tag-name function.
pub struct FieldDecl {
    name: &'static str,
    tag: String,
    labels: Vec<(&'static str, String)>,
    kind: FieldKind,
    type_name: String,
    accessor: Arc<dyn Accessor>,
}

impl FieldDecl {
    /// Declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw rule tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Label value for `key`, if one was attached.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Declared kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Short Rust type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("labels", &self.labels)
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ACCESSORS
// ============================================================================

/// Reads one field out of a type-erased record.
pub(crate) trait Accessor: Send + Sync {
    /// `None` if `record` is not the type the accessor was declared for.
    fn get<'a>(&self, record: &'a dyn Any) -> Option<Value<'a>>;
}

struct FieldAccessor<R, V, F> {
    accessor: F,
    _types: PhantomData<fn(&R) -> &V>,
}

impl<R, V, F> Accessor for FieldAccessor<R, V, F>
where
    R: Any,
    V: FieldType + 'static,
    F: Fn(&R) -> &V + Send + Sync,
{
    fn get<'a>(&self, record: &'a dyn Any) -> Option<Value<'a>> {
        record
            .downcast_ref::<R>()
            .map(|record| (self.accessor)(record).value())
    }
}

// ============================================================================
// DERIVED SCHEMA
// ============================================================================

/// The parsed, bound form of a record declaration.
///
/// Obtained from [`Validator::describe`](crate::Validator::describe).
pub struct RecordSchema {
    pub(crate) ty: RecordType,
    pub(crate) fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Record name.
    pub fn name(&self) -> &'static str {
        self.ty.name
    }

    /// Record type identity.
    pub fn record_type(&self) -> RecordType {
        self.ty
    }

    /// Fields in declaration order, skipped ones included.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks a field up by declared name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.ty.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// One field of a [`RecordSchema`].
pub struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) display_name: String,
    pub(crate) type_name: String,
    pub(crate) kind: FieldKind,
    pub(crate) tag: String,
    pub(crate) skip: bool,
    pub(crate) chain: RuleChain,
    pub(crate) accessor: Arc<dyn Accessor>,
}

impl FieldSpec {
    /// Declared name, used in the struct namespace.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name after the tag-name function, used in the namespace.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Short Rust type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Raw tag text.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `true` when the tag is `-`.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Rules applied to the field value itself.
    pub fn rules(&self) -> &[RuleSpec] {
        self.chain.rules()
    }

    /// `true` when the tag contains `dive`.
    pub fn dives(&self) -> bool {
        self.chain.dive().is_some()
    }

    /// The parsed rule chain.
    pub fn chain(&self) -> &RuleChain {
        &self.chain
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("type", &self.type_name)
            .field("tag", &self.tag)
            .field("skip", &self.skip)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
