//! Runtime value model.
//!
//! Rules never see user types directly. A field accessor hands the walker a
//! [`Value`] borrowed from the record, and every rule checks that.
//!
//! [`FieldType`] connects a Rust type to its static [`FieldKind`] (used when
//! the schema is derived) and to its runtime [`Value`] (used when walking).
//! It is implemented for the scalar types, `String`, `Option`, `Box`, `Vec`
//! and the map types. Records get it from `#[derive(Record)]` or
//! [`record_field_type!`](crate::record_field_type); opaque wrapper types
//! from [`custom_field_type!`](crate::custom_field_type).

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;

use crate::schema::{Record, RecordType};

// ============================================================================
// FIELD KIND
// ============================================================================

/// The static shape of a declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `bool`.
    Bool,
    /// Signed integers.
    Int,
    /// Unsigned integers.
    Uint,
    /// `f32` / `f64`.
    Float,
    /// Text.
    String,
    /// A value that may be absent.
    Option(Box<FieldKind>),
    /// An ordered sequence.
    Seq(Box<FieldKind>),
    /// A keyed map.
    Map {
        /// Key kind.
        key: Box<FieldKind>,
        /// Value kind.
        value: Box<FieldKind>,
    },
    /// A nested record.
    Record(RecordType),
    /// A user type, opaque unless coerced through a registered extraction.
    Custom(CustomType),
}

impl FieldKind {
    /// Kind of a nested record.
    pub fn record<R: Record>() -> Self {
        Self::Record(RecordType::of::<R>())
    }

    /// Kind of an opaque user type.
    pub fn custom<T: Any>() -> Self {
        Self::Custom(CustomType::of::<T>())
    }

    /// Short kind name used in errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Option(_) => "option",
            Self::Seq(_) => "seq",
            Self::Map { .. } => "map",
            Self::Record(_) => "record",
            Self::Custom(_) => "custom",
        }
    }

    /// Human-readable type label, e.g. `Vec<Address>`.
    pub fn label(&self) -> String {
        match self {
            Self::Option(inner) => format!("Option<{}>", inner.label()),
            Self::Seq(inner) => format!("Vec<{}>", inner.label()),
            Self::Map { key, value } => format!("Map<{}, {}>", key.label(), value.label()),
            Self::Record(ty) => ty.type_name(),
            Self::Custom(ty) => ty.name(),
            other => other.name().to_owned(),
        }
    }
}

/// Identity of an opaque user type.
#[derive(Debug, Clone, Copy)]
pub struct CustomType {
    id: TypeId,
    full_name: &'static str,
}

impl CustomType {
    /// Identity of `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// The Rust type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name.
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Short type name, e.g. `NullString`.
    pub fn name(&self) -> String {
        short_type_name(self.full_name)
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// A field value as seen by rules.
///
/// `Absent` stands for "no value": a `None`, or a custom type whose
/// extraction failed or reported nothing.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// No value.
    Absent,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Float.
    Float(f64),
    /// Text.
    Str(Cow<'a, str>),
    /// Sequence elements in order.
    Seq(Vec<Value<'a>>),
    /// Map entries in walk order.
    Map(Vec<(Value<'a>, Value<'a>)>),
    /// A nested record.
    Record(RecordRef<'a>),
    /// An opaque user value.
    Custom(CustomRef<'a>),
}

impl<'a> Value<'a> {
    /// Borrows a record.
    pub fn record<R: Record>(record: &'a R) -> Self {
        Self::Record(RecordRef {
            any: record,
            ty: RecordType::of::<R>(),
        })
    }

    /// Borrows an opaque user value.
    pub fn custom<T: Any>(value: &'a T) -> Self {
        Self::Custom(CustomRef {
            any: value,
            ty: CustomType::of::<T>(),
        })
    }

    /// Borrowed text.
    pub fn str(text: &'a str) -> Self {
        Self::Str(Cow::Borrowed(text))
    }

    /// Owned text.
    pub fn string(text: impl Into<String>) -> Self {
        Self::Str(Cow::Owned(text.into()))
    }

    /// Runtime kind name, reported in violations.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Seq(_) => "seq",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Custom(_) => "custom",
        }
    }

    /// `true` for absent values and zero values of their kind.
    ///
    /// Records and opaque custom values are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Uint(n) => *n == 0,
            Self::Float(n) => *n == 0.0,
            Self::Str(s) => s.is_empty(),
            Self::Seq(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Record(_) | Self::Custom(_) => false,
        }
    }

    /// `true` only for [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Character count for text, element count for collections.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::Seq(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Text content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("<absent>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("map[")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
            Self::Record(record) => write!(f, "{}{{..}}", record.ty.name()),
            Self::Custom(custom) => write!(f, "{}{{..}}", custom.ty.name()),
        }
    }
}

/// A borrowed record together with its type identity.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    pub(crate) any: &'a dyn Any,
    pub(crate) ty: RecordType,
}

impl RecordRef<'_> {
    /// The record's type.
    pub fn record_type(&self) -> RecordType {
        self.ty
    }
}

/// A borrowed opaque user value together with its type identity.
#[derive(Debug, Clone, Copy)]
pub struct CustomRef<'a> {
    pub(crate) any: &'a dyn Any,
    pub(crate) ty: CustomType,
}

impl<'a> CustomRef<'a> {
    /// The value's type.
    pub fn custom_type(&self) -> CustomType {
        self.ty
    }

    /// Downcasts to the concrete type.
    pub fn downcast<T: Any>(&self) -> Option<&'a T> {
        self.any.downcast_ref()
    }
}

// ============================================================================
// FIELD TYPE
// ============================================================================

/// A Rust type that can appear as a record field.
pub trait FieldType {
    /// Static shape, inspected when the schema is derived.
    fn kind() -> FieldKind
    where
        Self: Sized;

    /// Runtime value borrowed from `self`.
    fn value(&self) -> Value<'_>;
}

macro_rules! signed_field_type {
    ($($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                fn kind() -> FieldKind {
                    FieldKind::Int
                }

                fn value(&self) -> Value<'_> {
                    Value::Int(*self as i64)
                }
            }
        )+
    };
}

macro_rules! unsigned_field_type {
    ($($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                fn kind() -> FieldKind {
                    FieldKind::Uint
                }

                fn value(&self) -> Value<'_> {
                    Value::Uint(*self as u64)
                }
            }
        )+
    };
}

signed_field_type!(i8, i16, i32, i64, isize);
unsigned_field_type!(u8, u16, u32, u64, usize);

impl FieldType for f32 {
    fn kind() -> FieldKind {
        FieldKind::Float
    }

    fn value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl FieldType for f64 {
    fn kind() -> FieldKind {
        FieldKind::Float
    }

    fn value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl FieldType for bool {
    fn kind() -> FieldKind {
        FieldKind::Bool
    }

    fn value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl FieldType for String {
    fn kind() -> FieldKind {
        FieldKind::String
    }

    fn value(&self) -> Value<'_> {
        Value::str(self)
    }
}

impl FieldType for &str {
    fn kind() -> FieldKind {
        FieldKind::String
    }

    fn value(&self) -> Value<'_> {
        Value::str(self)
    }
}

impl FieldType for Cow<'_, str> {
    fn kind() -> FieldKind {
        FieldKind::String
    }

    fn value(&self) -> Value<'_> {
        Value::str(self)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Option(Box::new(T::kind()))
    }

    fn value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.value(),
            None => Value::Absent,
        }
    }
}

impl<T: FieldType> FieldType for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn value(&self) -> Value<'_> {
        (**self).value()
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::Seq(Box::new(T::kind()))
    }

    fn value(&self) -> Value<'_> {
        Value::Seq(self.iter().map(FieldType::value).collect())
    }
}

impl<K: FieldType, V: FieldType> FieldType for BTreeMap<K, V> {
    fn kind() -> FieldKind {
        map_kind::<K, V>()
    }

    fn value(&self) -> Value<'_> {
        Value::Map(self.iter().map(|(k, v)| (k.value(), v.value())).collect())
    }
}

impl<K: FieldType, V: FieldType, S> FieldType for IndexMap<K, V, S> {
    fn kind() -> FieldKind {
        map_kind::<K, V>()
    }

    fn value(&self) -> Value<'_> {
        Value::Map(self.iter().map(|(k, v)| (k.value(), v.value())).collect())
    }
}

/// Entries are walked in ascending order of the rendered key so violation
/// order does not depend on the hasher.
impl<K: FieldType, V: FieldType, S> FieldType for HashMap<K, V, S> {
    fn kind() -> FieldKind {
        map_kind::<K, V>()
    }

    fn value(&self) -> Value<'_> {
        let mut entries: Vec<_> = self.iter().map(|(k, v)| (k.value(), v.value())).collect();
        entries.sort_by_cached_key(|(k, _)| k.to_string());
        Value::Map(entries)
    }
}

fn map_kind<K: FieldType, V: FieldType>() -> FieldKind {
    FieldKind::Map {
        key: Box::new(K::kind()),
        value: Box::new(V::kind()),
    }
}

// ============================================================================
// TYPE NAMES
// ============================================================================

/// Strips module paths from a `std::any::type_name` string.
///
/// `alloc::vec::Vec<my_app::model::Address>` becomes `Vec<Address>`.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(last_segment(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alloc::string::String", "String")]
    #[case("alloc::vec::Vec<my_app::model::Address>", "Vec<Address>")]
    #[case(
        "std::collections::hash::map::HashMap<alloc::string::String, u8>",
        "HashMap<String, u8>"
    )]
    #[case("core::option::Option<&str>", "Option<&str>")]
    fn short_type_names(#[case] full: &str, #[case] expected: &str) {
        assert_eq!(short_type_name(full), expected);
    }

    #[rstest]
    #[case(Value::Absent, true)]
    #[case(Value::Int(0), true)]
    #[case(Value::Uint(7), false)]
    #[case(Value::Float(0.0), true)]
    #[case(Value::Bool(false), true)]
    #[case(Value::str(""), true)]
    #[case(Value::str("x"), false)]
    #[case(Value::Seq(vec![]), true)]
    #[case(Value::Seq(vec![Value::Absent]), false)]
    fn zero_values_are_empty(#[case] value: Value<'static>, #[case] empty: bool) {
        assert_eq!(value.is_empty(), empty);
    }

    #[test]
    fn string_length_counts_characters() {
        assert_eq!(Value::str("héllo").len(), Some(5));
    }

    #[test]
    fn option_none_is_absent() {
        let missing: Option<String> = None;
        assert!(missing.value().is_absent());
        assert_eq!(
            <Option<String>>::kind(),
            FieldKind::Option(Box::new(FieldKind::String))
        );
    }

    #[test]
    fn hash_map_entries_are_sorted_by_key() {
        let map: HashMap<String, u32> = [("b", 2), ("c", 3), ("a", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();

        assert_eq!(map.value().to_string(), "map[a:1 b:2 c:3]");
    }

    #[test]
    fn display_renders_sequences() {
        let v = vec![1_i32, 2, 3];
        assert_eq!(v.value().to_string(), "[1 2 3]");
    }

    #[test]
    fn kind_labels() {
        let kind = <Vec<Option<String>>>::kind();
        assert_eq!(kind.label(), "Vec<Option<string>>");
    }
}
