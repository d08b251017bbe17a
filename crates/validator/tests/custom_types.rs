//! Custom value types resolved through registered coercions.

mod common;

use common::{pairs, summary};
use pretty_assertions::assert_eq;
use tagcheck::{
    CoercionError, FieldKind, Record, RegistrationError, SchemaBuilder, SchemaError, Validator,
    ValidatorBuilder, Value, custom_field_type,
};

#[derive(Debug, Clone, Default)]
struct NullString {
    value: String,
    valid: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct NullInt64 {
    value: i64,
    valid: bool,
}

/// Opaque: never registered.
#[derive(Debug, Clone, Copy)]
struct Token(#[allow(dead_code)] u32);

custom_field_type!(NullString, NullInt64, Token);

fn some_string(value: &str) -> NullString {
    NullString {
        value: value.to_owned(),
        valid: true,
    }
}

fn some_int(value: i64) -> NullInt64 {
    NullInt64 { value, valid: true }
}

#[derive(Debug, Clone, Default)]
struct Row {
    name: NullString,
    age: NullInt64,
    nickname: NullString,
    scores: Vec<NullInt64>,
}

impl Record for Row {
    const NAME: &'static str = "Row";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Name", |r| &r.name).rules("required");
        schema.field("Age", |r| &r.age).rules("gte=1,lte=150");
        schema.field("Nickname", |r| &r.nickname).rules("omitempty,min=3");
        schema.field("Scores", |r| &r.scores).rules("dive,lt=100");
    }
}

fn validator() -> Validator {
    let mut builder = ValidatorBuilder::new();
    builder
        .register_custom_type::<NullString, _>(FieldKind::String, |s| {
            Ok(if s.valid { Value::str(&s.value) } else { Value::Absent })
        })
        .unwrap()
        .register_custom_type::<NullInt64, _>(FieldKind::Int, |n| {
            Ok(if n.valid { Value::Int(n.value) } else { Value::Absent })
        })
        .unwrap();
    builder.build()
}

fn row() -> Row {
    Row {
        name: some_string("Badger"),
        age: some_int(35),
        nickname: NullString::default(),
        scores: vec![some_int(10), some_int(99)],
    }
}

#[test]
fn coerced_values_pass() {
    assert!(validator().validate_record(&row()).is_ok());
}

#[test]
fn absent_and_present_empty_both_fail_required() {
    let validator = validator();

    let absent = Row {
        name: NullString::default(),
        ..row()
    };
    let empty = Row {
        name: some_string(""),
        ..row()
    };

    for input in [absent, empty] {
        let err = validator.validate_record(&input).unwrap_err();
        assert_eq!(summary(&err), pairs(&[("Row.Name", "required")]));
    }
}

#[test]
fn comparison_distinguishes_absent_from_zero() {
    let validator = validator();

    let absent = Row {
        age: NullInt64::default(),
        ..row()
    };
    assert!(validator.validate_record(&absent).is_ok());

    let zero = Row {
        age: some_int(0),
        ..row()
    };
    let err = validator.validate_record(&zero).unwrap_err();
    let v = &err.violations().unwrap().as_slice()[0];
    assert_eq!(v.namespace(), "Row.Age");
    assert_eq!(v.tag(), "gte");
    assert_eq!(v.kind(), "int");
    assert_eq!(v.type_name(), "NullInt64");
}

#[test]
fn omitempty_skips_absent_custom_value() {
    let validator = validator();
    let short = Row {
        nickname: some_string("ab"),
        ..row()
    };

    let err = validator.validate_record(&short).unwrap_err();
    assert_eq!(summary(&err), pairs(&[("Row.Nickname", "min")]));
}

#[test]
fn dived_elements_are_coerced() {
    let validator = validator();
    let input = Row {
        scores: vec![some_int(1), some_int(100), NullInt64::default()],
        ..row()
    };

    let err = validator.validate_record(&input).unwrap_err();
    assert_eq!(summary(&err), pairs(&[("Row.Scores[1]", "lt")]));
}

#[test]
fn failed_extraction_counts_as_absent() {
    let mut builder = ValidatorBuilder::new();
    builder
        .register_custom_type::<NullString, _>(FieldKind::String, |_| {
            Err(CoercionError::new("corrupt column"))
        })
        .unwrap()
        .register_custom_type::<NullInt64, _>(FieldKind::Int, |n| Ok(Value::Int(n.value)))
        .unwrap();
    let validator = builder.build();

    let err = validator.validate_record(&row()).unwrap_err();
    assert_eq!(summary(&err), pairs(&[("Row.Name", "required")]));
}

#[derive(Debug, Clone, Copy)]
struct Session {
    token: Token,
}

impl Record for Session {
    const NAME: &'static str = "Session";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Token", |s| &s.token).rules("required");
    }
}

#[derive(Debug, Clone, Copy)]
struct BadSession {
    token: Token,
}

impl Record for BadSession {
    const NAME: &'static str = "BadSession";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Token", |s| &s.token).rules("min=3");
    }
}

#[test]
fn opaque_custom_types_only_take_structural_rules() {
    let validator = validator();
    assert!(validator.validate_record(&Session { token: Token(7) }).is_ok());

    let err = validator
        .validate_record(&BadSession { token: Token(7) })
        .unwrap_err();
    assert!(matches!(
        err,
        tagcheck::Error::Schema(SchemaError::KindMismatch { ref rule, kind: "custom", .. }) if rule == "min"
    ));
}

#[test]
fn custom_type_cannot_map_to_custom_kind() {
    let mut builder = ValidatorBuilder::new();
    let err = builder
        .register_custom_type::<NullString, _>(FieldKind::custom::<Token>(), |_| Ok(Value::Absent))
        .unwrap_err();
    assert!(matches!(err, RegistrationError::OpaqueUnderlying { .. }));
}
