//! Record-level validation and field renaming.

mod common;

use common::{pairs, summary};
use pretty_assertions::assert_eq;
use tagcheck::{Record, SchemaBuilder, StructLevel, Validator, ValidatorBuilder, record_field_type};

#[derive(Debug, Clone, Default)]
struct Person {
    first_name: String,
    last_name: String,
    age: u8,
    email: String,
}

impl Record for Person {
    const NAME: &'static str = "User";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("FirstName", |p| &p.first_name).label("json", "fname");
        schema.field("LastName", |p| &p.last_name).label("json", "lname");
        schema.field("Age", |p| &p.age).rules("gte=0,lte=130");
        schema
            .field("Email", |p| &p.email)
            .rules("required,email")
            .label("json", "e-mail");
    }
}

#[derive(Debug, Clone, Default)]
struct Team {
    lead: Person,
    members: Vec<Person>,
}

impl Record for Team {
    const NAME: &'static str = "Team";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Lead", |t| &t.lead);
        schema.field("Members", |t| &t.members).rules("dive");
    }
}

record_field_type!(Person, Team);

fn first_or_last_name(person: &Person, level: &mut StructLevel<'_>) {
    if person.first_name.is_empty() && person.last_name.is_empty() {
        level.report_error(&person.first_name, "fname", "FirstName", "fnameorlname", "");
        level.report_error(&person.last_name, "lname", "LastName", "fnameorlname", "");
    }
}

fn validator() -> Validator {
    let mut builder = ValidatorBuilder::new();
    builder
        .register_tag_name_fn(|field| field.label("json").map(str::to_owned))
        .register_struct_level(first_or_last_name);
    builder.build()
}

fn person() -> Person {
    Person {
        first_name: String::new(),
        last_name: String::new(),
        age: 45,
        email: "Badger.Smith@gmail.com".to_owned(),
    }
}

#[test]
fn reports_both_names_in_order() {
    let err = validator().validate_record(&person()).unwrap_err();
    let errors = err.violations().unwrap();

    assert_eq!(errors.len(), 2);
    let first = &errors.as_slice()[0];
    assert_eq!(first.namespace(), "User.fname");
    assert_eq!(first.struct_namespace(), "User.FirstName");
    assert_eq!(first.field(), "fname");
    assert_eq!(first.struct_field(), "FirstName");
    assert_eq!(first.tag(), "fnameorlname");
    assert_eq!(first.kind(), "string");
    assert_eq!(first.type_name(), "String");

    assert_eq!(errors.as_slice()[1].namespace(), "User.lname");
}

#[test]
fn struct_level_runs_after_fields() {
    let input = Person {
        email: "not an email".to_owned(),
        ..person()
    };

    let err = validator().validate_record(&input).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[
            ("User.e-mail", "email"),
            ("User.fname", "fnameorlname"),
            ("User.lname", "fnameorlname"),
        ])
    );
}

#[test]
fn one_name_is_enough() {
    let input = Person {
        last_name: "Smith".to_owned(),
        ..person()
    };
    assert!(validator().validate_record(&input).is_ok());
}

#[test]
fn struct_level_functions_append_in_registration_order() {
    let mut builder = ValidatorBuilder::new();
    builder
        .register_struct_level(first_or_last_name)
        .register_struct_level(|p: &Person, level: &mut StructLevel<'_>| {
            if p.age < 50 {
                level.report_error(&p.age, "Age", "", "senior", "50");
            }
        });
    let validator = builder.build();

    let err = validator.validate_record(&person()).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[
            ("User.FirstName", "fnameorlname"),
            ("User.LastName", "fnameorlname"),
            ("User.Age", "senior"),
        ])
    );
    let senior = err.violations().unwrap().find("User.Age").unwrap();
    assert_eq!(senior.struct_namespace(), "User.Age");
    assert_eq!(senior.param(), "50");
}

#[test]
fn nested_records_run_their_own_struct_level() {
    let team = Team {
        lead: Person {
            first_name: "Mal".to_owned(),
            ..person()
        },
        members: vec![
            Person {
                last_name: "Frye".to_owned(),
                ..person()
            },
            person(),
        ],
    };

    let err = validator().validate_record(&team).unwrap_err();
    assert_eq!(
        summary(&err),
        pairs(&[
            ("Team.Members[1].fname", "fnameorlname"),
            ("Team.Members[1].lname", "fnameorlname"),
        ])
    );
    let v = &err.violations().unwrap().as_slice()[0];
    assert_eq!(v.struct_namespace(), "Team.Members[1].FirstName");
    assert_eq!(v.field_path(), "Members[1].fname");
}

#[test]
fn empty_display_name_keeps_declared_name() {
    let mut builder = ValidatorBuilder::new();
    builder.register_tag_name_fn(|field| {
        Some(field.label("json").unwrap_or_default().to_owned())
    });
    let validator = builder.build();

    let input = Person {
        age: 200,
        ..person()
    };
    let err = validator.validate_record(&input).unwrap_err();
    assert_eq!(summary(&err), pairs(&[("User.Age", "lte")]));
}
