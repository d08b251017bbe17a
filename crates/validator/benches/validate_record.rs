// Record validation benchmarks.
//
// Measures the warm path (schema already cached) for a valid record, a record
// with violations, and one-off value checks.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use tagcheck::{Record, SchemaBuilder, Validator, record_field_type};

// -- Fixture records --

struct Address {
    street: String,
    city: String,
}

impl Record for Address {
    const NAME: &'static str = "Address";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Street", |a| &a.street).rules("required");
        schema.field("City", |a| &a.city).rules("required,alpha");
    }
}

struct User {
    name: String,
    age: u8,
    email: String,
    color: String,
    addresses: Vec<Address>,
}

impl Record for User {
    const NAME: &'static str = "User";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Name", |u| &u.name).rules("required,min=2,max=64");
        schema.field("Age", |u| &u.age).rules("gte=0,lte=130");
        schema.field("Email", |u| &u.email).rules("required,email");
        schema.field("Color", |u| &u.color).rules("omitempty,iscolor");
        schema.field("Addresses", |u| &u.addresses).rules("required,dive");
    }
}

record_field_type!(Address, User);

fn user(addresses: usize, valid: bool) -> User {
    User {
        name: "Badger".to_owned(),
        age: if valid { 35 } else { 135 },
        email: "badger@example.com".to_owned(),
        color: "rgb(12, 34, 56)".to_owned(),
        addresses: (0..addresses)
            .map(|_| Address {
                street: "Eavesdown Docks".to_owned(),
                city: if valid { "Persephone" } else { "" }.to_owned(),
            })
            .collect(),
    }
}

fn valid_record(c: &mut Criterion) {
    let validator = Validator::new();
    let input = user(4, true);
    validator.validate_record(&input).unwrap();

    c.bench_function("validate_valid_record_4_addresses", |b| {
        b.iter(|| validator.validate_record(black_box(&input)).is_ok());
    });
}

fn invalid_record(c: &mut Criterion) {
    let validator = Validator::new();
    let input = user(4, false);
    let _ = validator.validate_record(&input);

    c.bench_function("validate_invalid_record_5_violations", |b| {
        b.iter(|| validator.validate_record(black_box(&input)).is_err());
    });
}

fn single_value(c: &mut Criterion) {
    let validator = Validator::new();
    let email = "badger@example.com".to_owned();
    validator.validate_value(&email, "required,email").unwrap();

    c.bench_function("validate_value_email", |b| {
        b.iter(|| validator.validate_value(black_box(&email), "required,email").is_ok());
    });
}

criterion_group!(benches, valid_record, invalid_record, single_value);
criterion_main!(benches);
