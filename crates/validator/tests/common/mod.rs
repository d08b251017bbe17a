//! Shared record fixtures with hand-written `Record` impls.

#![allow(dead_code)]

use tagcheck::{Record, SchemaBuilder, record_field_type};

#[derive(Debug, Clone, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub planet: String,
    pub phone: String,
}

impl Record for Address {
    const NAME: &'static str = "Address";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("Street", |a| &a.street).rules("required");
        schema.field("City", |a| &a.city).rules("required");
        schema.field("Planet", |a| &a.planet).rules("required");
        schema.field("Phone", |a| &a.phone).rules("required");
    }
}

#[derive(Debug, Clone, Default)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub email: String,
    pub favourite_color: String,
    pub addresses: Vec<Address>,
}

impl Record for User {
    const NAME: &'static str = "User";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("FirstName", |u| &u.first_name)
            .rules("required")
            .label("json", "fname");
        schema
            .field("LastName", |u| &u.last_name)
            .rules("required")
            .label("json", "lname");
        schema.field("Age", |u| &u.age).rules("gte=0,lte=130");
        schema.field("Email", |u| &u.email).rules("required,email");
        schema
            .field("FavouriteColor", |u| &u.favourite_color)
            .rules("iscolor");
        schema
            .field("Addresses", |u| &u.addresses)
            .rules("required,dive,required");
    }
}

record_field_type!(Address, User);

pub fn valid_address() -> Address {
    Address {
        street: "Eavesdown Docks".to_owned(),
        city: "Unknown".to_owned(),
        planet: "Persphone".to_owned(),
        phone: "none".to_owned(),
    }
}

pub fn valid_user() -> User {
    User {
        first_name: "Badger".to_owned(),
        last_name: "Smith".to_owned(),
        age: 35,
        email: "Badger.Smith@gmail.com".to_owned(),
        favourite_color: "#000".to_owned(),
        addresses: vec![valid_address()],
    }
}

/// `(namespace, tag)` of every violation, in order.
pub fn summary(err: &tagcheck::Error) -> Vec<(String, String)> {
    err.violations()
        .map(|errors| {
            errors
                .iter()
                .map(|v| (v.namespace().to_owned(), v.tag().to_owned()))
                .collect()
        })
        .unwrap_or_default()
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(ns, tag)| ((*ns).to_owned(), (*tag).to_owned()))
        .collect()
}
