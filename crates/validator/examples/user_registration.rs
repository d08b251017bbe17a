//! Validating a sign-up form with nested addresses, a cross-field rule and
//! English messages.
//!
//! Run with `RUST_LOG=tagcheck=debug` to see schema derivation.

use serde::{Deserialize, Serialize};
use tagcheck::translation::en;
use tagcheck::{Error, Locale, Record, RegistrationError, StructLevel, Validator, ValidatorBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Record, Serialize, Deserialize)]
struct Address {
    #[validate("required")]
    street: String,
    #[validate("required")]
    city: String,
    #[validate("omitempty,len=5,numeric")]
    zip: String,
}

#[derive(Debug, Record, Serialize, Deserialize)]
#[validate(name = "Registration")]
struct Registration {
    #[serde(rename = "fname")]
    first_name: String,
    #[serde(rename = "lname")]
    last_name: String,
    #[validate("required,email")]
    email: String,
    #[validate("gte=13,lte=130")]
    age: u8,
    #[validate("iscolor")]
    #[serde(rename = "color")]
    favourite_color: String,
    #[validate("required,max=3,dive")]
    addresses: Vec<Address>,
}

fn build_validator() -> Result<Validator, RegistrationError> {
    let mut builder = ValidatorBuilder::new();
    builder
        .register_tag_name_fn(|field| field.label("serde").map(str::to_owned))
        .register_struct_level(|r: &Registration, level: &mut StructLevel<'_>| {
            if r.first_name.is_empty() && r.last_name.is_empty() {
                level.report_error(&r.first_name, "fname", "first_name", "fnameorlname", "");
                level.report_error(&r.last_name, "lname", "last_name", "fnameorlname", "");
            }
        });
    en::register_defaults(&mut builder)?;
    builder.register_translation(
        &Locale::english(),
        "fnameorlname",
        "{0}: either a first or a last name is required",
    )?;
    Ok(builder.build())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let validator = match build_validator() {
        Ok(validator) => validator,
        Err(e) => {
            eprintln!("failed to set up validator: {e}");
            return;
        }
    };

    let form: Registration = match serde_json::from_str(
        r##"{
            "fname": "",
            "lname": "",
            "email": "mal@serenity",
            "age": 12,
            "color": "#12345",
            "addresses": [
                { "street": "Eavesdown Docks", "city": "", "zip": "1234a" }
            ]
        }"##,
    ) {
        Ok(form) => form,
        Err(e) => {
            eprintln!("invalid JSON: {e}");
            return;
        }
    };

    match validator.validate_record(&form) {
        Ok(()) => println!("registration is valid"),
        Err(Error::Violations(errors)) => {
            for (namespace, messages) in errors.translate(&validator, "en") {
                for message in messages {
                    println!("{namespace:<32} {message}");
                }
            }
            let wire = errors.translated(&validator, "en").to_wire();
            match serde_json::to_string_pretty(&wire) {
                Ok(json) => println!("\n{json}"),
                Err(e) => eprintln!("failed to serialize violations: {e}"),
            }
        }
        Err(e) => eprintln!("cannot validate: {e}"),
    }
}
