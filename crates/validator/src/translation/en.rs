//! English messages for the built-in rules.
//!
//! | tag | message |
//! |-----|---------|
//! | `required` | `{0} is a required field` |
//! | `email` | `{0} must be a valid email address` |
//! | `gte` / `min` | `{0} must be at least {1} characters long` (text), `{0} must contain at least {1} items` (collections), `{0} must be {1} or greater` (numbers) |
//! | `lte` / `max` | `... at most ...` / `{0} must be {1} or less` |
//! | `gt` | `{0} must be longer than {1} characters` / `... more than {1} items` / `... greater than {1}` |
//! | `lt` | `{0} must be shorter than {1} characters` / `... fewer than {1} items` / `... less than {1}` |
//! | `len` | `{0} must be exactly {1} characters long` / `... exactly {1} items` / `... equal to {1}` |
//!
//! Size messages pick their wording from the kind of the offending value
//! and their singular or plural form from the parameter.

use crate::error::RegistrationError;
use crate::translation::{Locale, MessageContext, MessageTemplate};
use crate::validator::ValidatorBuilder;
use crate::violation::Violation;

const SIMPLE: &[(&str, &str)] = &[
    ("required", "{0} is a required field"),
    ("email", "{0} must be a valid email address"),
    ("url", "{0} must be a valid URL"),
    ("uuid", "{0} must be a valid UUID"),
    ("hexcolor", "{0} must be a valid HEX color"),
    ("rgb", "{0} must be a valid RGB color"),
    ("rgba", "{0} must be a valid RGBA color"),
    ("hsl", "{0} must be a valid HSL color"),
    ("hsla", "{0} must be a valid HSLA color"),
    ("iscolor", "{0} must be a valid color"),
    ("alpha", "{0} can only contain alphabetic characters"),
    ("alphanum", "{0} can only contain alphanumeric characters"),
    ("numeric", "{0} must be a valid numeric value"),
    ("lowercase", "{0} must be a lowercase string"),
    ("uppercase", "{0} must be an uppercase string"),
    ("contains", "{0} must contain the text '{1}'"),
    ("startswith", "{0} must start with text '{1}'"),
    ("endswith", "{0} must end with text '{1}'"),
    ("oneof", "{0} must be one of [{1}]"),
    ("eq", "{0} is not equal to {1}"),
    ("ne", "{0} should not be equal to {1}"),
];

struct Size {
    tags: &'static [&'static str],
    text: (&'static str, &'static str),
    items: (&'static str, &'static str),
    number: &'static str,
}

const SIZES: &[Size] = &[
    Size {
        tags: &["gte", "min"],
        text: (
            "{0} must be at least {1} character long",
            "{0} must be at least {1} characters long",
        ),
        items: (
            "{0} must contain at least {1} item",
            "{0} must contain at least {1} items",
        ),
        number: "{0} must be {1} or greater",
    },
    Size {
        tags: &["lte", "max"],
        text: (
            "{0} must be at most {1} character long",
            "{0} must be at most {1} characters long",
        ),
        items: (
            "{0} must contain at most {1} item",
            "{0} must contain at most {1} items",
        ),
        number: "{0} must be {1} or less",
    },
    Size {
        tags: &["gt"],
        text: (
            "{0} must be longer than {1} character",
            "{0} must be longer than {1} characters",
        ),
        items: (
            "{0} must contain more than {1} item",
            "{0} must contain more than {1} items",
        ),
        number: "{0} must be greater than {1}",
    },
    Size {
        tags: &["lt"],
        text: (
            "{0} must be shorter than {1} character",
            "{0} must be shorter than {1} characters",
        ),
        items: (
            "{0} must contain fewer than {1} item",
            "{0} must contain fewer than {1} items",
        ),
        number: "{0} must be less than {1}",
    },
    Size {
        tags: &["len"],
        text: (
            "{0} must be exactly {1} character long",
            "{0} must be exactly {1} characters long",
        ),
        items: (
            "{0} must contain exactly {1} item",
            "{0} must contain exactly {1} items",
        ),
        number: "{0} must be equal to {1}",
    },
];

/// Installs the English catalogue under [`Locale::english`].
///
/// Messages registered earlier for the same tags are replaced, or refused
/// under [`RegistrationPolicy::Reject`](crate::RegistrationPolicy::Reject).
pub fn register_defaults(builder: &mut ValidatorBuilder) -> Result<(), RegistrationError> {
    let locale = Locale::english();

    for (tag, text) in SIMPLE {
        builder.register_translation(&locale, tag, *text)?;
    }

    for size in SIZES {
        let (text, items) = (size.text, size.items);
        for tag in size.tags {
            builder.register_translation_with(
                &locale,
                tag,
                MessageTemplate::from(size.number),
                move |ctx: &MessageContext<'_>, v: &Violation| match v.kind() {
                    "string" => ctx.plural(text.0, text.1, v),
                    "seq" | "map" => ctx.plural(items.0, items.1, v),
                    _ => ctx.render_default(v),
                },
            )?;
        }
    }
    Ok(())
}
