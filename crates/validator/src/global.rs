//! One process-wide validator.
//!
//! Install it once at startup, after all registrations:
//!
//! ```rust,ignore
//! let mut builder = tagcheck::ValidatorBuilder::new();
//! tagcheck::translation::en::register_defaults(&mut builder)?;
//! tagcheck::global::install(builder.build()).expect("installed twice");
//!
//! // anywhere later
//! tagcheck::global::get().validate_record(&user)?;
//! ```

use std::sync::OnceLock;

use tracing::debug;

use crate::validator::Validator;

static GLOBAL_VALIDATOR: OnceLock<Validator> = OnceLock::new();

/// Installs `validator` as the process-wide instance.
///
/// Returns the installed instance, or gives `validator` back if one was
/// already installed.
pub fn install(validator: Validator) -> Result<&'static Validator, Validator> {
    GLOBAL_VALIDATOR.set(validator)?;
    debug!("installed global validator");
    Ok(get())
}

/// The process-wide validator.
///
/// Installs a default one (built-in rules, no translations) if none was
/// installed.
pub fn get() -> &'static Validator {
    GLOBAL_VALIDATOR.get_or_init(Validator::new)
}

/// The installed validator, without installing a default.
pub fn try_get() -> Option<&'static Validator> {
    GLOBAL_VALIDATOR.get()
}
