//! Validator configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```rust,ignore
//! use tagcheck::config::{RegistrationPolicy, ValidatorConfig};
//!
//! let config = ValidatorConfig::from_json(r#"{ "registration": "reject" }"#)?;
//! assert_eq!(config.registration, RegistrationPolicy::Reject);
//! assert_eq!(config.fallback_locale, "en");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings fixed when a [`ValidatorBuilder`](crate::ValidatorBuilder) is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Locale consulted when the requested one has no template for a tag.
    pub fallback_locale: String,

    /// What happens when a name is registered twice.
    pub registration: RegistrationPolicy,

    /// Install the built-in rule set and aliases.
    pub builtins: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fallback_locale: "en".to_owned(),
            registration: RegistrationPolicy::default(),
            builtins: true,
        }
    }
}

impl ValidatorConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_locale.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "fallback_locale must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Sets the fallback locale.
    pub fn with_fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = locale.into();
        self
    }

    /// Sets the registration policy.
    pub fn with_registration(mut self, policy: RegistrationPolicy) -> Self {
        self.registration = policy;
        self
    }

    /// Starts from an empty rule set instead of the built-ins.
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }
}

/// Behaviour on duplicate rule, alias or custom-type registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// The later registration replaces the earlier one.
    #[default]
    LastWriteWins,
    /// The later registration fails with
    /// [`RegistrationError::Duplicate`](crate::error::RegistrationError::Duplicate).
    Reject,
}
