//! The validator façade.
//!
//! Validation has two phases. A [`ValidatorBuilder`] collects rules,
//! aliases, custom types, struct-level functions, the tag-name function
//! and translations. [`ValidatorBuilder::build`] freezes them into a
//! [`Validator`], which is cheap to clone and shared across threads; the
//! only state it still mutates is its schema cache.
//!
//! ```rust,ignore
//! use tagcheck::{FnRule, Validator, ValidatorBuilder};
//!
//! let mut builder = ValidatorBuilder::new();
//! builder.register_fn("even", |value, _| matches!(value, Value::Int(n) if n % 2 == 0))?;
//! tagcheck::translation::en::register_defaults(&mut builder)?;
//! let validator: Validator = builder.build();
//!
//! validator.validate_record(&user)?;
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::ValidatorConfig;
use crate::error::{CoercionError, Error, InvalidInputError, RegistrationError, SchemaError};
use crate::registry::Registry;
use crate::rules::{self, FnRule, Rule};
use crate::schema::{FieldDecl, Record, RecordSchema, RecordType, RuleChain, SchemaCache, TagParser};
use crate::struct_level::StructLevel;
use crate::translation::{Locale, MessageContext, MessageTemplate, RenderFn};
use crate::value::{FieldKind, FieldType, RecordRef, Value, short_type_name};
use crate::violation::{ValidationErrors, Violation};
use crate::walker::{Location, Walker};

// ============================================================================
// BUILDER
// ============================================================================

/// Registration phase of a [`Validator`].
pub struct ValidatorBuilder {
    config: ValidatorConfig,
    registry: Registry,
}

impl ValidatorBuilder {
    /// A builder with the default configuration and the built-in rules.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// A builder with `config`.
    pub fn with_config(config: ValidatorConfig) -> Self {
        let mut registry = Registry::new(config.registration);
        if config.builtins {
            rules::register_builtins(&mut registry);
        }
        debug!(
            builtins = config.builtins,
            policy = ?config.registration,
            fallback_locale = %config.fallback_locale,
            "created validator builder"
        );
        Self { config, registry }
    }

    /// The configuration the builder was created with.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Registers `rule` under `name`.
    pub fn register_rule<R>(&mut self, name: &str, rule: R) -> Result<&mut Self, RegistrationError>
    where
        R: Rule + 'static,
    {
        self.registry.register_rule(name, Arc::new(rule))?;
        Ok(self)
    }

    /// Registers a plain function of value and raw parameter under `name`.
    ///
    /// The function runs for every kind and receives absent values too.
    pub fn register_fn<F>(&mut self, name: &str, f: F) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&Value<'_>, &str) -> bool + Send + Sync + 'static,
    {
        self.register_rule(name, FnRule::new(f))
    }

    /// Registers `name` as shorthand for `expansion`, e.g.
    /// `"hexcolor|rgb|rgba"`. Failures report `name` as their tag.
    pub fn register_alias(
        &mut self,
        name: &str,
        expansion: &str,
    ) -> Result<&mut Self, RegistrationError> {
        self.registry.register_alias(name, expansion)?;
        Ok(self)
    }

    /// Teaches the validator to read values of `T` as `underlying`.
    ///
    /// `extract` runs before any rule sees a `T`; an error makes the value
    /// absent. Rules on `T` fields bind against `underlying`.
    pub fn register_custom_type<T, F>(
        &mut self,
        underlying: FieldKind,
        extract: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        T: Any,
        F: Fn(&T) -> Result<Value<'_>, CoercionError> + Send + Sync + 'static,
    {
        self.registry.register_custom_type::<T, F>(underlying, extract)?;
        Ok(self)
    }

    /// Appends a record-level function for `R`, run after `R`'s fields.
    pub fn register_struct_level<R, F>(&mut self, f: F) -> &mut Self
    where
        R: Record,
        F: Fn(&R, &mut StructLevel<'_>) + Send + Sync + 'static,
    {
        self.registry.register_struct_level::<R, F>(f);
        self
    }

    /// Sets the function naming fields in namespaces.
    ///
    /// `None` or an empty name keeps the declared name.
    pub fn register_tag_name_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&FieldDecl) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.set_tag_name_fn(Arc::new(f));
        self
    }

    /// Registers the message for `tag` in `locale`.
    pub fn register_translation(
        &mut self,
        locale: &Locale,
        tag: &str,
        template: impl Into<MessageTemplate>,
    ) -> Result<&mut Self, RegistrationError> {
        self.registry
            .register_translation(locale, tag, template.into(), None)?;
        Ok(self)
    }

    /// Registers the message for `tag` in `locale`, rendered by `render`.
    pub fn register_translation_with<F>(
        &mut self,
        locale: &Locale,
        tag: &str,
        template: impl Into<MessageTemplate>,
        render: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&MessageContext<'_>, &Violation) -> String + Send + Sync + 'static,
    {
        let render: RenderFn = Arc::new(render);
        self.registry
            .register_translation(locale, tag, template.into(), Some(render))?;
        Ok(self)
    }

    /// Freezes the registrations.
    pub fn build(self) -> Validator {
        debug!(registry = ?self.registry, "validator built");
        Validator {
            inner: Arc::new(Inner {
                registry: self.registry,
                schemas: SchemaCache::new(),
                chains: DashMap::new(),
                config: self.config,
            }),
        }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBuilder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// A frozen, shareable validator.
#[derive(Clone)]
pub struct Validator {
    inner: Arc<Inner>,
}

/// Upper bound on cached `validate_value` tag chains. Tags past the limit
/// are parsed on every call.
const VALUE_CHAIN_CACHE_LIMIT: usize = 1024;

struct Inner {
    registry: Registry,
    schemas: SchemaCache,
    chains: DashMap<(TypeId, String), Arc<RuleChain>>,
    config: ValidatorConfig,
}

impl Validator {
    /// A validator with the built-in rules and nothing else.
    pub fn new() -> Self {
        ValidatorBuilder::new().build()
    }

    /// Starts a builder.
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// The configuration the validator was built with.
    pub fn config(&self) -> &ValidatorConfig {
        &self.inner.config
    }

    /// The schema of `R`, deriving and caching it on first use.
    pub fn describe<R: Record>(&self) -> Result<Arc<RecordSchema>, SchemaError> {
        self.inner
            .schemas
            .get_or_derive(RecordType::of::<R>(), &self.inner.registry)
    }

    /// Number of record schemas derived so far.
    pub fn cached_schemas(&self) -> usize {
        self.inner.schemas.len()
    }

    /// Validates `record` and everything it reaches.
    pub fn validate_record<R: Record>(&self, record: &R) -> Result<(), Error> {
        self.validate_dyn(Value::record(record))
    }

    /// Validates a type-erased root, which must be a record.
    pub fn validate_dyn(&self, root: Value<'_>) -> Result<(), Error> {
        let record = match root {
            Value::Record(record) => record,
            Value::Absent => return Err(InvalidInputError::AbsentRoot.into()),
            other => {
                return Err(InvalidInputError::NotARecord {
                    kind: other.kind_name(),
                }
                .into());
            }
        };
        self.walk_record(record)
    }

    fn walk_record(&self, record: RecordRef<'_>) -> Result<(), Error> {
        let ty = record.record_type();
        let mut walker = Walker::new(&self.inner.registry, &self.inner.schemas);
        walker.record(record, &Location::root(ty.name()))?;
        let result = walker.finish();
        trace!(
            record = ty.name(),
            violations = result.as_ref().err().and_then(Error::violations).map_or(0, ValidationErrors::len),
            "validated record"
        );
        result
    }

    /// Checks a single value against `tags`, outside any record.
    ///
    /// Violations have empty namespaces and field names. The parsed tag is
    /// cached per value type.
    pub fn validate_value<T>(&self, value: &T, tags: &str) -> Result<(), Error>
    where
        T: FieldType + 'static,
    {
        let chain = self.value_chain::<T>(tags)?;
        let type_name = short_type_name(std::any::type_name::<T>());
        let mut walker = Walker::new(&self.inner.registry, &self.inner.schemas);
        walker.value(&chain, value.value(), &Location::default(), &type_name)?;
        walker.finish()
    }

    fn value_chain<T: FieldType + 'static>(&self, tags: &str) -> Result<Arc<RuleChain>, SchemaError> {
        let key = (TypeId::of::<T>(), tags.to_owned());
        if let Some(hit) = self.inner.chains.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }
        let chain = Arc::new(
            TagParser::new(&self.inner.registry, std::any::type_name::<T>(), "value", tags)
                .parse(&T::kind())?,
        );
        if self.inner.chains.len() >= VALUE_CHAIN_CACHE_LIMIT {
            trace!(tags, "value chain cache full; not caching");
            return Ok(chain);
        }
        let chain = Arc::clone(self.inner.chains.entry(key).or_insert(chain).value());
        Ok(chain)
    }

    /// Message for `violation` in `locale`.
    ///
    /// Falls back to the configured fallback locale, then to the canonical
    /// message.
    pub fn translate(&self, violation: &Violation, locale: &str) -> String {
        self.inner
            .registry
            .translations
            .translate(violation, locale, &self.inner.config.fallback_locale)
    }

    /// Messages for every violation, grouped by namespace.
    pub fn translate_all(
        &self,
        errors: &ValidationErrors,
        locale: &str,
    ) -> IndexMap<String, Vec<String>> {
        errors.translate(self, locale)
    }

    /// Locales that have at least one registered message, sorted.
    pub fn locales(&self) -> Vec<&str> {
        self.inner.registry.translations.locales()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .field("cached_schemas", &self.inner.schemas.len())
            .finish()
    }
}
