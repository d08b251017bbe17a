//! Everything registered on a [`ValidatorBuilder`](crate::ValidatorBuilder).
//!
//! The registry is mutated only while the builder is open. `build()` moves it
//! behind an `Arc`, after which it is shared read-only across threads.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::RegistrationPolicy;
use crate::error::{CoercionError, RegistrationError};
use crate::rules::Rule;
use crate::schema::{FieldDecl, Record, RecordType};
use crate::struct_level::StructLevel;
use crate::translation::{Locale, MessageTemplate, RenderFn, Translations};
use crate::value::{CustomRef, FieldKind, Value};

/// Tokens with structural meaning in a tag.
pub(crate) const RESERVED: &[&str] = &["required", "omitempty", "dive", "keys", "endkeys", "-"];

pub(crate) type TagNameFn = Arc<dyn Fn(&FieldDecl) -> Option<String> + Send + Sync>;

pub(crate) struct Registry {
    policy: RegistrationPolicy,
    rules: HashMap<String, Arc<dyn Rule>>,
    aliases: HashMap<String, String>,
    custom_types: HashMap<TypeId, CustomCoercion>,
    struct_levels: HashMap<TypeId, Vec<Arc<dyn StructCheck>>>,
    tag_name: Option<TagNameFn>,
    pub(crate) translations: Translations,
}

impl Registry {
    pub(crate) fn new(policy: RegistrationPolicy) -> Self {
        Self {
            policy,
            rules: HashMap::new(),
            aliases: HashMap::new(),
            custom_types: HashMap::new(),
            struct_levels: HashMap::new(),
            tag_name: None,
            translations: Translations::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_builtins() -> Self {
        let mut registry = Self::new(RegistrationPolicy::default());
        crate::rules::register_builtins(&mut registry);
        registry
    }

    // ------------------------------------------------------------------------
    // rules and aliases
    // ------------------------------------------------------------------------

    /// Inserts a rule without policy checks. Used for the built-in set.
    pub(crate) fn install_rule(&mut self, name: &str, rule: impl Rule + 'static) {
        self.rules.insert(name.to_owned(), Arc::new(rule));
    }

    /// Inserts an alias without policy checks. Used for the built-in set.
    pub(crate) fn install_alias(&mut self, name: &str, expansion: &str) {
        self.aliases.insert(name.to_owned(), expansion.to_owned());
    }

    pub(crate) fn register_rule(
        &mut self,
        name: &str,
        rule: Arc<dyn Rule>,
    ) -> Result<(), RegistrationError> {
        check_name(name)?;
        if self.rules.contains_key(name) || self.aliases.contains_key(name) {
            self.on_duplicate("rule", name)?;
        }
        self.aliases.remove(name);
        self.rules.insert(name.to_owned(), rule);
        debug!(rule = name, "registered rule");
        Ok(())
    }

    pub(crate) fn register_alias(
        &mut self,
        name: &str,
        expansion: &str,
    ) -> Result<(), RegistrationError> {
        check_name(name)?;
        let invalid = |reason| RegistrationError::InvalidAlias {
            name: name.to_owned(),
            expansion: expansion.to_owned(),
            reason,
        };
        if expansion.trim().is_empty() {
            return Err(invalid("expansion is empty"));
        }
        if expansion
            .split([',', '|'])
            .map(|t| t.split_once('=').map_or(t, |(n, _)| n).trim())
            .any(|t| matches!(t, "dive" | "keys" | "endkeys" | "-"))
        {
            return Err(invalid("expansion may not contain structural tokens"));
        }
        if expansion
            .split([',', '|'])
            .map(|t| t.split_once('=').map_or(t, |(n, _)| n).trim())
            .any(|t| t == name)
        {
            return Err(invalid("alias refers to itself"));
        }

        if self.rules.contains_key(name) || self.aliases.contains_key(name) {
            self.on_duplicate("alias", name)?;
        }
        self.rules.remove(name);
        self.aliases.insert(name.to_owned(), expansion.to_owned());
        debug!(alias = name, expansion, "registered alias");
        Ok(())
    }

    pub(crate) fn rule(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(name)
    }

    pub(crate) fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    fn on_duplicate(&self, what: &'static str, name: &str) -> Result<(), RegistrationError> {
        match self.policy {
            RegistrationPolicy::Reject => Err(RegistrationError::Duplicate {
                what,
                name: name.to_owned(),
            }),
            RegistrationPolicy::LastWriteWins => {
                debug!(what, name, "replacing earlier registration");
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // custom types
    // ------------------------------------------------------------------------

    pub(crate) fn register_custom_type<T, F>(
        &mut self,
        underlying: FieldKind,
        extract: F,
    ) -> Result<(), RegistrationError>
    where
        T: Any,
        F: Fn(&T) -> Result<Value<'_>, CoercionError> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        if let FieldKind::Custom(_) = strip_option(&underlying) {
            return Err(RegistrationError::OpaqueUnderlying {
                type_name,
                kind: "custom",
            });
        }

        let id = TypeId::of::<T>();
        if self.custom_types.contains_key(&id) {
            self.on_duplicate("custom type", type_name)?;
        }
        self.custom_types.insert(
            id,
            CustomCoercion {
                kind: underlying,
                extract: Arc::new(TypedCoercion {
                    extract,
                    _type: PhantomData,
                }),
            },
        );
        debug!(custom_type = type_name, "registered custom type");
        Ok(())
    }

    /// Resolves the kind rules bind against: options are unwrapped and
    /// registered custom types replaced by their underlying kind.
    pub(crate) fn effective_kind(&self, kind: &FieldKind) -> FieldKind {
        match kind {
            FieldKind::Option(inner) => self.effective_kind(inner),
            FieldKind::Custom(custom) => match self.custom_types.get(&custom.id()) {
                Some(coercion) => self.effective_kind(&coercion.kind),
                None => kind.clone(),
            },
            other => other.clone(),
        }
    }

    /// Every record type reachable through `kind`, following registered
    /// custom types to their underlying kinds.
    pub(crate) fn nested_records(&self, kind: &FieldKind) -> Vec<RecordType> {
        let mut found = Vec::new();
        let mut visited = Vec::new();
        self.collect_records(kind, &mut found, &mut visited);
        found
    }

    fn collect_records(
        &self,
        kind: &FieldKind,
        found: &mut Vec<RecordType>,
        visited: &mut Vec<TypeId>,
    ) {
        match kind {
            FieldKind::Option(inner) | FieldKind::Seq(inner) => {
                self.collect_records(inner, found, visited);
            }
            FieldKind::Map { key, value } => {
                self.collect_records(key, found, visited);
                self.collect_records(value, found, visited);
            }
            FieldKind::Record(ty) => found.push(*ty),
            FieldKind::Custom(custom) => {
                if visited.contains(&custom.id()) {
                    return;
                }
                visited.push(custom.id());
                if let Some(coercion) = self.custom_types.get(&custom.id()) {
                    self.collect_records(&coercion.kind, found, visited);
                }
            }
            _ => {}
        }
    }

    /// Replaces a registered custom value by its extracted value.
    ///
    /// Failed extraction yields [`Value::Absent`]. Unregistered custom values
    /// pass through unchanged.
    pub(crate) fn coerce<'a>(&self, value: Value<'a>) -> Value<'a> {
        let Value::Custom(custom) = value else {
            return value;
        };
        let Some(coercion) = self.custom_types.get(&custom.ty.id()) else {
            return value;
        };
        match coercion.extract.extract(custom) {
            Some(Ok(extracted)) => extracted,
            Some(Err(err)) => {
                debug!(
                    custom_type = custom.ty.full_name(),
                    error = %err,
                    "custom value extraction failed; treating as absent"
                );
                Value::Absent
            }
            None => Value::Absent,
        }
    }

    // ------------------------------------------------------------------------
    // struct-level functions
    // ------------------------------------------------------------------------

    pub(crate) fn register_struct_level<R, F>(&mut self, check: F)
    where
        R: Record,
        F: Fn(&R, &mut StructLevel<'_>) + Send + Sync + 'static,
    {
        self.struct_levels
            .entry(TypeId::of::<R>())
            .or_default()
            .push(Arc::new(TypedStructCheck {
                check,
                _record: PhantomData,
            }));
        debug!(record = R::NAME, "registered struct-level validation");
    }

    pub(crate) fn struct_levels(&self, id: TypeId) -> &[Arc<dyn StructCheck>] {
        self.struct_levels.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    // ------------------------------------------------------------------------
    // translations
    // ------------------------------------------------------------------------

    pub(crate) fn register_translation(
        &mut self,
        locale: &Locale,
        tag: &str,
        template: MessageTemplate,
        render: Option<RenderFn>,
    ) -> Result<(), RegistrationError> {
        if self.translations.contains(locale.tag(), tag) {
            self.on_duplicate("translation", &format!("{}:{tag}", locale.tag()))?;
        }
        self.translations.insert(locale, tag, template, render);
        trace!(locale = locale.tag(), tag, "registered translation");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // field names
    // ------------------------------------------------------------------------

    pub(crate) fn set_tag_name_fn(&mut self, f: TagNameFn) {
        if self.tag_name.is_some() {
            debug!("replacing tag-name function");
        }
        self.tag_name = Some(f);
    }

    /// Name used in the namespace for a declared field.
    pub(crate) fn display_name(&self, decl: &FieldDecl) -> String {
        let name = self
            .tag_name
            .as_ref()
            .and_then(|f| f(decl))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| decl.name().to_owned());
        trace!(field = decl.name(), display = %name, "resolved field name");
        name
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = self.rules.keys().collect();
        rules.sort();
        f.debug_struct("Registry")
            .field("policy", &self.policy)
            .field("rules", &rules)
            .field("aliases", &self.aliases)
            .field("custom_types", &self.custom_types.len())
            .field("struct_levels", &self.struct_levels.len())
            .field("tag_name_fn", &self.tag_name.is_some())
            .field("translations", &self.translations)
            .finish_non_exhaustive()
    }
}

fn check_name(name: &str) -> Result<(), RegistrationError> {
    let restricted = name.is_empty()
        || RESERVED.contains(&name)
        || name.chars().any(|c| c == ',' || c == '|' || c == '=' || c.is_whitespace());
    if restricted {
        return Err(RegistrationError::Reserved {
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn strip_option(kind: &FieldKind) -> &FieldKind {
    match kind {
        FieldKind::Option(inner) => strip_option(inner),
        other => other,
    }
}

// ============================================================================
// ERASED CALLBACKS
// ============================================================================

struct CustomCoercion {
    kind: FieldKind,
    extract: Arc<dyn Coerce>,
}

trait Coerce: Send + Sync {
    /// `None` if the value is not the registered type.
    fn extract<'a>(&self, value: CustomRef<'a>) -> Option<Result<Value<'a>, CoercionError>>;
}

struct TypedCoercion<T, F> {
    extract: F,
    _type: PhantomData<fn(&T)>,
}

impl<T, F> Coerce for TypedCoercion<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<Value<'_>, CoercionError> + Send + Sync,
{
    fn extract<'a>(&self, value: CustomRef<'a>) -> Option<Result<Value<'a>, CoercionError>> {
        value.downcast::<T>().map(|v| (self.extract)(v))
    }
}

/// A struct-level function with its record type erased.
pub(crate) trait StructCheck: Send + Sync {
    fn run(&self, record: &dyn Any, level: &mut StructLevel<'_>);
}

struct TypedStructCheck<R, F> {
    check: F,
    _record: PhantomData<fn(&R)>,
}

impl<R, F> StructCheck for TypedStructCheck<R, F>
where
    R: Record,
    F: Fn(&R, &mut StructLevel<'_>) + Send + Sync,
{
    fn run(&self, record: &dyn Any, level: &mut StructLevel<'_>) {
        if let Some(record) = record.downcast_ref::<R>() {
            (self.check)(record, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FnRule;

    fn always() -> Arc<dyn Rule> {
        Arc::new(FnRule::new(|_: &Value<'_>, _: &str| true))
    }

    #[test]
    fn reserved_names_are_refused() {
        let mut registry = Registry::new(RegistrationPolicy::LastWriteWins);
        for name in ["required", "dive", "-", "", "a,b", "x|y", "k=v", "has space"] {
            let err = registry.register_rule(name, always()).unwrap_err();
            assert!(matches!(err, RegistrationError::Reserved { .. }), "{name:?}");
        }
    }

    #[test]
    fn reject_policy_refuses_duplicates() {
        let mut registry = Registry::new(RegistrationPolicy::Reject);
        registry.register_rule("even", always()).unwrap();

        let err = registry.register_rule("even", always()).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Duplicate {
                what: "rule",
                name: "even".to_owned()
            }
        );
    }

    #[test]
    fn last_write_wins_replaces_alias_with_rule() {
        let mut registry = Registry::with_builtins();
        registry.register_rule("iscolor", always()).unwrap();

        assert!(registry.alias("iscolor").is_none());
        assert!(registry.rule("iscolor").is_some());
    }

    #[test]
    fn alias_expansion_is_checked() {
        let mut registry = Registry::with_builtins();
        assert!(registry.register_alias("bad", "required,dive").is_err());
        assert!(registry.register_alias("loop", "loop|email").is_err());
        assert!(registry.register_alias("empty", " ").is_err());
        assert!(registry.register_alias("contact", "email|url").is_ok());
    }

    #[test]
    fn effective_kind_unwraps_options_and_custom_types() {
        struct Wrapper(i64);

        let mut registry = Registry::with_builtins();
        registry
            .register_custom_type::<Wrapper, _>(FieldKind::Int, |w| Ok(Value::Int(w.0)))
            .unwrap();

        let kind = FieldKind::Option(Box::new(FieldKind::custom::<Wrapper>()));
        assert_eq!(registry.effective_kind(&kind), FieldKind::Int);
    }

    #[test]
    fn failed_extraction_is_absent() {
        struct Broken;

        let mut registry = Registry::with_builtins();
        registry
            .register_custom_type::<Broken, _>(FieldKind::String, |_| {
                Err(CoercionError::new("unreadable"))
            })
            .unwrap();

        let broken = Broken;
        assert!(registry.coerce(Value::custom(&broken)).is_absent());
    }
}
