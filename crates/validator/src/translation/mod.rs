//! Locale-aware violation messages.
//!
//! Messages are registered per `(locale, tag)` on the
//! [`ValidatorBuilder`](crate::ValidatorBuilder) and resolved by
//! [`Validator::translate`](crate::Validator::translate): the requested
//! locale first, then the configured fallback locale, then the canonical
//! message.
//!
//! Templates substitute `{0}` with the field's display name and `{1}` with
//! the rule parameter:
//!
//! ```rust,ignore
//! builder.register_translation(&Locale::english(), "required", "{0} is a required field")?;
//! builder.register_translation(
//!     &Locale::english(),
//!     "gt",
//!     MessageTemplate::plural("{0} must be longer than {1} character", "{0} must be longer than {1} characters"),
//! )?;
//! ```

pub mod en;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::violation::Violation;

// ============================================================================
// LOCALES
// ============================================================================

/// Plural category of a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    /// Singular form.
    One,
    /// Everything else.
    Other,
}

/// A locale tag and its plural rule.
#[derive(Clone)]
pub struct Locale {
    tag: String,
    plural: fn(f64) -> PluralCategory,
}

impl Locale {
    /// A locale with a custom plural rule.
    pub fn new(tag: impl Into<String>, plural: fn(f64) -> PluralCategory) -> Self {
        Self {
            tag: tag.into(),
            plural,
        }
    }

    /// `en`: one for exactly 1, other otherwise.
    pub fn english() -> Self {
        Self::new("en", english_plural)
    }

    /// `zh`: no plural distinction.
    pub fn chinese() -> Self {
        Self::new("zh", |_| PluralCategory::Other)
    }

    /// The locale tag, e.g. `"en"`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Plural category of `count` in this locale.
    pub fn plural_category(&self, count: f64) -> PluralCategory {
        (self.plural)(count)
    }
}

fn english_plural(count: f64) -> PluralCategory {
    if (count - 1.0).abs() < f64::EPSILON {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Locale").field(&self.tag).finish()
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Message text with `{0}` / `{1}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTemplate {
    /// One form for every count.
    Text(String),
    /// Forms chosen by the plural category of the rule parameter.
    Plural {
        /// Singular form.
        one: String,
        /// Plural form.
        other: String,
    },
}

impl MessageTemplate {
    /// A plural template.
    pub fn plural(one: impl Into<String>, other: impl Into<String>) -> Self {
        Self::Plural {
            one: one.into(),
            other: other.into(),
        }
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for MessageTemplate {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Custom rendering for one translation.
pub type RenderFn = Arc<dyn Fn(&MessageContext<'_>, &Violation) -> String + Send + Sync>;

/// What a [`RenderFn`] sees besides the violation.
pub struct MessageContext<'t> {
    locale: &'t Locale,
    template: &'t MessageTemplate,
}

impl<'t> MessageContext<'t> {
    /// Locale the message is rendered in.
    pub fn locale(&self) -> &'t Locale {
        self.locale
    }

    /// The registered template.
    pub fn template(&self) -> &'t MessageTemplate {
        self.template
    }

    /// Renders the registered template as if no render function existed.
    pub fn render_default(&self, violation: &Violation) -> String {
        match self.template {
            MessageTemplate::Text(text) => fill(text, violation),
            MessageTemplate::Plural { one, other } => self.plural(one, other, violation),
        }
    }

    /// Picks `one` or `other` by the plural category of the violation's
    /// parameter and fills it. Non-numeric parameters use `other`.
    pub fn plural(&self, one: &str, other: &str, violation: &Violation) -> String {
        let category = violation
            .param()
            .parse::<f64>()
            .map_or(PluralCategory::Other, |n| self.locale.plural_category(n));
        match category {
            PluralCategory::One => fill(one, violation),
            PluralCategory::Other => fill(other, violation),
        }
    }
}

/// Substitutes `{0}` and `{1}` in one pass.
pub fn fill(text: &str, violation: &Violation) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{0}") {
            out.push_str(violation.field());
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{1}") {
            out.push_str(violation.param());
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// CATALOGUES
// ============================================================================

struct Translation {
    template: MessageTemplate,
    render: Option<RenderFn>,
}

struct Catalogue {
    locale: Locale,
    entries: HashMap<String, Translation>,
}

/// Registered translations, keyed by locale tag then rule tag.
#[derive(Default)]
pub(crate) struct Translations {
    catalogues: HashMap<String, Catalogue>,
}

impl Translations {
    pub(crate) fn contains(&self, locale: &str, tag: &str) -> bool {
        self.catalogues
            .get(locale)
            .is_some_and(|c| c.entries.contains_key(tag))
    }

    pub(crate) fn insert(
        &mut self,
        locale: &Locale,
        tag: &str,
        template: MessageTemplate,
        render: Option<RenderFn>,
    ) {
        let catalogue = self
            .catalogues
            .entry(locale.tag().to_owned())
            .or_insert_with(|| Catalogue {
                locale: locale.clone(),
                entries: HashMap::new(),
            });
        catalogue.locale = locale.clone();
        catalogue
            .entries
            .insert(tag.to_owned(), Translation { template, render });
    }

    /// Registered locale tags, sorted.
    pub(crate) fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<_> = self.catalogues.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Message for `violation` in `locale`, else `fallback`, else the
    /// canonical message.
    pub(crate) fn translate(&self, violation: &Violation, locale: &str, fallback: &str) -> String {
        [locale, fallback]
            .into_iter()
            .find_map(|tag| self.render(violation, tag))
            .unwrap_or_else(|| violation.canonical_message())
    }

    fn render(&self, violation: &Violation, locale: &str) -> Option<String> {
        let catalogue = self.catalogues.get(locale)?;
        let translation = catalogue.entries.get(violation.tag())?;
        let context = MessageContext {
            locale: &catalogue.locale,
            template: &translation.template,
        };
        Some(match &translation.render {
            Some(render) => render(&context, violation),
            None => context.render_default(violation),
        })
    }
}

impl fmt::Debug for Translations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translations")
            .field("locales", &self.locales())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn violation(field: &str, tag: &str, param: &str) -> Violation {
        Violation {
            namespace: format!("User.{field}"),
            struct_namespace: format!("User.{field}"),
            field: field.to_owned(),
            struct_field: field.to_owned(),
            tag: tag.to_owned(),
            actual_tag: tag.to_owned(),
            kind: "string",
            type_name: "String".to_owned(),
            value: String::new(),
            param: param.to_owned(),
            message: None,
        }
    }

    #[test]
    fn fill_substitutes_once() {
        let v = violation("Name", "contains", "{0}");
        assert_eq!(fill("{0} must contain '{1}' {x}", &v), "Name must contain '{0}' {x}");
    }

    #[test]
    fn resolution_order() {
        let mut translations = Translations::default();
        translations.insert(&Locale::english(), "required", "{0} is required".into(), None);
        translations.insert(&Locale::chinese(), "required", "{0}为必填字段".into(), None);

        let v = violation("Name", "required", "");
        assert_eq!(translations.translate(&v, "zh", "en"), "Name为必填字段");
        assert_eq!(translations.translate(&v, "fr", "en"), "Name is required");

        let v = violation("Name", "email", "");
        assert_eq!(translations.translate(&v, "en", "en"), v.canonical_message());
    }

    #[test]
    fn plural_forms_follow_locale_rule() {
        let mut translations = Translations::default();
        let template = MessageTemplate::plural("{0}: {1} item", "{0}: {1} items");
        translations.insert(&Locale::english(), "min", template.clone(), None);
        translations.insert(&Locale::chinese(), "min", template, None);

        assert_eq!(translations.translate(&violation("Tags", "min", "1"), "en", "en"), "Tags: 1 item");
        assert_eq!(translations.translate(&violation("Tags", "min", "3"), "en", "en"), "Tags: 3 items");
        assert_eq!(translations.translate(&violation("Tags", "min", "1"), "zh", "en"), "Tags: 1 items");
    }

    #[test]
    fn render_function_overrides_template() {
        let mut translations = Translations::default();
        let render: RenderFn = Arc::new(|ctx: &MessageContext<'_>, v: &Violation| {
            format!("[{}] {}", ctx.locale().tag(), ctx.render_default(v))
        });
        translations.insert(&Locale::english(), "required", "{0} is required".into(), Some(render));

        let v = violation("Name", "required", "");
        assert_eq!(translations.translate(&v, "en", "en"), "[en] Name is required");
        assert_eq!(translations.locales(), vec!["en"]);
    }
}
