//! Rule tag grammar.
//!
//! ```text
//! tag      := "-" | chain
//! chain    := token ("," token)*
//! token    := "required" | "omitempty" | "dive" | "keys" | "endkeys"
//!           | alt ("|" alt)*
//! alt      := name ("=" param)?
//! ```
//!
//! Rules after `dive` apply to each element; `dive,keys,...,endkeys,...`
//! applies the inner block to map keys. Inside a parameter `0x2C` stands for
//! `,` and `0x7C` for `|`.

use std::fmt;
use std::sync::Arc;

use smallvec::{SmallVec, smallvec};

use crate::error::{BindError, SchemaError};
use crate::registry::Registry;
use crate::rules::Check;
use crate::value::{FieldKind, Value};

/// Aliases may reference other aliases up to this depth.
const MAX_ALIAS_DEPTH: usize = 8;

const STRUCTURAL: &[&str] = &["required", "omitempty", "dive", "keys", "endkeys", "-"];

// ============================================================================
// PARSED FORM
// ============================================================================

/// Rules for one level of a field, plus the optional dive below it.
#[derive(Debug, Clone, Default)]
pub struct RuleChain {
    rules: Vec<RuleSpec>,
    dive: Option<Box<DiveSpec>>,
}

impl RuleChain {
    /// Rules in tag order.
    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// The `dive` section, if any.
    pub fn dive(&self) -> Option<&DiveSpec> {
        self.dive.as_deref()
    }

    /// `true` when the chain has neither rules nor a dive.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.dive.is_none()
    }

    pub(crate) fn required(&self) -> Option<&RuleSpec> {
        self.rules
            .iter()
            .find(|r| matches!(r.class, RuleClass::Required))
    }

    pub(crate) fn omits_empty(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.class, RuleClass::OmitEmpty))
    }

    pub(crate) fn checks(&self) -> impl Iterator<Item = &RuleSpec> {
        self.rules
            .iter()
            .filter(|r| matches!(r.class, RuleClass::Check(_)))
    }
}

/// Rules applied to the elements (and optionally keys) of a collection.
#[derive(Debug, Clone)]
pub struct DiveSpec {
    keys: Option<RuleChain>,
    elements: RuleChain,
    key_type: Option<String>,
    element_type: String,
}

impl DiveSpec {
    /// Rules for map keys, from a `keys ... endkeys` block.
    pub fn keys(&self) -> Option<&RuleChain> {
        self.keys.as_ref()
    }

    /// Rules for each element or map value.
    pub fn elements(&self) -> &RuleChain {
        &self.elements
    }

    /// Declared element type label.
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Declared key type label, for maps.
    pub fn key_type(&self) -> Option<&str> {
        self.key_type.as_deref()
    }
}

/// One token of a tag, bound to the field kind.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub(crate) tag: String,
    pub(crate) actual_tag: String,
    pub(crate) param: String,
    pub(crate) class: RuleClass,
}

impl RuleSpec {
    /// Tag reported in violations; the alias name for expanded aliases.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The tag that actually ran.
    pub fn actual_tag(&self) -> &str {
        &self.actual_tag
    }

    /// Unescaped parameter text.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// `true` for `required`.
    pub fn is_required(&self) -> bool {
        matches!(self.class, RuleClass::Required)
    }

    /// `true` for `omitempty`.
    pub fn is_omitempty(&self) -> bool {
        matches!(self.class, RuleClass::OmitEmpty)
    }

    /// Evaluates a check rule; passes if any alternative passes.
    pub(crate) fn passes(&self, value: &Value<'_>) -> bool {
        match &self.class {
            RuleClass::Check(alternatives) => alternatives.iter().any(|b| b.check.check(value)),
            RuleClass::Required | RuleClass::OmitEmpty => true,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum RuleClass {
    Required,
    OmitEmpty,
    Check(SmallVec<[Bound; 1]>),
}

/// A rule bound to one field kind and parameter.
#[derive(Clone)]
pub(crate) struct Bound {
    name: String,
    check: Arc<dyn Check>,
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bound").field(&self.name).finish()
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Parses one field's tag against the registry.
pub(crate) struct TagParser<'r> {
    registry: &'r Registry,
    record: &'static str,
    field: &'static str,
    tag: &'r str,
}

impl<'r> TagParser<'r> {
    pub(crate) fn new(
        registry: &'r Registry,
        record: &'static str,
        field: &'static str,
        tag: &'r str,
    ) -> Self {
        Self {
            registry,
            record,
            field,
            tag,
        }
    }

    /// Parses the whole tag. An empty tag yields an empty chain.
    pub(crate) fn parse(&self, kind: &FieldKind) -> Result<RuleChain, SchemaError> {
        let tag = self.tag.trim();
        if tag.is_empty() {
            return Ok(RuleChain::default());
        }
        let tokens: Vec<&str> = tag.split(',').map(str::trim).collect();
        self.chain(&tokens, kind)
    }

    fn chain(&self, tokens: &[&str], kind: &FieldKind) -> Result<RuleChain, SchemaError> {
        let kind = self.registry.effective_kind(kind);
        let mut rules = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match *token {
                "dive" => {
                    let dive = self.dive(&tokens[i + 1..], &kind)?;
                    return Ok(RuleChain {
                        rules,
                        dive: Some(Box::new(dive)),
                    });
                }
                "keys" => return Err(self.malformed("`keys` must directly follow `dive`")),
                "endkeys" => return Err(self.malformed("`endkeys` without a matching `keys`")),
                "-" => return Err(self.malformed("`-` must be the entire tag")),
                token => self.token(token, &kind, 0, &mut rules)?,
            }
        }

        Ok(RuleChain { rules, dive: None })
    }

    fn dive(&self, rest: &[&str], kind: &FieldKind) -> Result<DiveSpec, SchemaError> {
        let (key_kind, element_kind) = match kind {
            FieldKind::Seq(element) => (None, element.as_ref()),
            FieldKind::Map { key, value } => (Some(key.as_ref()), value.as_ref()),
            other => {
                return Err(SchemaError::InvalidDive {
                    record: self.record,
                    field: self.field,
                    tag: self.tag.to_owned(),
                    kind: other.name(),
                });
            }
        };

        let mut rest = rest;
        let mut keys = None;
        if rest.first() == Some(&"keys") {
            let Some(key_kind) = key_kind else {
                return Err(self.malformed("`keys` requires a map field"));
            };
            let end = rest
                .iter()
                .position(|t| *t == "endkeys")
                .ok_or_else(|| self.malformed("`keys` without a matching `endkeys`"))?;
            if end == 1 {
                return Err(self.malformed("empty `keys` block"));
            }
            keys = Some(self.chain(&rest[1..end], key_kind)?);
            rest = &rest[end + 1..];
        }

        Ok(DiveSpec {
            keys,
            elements: self.chain(rest, element_kind)?,
            key_type: key_kind.map(FieldKind::label),
            element_type: element_kind.label(),
        })
    }

    fn token(
        &self,
        token: &str,
        kind: &FieldKind,
        depth: usize,
        out: &mut Vec<RuleSpec>,
    ) -> Result<(), SchemaError> {
        if token.is_empty() {
            return Err(self.malformed("empty rule"));
        }
        if token.contains('|') {
            out.push(self.alternatives(token, kind)?);
            return Ok(());
        }

        let (name, param) = split_param(token);
        match name {
            "required" | "omitempty" => {
                if !param.is_empty() {
                    return Err(self.malformed(format!("`{name}` takes no parameter")));
                }
                let class = if name == "required" {
                    RuleClass::Required
                } else {
                    RuleClass::OmitEmpty
                };
                out.push(RuleSpec {
                    tag: name.to_owned(),
                    actual_tag: name.to_owned(),
                    param,
                    class,
                });
            }
            "dive" | "keys" | "endkeys" | "-" => {
                return Err(self.malformed(format!("`{name}` is not allowed here")));
            }
            _ => {
                if let Some(expansion) = self.registry.alias(name) {
                    if !param.is_empty() {
                        return Err(self.malformed(format!("alias `{name}` takes no parameter")));
                    }
                    if depth >= MAX_ALIAS_DEPTH {
                        return Err(self.malformed(format!("alias `{name}` expands too deeply")));
                    }
                    let start = out.len();
                    for part in expansion.split(',').map(str::trim) {
                        self.token(part, kind, depth + 1, out)?;
                    }
                    for spec in &mut out[start..] {
                        spec.tag = name.to_owned();
                    }
                } else {
                    let bound = self.bind(name, &param, kind)?;
                    out.push(RuleSpec {
                        tag: name.to_owned(),
                        actual_tag: name.to_owned(),
                        param,
                        class: RuleClass::Check(smallvec![bound]),
                    });
                }
            }
        }
        Ok(())
    }

    fn alternatives(&self, token: &str, kind: &FieldKind) -> Result<RuleSpec, SchemaError> {
        let parts: Vec<(&str, String)> = token.split('|').map(str::trim).map(split_param).collect();
        for (name, _) in &parts {
            if name.is_empty() {
                return Err(self.malformed(format!("empty alternative in `{token}`")));
            }
            if STRUCTURAL.contains(name) || self.registry.alias(name).is_some() {
                return Err(self.malformed(format!("`{name}` cannot be used as a `|` alternative")));
            }
        }

        let mut bound = SmallVec::with_capacity(parts.len());
        let mut last_param = String::new();
        for (name, param) in parts {
            bound.push(self.bind(name, &param, kind)?);
            last_param = param;
        }

        Ok(RuleSpec {
            tag: token.to_owned(),
            actual_tag: token.to_owned(),
            param: last_param,
            class: RuleClass::Check(bound),
        })
    }

    fn bind(&self, name: &str, param: &str, kind: &FieldKind) -> Result<Bound, SchemaError> {
        let rule = self
            .registry
            .rule(name)
            .ok_or_else(|| SchemaError::UnknownRule {
                record: self.record,
                field: self.field,
                tag: self.tag.to_owned(),
                rule: name.to_owned(),
            })?;

        let check = rule.bind(param, kind).map_err(|err| match err {
            BindError::KindMismatch { kind } => SchemaError::KindMismatch {
                record: self.record,
                field: self.field,
                tag: self.tag.to_owned(),
                rule: name.to_owned(),
                kind,
            },
            BindError::InvalidParam(reason) => SchemaError::InvalidParam {
                record: self.record,
                field: self.field,
                tag: self.tag.to_owned(),
                rule: name.to_owned(),
                param: param.to_owned(),
                reason,
            },
        })?;

        Ok(Bound {
            name: name.to_owned(),
            check,
        })
    }

    fn malformed(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::Malformed {
            record: self.record,
            field: self.field,
            tag: self.tag.to_owned(),
            reason: reason.into(),
        }
    }
}

fn split_param(token: &str) -> (&str, String) {
    match token.split_once('=') {
        Some((name, param)) => (name, unescape(param)),
        None => (token, String::new()),
    }
}

fn unescape(param: &str) -> String {
    param.replace("0x2C", ",").replace("0x7C", "|")
}
