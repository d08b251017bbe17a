use syn::{
    Attribute, Ident, Lit, LitStr, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

use crate::support::diag;

/// Parsed attribute arguments container.
#[derive(Debug, Clone, Default)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single attribute item.
#[derive(Debug, Clone)]
pub enum AttrItem {
    /// A bare string literal like `"required,email"`
    Literal(LitStr),
    /// A flag like `skip`
    Flag(Ident),
    /// Key-value pair like `name = "User"`
    KeyValue { key: Ident, value: Lit },
    /// Nested key-value list like `label(json = "first_name")`
    Nested { key: Ident, items: Vec<AttrItem> },
}

impl AttrArgs {
    /// Find a key-value pair by key name.
    pub fn get_value(&self, key: &str) -> Option<&Lit> {
        self.items.iter().find_map(|item| match item {
            AttrItem::KeyValue { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    /// Get a string value by key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_value(key).and_then(|lit| match lit {
            Lit::Str(s) => Some(s.value()),
            _ => None,
        })
    }

    /// The first bare string literal, if any.
    pub fn literal(&self) -> Option<&LitStr> {
        self.items.iter().find_map(|item| match item {
            AttrItem::Literal(lit) => Some(lit),
            _ => None,
        })
    }

    /// Check if a flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, AttrItem::Flag(f) if f == flag))
    }

    /// String pairs from every nested list named `key`, in declaration order.
    pub fn nested_strings(&self, key: &str) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        for item in &self.items {
            let AttrItem::Nested { key: k, items } = item else {
                continue;
            };
            if k != key {
                continue;
            }
            for nested in items {
                match nested {
                    AttrItem::KeyValue {
                        key,
                        value: Lit::Str(s),
                    } => pairs.push((key.to_string(), s.value())),
                    other => {
                        return Err(diag::error_spanned(
                            k,
                            format!("`{key}(...)` expects `name = \"value\"` pairs, got {other:?}"),
                        ));
                    }
                }
            }
        }
        Ok(pairs)
    }

    /// Reject any key or flag not listed in `allowed`.
    pub fn ensure_known(&self, allowed: &[&str], attr: &str) -> Result<()> {
        for item in &self.items {
            let key = match item {
                AttrItem::Literal(_) => continue,
                AttrItem::Flag(key)
                | AttrItem::KeyValue { key, .. }
                | AttrItem::Nested { key, .. } => key,
            };
            if !allowed.iter().any(|a| key == a) {
                return Err(diag::error_spanned(
                    key,
                    format!(
                        "unknown `#[{attr}]` argument `{key}`; expected one of: {}",
                        allowed.join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Parse attribute like `#[validate(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute, expected: &str) -> Result<Option<AttrArgs>> {
    if !attr.path().is_ident(expected) {
        return Ok(None);
    }

    match &attr.meta {
        Meta::Path(_) => Ok(Some(AttrArgs::default())),
        Meta::List(list) => {
            let args = syn::parse2::<AttrArgsParser>(list.tokens.clone())?;
            Ok(Some(args.0))
        }
        Meta::NameValue(nv) => Err(diag::error_spanned(
            nv,
            format!("#[{expected}] must be #[{expected}(...)] or #[{expected}] (not name-value)"),
        )),
    }
}

/// Parse all attributes of a given type and merge them.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<AttrArgs> {
    let mut result = AttrArgs::default();

    for attr in attrs {
        if let Some(args) = parse_attr(attr, name)? {
            result.items.extend(args.items);
        }
    }

    Ok(result)
}

/// Extract `rename = "..."` from `#[serde(...)]` attributes.
///
/// Anything else inside the serde attribute is skipped.
pub fn serde_rename(attrs: &[Attribute]) -> Option<String> {
    let mut rename = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                let lit: LitStr = meta.value()?.parse()?;
                rename = Some(lit.value());
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                let _: proc_macro2::TokenStream = content.parse()?;
            }
            Ok(())
        });
    }
    rename
}

struct AttrArgsParser(AttrArgs);

impl Parse for AttrArgsParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = if input.is_empty() {
            vec![]
        } else {
            Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
                .into_iter()
                .map(|x| x.0)
                .collect()
        };
        Ok(Self(AttrArgs { items }))
    }
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self(AttrItem::Literal(input.parse()?)));
        }

        let key: Ident = input.parse()?;

        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let value: Lit = input.parse()?;
            return Ok(Self(AttrItem::KeyValue { key, value }));
        }

        if input.peek(syn::token::Paren) {
            let content;
            syn::parenthesized!(content in input);
            let items = Punctuated::<AttrItemParser, Token![,]>::parse_terminated(&content)?
                .into_iter()
                .map(|x| x.0)
                .collect();
            return Ok(Self(AttrItem::Nested { key, items }));
        }

        Ok(Self(AttrItem::Flag(key)))
    }
}
