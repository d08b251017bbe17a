use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use crate::support::{attrs, diag};

const CONTAINER_KEYS: &[&str] = &["name"];
const FIELD_KEYS: &[&str] = &["rules", "rename", "label", "skip"];

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(ts) => ts.into(),
        Err(e) => diag::to_compile_error(e),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(diag::error_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }

    let container = attrs::parse_attrs(&input.attrs, "validate")?;
    container.ensure_known(CONTAINER_KEYS, "validate")?;
    let record_name = container
        .get_string("name")
        .unwrap_or_else(|| struct_name.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => {
                return Ok(emit(struct_name, &record_name, &[]));
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    struct_name.span(),
                    "Record derive requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Record derive can only be used on structs",
            ));
        }
    };

    let mut declarations = Vec::with_capacity(fields.len());
    for field in fields {
        let args = attrs::parse_attrs(&field.attrs, "validate")?;
        args.ensure_known(FIELD_KEYS, "validate")?;
        if args.has_flag("skip") {
            continue;
        }

        let Some(ident) = &field.ident else {
            continue;
        };
        let name = args
            .get_string("rename")
            .unwrap_or_else(|| ident.to_string());

        let rules = match (args.literal(), args.get_string("rules")) {
            (Some(_), Some(_)) => {
                return Err(diag::error_spanned(
                    ident,
                    "rules given twice; use either `\"...\"` or `rules = \"...\"`",
                ));
            }
            (Some(lit), None) => Some(lit.value()),
            (None, rules) => rules,
        };

        let mut labels = args.nested_strings("label")?;
        if let Some(rename) = attrs::serde_rename(&field.attrs) {
            labels.push(("serde".to_owned(), rename));
        }

        let rules_call = rules.map(|tag| quote!(.rules(#tag)));
        let label_calls = labels
            .iter()
            .map(|(key, value)| quote!(.label(#key, #value)));

        declarations.push(quote! {
            schema.field(#name, |record| &record.#ident) #rules_call #(#label_calls)*;
        });
    }

    Ok(emit(struct_name, &record_name, &declarations))
}

fn emit(struct_name: &syn::Ident, record_name: &str, declarations: &[TokenStream2]) -> TokenStream2 {
    let schema_param = if declarations.is_empty() {
        quote!(_schema)
    } else {
        quote!(schema)
    };

    quote! {
        impl ::tagcheck::Record for #struct_name {
            const NAME: &'static str = #record_name;

            fn describe(#schema_param: &mut ::tagcheck::SchemaBuilder<Self>) {
                #(#declarations)*
            }
        }

        impl ::tagcheck::FieldType for #struct_name {
            fn kind() -> ::tagcheck::FieldKind {
                ::tagcheck::FieldKind::record::<Self>()
            }

            fn value(&self) -> ::tagcheck::Value<'_> {
                ::tagcheck::Value::record(self)
            }
        }
    }
}
