//! Concurrent schema cache.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use super::{FieldSpec, RecordSchema, RecordType, RuleChain, TagParser};
use crate::error::SchemaError;
use crate::registry::Registry;

/// Derived schemas keyed by record type.
///
/// Derivation never holds a map lock, so two threads racing on the same
/// type both derive it and the first insert wins; both results are
/// identical.
#[derive(Default)]
pub(crate) struct SchemaCache {
    entries: DashMap<TypeId, Arc<RecordSchema>>,
}

impl SchemaCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `ty`, deriving it and every record it
    /// reaches on first use.
    pub(crate) fn get_or_derive(
        &self,
        ty: RecordType,
        registry: &Registry,
    ) -> Result<Arc<RecordSchema>, SchemaError> {
        if let Some(hit) = self.entries.get(&ty.id()) {
            return Ok(Arc::clone(hit.value()));
        }
        let mut stack = Vec::new();
        self.derive(ty, registry, &mut stack)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn derive(
        &self,
        ty: RecordType,
        registry: &Registry,
        stack: &mut Vec<RecordType>,
    ) -> Result<Arc<RecordSchema>, SchemaError> {
        if let Some(start) = stack.iter().position(|t| *t == ty) {
            let path = stack[start..]
                .iter()
                .map(RecordType::name)
                .chain(std::iter::once(ty.name()))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(SchemaError::Cycle { path });
        }
        if let Some(hit) = self.entries.get(&ty.id()) {
            return Ok(Arc::clone(hit.value()));
        }

        stack.push(ty);
        let declaration = ty.declaration();
        let mut fields = Vec::with_capacity(declaration.fields.len());

        for decl in declaration.fields {
            let skip = decl.tag.trim() == "-";
            let chain = if skip {
                RuleChain::default()
            } else {
                TagParser::new(registry, ty.name(), decl.name, &decl.tag).parse(&decl.kind)?
            };

            if !skip {
                for nested in registry.nested_records(&decl.kind) {
                    self.derive(nested, registry, stack)?;
                }
            }

            let display_name = registry.display_name(&decl);
            trace!(
                record = ty.name(),
                field = decl.name,
                display = %display_name,
                tag = %decl.tag,
                "parsed field tag"
            );

            fields.push(FieldSpec {
                name: decl.name,
                display_name,
                type_name: decl.type_name,
                kind: decl.kind,
                tag: decl.tag,
                skip,
                chain,
                accessor: decl.accessor,
            });
        }
        stack.pop();

        let schema = Arc::new(RecordSchema { ty, fields });
        debug!(
            record = ty.name(),
            fields = schema.fields.len(),
            "derived record schema"
        );

        let entry = self.entries.entry(ty.id()).or_insert(schema);
        Ok(Arc::clone(entry.value()))
    }
}
