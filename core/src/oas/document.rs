#![deny(missing_docs)]

//! # Document Model
//!
//! Entry points that resolve a whole OpenAPI document into a [`DocumentModel`],
//! and the emission order of its schemas.
//!
//! Resolution runs in a fixed order: `components.schemas`, then `paths`,
//! then `components.parameters`. Inline schemas discovered along the way
//! are merged over the named ones at the end.

use crate::error::{AppError, AppResult};
use crate::oas::context::ResolutionContext;
use crate::oas::models::{
    DiscriminatorBaseClass, DocumentInfo, HttpMethod, OperationNode, ParameterNode, PathNode,
    SchemaKind, SchemaNode, SchemaRef,
};
use crate::oas::references::RefResolver;
use crate::oas::resolver::resolve_parameter;
use crate::oas::routes::resolve_paths;
use crate::oas::schemas::SchemaResolver;
use crate::oas::shims::{from_fragment, ShimDocument};
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, info};

/// The resolved document. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    /// Document metadata.
    pub info: DocumentInfo,
    /// Resolved paths, in declaration order.
    pub paths: IndexMap<String, PathNode>,
    /// `components.parameters`, keyed by component name.
    pub named_parameters: IndexMap<String, ParameterNode>,
    /// Named schemas overlaid with the synthesized inline ones.
    pub all_schemas: IndexMap<String, SchemaRef>,
    /// Schemas marked with `__discriminator__(Class.attr)`.
    pub discriminator_base_classes: Vec<DiscriminatorBaseClass>,
}

impl DocumentModel {
    /// Looks up a schema by id.
    pub fn schema(&self, id: &str) -> Option<&SchemaRef> {
        self.all_schemas.get(id)
    }

    /// Every operation with its path, in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &OperationNode)> + '_ {
        self.paths.iter().flat_map(|(path, node)| {
            node.operations
                .iter()
                .map(move |(method, op)| (path.as_str(), *method, op))
        })
    }

    /// Object schemas in emission order: every schema after the schemas it depends on.
    pub fn sorted_schemas(&self) -> Vec<SchemaRef> {
        self.emission_order()
            .into_iter()
            .filter_map(|id| self.all_schemas.get(id))
            .filter(|node| node.kind == SchemaKind::Object && node.enum_values.is_none())
            .cloned()
            .collect()
    }

    /// Enumeration schemas, ordered by the same rule.
    pub fn sorted_enums(&self) -> Vec<SchemaRef> {
        self.emission_order()
            .into_iter()
            .filter_map(|id| self.all_schemas.get(id))
            .filter(|node| node.enum_values.is_some())
            .cloned()
            .collect()
    }

    /// Ids in dependency order.
    ///
    /// Depth-first over a work stack in declaration order: a schema is placed
    /// once all of its dependencies are. A dependency found on the current
    /// path is a cycle and is skipped. Aliases (entries stored under a key
    /// other than their node's id) are left out so each node is emitted once.
    fn emission_order(&self) -> Vec<&str> {
        enum Frame<'s> {
            Enter(&'s str),
            Exit(&'s str),
        }

        let mut placed: IndexSet<&str> = IndexSet::new();
        let mut visiting: HashSet<&str> = HashSet::new();
        for (key, node) in &self.all_schemas {
            if key != &node.id {
                continue;
            }
            let mut stack = vec![Frame::Enter(key.as_str())];
            while let Some(frame) = stack.pop() {
                match frame {
                    Frame::Enter(id) => {
                        if placed.contains(id) || visiting.contains(id) {
                            continue;
                        }
                        visiting.insert(id);
                        stack.push(Frame::Exit(id));
                        for dep in self.dependencies(id).into_iter().rev() {
                            stack.push(Frame::Enter(dep));
                        }
                    }
                    Frame::Exit(id) => {
                        visiting.remove(id);
                        placed.insert(id);
                    }
                }
            }
        }
        debug!(count = placed.len(), "computed emission order");
        placed.into_iter().collect()
    }

    /// Ids of the schemas `id` structurally depends on: `allOf`/`anyOf`
    /// members, property schemas and array items. Nodes without an entry
    /// of their own are looked through.
    fn dependencies(&self, id: &str) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(node) = self.all_schemas.get(id) {
            self.collect_dependencies(node, id, &mut out);
        }
        out
    }

    fn collect_dependencies<'s>(&'s self, node: &SchemaNode, owner: &str, out: &mut Vec<&'s str>) {
        let items = node.items.iter().flat_map(|items| items.variants());
        let children = node
            .all_of
            .iter()
            .chain(node.any_of.iter())
            .chain(node.properties.iter().map(|p| &p.schema))
            .chain(items);
        for child in children {
            match self.all_schemas.get_key_value(child.id.as_str()) {
                Some((key, _)) if key != owner => {
                    if !out.contains(&key.as_str()) {
                        out.push(key.as_str());
                    }
                }
                Some(_) => {}
                None => self.collect_dependencies(child, owner, out),
            }
        }
    }
}

/// Resolves a decoded OpenAPI document.
///
/// Fails on the first fatal error; no partial model is returned.
pub fn build_document(document: &Value) -> AppResult<DocumentModel> {
    let shim: ShimDocument = from_fragment(document)?;
    let schemas = SchemaResolver::new(RefResolver::new(document));
    let mut ctx = ResolutionContext::new();

    let mut all_schemas = IndexMap::with_capacity(shim.components.schemas.len());
    for (name, fragment) in &shim.components.schemas {
        let node = schemas.resolve_schema(&mut ctx, name, fragment, false)?;
        all_schemas.insert(name.clone(), node);
    }

    let paths = resolve_paths(&schemas, &mut ctx, &shim.paths)?;

    let mut named_parameters = IndexMap::with_capacity(shim.components.parameters.len());
    for (name, fragment) in &shim.components.parameters {
        let mut node = resolve_parameter(&schemas, &mut ctx, fragment)?;
        node.id = name.clone();
        named_parameters.insert(name.clone(), node);
    }

    let inline = ctx.inline.snapshot();
    debug!(named = all_schemas.len(), inline = inline.len(), "merging schemas");
    all_schemas.extend(inline);
    validate_discriminator_targets(&all_schemas)?;

    info!(
        title = %shim.info.title,
        schemas = all_schemas.len(),
        paths = paths.len(),
        "resolved document"
    );
    Ok(DocumentModel {
        info: DocumentInfo {
            title: shim.info.title,
            version: shim.info.version,
            description: shim.info.description,
        },
        paths,
        named_parameters,
        all_schemas,
        discriminator_base_classes: ctx.discriminator_base_classes().to_vec(),
    })
}

/// Decodes YAML or JSON text and resolves it.
pub fn parse_openapi_document(text: &str) -> AppResult<DocumentModel> {
    let document: Value =
        serde_yaml::from_str(text).map_err(|e| AppError::Decode(e.to_string()))?;
    build_document(&document)
}

/// Every discriminator target must be a declared, fully resolved schema.
fn validate_discriminator_targets(all_schemas: &IndexMap<String, SchemaRef>) -> AppResult<()> {
    for (owner, node) in all_schemas {
        let Some(discriminator) = &node.discriminator else {
            continue;
        };
        for (tag, target) in &discriminator.mapping {
            let declared = all_schemas
                .get(target.id.as_str())
                .is_some_and(|found| !found.is_placeholder);
            if !declared {
                return Err(AppError::InvalidDiscriminator {
                    message: format!(
                        "mapping \"{}\" of \"{}\" targets \"{}\", which is not a declared schema",
                        tag, owner, target.id
                    ),
                    fragment: json!({
                        "propertyName": &discriminator.property_name,
                        "mapping": {tag.as_str(): &target.id},
                    }),
                });
            }
        }
    }
    Ok(())
}
