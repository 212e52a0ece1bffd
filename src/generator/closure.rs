//! DTO closure over the model reference graph.
//!
//! Starting from the models an operation touches (body, response, parameters), the
//! builder walks every property reference and emits exactly one [`DtoDefinition`] per
//! derived DTO name across the whole document. Cycles and diamonds terminate on the
//! `visited` set; the state lives in an explicit [`ClosureState`] value.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

use super::naming::{dto_name, field_name, is_dto_name, DTO_SUFFIX};
use super::types::{rewrite_to_dto, TypeDescriptor};
use crate::error::GenerationError;
use crate::spec::{ModelDefinition, ModelProperty, SchemaDocument, ValidationConstraints};

/// One property of a DTO, built from the matching model property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DtoProperty {
    /// Wire name, kept for `#[serde(rename)]`
    pub name: String,
    pub field_name: String,
    pub ty: TypeDescriptor,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
    pub constraints: ValidationConstraints,
    /// Pattern with its quoting delimiters removed
    pub pattern: Option<String>,
    /// Direct reference that leads back to the owning DTO; rendered as `Box<_>`
    pub boxed: bool,
}

impl DtoProperty {
    pub fn from_model_property(property: &ModelProperty) -> Self {
        DtoProperty {
            name: property.name.clone(),
            field_name: field_name(&property.name),
            ty: rewrite_to_dto(&property.ty),
            required: property.required,
            nullable: property.nullable,
            description: property.description.clone(),
            constraints: property.constraints.clone(),
            pattern: property.pattern.as_deref().map(strip_pattern_delimiters),
            boxed: false,
        }
    }

    /// Field type in generated code; optional when not required or nullable.
    pub fn rust_type(&self) -> String {
        let base = if self.boxed {
            format!("Box<{}>", self.ty)
        } else {
            self.ty.to_string()
        };
        if self.is_optional() {
            format!("Option<{base}>")
        } else {
            base
        }
    }

    pub fn is_optional(&self) -> bool {
        !self.required || self.nullable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DtoDefinition {
    pub name: String,
    /// Model this DTO mirrors
    pub source_model: String,
    pub description: Option<String>,
    pub properties: Vec<DtoProperty>,
    pub enum_values: Vec<String>,
}

impl DtoDefinition {
    pub fn from_model(model: &ModelDefinition) -> Self {
        DtoDefinition {
            name: dto_name(&model.name),
            source_model: model.name.clone(),
            description: model.description.clone(),
            properties: model
                .properties
                .iter()
                .map(DtoProperty::from_model_property)
                .collect(),
            enum_values: model.enum_values.clone(),
        }
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// Remove one matching pair of `/`, `"` or `'` around a pattern.
///
/// `/^[a-z]+$/` → `^[a-z]+$`. Anything not wrapped in a matching pair is returned as is.
pub fn strip_pattern_delimiters(pattern: &str) -> String {
    let trimmed = pattern.trim();
    for delimiter in ['/', '"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(delimiter) && trimmed.ends_with(delimiter) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

/// Accumulated closure for one document.
#[derive(Debug, Clone, Default)]
pub struct ClosureState {
    visited: BTreeSet<String>,
    definitions: Vec<DtoDefinition>,
}

impl ClosureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a DTO with this derived name has been produced.
    pub fn contains(&self, dto_name: &str) -> bool {
        self.visited.contains(dto_name)
    }

    /// Definitions in discovery order.
    pub fn definitions(&self) -> &[DtoDefinition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<DtoDefinition> {
        self.definitions
    }

    /// Mark direct references that can reach their owner again through direct references.
    ///
    /// Arrays and maps already store their elements on the heap, so only bare references
    /// take part. Call once the closure is complete.
    pub fn box_recursive_properties(&mut self) {
        let edges: BTreeMap<String, Vec<String>> = self
            .definitions
            .iter()
            .map(|d| {
                let direct = d
                    .properties
                    .iter()
                    .filter_map(|p| match &p.ty {
                        TypeDescriptor::Reference(target) => Some(target.clone()),
                        _ => None,
                    })
                    .collect();
                (d.name.clone(), direct)
            })
            .collect();

        for definition in &mut self.definitions {
            for property in &mut definition.properties {
                if let TypeDescriptor::Reference(target) = &property.ty {
                    property.boxed = reaches(&edges, target, &definition.name);
                }
            }
        }
    }

    /// Add every model reachable from `root` that is not already in the closure.
    ///
    /// `referenced_by` names the operation or model holding the root, for error reporting.
    ///
    /// # Errors
    ///
    /// [`GenerationError::UnknownModel`] when a reference names a model that is not in
    /// `models`.
    pub fn expand(
        &mut self,
        models: &BTreeMap<String, ModelDefinition>,
        referenced_by: &str,
        root: &TypeDescriptor,
    ) -> Result<(), GenerationError> {
        let mut worklist: VecDeque<(String, String)> = root
            .references()
            .into_iter()
            .map(|name| (name.to_string(), referenced_by.to_string()))
            .collect();

        while let Some((name, holder)) = worklist.pop_front() {
            let derived = dto_name(&name);
            if self.visited.contains(&derived) {
                continue;
            }
            let model = lookup_model(models, &name).ok_or_else(|| GenerationError::UnknownModel {
                model: name.clone(),
                referenced_by: holder.clone(),
            })?;

            debug!(model = %model.name, dto = %derived, via = %holder, "dto added to closure");
            self.visited.insert(derived);
            for property in &model.properties {
                for reference in property.ty.references() {
                    worklist.push_back((reference.to_string(), model.name.clone()));
                }
            }
            self.definitions.push(DtoDefinition::from_model(model));
        }
        Ok(())
    }
}

fn reaches(edges: &BTreeMap<String, Vec<String>>, from: &str, to: &str) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = edges.get(node) {
            stack.extend(next.iter().map(String::as_str));
        }
    }
    false
}

/// Find a model by source name, accepting an already DTO-suffixed spelling.
fn lookup_model<'a>(
    models: &'a BTreeMap<String, ModelDefinition>,
    name: &str,
) -> Option<&'a ModelDefinition> {
    models.get(name).or_else(|| {
        if is_dto_name(name) {
            models.get(&name[..name.len() - DTO_SUFFIX.len()])
        } else {
            None
        }
    })
}

/// Compute the document-wide DTO closure.
///
/// Seeds are every operation's request body, response type and parameters, in
/// document order. With `include_all_models` every remaining model is added afterwards.
pub fn build_closure(
    document: &SchemaDocument,
    include_all_models: bool,
) -> Result<ClosureState, GenerationError> {
    let mut state = ClosureState::new();
    for operation in &document.operations {
        let id = operation.operation_id.as_str();
        if let Some(body) = &operation.request_body {
            state.expand(&document.models, id, &body.ty)?;
        }
        if let Some(ty) = operation.response.declared_type() {
            state.expand(&document.models, id, &ty)?;
        }
        for parameter in &operation.parameters {
            state.expand(&document.models, id, &parameter.ty)?;
        }
    }
    if include_all_models {
        for name in document.models.keys() {
            state.expand(&document.models, name, &TypeDescriptor::reference(name.as_str()))?;
        }
    }
    state.box_recursive_properties();
    debug!(dtos = state.definitions.len(), "dto closure computed");
    Ok(state)
}
