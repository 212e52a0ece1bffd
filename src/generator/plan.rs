//! Merge classification, naming and the DTO closure into one ordered plan.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::classify::{classify, RequestKind, ResponseClassification};
use super::closure::{build_closure, DtoDefinition, DtoProperty};
use super::naming::{
    command_name, field_name, file_stem, handler_name, query_name, validator_name,
};
use super::types::{rewrite_to_dto, Scalar, TypeDescriptor};
use crate::error::GenerationError;
use crate::spec::{OperationDescriptor, ParameterLocation, SchemaDocument};

/// Planner switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Emit a validator per DTO
    pub validators: bool,
    /// Emit a DTO for every model, reachable or not
    pub include_all_models: bool,
}

/// A field of a command/query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestField {
    /// Wire name of the parameter, or `body`
    pub name: String,
    pub field_name: String,
    /// DTO-rewritten type
    pub ty: TypeDescriptor,
    pub required: bool,
    /// `None` for the request body
    pub location: Option<ParameterLocation>,
}

impl RequestField {
    pub fn rust_type(&self) -> String {
        if self.required {
            self.ty.to_string()
        } else {
            format!("Option<{}>", self.ty)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestArtifact {
    pub kind: RequestKind,
    pub name: String,
    pub operation_id: String,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub fields: Vec<RequestField>,
    pub classification: ResponseClassification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerArtifact {
    pub name: String,
    pub request_name: String,
    pub operation_id: String,
    pub classification: ResponseClassification,
}

/// Check applied by a generated validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum RuleCheck {
    /// Required strings and collections must not be empty
    NotEmpty,
    MinLength(u64),
    MaxLength(u64),
    Minimum(f64),
    Maximum(f64),
    MinItems(u64),
    MaxItems(u64),
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRule {
    pub field_name: String,
    /// Wire name used in error messages
    pub name: String,
    /// Field is `Option<_>`; the check applies only when present
    pub optional: bool,
    pub check: RuleCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorArtifact {
    pub name: String,
    pub dto_name: String,
    pub rules: Vec<ValidationRule>,
}

/// Everything one generation run produces, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationPlan {
    pub dtos: Vec<DtoDefinition>,
    pub validators: Vec<ValidatorArtifact>,
    pub requests: Vec<RequestArtifact>,
    pub handlers: Vec<HandlerArtifact>,
}

impl GenerationPlan {
    pub fn dto(&self, name: &str) -> Option<&DtoDefinition> {
        self.dtos.iter().find(|d| d.name == name)
    }

    pub fn request(&self, name: &str) -> Option<&RequestArtifact> {
        self.requests.iter().find(|r| r.name == name)
    }

    pub fn artifact_count(&self) -> usize {
        self.dtos.len() + self.validators.len() + self.requests.len() + self.handlers.len()
    }
}

fn request_name(kind: RequestKind, operation_id: &str) -> String {
    match kind {
        RequestKind::Command => command_name(operation_id),
        RequestKind::Query => query_name(operation_id),
    }
}

fn request_fields(operation: &OperationDescriptor) -> Vec<RequestField> {
    let mut fields: Vec<RequestField> = Vec::new();
    for parameter in &operation.parameters {
        let mut name = field_name(&parameter.name);
        if fields.iter().any(|f| f.field_name == name) {
            // same name in two locations, e.g. `id` in path and query
            name = format!("{name}_{}", parameter.location);
        }
        fields.push(RequestField {
            name: parameter.name.clone(),
            field_name: name,
            ty: rewrite_to_dto(&parameter.ty),
            required: parameter.required,
            location: Some(parameter.location),
        });
    }
    if let Some(body) = &operation.request_body {
        let name = if fields.iter().any(|f| f.field_name == "body") {
            "request_body"
        } else {
            "body"
        };
        fields.push(RequestField {
            name: "body".to_string(),
            field_name: name.to_string(),
            ty: rewrite_to_dto(&body.ty),
            required: body.required,
            location: None,
        });
    }
    fields
}

fn is_text(ty: &TypeDescriptor) -> bool {
    matches!(ty, TypeDescriptor::Scalar(Scalar::String))
}

fn is_numeric(ty: &TypeDescriptor) -> bool {
    matches!(
        ty,
        TypeDescriptor::Scalar(Scalar::Integer | Scalar::Long | Scalar::Float | Scalar::Double)
    )
}

/// Rules for one property; constraints that do not fit the property type are ignored.
fn property_rules(property: &DtoProperty) -> Vec<RuleCheck> {
    let c = &property.constraints;
    let mut checks = Vec::new();
    let ty = &property.ty;
    let is_array = matches!(ty, TypeDescriptor::ArrayOf(_));

    if property.required && !property.nullable && (is_text(ty) || is_array) {
        checks.push(RuleCheck::NotEmpty);
    }
    if is_text(ty) {
        checks.extend(c.min_length.map(RuleCheck::MinLength));
        checks.extend(c.max_length.map(RuleCheck::MaxLength));
        checks.extend(property.pattern.clone().map(RuleCheck::Pattern));
    }
    if is_numeric(ty) {
        checks.extend(c.minimum.map(RuleCheck::Minimum));
        checks.extend(c.maximum.map(RuleCheck::Maximum));
    }
    if is_array {
        checks.extend(c.min_items.map(RuleCheck::MinItems));
        checks.extend(c.max_items.map(RuleCheck::MaxItems));
    }
    checks
}

/// Validator for a DTO; enum DTOs have nothing to validate and get none.
pub fn validator_for(dto: &DtoDefinition) -> Option<ValidatorArtifact> {
    if dto.is_enum() {
        return None;
    }
    let rules = dto
        .properties
        .iter()
        .flat_map(|property| {
            property_rules(property)
                .into_iter()
                .map(|check| ValidationRule {
                    field_name: property.field_name.clone(),
                    name: property.name.clone(),
                    optional: property.is_optional(),
                    check,
                })
        })
        .collect();
    Some(ValidatorArtifact {
        name: validator_name(&dto.name),
        dto_name: dto.name.clone(),
        rules,
    })
}

/// Artifacts of one kind share a folder, so their file stems must be distinct.
fn check_file_stems<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), GenerationError> {
    let mut stems: BTreeMap<String, &str> = BTreeMap::new();
    for name in names {
        let stem = file_stem(name);
        if let Some(first) = stems.insert(stem.clone(), name) {
            return Err(GenerationError::NamingCollision {
                name: stem,
                first: first.to_string(),
                second: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Build the generation plan for a document.
///
/// # Errors
///
/// * [`GenerationError::UnknownModel`] when the closure hits an undefined model
/// * [`GenerationError::NamingCollision`] when two operations derive the same request name,
///   or two artifacts of one kind would be written to the same file
pub fn build_plan(
    document: &SchemaDocument,
    options: PlanOptions,
) -> Result<GenerationPlan, GenerationError> {
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    let mut requests = Vec::with_capacity(document.operations.len());
    let mut handlers = Vec::with_capacity(document.operations.len());

    for operation in &document.operations {
        let classification = classify(operation);
        let name = request_name(classification.kind, &operation.operation_id);
        if let Some(first) = owners.insert(name.clone(), operation.operation_id.clone()) {
            return Err(GenerationError::NamingCollision {
                name,
                first,
                second: operation.operation_id.clone(),
            });
        }
        debug!(
            operation_id = %operation.operation_id,
            kind = %classification.kind,
            request = %name,
            response = %classification.response_type,
            "operation classified"
        );

        handlers.push(HandlerArtifact {
            name: handler_name(&name),
            request_name: name.clone(),
            operation_id: operation.operation_id.clone(),
            classification: classification.clone(),
        });
        requests.push(RequestArtifact {
            kind: classification.kind,
            name,
            operation_id: operation.operation_id.clone(),
            method: operation.method.to_string(),
            path: operation.path.clone(),
            summary: operation.summary.clone(),
            fields: request_fields(operation),
            classification,
        });
    }

    let dtos = build_closure(document, options.include_all_models)?.into_definitions();
    let validators: Vec<ValidatorArtifact> = if options.validators {
        dtos.iter().filter_map(validator_for).collect()
    } else {
        Vec::new()
    };

    check_file_stems(dtos.iter().map(|d| d.name.as_str()))?;
    check_file_stems(validators.iter().map(|v| v.name.as_str()))?;
    check_file_stems(requests.iter().map(|r| r.name.as_str()))?;
    check_file_stems(handlers.iter().map(|h| h.name.as_str()))?;

    let plan = GenerationPlan {
        dtos,
        validators,
        requests,
        handlers,
    };
    info!(
        dtos = plan.dtos.len(),
        validators = plan.validators.len(),
        requests = plan.requests.len(),
        handlers = plan.handlers.len(),
        "generation plan built"
    );
    Ok(plan)
}
