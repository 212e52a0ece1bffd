//! Askama templates for every artifact kind and the renderer that picks between them.

use anyhow::bail;
use askama::Template;
use std::collections::BTreeSet;

use super::closure::DtoDefinition;
use super::naming::{file_stem, variant_name};
use super::plan::{HandlerArtifact, RequestArtifact, RuleCheck, ValidationRule, ValidatorArtifact};
use super::policy::{ArtifactContext, ArtifactKind, WriteInstruction};
use super::types::TypeDescriptor;
use super::RequestKind;

/// Turns write instructions into source text.
pub trait Renderer {
    /// Whether this renderer has a template for `kind`.
    fn supports(&self, kind: ArtifactKind) -> bool;

    /// Render one instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails or the context does not match the kind.
    fn render(&self, instruction: &WriteInstruction) -> anyhow::Result<String>;
}

/// A struct field or enum variant line in a DTO
#[derive(Debug, Clone)]
pub struct FieldView {
    pub doc: Vec<String>,
    /// `#[serde(...)]` attribute body, empty for none
    pub serde: String,
    pub ident: String,
    pub rust_type: String,
}

#[derive(Debug, Clone)]
pub struct VariantView {
    pub ident: String,
    pub value: String,
}

/// Template data for a DTO module
#[derive(Template)]
#[template(path = "dto.rs.txt", escape = "none")]
pub struct DtoTemplateData {
    pub name: String,
    pub source_model: String,
    pub doc: Vec<String>,
    pub imports: Vec<String>,
    pub is_enum: bool,
    pub fields: Vec<FieldView>,
    pub variants: Vec<VariantView>,
}

/// Template data for a command module
#[derive(Template)]
#[template(path = "command.rs.txt", escape = "none")]
pub struct CommandTemplateData {
    pub request: RequestView,
}

/// Template data for a query module
#[derive(Template)]
#[template(path = "query.rs.txt", escape = "none")]
pub struct QueryTemplateData {
    pub request: RequestView,
}

/// Shared by the command and query templates
#[derive(Debug, Clone)]
pub struct RequestView {
    pub name: String,
    pub operation_id: String,
    pub method: String,
    pub path: String,
    pub doc: Vec<String>,
    pub imports: Vec<String>,
    pub fields: Vec<FieldView>,
    pub response_type: String,
    pub domain_response_type: String,
    pub created_on_success: bool,
    pub delete_returns_bool: bool,
}

/// Template data for a handler skeleton
#[derive(Template)]
#[template(path = "handler.rs.txt", escape = "none")]
pub struct HandlerTemplateData {
    pub name: String,
    pub request_name: String,
    pub request_module: String,
    pub response_name: String,
    pub response_type: String,
    pub domain_response_type: String,
    /// Placeholder body: `Ok(())` for unit responses, `todo!` otherwise
    pub body: String,
    pub argument: String,
}

#[derive(Debug, Clone)]
pub struct RuleView {
    /// Field is `Option<_>`; the check runs only when present
    pub optional: bool,
    pub ident: String,
    /// Expression that is true when the rule fails
    pub failure: String,
    pub field: String,
    pub message: String,
}

/// Template data for a validator module
#[derive(Template)]
#[template(path = "validator.rs.txt", escape = "none")]
pub struct ValidatorTemplateData {
    pub name: String,
    pub dto_name: String,
    pub dto_module: String,
    pub rules: Vec<RuleView>,
}

/// DTO names referenced anywhere in `ty`.
fn dto_refs(ty: &TypeDescriptor, out: &mut BTreeSet<String>) {
    out.extend(ty.references().into_iter().map(str::to_string));
}

fn uses_map(ty: &TypeDescriptor) -> bool {
    match ty {
        TypeDescriptor::MapOf(..) => true,
        TypeDescriptor::ArrayOf(inner) => uses_map(inner),
        TypeDescriptor::Scalar(_) | TypeDescriptor::Reference(_) => false,
    }
}

fn doc_lines(text: Option<&str>) -> Vec<String> {
    text.map(|t| t.lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default()
}

/// `#[serde(rename = "...")]` when the field identifier differs from the wire name.
fn rename_attr(ident: &str, wire: &str) -> Option<String> {
    let bare = ident.strip_prefix("r#").unwrap_or(ident);
    (bare != wire).then(|| format!("rename = {wire:?}"))
}

fn dto_view(dto: &DtoDefinition) -> DtoTemplateData {
    let mut refs = BTreeSet::new();
    let mut needs_map = false;
    let fields = dto
        .properties
        .iter()
        .map(|p| {
            dto_refs(&p.ty, &mut refs);
            needs_map |= uses_map(&p.ty);
            let mut serde = Vec::new();
            serde.extend(rename_attr(&p.field_name, &p.name));
            if p.is_optional() {
                serde.push("default, skip_serializing_if = \"Option::is_none\"".to_string());
            }
            FieldView {
                doc: doc_lines(p.description.as_deref()),
                serde: serde.join(", "),
                ident: p.field_name.clone(),
                rust_type: p.rust_type(),
            }
        })
        .collect();
    refs.remove(&dto.name);

    let mut imports: Vec<String> = refs
        .iter()
        .map(|name| format!("use super::{}::{name};", file_stem(name)))
        .collect();
    if needs_map {
        imports.insert(0, "use std::collections::HashMap;".to_string());
    }

    let mut seen = BTreeSet::new();
    let variants = dto
        .enum_values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let mut ident = variant_name(value);
            if !seen.insert(ident.clone()) {
                ident = format!("{ident}{i}");
            }
            VariantView {
                ident,
                value: format!("{value:?}"),
            }
        })
        .collect();

    DtoTemplateData {
        name: dto.name.clone(),
        source_model: dto.source_model.clone(),
        doc: doc_lines(dto.description.as_deref()),
        imports,
        is_enum: dto.is_enum(),
        fields,
        variants,
    }
}

fn request_view(request: &RequestArtifact) -> RequestView {
    let mut refs = BTreeSet::new();
    let mut needs_map = uses_map(&request.classification.dto_response_type);
    dto_refs(&request.classification.dto_response_type, &mut refs);
    let fields = request
        .fields
        .iter()
        .map(|f| {
            dto_refs(&f.ty, &mut refs);
            needs_map |= uses_map(&f.ty);
            let mut doc = Vec::new();
            if let Some(location) = f.location {
                doc.push(format!("`{}` {location} parameter", f.name));
            } else {
                doc.push("Request body".to_string());
            }
            let mut serde = Vec::new();
            serde.extend(rename_attr(&f.field_name, &f.name));
            if !f.required {
                serde.push("default, skip_serializing_if = \"Option::is_none\"".to_string());
            }
            FieldView {
                doc,
                serde: serde.join(", "),
                ident: f.field_name.clone(),
                rust_type: f.rust_type(),
            }
        })
        .collect();

    let mut imports: Vec<String> = refs
        .iter()
        .map(|name| format!("use super::super::dtos::{}::{name};", file_stem(name)))
        .collect();
    if needs_map {
        imports.insert(0, "use std::collections::HashMap;".to_string());
    }

    RequestView {
        name: request.name.clone(),
        operation_id: request.operation_id.clone(),
        method: request.method.clone(),
        path: request.path.clone(),
        doc: doc_lines(request.summary.as_deref()),
        imports,
        fields,
        response_type: request.classification.dto_response_type.to_string(),
        domain_response_type: request.classification.response_type.to_string(),
        created_on_success: request.classification.created_on_success,
        delete_returns_bool: request.classification.delete_returns_bool,
    }
}

fn handler_view(handler: &HandlerArtifact, contract_module: &str) -> HandlerTemplateData {
    let folder = ArtifactKind::from(handler.classification.kind).folder();
    let body = if handler.classification.is_unit {
        "Ok(())".to_string()
    } else {
        format!("todo!(\"implement {}\")", handler.name)
    };
    let argument = match handler.classification.kind {
        RequestKind::Command => "command",
        RequestKind::Query => "query",
    };
    HandlerTemplateData {
        name: handler.name.clone(),
        request_name: handler.request_name.clone(),
        request_module: format!(
            "{contract_module}::{folder}::{}",
            file_stem(&handler.request_name)
        ),
        response_name: format!("{}Response", handler.request_name),
        response_type: handler.classification.dto_response_type.to_string(),
        domain_response_type: handler.classification.response_type.to_string(),
        body,
        argument: argument.to_string(),
    }
}

fn rule_view(rule: &ValidationRule) -> RuleView {
    let (failure, message) = match &rule.check {
        RuleCheck::NotEmpty => ("value.is_empty()".to_string(), "must not be empty".to_string()),
        RuleCheck::MinLength(n) => (
            format!("value.chars().count() < {n}"),
            format!("must be at least {n} characters"),
        ),
        RuleCheck::MaxLength(n) => (
            format!("value.chars().count() > {n}"),
            format!("must be at most {n} characters"),
        ),
        RuleCheck::Minimum(x) => (
            format!("(*value as f64) < {x:?}"),
            format!("must be at least {x}"),
        ),
        RuleCheck::Maximum(x) => (
            format!("(*value as f64) > {x:?}"),
            format!("must be at most {x}"),
        ),
        RuleCheck::MinItems(n) => (
            format!("value.len() < {n}"),
            format!("must contain at least {n} items"),
        ),
        RuleCheck::MaxItems(n) => (
            format!("value.len() > {n}"),
            format!("must contain at most {n} items"),
        ),
        RuleCheck::Pattern(p) => (
            format!("!regex::Regex::new({p:?}).map(|re| re.is_match(value)).unwrap_or(false)"),
            format!("must match {p}"),
        ),
    };
    RuleView {
        optional: rule.optional,
        ident: rule.field_name.clone(),
        failure,
        field: format!("{:?}", rule.name),
        message: format!("{message:?}"),
    }
}

fn validator_view(validator: &ValidatorArtifact) -> ValidatorTemplateData {
    ValidatorTemplateData {
        name: validator.name.clone(),
        dto_name: validator.dto_name.clone(),
        dto_module: file_stem(&validator.dto_name),
        rules: validator.rules.iter().map(rule_view).collect(),
    }
}

/// Renders the bundled askama templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl Renderer for TemplateRenderer {
    fn supports(&self, _kind: ArtifactKind) -> bool {
        true
    }

    fn render(&self, instruction: &WriteInstruction) -> anyhow::Result<String> {
        let text = match (&instruction.context, instruction.kind) {
            (ArtifactContext::Dto(dto), ArtifactKind::Dto) => dto_view(dto).render()?,
            (ArtifactContext::Validator(v), ArtifactKind::Validator) => {
                validator_view(v).render()?
            }
            (ArtifactContext::Request(r), ArtifactKind::Command) => CommandTemplateData {
                request: request_view(r),
            }
            .render()?,
            (ArtifactContext::Request(r), ArtifactKind::Query) => QueryTemplateData {
                request: request_view(r),
            }
            .render()?,
            (
                ArtifactContext::Handler {
                    handler,
                    contract_module,
                },
                ArtifactKind::Handler,
            ) => handler_view(handler, contract_module).render()?,
            (_, kind) => bail!("{kind} instruction '{}' carries a mismatched context", instruction.name),
        };
        Ok(text)
    }
}
