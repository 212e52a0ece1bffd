use oas3::spec::{MediaType, ObjectOrReference, ObjectSchema, Operation, Parameter};
use oas3::OpenApiV3Spec;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::types::{
    slugify, ModelDefinition, ModelProperty, OperationDescriptor, ParameterDescriptor,
    ParameterLocation, RequestBody, ResponseShape, SchemaDocument, ValidationConstraints,
};
use crate::error::{GenerationError, ValidationIssue};
use crate::generator::{Scalar, TypeDescriptor};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
/// Alias chains deeper than this are treated as cyclic and degrade to `Any`
const MAX_ALIAS_DEPTH: usize = 16;
const RETURN_TYPE_EXTENSION: &str = "x-return-type";

fn any() -> TypeDescriptor {
    TypeDescriptor::scalar(Scalar::Any)
}

fn schema_to_value(schema: &ObjectOrReference<ObjectSchema>) -> Value {
    match schema {
        ObjectOrReference::Object(obj) => serde_json::to_value(obj).unwrap_or(Value::Null),
        ObjectOrReference::Ref { ref_path, .. } => json!({ "$ref": ref_path }),
    }
}

fn ref_name(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

/// The first non-null `type` and whether `null` is admitted (3.1 `type: [T, "null"]`).
fn schema_type(obj: &serde_json::Map<String, Value>) -> (Option<&str>, bool) {
    match obj.get("type") {
        Some(Value::String(t)) => (Some(t.as_str()), t == "null"),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t.as_str() == Some("null"));
            let first = types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null");
            (first, nullable)
        }
        _ => (None, false),
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

/// Object schemas and string enums become models; everything else is an alias that is
/// inlined wherever it is referenced.
fn is_model_schema(schema: &Value) -> bool {
    let Some(obj) = schema.as_object() else {
        return false;
    };
    if obj.contains_key("$ref") {
        return false;
    }
    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        return !values.is_empty() && values.iter().all(Value::is_string);
    }
    if obj.contains_key("properties") {
        return true;
    }
    if obj
        .get("allOf")
        .and_then(Value::as_array)
        .is_some_and(|parts| parts.len() > 1)
    {
        return true;
    }
    let (ty, _) = schema_type(obj);
    ty == Some("object")
        && !matches!(
            obj.get("additionalProperties"),
            Some(Value::Object(_)) | Some(Value::Bool(true))
        )
}

/// Maps JSON schema values onto type descriptors and model definitions.
struct SchemaMapper<'a> {
    schemas: &'a BTreeMap<String, Value>,
    model_names: BTreeSet<String>,
}

impl<'a> SchemaMapper<'a> {
    fn new(schemas: &'a BTreeMap<String, Value>) -> Self {
        let model_names = schemas
            .iter()
            .filter(|(_, schema)| is_model_schema(schema))
            .map(|(name, _)| name.clone())
            .collect();
        SchemaMapper {
            schemas,
            model_names,
        }
    }

    /// Descriptor for a schema plus whether it admits `null`.
    fn map(&self, schema: &Value, depth: usize) -> (TypeDescriptor, bool) {
        if depth > MAX_ALIAS_DEPTH {
            return (any(), false);
        }
        let Some(obj) = schema.as_object() else {
            return (any(), false);
        };
        let mut nullable = obj
            .get("nullable")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if let Some(ref_path) = obj.get("$ref").and_then(Value::as_str) {
            let name = ref_name(ref_path);
            if ref_path.starts_with(SCHEMA_REF_PREFIX) && !self.model_names.contains(name) {
                if let Some(alias) = self.schemas.get(name) {
                    let (ty, alias_nullable) = self.map(alias, depth + 1);
                    return (ty, nullable || alias_nullable);
                }
            }
            return (TypeDescriptor::reference(name), nullable);
        }

        for key in ["oneOf", "anyOf"] {
            if let Some(Value::Array(variants)) = obj.get(key) {
                let non_null: Vec<&Value> =
                    variants.iter().filter(|v| !is_null_schema(v)).collect();
                let has_null = non_null.len() != variants.len();
                if let [single] = non_null.as_slice() {
                    let (ty, inner_nullable) = self.map(single, depth + 1);
                    return (ty, nullable || has_null || inner_nullable);
                }
                return (any(), nullable || has_null);
            }
        }
        if let Some(Value::Array(parts)) = obj.get("allOf") {
            if let [single] = parts.as_slice() {
                let (ty, inner_nullable) = self.map(single, depth + 1);
                return (ty, nullable || inner_nullable);
            }
            return (any(), nullable);
        }

        let (ty_name, type_nullable) = schema_type(obj);
        nullable |= type_nullable;
        let format = obj.get("format").and_then(Value::as_str);
        let ty = match ty_name {
            Some("string") => TypeDescriptor::scalar(match format {
                Some("date") => Scalar::Date,
                Some("date-time") => Scalar::DateTime,
                Some("uuid") => Scalar::Uuid,
                Some("duration") => Scalar::Duration,
                Some("binary") | Some("byte") => Scalar::Binary,
                _ => Scalar::String,
            }),
            Some("integer") => TypeDescriptor::scalar(match format {
                Some("int64") => Scalar::Long,
                _ => Scalar::Integer,
            }),
            Some("number") => TypeDescriptor::scalar(match format {
                Some("float") => Scalar::Float,
                _ => Scalar::Double,
            }),
            Some("boolean") => TypeDescriptor::scalar(Scalar::Bool),
            Some("array") => TypeDescriptor::array_of(
                obj.get("items")
                    .map(|items| self.map(items, depth + 1).0)
                    .unwrap_or_else(any),
            ),
            Some("object") | None if !obj.contains_key("properties") => {
                match obj.get("additionalProperties") {
                    Some(values @ Value::Object(_)) => TypeDescriptor::map_of(
                        TypeDescriptor::scalar(Scalar::String),
                        self.map(values, depth + 1).0,
                    ),
                    Some(Value::Bool(true)) => {
                        TypeDescriptor::map_of(TypeDescriptor::scalar(Scalar::String), any())
                    }
                    _ => any(),
                }
            }
            _ => any(),
        };
        (ty, nullable)
    }

    fn property(&self, name: &str, schema: &Value, required: bool) -> ModelProperty {
        let (ty, nullable) = self.map(schema, 0);
        let field = |key: &str| schema.get(key);
        ModelProperty {
            name: name.to_string(),
            ty,
            required,
            nullable,
            description: field("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            constraints: ValidationConstraints {
                min_length: field("minLength").and_then(Value::as_u64),
                max_length: field("maxLength").and_then(Value::as_u64),
                minimum: field("minimum").and_then(Value::as_f64),
                maximum: field("maximum").and_then(Value::as_f64),
                min_items: field("minItems").and_then(Value::as_u64),
                max_items: field("maxItems").and_then(Value::as_u64),
            },
            pattern: field("pattern").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Properties of an object schema, with `allOf` parts merged in order.
    fn collect_properties(&self, schema: &Value, depth: usize, out: &mut Vec<ModelProperty>) {
        if depth > MAX_ALIAS_DEPTH {
            return;
        }
        let Some(obj) = schema.as_object() else {
            return;
        };
        if let Some(ref_path) = obj.get("$ref").and_then(Value::as_str) {
            if let Some(target) = self.schemas.get(ref_name(ref_path)) {
                self.collect_properties(target, depth + 1, out);
            }
            return;
        }
        if let Some(Value::Array(parts)) = obj.get("allOf") {
            for part in parts {
                self.collect_properties(part, depth + 1, out);
            }
        }

        let required: Vec<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if let Some(Value::Object(props)) = obj.get("properties") {
            for (prop_name, prop_schema) in props {
                let property =
                    self.property(prop_name, prop_schema, required.contains(&prop_name.as_str()));
                match out.iter_mut().find(|p| p.name == property.name) {
                    Some(existing) => *existing = property,
                    None => out.push(property),
                }
            }
        }
    }

    fn build_model(&self, name: &str, schema: &Value) -> ModelDefinition {
        let enum_values: Vec<String> = schema
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let mut properties = Vec::new();
        if enum_values.is_empty() {
            self.collect_properties(schema, 0, &mut properties);
        }
        ModelDefinition {
            name: name.to_string(),
            description: schema
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            properties,
            enum_values,
        }
    }

    /// Unresolvable parameter references are reported in `issues` under `location`.
    fn parameters(
        &self,
        spec: &OpenApiV3Spec,
        params: &[ObjectOrReference<Parameter>],
        location: &str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<ParameterDescriptor> {
        let mut out = Vec::new();
        for p in params {
            let param = match p {
                ObjectOrReference::Object(obj) => obj,
                ObjectOrReference::Ref { ref_path, .. } => {
                    match resolve_parameter_ref(spec, ref_path) {
                        Some(param) => param,
                        None => {
                            issues.push(ValidationIssue::new(
                                location,
                                "UnresolvedParameter",
                                format!("parameter reference '{ref_path}' cannot be resolved"),
                            ));
                            continue;
                        }
                    }
                }
            };
            let location = ParameterLocation::from(param.location);
            let ty = param
                .schema
                .as_ref()
                .map(|s| self.map(&schema_to_value(s), 0).0)
                .unwrap_or_else(|| TypeDescriptor::scalar(Scalar::String));
            out.push(ParameterDescriptor {
                name: param.name.clone(),
                location,
                // path parameters are always required
                required: location == ParameterLocation::Path || param.required.unwrap_or(false),
                ty,
            });
        }
        out
    }

    fn request_body(&self, operation: &Operation) -> Option<RequestBody> {
        let ObjectOrReference::Object(body) = operation.request_body.as_ref()? else {
            return None;
        };
        let schema = json_media(&body.content)?.schema.as_ref()?;
        let (ty, _) = self.map(&schema_to_value(schema), 0);
        Some(RequestBody {
            ty,
            required: body.required.unwrap_or(false),
        })
    }

    /// Shape of the first 2xx JSON response, `200` first, then ascending status.
    fn response_shape(&self, operation: &Operation) -> ResponseShape {
        let Some(responses) = operation.responses.as_ref() else {
            return ResponseShape::Void;
        };
        let mut success: Vec<(u16, &oas3::spec::Response)> = responses
            .iter()
            .filter_map(|(status, resp)| {
                let code: u16 = status.parse().ok()?;
                if !(200..300).contains(&code) {
                    return None;
                }
                match resp {
                    ObjectOrReference::Object(r) => Some((code, r)),
                    ObjectOrReference::Ref { .. } => None,
                }
            })
            .collect();
        success.sort_by_key(|(code, _)| (*code != 200, *code));

        for (_, resp) in success {
            if let Some(schema) = json_media(&resp.content).and_then(|m| m.schema.as_ref()) {
                let (ty, _) = self.map(&schema_to_value(schema), 0);
                return ResponseShape::from_descriptor(ty);
            }
        }
        ResponseShape::Void
    }
}

/// `application/json` if present, else the first `*/json` or `+json` media type.
fn json_media<'a, I>(content: I) -> Option<&'a MediaType>
where
    I: IntoIterator<Item = (&'a String, &'a MediaType)>,
{
    let mut fallback = None;
    for (mt, media) in content {
        if mt == "application/json" {
            return Some(media);
        }
        if fallback.is_none() && (mt.ends_with("/json") || mt.ends_with("+json")) {
            fallback = Some(media);
        }
    }
    fallback
}

fn resolve_parameter_ref<'a>(spec: &'a OpenApiV3Spec, ref_path: &str) -> Option<&'a Parameter> {
    let name = ref_path.strip_prefix(PARAMETER_REF_PREFIX)?;
    spec.components
        .as_ref()?
        .parameters
        .get(name)
        .and_then(|param_ref| match param_ref {
            ObjectOrReference::Object(param) => Some(param),
            _ => None,
        })
}

fn return_type_override(operation: &Operation) -> Option<&str> {
    operation
        .extensions
        .get(RETURN_TYPE_EXTENSION)
        .or_else(|| operation.extensions.get("return-type"))
        .and_then(Value::as_str)
}

/// Adapt a parsed OpenAPI document into engine descriptors.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidSchema`] listing every operation without an
/// `operationId`, every duplicated `operationId`, every unparsable `x-return-type` and
/// every parameter `$ref` that does not resolve.
pub fn build_document(spec: &OpenApiV3Spec) -> Result<SchemaDocument, GenerationError> {
    let schemas: BTreeMap<String, Value> = spec
        .components
        .as_ref()
        .map(|c| {
            c.schemas
                .iter()
                .map(|(name, schema)| (name.clone(), schema_to_value(schema)))
                .collect()
        })
        .unwrap_or_default();
    let mapper = SchemaMapper::new(&schemas);

    let models: BTreeMap<String, ModelDefinition> = mapper
        .model_names
        .iter()
        .filter_map(|name| {
            let schema = schemas.get(name)?;
            Some((name.clone(), mapper.build_model(name, schema)))
        })
        .collect();

    let is_model = |name: &str| models.contains_key(name);
    let mut issues = Vec::new();
    let mut operations = Vec::new();
    let mut seen_ids: BTreeMap<String, String> = BTreeMap::new();

    if let Some(paths_map) = spec.paths.as_ref() {
        for (path, item) in paths_map {
            for (method, operation) in item.methods() {
                let method = method.clone();
                let location = format!("paths.{path}.{}", method.as_str().to_ascii_lowercase());

                let Some(operation_id) = operation.operation_id.clone() else {
                    issues.push(ValidationIssue::new(
                        &location,
                        "MissingOperationId",
                        "operationId is required to derive artifact names",
                    ));
                    continue;
                };
                if let Some(previous) = seen_ids.insert(operation_id.clone(), location.clone()) {
                    issues.push(ValidationIssue::new(
                        &location,
                        "DuplicateOperationId",
                        format!("operationId '{operation_id}' is already used at {previous}"),
                    ));
                    continue;
                }

                let mut parameters =
                    mapper.parameters(spec, &item.parameters, &location, &mut issues);
                for param in mapper.parameters(spec, &operation.parameters, &location, &mut issues) {
                    // operation-level parameters override path-level ones
                    match parameters
                        .iter_mut()
                        .find(|p| p.name == param.name && p.location == param.location)
                    {
                        Some(existing) => *existing = param,
                        None => parameters.push(param),
                    }
                }

                let response = match return_type_override(operation) {
                    Some(text) => match ResponseShape::from_declared_in(text, &is_model) {
                        Ok(shape) => shape,
                        Err(err) => {
                            issues.push(ValidationIssue::new(
                                &location,
                                "InvalidReturnType",
                                err.to_string(),
                            ));
                            continue;
                        }
                    },
                    None => mapper.response_shape(operation),
                };

                operations.push(OperationDescriptor {
                    operation_id,
                    method,
                    path: path.clone(),
                    summary: operation.summary.clone(),
                    tags: operation.tags.clone(),
                    parameters,
                    request_body: mapper.request_body(operation),
                    response,
                });
            }
        }
    }

    if !issues.is_empty() {
        return Err(GenerationError::InvalidSchema(issues));
    }

    debug!(
        operations = operations.len(),
        models = models.len(),
        aliases = schemas.len() - models.len(),
        "schema document adapted"
    );
    Ok(SchemaDocument {
        title: spec.info.title.clone(),
        slug: slugify(&spec.info.title),
        version: spec.info.version.clone(),
        operations,
        models,
    })
}
