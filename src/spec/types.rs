use http::Method;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::GenerationError;
use crate::generator::{Scalar, TypeDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

impl From<oas3::spec::ParameterIn> for ParameterLocation {
    fn from(loc: oas3::spec::ParameterIn) -> Self {
        match loc {
            oas3::spec::ParameterIn::Path => ParameterLocation::Path,
            oas3::spec::ParameterIn::Query => ParameterLocation::Query,
            oas3::spec::ParameterIn::Header => ParameterLocation::Header,
            oas3::spec::ParameterIn::Cookie => ParameterLocation::Cookie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub ty: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub ty: TypeDescriptor,
    pub required: bool,
}

/// Declared success response of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    Void,
    Single(TypeDescriptor),
    /// Array of the element type
    Array(TypeDescriptor),
    Map(TypeDescriptor, TypeDescriptor),
    Primitive(Scalar),
}

impl ResponseShape {
    /// Shape of a response whose body is `ty`.
    pub fn from_descriptor(ty: TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Scalar(Scalar::Unit) => ResponseShape::Void,
            TypeDescriptor::Scalar(s) => ResponseShape::Primitive(s),
            TypeDescriptor::Reference(_) => ResponseShape::Single(ty),
            TypeDescriptor::ArrayOf(inner) => ResponseShape::Array(*inner),
            TypeDescriptor::MapOf(key, value) => ResponseShape::Map(*key, *value),
        }
    }

    /// Shape from a declared return type string such as `Vec<Pet>` or `HashMap<String, i32>`.
    pub fn from_declared(text: &str) -> Result<Self, GenerationError> {
        Ok(Self::from_descriptor(text.parse()?))
    }

    /// Like [`ResponseShape::from_declared`], with bare names that satisfy `is_model`
    /// kept as model references.
    pub fn from_declared_in(
        text: &str,
        is_model: &dyn Fn(&str) -> bool,
    ) -> Result<Self, GenerationError> {
        Ok(Self::from_descriptor(TypeDescriptor::parse_declared(
            text, is_model,
        )?))
    }

    /// The body type, `None` for void.
    pub fn declared_type(&self) -> Option<TypeDescriptor> {
        match self {
            ResponseShape::Void => None,
            ResponseShape::Single(ty) => Some(ty.clone()),
            ResponseShape::Array(elem) => Some(TypeDescriptor::array_of(elem.clone())),
            ResponseShape::Map(key, value) => Some(TypeDescriptor::map_of(key.clone(), value.clone())),
            ResponseShape::Primitive(s) => Some(TypeDescriptor::scalar(*s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub operation_id: String,
    pub method: Method,
    pub path: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub request_body: Option<RequestBody>,
    pub response: ResponseShape,
}

impl OperationDescriptor {
    /// Minimal descriptor with no parameters, body or response.
    pub fn new(operation_id: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        OperationDescriptor {
            operation_id: operation_id.into(),
            method,
            path: path.into(),
            summary: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            response: ResponseShape::Void,
        }
    }

    pub fn with_body(mut self, ty: TypeDescriptor) -> Self {
        self.request_body = Some(RequestBody { ty, required: true });
        self
    }

    pub fn with_response(mut self, response: ResponseShape) -> Self {
        self.response = response;
        self
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        ty: TypeDescriptor,
    ) -> Self {
        self.parameters.push(ParameterDescriptor {
            name: name.into(),
            location,
            required,
            ty,
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl ValidationConstraints {
    pub fn is_empty(&self) -> bool {
        *self == ValidationConstraints::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelProperty {
    /// Wire name as it appears in the schema
    pub name: String,
    pub ty: TypeDescriptor,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
    pub constraints: ValidationConstraints,
    /// Raw pattern as written in the schema, delimiters included
    pub pattern: Option<String>,
}

impl ModelProperty {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        ModelProperty {
            name: name.into(),
            ty,
            required: false,
            nullable: false,
            description: None,
            constraints: ValidationConstraints::default(),
            pattern: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<ModelProperty>,
    /// Non-empty for string enums
    pub enum_values: Vec<String>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>, properties: Vec<ModelProperty>) -> Self {
        ModelDefinition {
            name: name.into(),
            description: None,
            properties,
            enum_values: Vec::new(),
        }
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// Everything the engine needs from one schema document.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub title: String,
    pub slug: String,
    pub version: String,
    pub operations: Vec<OperationDescriptor>,
    pub models: BTreeMap<String, ModelDefinition>,
}

impl SchemaDocument {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        SchemaDocument {
            slug: slugify(&title),
            title,
            version: String::new(),
            operations: Vec::new(),
            models: BTreeMap::new(),
        }
    }

    pub fn with_model(mut self, model: ModelDefinition) -> Self {
        self.models.insert(model.name.clone(), model);
        self
    }

    pub fn with_operation(mut self, operation: OperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }
}

/// Lower-case, non-alphanumerics to `_`, trimmed (`Pet Store API` → `pet_store_api`).
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
        .trim_matches('_')
        .to_string()
}
