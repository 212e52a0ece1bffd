//! HTTP method + declared response shape → CQRS role and response types.

use http::Method;
use serde::Serialize;
use std::fmt;

use super::types::{rewrite_to_dto, Scalar, TypeDescriptor};
use crate::spec::{OperationDescriptor, ResponseShape};

/// Command/Query role of a request artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    /// GET is the only read-only verb; everything else mutates.
    pub fn for_method(method: &Method) -> Self {
        if is_verb(method, &Method::GET) {
            RequestKind::Query
        } else {
            RequestKind::Command
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Command => write!(f, "command"),
            RequestKind::Query => write!(f, "query"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseClassification {
    pub kind: RequestKind,
    /// Type used by the request/handler contract
    pub response_type: TypeDescriptor,
    /// Same classification with every model reference moved to its DTO
    pub dto_response_type: TypeDescriptor,
    pub is_unit: bool,
    pub delete_returns_bool: bool,
    pub created_on_success: bool,
}

/// Verb comparison that ignores case, so extension spellings like `get` still match.
fn is_verb(method: &Method, verb: &Method) -> bool {
    method.as_str().eq_ignore_ascii_case(verb.as_str())
}

/// Response type for the internal contract.
///
/// A void DELETE reports success/not-found as `bool`; any other void response is `Unit`.
/// Arrays, maps and single types are returned as declared.
pub fn response_type(method: &Method, shape: &ResponseShape) -> TypeDescriptor {
    match shape {
        ResponseShape::Void if is_verb(method, &Method::DELETE) => TypeDescriptor::scalar(Scalar::Bool),
        ResponseShape::Void => TypeDescriptor::scalar(Scalar::Unit),
        ResponseShape::Array(elem) => TypeDescriptor::array_of(elem.clone()),
        ResponseShape::Map(key, value) => TypeDescriptor::map_of(key.clone(), value.clone()),
        ResponseShape::Single(ty) => ty.clone(),
        ResponseShape::Primitive(s) => TypeDescriptor::scalar(*s),
    }
}

/// [`response_type`] with model references rewritten to DTOs; scalars stay scalars.
pub fn dto_response_type(method: &Method, shape: &ResponseShape) -> TypeDescriptor {
    rewrite_to_dto(&response_type(method, shape))
}

/// Classify one operation.
pub fn classify(operation: &OperationDescriptor) -> ResponseClassification {
    let method = &operation.method;
    let response_type = response_type(method, &operation.response);
    let dto_response_type = rewrite_to_dto(&response_type);
    ResponseClassification {
        kind: RequestKind::for_method(method),
        is_unit: response_type == TypeDescriptor::scalar(Scalar::Unit),
        delete_returns_bool: is_verb(method, &Method::DELETE)
            && matches!(operation.response, ResponseShape::Void),
        created_on_success: is_verb(method, &Method::POST),
        response_type,
        dto_response_type,
    }
}
