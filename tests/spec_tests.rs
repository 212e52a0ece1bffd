#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::{write_spec, PETSTORE};
use cqrsgen::generator::{Scalar, TypeDescriptor};
use cqrsgen::spec::{load_document, parse_document, ParameterLocation, ResponseShape};
use cqrsgen::GenerationError;
use http::Method;

fn schema_error(err: anyhow::Error) -> GenerationError {
    match err.downcast::<GenerationError>() {
        Ok(e) => e,
        Err(other) => panic!("expected a generation error, got {other:#}"),
    }
}

#[test]
fn test_petstore_operations() {
    let document = parse_document(PETSTORE, true).unwrap();
    assert_eq!(document.title, "Swagger Petstore");
    assert_eq!(document.operations.len(), 7);

    let add = document
        .operations
        .iter()
        .find(|op| op.operation_id == "addPet")
        .unwrap();
    assert_eq!(add.method, Method::POST);
    assert_eq!(add.summary.as_deref(), Some("Add a new pet to the store"));
    let body = add.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(body.ty, TypeDescriptor::reference("Pet"));
    assert_eq!(
        add.response,
        ResponseShape::Single(TypeDescriptor::reference("Pet"))
    );

    let delete = document
        .operations
        .iter()
        .find(|op| op.operation_id == "deletePet")
        .unwrap();
    assert_eq!(delete.response, ResponseShape::Void);
    // inherited from the path item
    assert_eq!(delete.parameters.len(), 1);
    assert_eq!(delete.parameters[0].location, ParameterLocation::Path);
    assert_eq!(delete.parameters[0].ty, TypeDescriptor::scalar(Scalar::Long));

    let inventory = document
        .operations
        .iter()
        .find(|op| op.operation_id == "getInventory")
        .unwrap();
    assert_eq!(
        inventory.response,
        ResponseShape::Map(
            TypeDescriptor::scalar(Scalar::String),
            TypeDescriptor::scalar(Scalar::Integer)
        )
    );
}

#[test]
fn test_petstore_models() {
    let document = parse_document(PETSTORE, true).unwrap();
    let pet = document.model("Pet").unwrap();
    let name = pet.properties.iter().find(|p| p.name == "name").unwrap();
    assert!(name.required);
    assert_eq!(name.constraints.min_length, Some(1));
    let tags = pet.properties.iter().find(|p| p.name == "tags").unwrap();
    assert_eq!(
        tags.ty,
        TypeDescriptor::array_of(TypeDescriptor::reference("Tag"))
    );

    let status = document.model("PetStatus").unwrap();
    assert!(status.is_enum());
    assert_eq!(status.enum_values, vec!["available", "pending", "sold"]);
    assert!(document.model("Orphan").is_some());
}

#[test]
fn test_json_documents_load_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.json");
    let spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": { "title": "Json Api", "version": "1" },
        "paths": {
            "/ping": {
                "get": {
                    "operationId": "ping",
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": { "application/json": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        }
    });
    std::fs::write(&path, spec.to_string()).unwrap();
    let document = load_document(&path).unwrap();
    assert_eq!(document.operations.len(), 1);
    assert_eq!(
        document.operations[0].response,
        ResponseShape::Primitive(Scalar::String)
    );
}

#[test]
fn test_yaml_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_spec(dir.path(), PETSTORE);
    let document = load_document(&path).unwrap();
    assert_eq!(document.operations.len(), 7);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_document(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("nope.yaml"));
}

#[test]
fn test_missing_and_duplicate_operation_ids() {
    let spec = r#"
openapi: 3.1.0
info: { title: Ids, version: "1" }
paths:
  /a:
    get:
      responses: { '204': { description: ok } }
  /b:
    get:
      operationId: listThings
      responses: { '204': { description: ok } }
  /c:
    get:
      operationId: listThings
      responses: { '204': { description: ok } }
"#;
    let err = schema_error(parse_document(spec, true).unwrap_err());
    let GenerationError::InvalidSchema(issues) = err else {
        panic!("expected InvalidSchema");
    };
    let kinds: Vec<&str> = issues.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(kinds, vec!["MissingOperationId", "DuplicateOperationId"]);
    assert_eq!(issues[0].location, "paths./a.get");
}

#[test]
fn test_return_type_extension_overrides_response() {
    let spec = r#"
openapi: 3.1.0
info: { title: Override, version: "1" }
paths:
  /pets:
    get:
      operationId: listPets
      x-return-type: "Vec<Pet>"
      responses: { '200': { description: ok } }
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
"#;
    let document = parse_document(spec, true).unwrap();
    assert_eq!(
        document.operations[0].response,
        ResponseShape::Array(TypeDescriptor::reference("Pet"))
    );
}

#[test]
fn test_unparsable_return_type_is_reported() {
    let spec = r#"
openapi: 3.1.0
info: { title: Override, version: "1" }
paths:
  /pets:
    get:
      operationId: listPets
      x-return-type: "Vec<Pet"
      responses: { '200': { description: ok } }
"#;
    let err = schema_error(parse_document(spec, true).unwrap_err());
    let GenerationError::InvalidSchema(issues) = err else {
        panic!("expected InvalidSchema");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "InvalidReturnType");
}

#[test]
fn test_invalid_yaml_is_an_error() {
    assert!(parse_document("openapi: [", true).is_err());
    assert!(parse_document("{\"openapi\": 3", false).is_err());
}

#[test]
fn test_unresolvable_parameter_reference_is_reported() {
    let spec = r#"
openapi: 3.1.0
info: { title: Params, version: "1" }
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - $ref: '#/components/parameters/Limit'
        - $ref: '#/components/parameters/Missing'
      responses: { '204': { description: ok } }
components:
  parameters:
    Limit:
      name: limit
      in: query
      schema: { type: integer }
"#;
    let err = schema_error(parse_document(spec, true).unwrap_err());
    let GenerationError::InvalidSchema(issues) = err else {
        panic!("expected InvalidSchema");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "UnresolvedParameter");
    assert_eq!(issues[0].location, "paths./pets.get");
    assert!(issues[0].message.contains("#/components/parameters/Missing"));
}

#[test]
fn test_model_named_like_a_scalar_stays_a_reference() {
    let spec = r#"
openapi: 3.1.0
info: { title: Ttl, version: "1" }
paths:
  /pets:
    post:
      operationId: addPet
      x-return-type: "Duration"
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses: { '204': { description: ok } }
components:
  schemas:
    Duration:
      type: object
      properties:
        seconds: { type: integer, format: int64 }
    Pet:
      type: object
      properties:
        ttl:
          $ref: '#/components/schemas/Duration'
"#;
    let document = parse_document(spec, true).unwrap();
    let pet = document.model("Pet").unwrap();
    assert_eq!(pet.properties[0].ty, TypeDescriptor::reference("Duration"));
    assert_eq!(
        document.operations[0].response,
        ResponseShape::Single(TypeDescriptor::reference("Duration"))
    );
}
