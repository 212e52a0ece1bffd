#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use crate::spec::{
    ModelDefinition, ModelProperty, OperationDescriptor, ParameterLocation, ResponseShape,
    SchemaDocument,
};
use http::Method;
use std::path::Path;

fn status_model() -> ModelDefinition {
    let mut status = ModelDefinition::new("Status", Vec::new());
    status.enum_values = vec!["available".to_string(), "pending".to_string()];
    status
}

fn pet_model() -> ModelDefinition {
    let mut name = ModelProperty::new("name", TypeDescriptor::scalar(Scalar::String)).required();
    name.description = Some("Display name".to_string());
    let photo_urls = ModelProperty::new(
        "photoUrls",
        TypeDescriptor::array_of(TypeDescriptor::scalar(Scalar::String)),
    )
    .required();
    let status = ModelProperty::new("status", TypeDescriptor::reference("Status"));
    ModelDefinition::new("Pet", vec![name, photo_urls, status])
}

fn petstore() -> SchemaDocument {
    SchemaDocument::new("Petstore")
        .with_model(pet_model())
        .with_model(status_model())
        .with_operation(
            OperationDescriptor::new("addPet", Method::POST, "/pet")
                .with_body(TypeDescriptor::reference("Pet")),
        )
        .with_operation(
            OperationDescriptor::new("getPetById", Method::GET, "/pet/{petId}")
                .with_parameter(
                    "petId",
                    ParameterLocation::Path,
                    true,
                    TypeDescriptor::scalar(Scalar::Long),
                )
                .with_response(ResponseShape::Single(TypeDescriptor::reference("Pet"))),
        )
        .with_operation(
            OperationDescriptor::new("deletePet", Method::DELETE, "/pet/{petId}").with_parameter(
                "petId",
                ParameterLocation::Path,
                true,
                TypeDescriptor::scalar(Scalar::Long),
            ),
        )
        .with_operation(
            OperationDescriptor::new("getInventory", Method::GET, "/store/inventory").with_response(
                ResponseShape::Map(
                    TypeDescriptor::scalar(Scalar::String),
                    TypeDescriptor::scalar(Scalar::Integer),
                ),
            ),
        )
}

fn instructions(split: bool) -> Vec<WriteInstruction> {
    let plan = build_plan(
        &petstore(),
        PlanOptions {
            validators: true,
            include_all_models: false,
        },
    )
    .unwrap();
    let layout = OutputLayout::new(Path::new("out"), "generated", "implementation", split);
    write_instructions(&plan, &layout)
}

fn render(name: &str) -> String {
    render_with(name, false)
}

fn render_with(name: &str, split: bool) -> String {
    let all = instructions(split);
    let Some(instruction) = all.iter().find(|i| i.name == name) else {
        panic!("no instruction named {name}");
    };
    TemplateRenderer.render(instruction).unwrap()
}

#[test]
fn test_dto_struct_rendering() {
    let text = render("PetDto");
    assert!(text.contains("pub struct PetDto {"), "{text}");
    assert!(text.contains("from model `Pet`"));
    assert!(text.contains("/// Display name"));
    assert!(text.contains("pub name: String,"));
    assert!(text.contains("#[serde(rename = \"photoUrls\")]"));
    assert!(text.contains("pub photo_urls: Vec<String>,"));
    assert!(text.contains("pub status: Option<StatusDto>,"));
    assert!(text.contains("use super::status_dto::StatusDto;"));
    assert!(text.contains("default, skip_serializing_if = \"Option::is_none\""));
}

#[test]
fn test_dto_enum_rendering() {
    let text = render("StatusDto");
    assert!(text.contains("pub enum StatusDto {"), "{text}");
    assert!(text.contains("#[serde(rename = \"available\")]"));
    assert!(text.contains("Available,"));
    assert!(text.contains("Pending,"));
    assert!(!text.contains("pub struct"));
}

#[test]
fn test_command_rendering() {
    let text = render("AddPetCommand");
    assert!(text.contains("pub struct AddPetCommand {"), "{text}");
    assert!(text.contains("pub body: PetDto,"));
    assert!(text.contains("use super::super::dtos::pet_dto::PetDto;"));
    assert!(text.contains("pub const OPERATION_ID: &'static str = \"addPet\";"));
    assert!(text.contains("pub const CREATED_ON_SUCCESS: bool = true;"));
    assert!(text.contains("pub const DELETE_RETURNS_BOOL: bool = false;"));
    assert!(text.contains("pub type AddPetCommandResponse = ();"));
}

#[test]
fn test_delete_command_returns_bool() {
    let text = render("DeletePetCommand");
    assert!(text.contains("pub pet_id: i64,"), "{text}");
    assert!(text.contains("#[serde(rename = \"petId\")]"));
    assert!(text.contains("pub const DELETE_RETURNS_BOOL: bool = true;"));
    assert!(text.contains("pub type DeletePetCommandResponse = bool;"));
}

#[test]
fn test_query_rendering() {
    let text = render("GetPetByIdQuery");
    assert!(text.contains("pub struct GetPetByIdQuery {"), "{text}");
    assert!(text.contains("Read-only query for `GET /pet/{petId}`."));
    assert!(text.contains("pub type GetPetByIdQueryResponse = PetDto;"));
    assert!(text.contains("domain result: `Pet`"));
    assert!(!text.contains("CREATED_ON_SUCCESS"));
}

#[test]
fn test_map_response_keeps_shape() {
    let text = render("GetInventoryQuery");
    assert!(text.contains("use std::collections::HashMap;"), "{text}");
    assert!(text.contains("pub type GetInventoryQueryResponse = HashMap<String, i32>;"));
}

#[test]
fn test_unit_handler_returns_ok() {
    let text = render("AddPetCommandHandler");
    assert!(text.contains("pub struct AddPetCommandHandler;"), "{text}");
    assert!(text.contains(
        "use crate::generated::commands::add_pet_command::{ AddPetCommand, AddPetCommandResponse };"
    ));
    assert!(text.contains(
        "pub fn handle(&self, command: AddPetCommand) -> anyhow::Result<AddPetCommandResponse>"
    ));
    assert!(text.contains("Ok(())"));
    assert!(!text.contains("todo!"));
}

#[test]
fn test_valued_handler_is_a_placeholder() {
    let text = render("GetPetByIdQueryHandler");
    assert!(text.contains("query: GetPetByIdQuery"), "{text}");
    assert!(text.contains("todo!(\"implement GetPetByIdQueryHandler\")"));
}

#[test]
fn test_split_handler_imports_contract_package() {
    let text = render_with("GetPetByIdQueryHandler", true);
    assert!(text.contains("use generated::queries::get_pet_by_id_query::{"), "{text}");
}

#[test]
fn test_validator_rendering() {
    let text = render("PetDtoValidator");
    assert!(text.contains("pub struct PetDtoValidator;"), "{text}");
    assert!(text.contains("use super::super::dtos::pet_dto::PetDto;"));
    assert!(text.contains("pub fn validate(dto: &PetDto)"));
    assert!(text.contains("let value = &dto.name;"));
    assert!(text.contains("let value = &dto.photo_urls;"));
    assert!(text.contains("field: \"photoUrls\","));
    assert!(text.contains("\"must not be empty\".to_string()"));
}

#[test]
fn test_enum_dto_gets_no_validator() {
    assert!(!instructions(false)
        .iter()
        .any(|i| i.name == "StatusDtoValidator"));
}

#[test]
fn test_mismatched_context_is_an_error() {
    let mut all = instructions(false);
    let instruction = all.iter_mut().find(|i| i.name == "PetDto").unwrap();
    instruction.kind = ArtifactKind::Command;
    let err = TemplateRenderer.render(instruction).unwrap_err();
    assert!(err.to_string().contains("mismatched context"));
}

#[test]
fn test_generate_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = crate::config::GeneratorConfig::default();
    let report = generate(&petstore(), &config, dir.path(), false).unwrap();
    assert!(!report.has_failures());
    // PetDto, StatusDto, four requests, four handlers
    assert_eq!(report.written.len(), 10);
    assert!(dir.path().join("generated/dtos/pet_dto.rs").exists());
    assert!(dir
        .path()
        .join("generated/queries/get_inventory_query.rs")
        .exists());
}
