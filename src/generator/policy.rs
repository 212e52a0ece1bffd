//! Write discipline and target location for every planned artifact.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::closure::DtoDefinition;
use super::naming::file_stem;
use super::plan::{GenerationPlan, HandlerArtifact, RequestArtifact, ValidatorArtifact};
use super::RequestKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Overwrite unconditionally
    Always,
    /// Create only when nothing exists at the target; an existing file is skipped
    WriteOnce,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::Always => write!(f, "always"),
            WritePolicy::WriteOnce => write!(f, "write-once"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Dto,
    Command,
    Query,
    Handler,
    Validator,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Dto,
        ArtifactKind::Command,
        ArtifactKind::Query,
        ArtifactKind::Handler,
        ArtifactKind::Validator,
    ];

    /// Handlers hold hand-written logic; everything else is a pure derivation.
    pub fn write_policy(self) -> WritePolicy {
        match self {
            ArtifactKind::Handler => WritePolicy::WriteOnce,
            ArtifactKind::Dto
            | ArtifactKind::Command
            | ArtifactKind::Query
            | ArtifactKind::Validator => WritePolicy::Always,
        }
    }

    pub fn folder(self) -> &'static str {
        match self {
            ArtifactKind::Dto => "dtos",
            ArtifactKind::Command => "commands",
            ArtifactKind::Query => "queries",
            ArtifactKind::Handler => "handlers",
            ArtifactKind::Validator => "validators",
        }
    }

    /// Contract artifacts live in the generated package, handlers in the implementation one.
    pub fn is_contract(self) -> bool {
        self != ArtifactKind::Handler
    }
}

impl From<RequestKind> for ArtifactKind {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Command => ArtifactKind::Command,
            RequestKind::Query => ArtifactKind::Query,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Dto => "dto",
            ArtifactKind::Command => "command",
            ArtifactKind::Query => "query",
            ArtifactKind::Handler => "handler",
            ArtifactKind::Validator => "validator",
        };
        f.write_str(s)
    }
}

/// Where contract and implementation artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub contract_root: PathBuf,
    pub implementation_root: PathBuf,
    /// Path handlers use to import contract types (`crate::generated` or `generated`)
    pub contract_module: String,
}

impl OutputLayout {
    /// Without `split_packaging` handlers sit next to the contract artifacts.
    pub fn new(
        output: &Path,
        generated_folder: &str,
        implementation_folder: &str,
        split_packaging: bool,
    ) -> Self {
        let contract_root = output.join(generated_folder);
        let module = file_stem(generated_folder);
        if split_packaging {
            OutputLayout {
                contract_root,
                implementation_root: output.join(implementation_folder),
                contract_module: module,
            }
        } else {
            OutputLayout {
                implementation_root: contract_root.clone(),
                contract_root,
                contract_module: format!("crate::{module}"),
            }
        }
    }

    pub fn path_for(&self, kind: ArtifactKind, name: &str) -> PathBuf {
        let root = if kind.is_contract() {
            &self.contract_root
        } else {
            &self.implementation_root
        };
        root.join(kind.folder()).join(format!("{}.rs", file_stem(name)))
    }
}

/// Data a renderer turns into text.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactContext {
    Dto(DtoDefinition),
    Validator(ValidatorArtifact),
    Request(RequestArtifact),
    Handler {
        handler: HandlerArtifact,
        /// Module path of the contract package
        contract_module: String,
    },
}

/// One file to render and write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteInstruction {
    pub kind: ArtifactKind,
    pub name: String,
    pub output_path: PathBuf,
    pub write_policy: WritePolicy,
    #[serde(skip)]
    pub context: ArtifactContext,
}

impl WriteInstruction {
    fn new(layout: &OutputLayout, kind: ArtifactKind, name: &str, context: ArtifactContext) -> Self {
        WriteInstruction {
            kind,
            name: name.to_string(),
            output_path: layout.path_for(kind, name),
            write_policy: kind.write_policy(),
            context,
        }
    }
}

/// Turn a plan into write instructions.
///
/// Order follows the plan: DTOs, validators, then each request followed by its handler.
pub fn write_instructions(plan: &GenerationPlan, layout: &OutputLayout) -> Vec<WriteInstruction> {
    let mut out = Vec::with_capacity(plan.artifact_count());
    for dto in &plan.dtos {
        out.push(WriteInstruction::new(
            layout,
            ArtifactKind::Dto,
            &dto.name,
            ArtifactContext::Dto(dto.clone()),
        ));
    }
    for validator in &plan.validators {
        out.push(WriteInstruction::new(
            layout,
            ArtifactKind::Validator,
            &validator.name,
            ArtifactContext::Validator(validator.clone()),
        ));
    }
    for (request, handler) in plan.requests.iter().zip(&plan.handlers) {
        out.push(WriteInstruction::new(
            layout,
            request.kind.into(),
            &request.name,
            ArtifactContext::Request(request.clone()),
        ));
        out.push(WriteInstruction::new(
            layout,
            ArtifactKind::Handler,
            &handler.name,
            ArtifactContext::Handler {
                handler: handler.clone(),
                contract_module: layout.contract_module.clone(),
            },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::generator::{build_plan, PlanOptions, TypeDescriptor};
    use crate::spec::{ModelDefinition, OperationDescriptor, SchemaDocument};
    use http::Method;

    #[test]
    fn only_handlers_are_write_once() {
        for kind in ArtifactKind::ALL {
            let expected = if kind == ArtifactKind::Handler {
                WritePolicy::WriteOnce
            } else {
                WritePolicy::Always
            };
            assert_eq!(kind.write_policy(), expected, "{kind}");
        }
    }

    #[test]
    fn single_package_layout() {
        let layout = OutputLayout::new(Path::new("out"), "generated", "implementation", false);
        assert_eq!(
            layout.path_for(ArtifactKind::Dto, "PetDto"),
            PathBuf::from("out/generated/dtos/pet_dto.rs")
        );
        assert_eq!(
            layout.path_for(ArtifactKind::Handler, "AddPetCommandHandler"),
            PathBuf::from("out/generated/handlers/add_pet_command_handler.rs")
        );
        assert_eq!(layout.contract_module, "crate::generated");
    }

    #[test]
    fn split_layout_moves_handlers_only() {
        let layout = OutputLayout::new(Path::new("out"), "generated", "implementation", true);
        assert_eq!(
            layout.path_for(ArtifactKind::Query, "FindPetsByStatusQuery"),
            PathBuf::from("out/generated/queries/find_pets_by_status_query.rs")
        );
        assert_eq!(
            layout.path_for(ArtifactKind::Handler, "FindPetsByStatusQueryHandler"),
            PathBuf::from("out/implementation/handlers/find_pets_by_status_query_handler.rs")
        );
        assert_eq!(layout.contract_module, "generated");
    }

    #[test]
    fn instructions_follow_plan_order() {
        let doc = SchemaDocument::new("order")
            .with_model(ModelDefinition::new("Pet", Vec::new()))
            .with_operation(
                OperationDescriptor::new("addPet", Method::POST, "/pet")
                    .with_body(TypeDescriptor::reference("Pet")),
            )
            .with_operation(OperationDescriptor::new("getPet", Method::GET, "/pet"));
        let options = PlanOptions {
            validators: true,
            ..PlanOptions::default()
        };
        let plan = build_plan(&doc, options).unwrap();
        let layout = OutputLayout::new(Path::new("out"), "generated", "implementation", false);
        let instructions = write_instructions(&plan, &layout);
        let got: Vec<(ArtifactKind, &str, WritePolicy)> = instructions
            .iter()
            .map(|i| (i.kind, i.name.as_str(), i.write_policy))
            .collect();
        assert_eq!(
            got,
            vec![
                (ArtifactKind::Dto, "PetDto", WritePolicy::Always),
                (ArtifactKind::Validator, "PetDtoValidator", WritePolicy::Always),
                (ArtifactKind::Command, "AddPetCommand", WritePolicy::Always),
                (ArtifactKind::Handler, "AddPetCommandHandler", WritePolicy::WriteOnce),
                (ArtifactKind::Query, "GetPetQuery", WritePolicy::Always),
                (ArtifactKind::Handler, "GetPetQueryHandler", WritePolicy::WriteOnce),
            ]
        );
    }
}
