//! # Generator Module
//!
//! The generator derives the CQRS contract of a service from its [`SchemaDocument`]:
//! one Command or Query per operation, the DTOs those requests transitively need, a
//! handler skeleton per request, and optionally a validator per DTO.
//!
//! ## Architecture
//!
//! ```text
//! SchemaDocument → Classifier → DTO Closure → Plan → Write Instructions → Renderer → Files
//! ```
//!
//! 1. **Classifier** ([`classify`]) - Command or Query from the HTTP method, plus the
//!    domain and DTO response types
//! 2. **DTO Closure** ([`build_closure`]) - Walks the model reference graph from every
//!    request and response type; deduplicated and cycle-safe
//! 3. **Plan** ([`build_plan`]) - Derives names, request fields, and validators; naming
//!    collisions are fatal
//! 4. **Policy** ([`write_instructions`]) - Target path and write policy per artifact
//! 5. **Emission** ([`emit`]) - Renders with askama templates and writes
//!
//! ## Write Policy
//!
//! DTOs, commands, queries, and validators are rewritten on every run. Handlers are
//! **write-once**: an existing handler file is never touched and is reported as skipped.
//!
//! ## Generated Structure
//!
//! ```text
//! <output>/
//! ├── generated/
//! │   ├── dtos/            # PetDto, CategoryDto, ...
//! │   ├── commands/        # AddPetCommand, ...
//! │   ├── queries/         # FindPetsByStatusQuery, ...
//! │   ├── validators/      # PetDtoValidator, ... (opt-in)
//! │   └── handlers/        # AddPetCommandHandler, ... (write-once)
//! └── implementation/
//!     └── handlers/        # handlers go here instead with split packaging
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use cqrsgen::config::GeneratorConfig;
//! use cqrsgen::generator::generate;
//! use cqrsgen::spec::load_document;
//!
//! let document = load_document("openapi.yaml".as_ref())?;
//! let report = generate(&document, &GeneratorConfig::default(), "out".as_ref(), false)?;
//! assert!(!report.has_failures());
//! ```

mod classify;
mod closure;
mod emit;
mod naming;
mod plan;
mod policy;
mod templates;
mod types;
#[cfg(test)]
mod tests;

pub use classify::*;
pub use closure::*;
pub use emit::*;
pub use naming::*;
pub use plan::*;
pub use policy::*;
pub use templates::*;
pub use types::*;

use std::path::Path;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::spec::SchemaDocument;

/// Plan a document and lay the artifacts out under `output`.
///
/// # Errors
///
/// Fails on unknown models and naming collisions.
pub fn plan_document(
    document: &SchemaDocument,
    config: &GeneratorConfig,
    output: &Path,
) -> Result<Vec<WriteInstruction>, GenerationError> {
    let plan = build_plan(document, config.plan_options())?;
    let layout = OutputLayout::new(
        output,
        &config.generated_folder,
        &config.implementation_folder,
        config.split_packaging,
    );
    Ok(write_instructions(&plan, &layout))
}

/// Plan, render, and write a document with the bundled templates.
///
/// # Errors
///
/// Fatal errors only; per-artifact failures are in the returned report.
pub fn generate(
    document: &SchemaDocument,
    config: &GeneratorConfig,
    output: &Path,
    dry_run: bool,
) -> Result<EmissionReport, GenerationError> {
    let instructions = plan_document(document, config, output)?;
    emit(&instructions, &TemplateRenderer, dry_run)
}
