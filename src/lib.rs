//! # cqrsgen
//!
//! **cqrsgen** derives the CQRS contract of a service from its
//! [OpenAPI 3.1](https://spec.openapis.org/oas/v3.1.0) specification: a Command or Query per
//! operation, the DTOs those requests need, and a handler skeleton for each request.
//!
//! ## Architecture
//!
//! - **[`spec`]** - Loads an OpenAPI document into typed operation and model descriptors
//! - **[`generator`]** - Classification, DTO closure, planning, write policy, and emission
//! - **[`config`]** - `cqrsgen.toml` settings
//! - **[`cli`]** - The `cqrsgen` command line
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`error`]** - Fatal generation errors
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(cqrsgen)
//!     participant Spec as spec::load_document
//!     participant Plan as generator::build_plan
//!     participant Policy as generator::write_instructions
//!     participant Emit as generator::emit
//!     participant FS as File System
//!
//!     CLI->>Spec: load_document("openapi.yaml")
//!     Spec-->>CLI: SchemaDocument
//!     CLI->>Plan: build_plan(&document, options)
//!     Plan->>Plan: classify operations<br/>build DTO closure<br/>derive names
//!     Plan-->>CLI: GenerationPlan
//!     CLI->>Policy: write_instructions(&plan, &layout)
//!     Policy-->>CLI: Vec<WriteInstruction>
//!     CLI->>Emit: emit(&instructions, &TemplateRenderer, dry_run)
//!     Emit->>FS: DTOs, commands, queries (always)
//!     Emit->>FS: handlers (create only if missing)
//!     Emit-->>CLI: EmissionReport
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cqrsgen generate --spec openapi.yaml --output my-service
//! ```
//!
//! Running the command again rewrites every contract file and keeps every handler.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod spec;

pub use error::{GenerationError, ValidationIssue};
