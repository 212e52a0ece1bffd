//! # CLI Module
//!
//! Command-line surface of the `cqrsgen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! ```bash
//! cqrsgen generate --spec openapi.yaml --output my-service
//! ```
//!
//! Options:
//! - `--spec <FILE>` - Path to OpenAPI specification (required)
//! - `--output <DIR>` - Output directory (default: `.`)
//! - `--config <FILE>` - Config file; `cqrsgen.toml` next to the spec is picked up otherwise
//! - `--validators` - Emit a validator per DTO
//! - `--include-all-models` - Emit DTOs for every model
//! - `--split-packaging` - Put handlers under the implementation folder
//! - `--dry-run` - Report without writing
//! - `--verbose` - Debug logging
//!
//! Handlers are only created when missing; rerunning never touches an edited handler.
//!
//! ### `inspect`
//!
//! Print the planned artifacts as JSON or YAML:
//!
//! ```bash
//! cqrsgen inspect --spec openapi.yaml --format yaml
//! ```
//!
//! ## Exit Status
//!
//! `1` on a fatal error (unknown model, naming collision, unreadable spec) or when any
//! single artifact failed to render or write.

mod commands;

pub use commands::{run_cli, Cli, Commands, InspectFormat};
