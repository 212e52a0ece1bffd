use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{load_config, ConfigOverrides};
use crate::generator::{emit, plan_document, TemplateRenderer};
use crate::spec::load_document;

/// Command-line interface for cqrsgen
///
/// Derives CQRS contracts (DTOs, commands, queries, handlers) from an OpenAPI spec.
#[derive(Parser, Debug)]
#[command(name = "cqrsgen", version)]
#[command(about = "CQRS contract generator for OpenAPI specs", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate contract artifacts and handler skeletons
    Generate {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Path to the configuration file (cqrsgen.toml)
        /// If not provided, will auto-detect alongside the OpenAPI spec
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit a validator per DTO
        #[arg(long, default_value_t = false)]
        validators: bool,

        /// Emit DTOs for every model, not only the reachable ones
        #[arg(long, default_value_t = false)]
        include_all_models: bool,

        /// Put handlers in a separate implementation folder
        #[arg(long, default_value_t = false)]
        split_packaging: bool,

        /// Show what would be written without touching the disk
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the emission plan: kind, name, path, and write policy per artifact
    Inspect {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output directory the paths are computed against
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Path to the configuration file (cqrsgen.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = InspectFormat::Json)]
        format: InspectFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    Json,
    Yaml,
}

/// Execute a parsed command line.
///
/// Returns `Ok(false)` when the run completed but some artifacts failed.
///
/// # Errors
///
/// Unreadable specs or configs and fatal generation errors.
pub fn run_cli(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Generate {
            spec,
            output,
            config,
            validators,
            include_all_models,
            split_packaging,
            dry_run,
        } => {
            let document = load_document(spec)?;
            let config = load_config(config.as_deref(), spec)?.with_overrides(&ConfigOverrides {
                validators: *validators,
                include_all_models: *include_all_models,
                split_packaging: *split_packaging,
            });
            let instructions = plan_document(&document, &config, output)?;
            let report = emit(&instructions, &TemplateRenderer, *dry_run)?;

            if report.has_failures() {
                warn!(failed = report.failed.len(), "generation finished with failures");
            } else {
                info!(
                    written = report.written.len(),
                    skipped = report.skipped.len(),
                    dry_run = *dry_run,
                    output = %output.display(),
                    "generation finished"
                );
            }
            Ok(!report.has_failures())
        }
        Commands::Inspect {
            spec,
            output,
            config,
            format,
        } => {
            let document = load_document(spec)?;
            let config = load_config(config.as_deref(), spec)?;
            let instructions = plan_document(&document, &config, output)?;
            let text = match format {
                InspectFormat::Json => serde_json::to_string_pretty(&instructions)
                    .context("Failed to serialize plan as JSON")?,
                InspectFormat::Yaml => serde_yaml::to_string(&instructions)
                    .context("Failed to serialize plan as YAML")?,
            };
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("Failed to write plan")?;
            Ok(true)
        }
    }
}
