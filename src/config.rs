//! Generator configuration
//!
//! Settings come from a `cqrsgen.toml` file that sits alongside the OpenAPI spec
//! (or an explicit `--config` path). Command-line flags override file values.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::PlanOptions;

/// File name looked up next to the spec when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "cqrsgen.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Emit a validator per DTO
    pub validators: bool,
    /// Emit DTOs for every model, not only the reachable ones
    pub include_all_models: bool,
    /// Put handlers in a separate implementation package
    pub split_packaging: bool,
    /// Folder for contract artifacts (DTOs, commands, queries, validators)
    pub generated_folder: String,
    /// Folder for handlers when `split_packaging` is on
    pub implementation_folder: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            validators: false,
            include_all_models: false,
            split_packaging: false,
            generated_folder: "generated".to_string(),
            implementation_folder: "implementation".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            validators: self.validators,
            include_all_models: self.include_all_models,
        }
    }

    /// Apply command-line switches. A set flag turns the option on; an unset one keeps
    /// the file value.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        self.validators |= overrides.validators;
        self.include_all_models |= overrides.include_all_models;
        self.split_packaging |= overrides.split_packaging;
        self
    }
}

/// Flags from the command line that override file settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub validators: bool,
    pub include_all_models: bool,
    pub split_packaging: bool,
}

/// Load a configuration file.
///
/// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but fails to parse.
pub fn load_config_file(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Look for `cqrsgen.toml` in the same directory as the spec.
pub fn auto_detect_config_path(spec_path: &Path) -> Option<PathBuf> {
    let config_path = spec_path.parent()?.join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Resolve and load the configuration.
///
/// Priority:
/// 1. Explicitly provided path, which must exist
/// 2. Auto-detected alongside the spec
/// 3. Defaults
pub fn load_config(explicit_path: Option<&Path>, spec_path: &Path) -> anyhow::Result<GeneratorConfig> {
    if let Some(path) = explicit_path {
        let config = load_config_file(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        return Ok(config);
    }
    let Some(path) = auto_detect_config_path(spec_path) else {
        tracing::debug!("no config file found, using defaults");
        return Ok(GeneratorConfig::default());
    };
    match load_config_file(&path)? {
        Some(config) => {
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => {
            tracing::warn!(path = %path.display(), "config file disappeared, using defaults");
            Ok(GeneratorConfig::default())
        }
    }
}
