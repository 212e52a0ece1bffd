//! Engine error taxonomy.

use std::fmt;

use crate::generator::ArtifactKind;

/// A single problem found while adapting a schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON-pointer-ish location, e.g. `paths./pet.post`
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Fatal errors that abort a generation run.
///
/// Per-artifact render/write failures are not represented here; the emitter records them
/// in its report and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A model reference names a model that the document does not define
    UnknownModel {
        /// The missing model name
        model: String,
        /// Operation id or model name that holds the reference
        referenced_by: String,
    },
    /// Two distinct operations derive the same artifact name, or two artifacts the same file
    NamingCollision {
        name: String,
        first: String,
        second: String,
    },
    /// The plan contains an artifact kind the renderer cannot produce
    MissingTemplate { kind: ArtifactKind },
    /// The schema document failed adaptation
    InvalidSchema(Vec<ValidationIssue>),
    /// Type text could not be parsed into a descriptor
    InvalidTypeExpression { input: String, reason: String },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::UnknownModel {
                model,
                referenced_by,
            } => write!(
                f,
                "schema inconsistency: '{referenced_by}' references model '{model}' which is not defined"
            ),
            GenerationError::NamingCollision {
                name,
                first,
                second,
            } => write!(
                f,
                "naming collision: '{first}' and '{second}' both derive '{name}'"
            ),
            GenerationError::MissingTemplate { kind } => {
                write!(f, "no template available for {kind} artifacts")
            }
            GenerationError::InvalidSchema(issues) => {
                write!(f, "schema validation failed with {} issue(s)", issues.len())?;
                for issue in issues {
                    write!(f, "\n  {issue}")?;
                }
                Ok(())
            }
            GenerationError::InvalidTypeExpression { input, reason } => {
                write!(f, "invalid type expression '{input}': {reason}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}
