//! Deterministic artifact names.
//!
//! Every generated artifact name is a pure function of an operationId or a model name.
//! The deriver does not de-duplicate: two operationIds that normalize to the same
//! PascalCase string produce the same name, and the planner rejects that as a collision.

use convert_case::{Case, Casing};

pub const DTO_SUFFIX: &str = "Dto";
pub const COMMAND_SUFFIX: &str = "Command";
pub const QUERY_SUFFIX: &str = "Query";
pub const HANDLER_SUFFIX: &str = "Handler";
pub const VALIDATOR_SUFFIX: &str = "Validator";

/// Convert an identifier to PascalCase (`findPetsByStatus` → `FindPetsByStatus`).
///
/// Any character that is not ASCII alphanumeric and any lower→upper transition start
/// a new word, so `add_pet`, `add-pet`, `add.pet` and `addPet` normalize identically.
pub fn to_pascal_case(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    cleaned.to_case(Case::Pascal)
}

/// `addPet` → `AddPetCommand`
pub fn command_name(operation_id: &str) -> String {
    format!("{}{COMMAND_SUFFIX}", to_pascal_case(operation_id))
}

/// `findPetsByStatus` → `FindPetsByStatusQuery`
pub fn query_name(operation_id: &str) -> String {
    format!("{}{QUERY_SUFFIX}", to_pascal_case(operation_id))
}

/// `AddPetCommand` → `AddPetCommandHandler`
pub fn handler_name(request_name: &str) -> String {
    format!("{request_name}{HANDLER_SUFFIX}")
}

/// `Pet` → `PetDto`. Names already carrying the suffix are returned unchanged so the
/// DTO of a model always matches the rewritten reference to it.
pub fn dto_name(model_name: &str) -> String {
    if is_dto_name(model_name) {
        model_name.to_string()
    } else {
        format!("{model_name}{DTO_SUFFIX}")
    }
}

pub fn is_dto_name(name: &str) -> bool {
    name.len() > DTO_SUFFIX.len() && name.ends_with(DTO_SUFFIX)
}

/// `PetDto` → `PetDtoValidator`
pub fn validator_name(dto_name: &str) -> String {
    format!("{dto_name}{VALIDATOR_SUFFIX}")
}

/// File stem for an artifact (`AddPetCommandHandler` → `add_pet_command_handler`).
pub fn file_stem(artifact_name: &str) -> String {
    artifact_name.to_case(Case::Snake)
}

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn",
];

/// Struct field name for a wire property or parameter name.
///
/// Produces snake_case, replaces anything that is not an identifier character with `_`,
/// prefixes a leading digit and raw-escapes keywords (`type` → `r#type`).
pub fn field_name(wire_name: &str) -> String {
    let cleaned: String = wire_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut snake = cleaned.to_case(Case::Snake);
    if snake.is_empty() {
        snake.push('_');
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        snake.insert(0, '_');
    }
    if snake == "self" || snake == "Self" || snake == "super" || snake == "crate" {
        return format!("{snake}_");
    }
    if KEYWORDS.contains(&snake.as_str()) {
        format!("r#{snake}")
    } else {
        snake
    }
}

/// Enum variant identifier for a string enum value (`sold` → `Sold`, `in-stock` → `InStock`).
pub fn variant_name(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut pascal = cleaned.to_case(Case::Pascal);
    if pascal.is_empty() {
        pascal.push_str("Empty");
    }
    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        pascal.insert(0, 'V');
    }
    pascal
}
