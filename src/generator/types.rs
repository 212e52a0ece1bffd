//! Type descriptors shared by every stage of the engine.
//!
//! A [`TypeDescriptor`] is the structural form of "a type": a scalar, a named model
//! reference, or an array/map wrapping another descriptor. Generic type text such as
//! `Vec<Pet>` or `Dictionary<string, int>` is parsed into this form before anything is
//! rewritten, so model names are only ever touched in their own slot.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::naming::dto_name;
use crate::error::GenerationError;

/// Built-in value types that never get a DTO counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    String,
    Integer,
    Long,
    Float,
    Double,
    Bool,
    Date,
    DateTime,
    Uuid,
    Duration,
    Binary,
    /// Free-form JSON (inline objects, untyped schemas)
    Any,
    /// Zero-information success marker for void commands
    Unit,
}

impl Scalar {
    /// Resolve a scalar alias from Rust, C# or OpenAPI spelling.
    ///
    /// Only the last `::` segment is considered, so `serde_json::Value` and
    /// `chrono::NaiveDate` resolve like `Value` and `NaiveDate`.
    pub fn from_alias(name: &str) -> Option<Scalar> {
        let name = name.trim().trim_end_matches('?');
        let last = name.rsplit("::").next().unwrap_or(name);
        let scalar = match last {
            "String" | "string" | "str" | "char" => Scalar::String,
            "i32" | "int" | "integer" | "i16" | "short" | "u32" | "u8" | "byte" => Scalar::Integer,
            "i64" | "long" | "u64" | "Int64" => Scalar::Long,
            "f32" | "float" => Scalar::Float,
            "f64" | "double" | "decimal" | "number" => Scalar::Double,
            "bool" | "boolean" | "Boolean" => Scalar::Bool,
            "NaiveDate" | "Date" | "DateOnly" | "date" => Scalar::Date,
            "DateTime" | "DateTimeOffset" | "date-time" => Scalar::DateTime,
            "Uuid" | "Guid" | "uuid" => Scalar::Uuid,
            "Duration" | "TimeSpan" | "duration" => Scalar::Duration,
            "Bytes" | "binary" => Scalar::Binary,
            "Value" | "object" | "JsonElement" => Scalar::Any,
            "()" | "Unit" => Scalar::Unit,
            _ => return None,
        };
        Some(scalar)
    }

    /// Rust spelling used in generated sources.
    pub fn rust_name(self) -> &'static str {
        match self {
            Scalar::String => "String",
            Scalar::Integer => "i32",
            Scalar::Long => "i64",
            Scalar::Float => "f32",
            Scalar::Double => "f64",
            Scalar::Bool => "bool",
            Scalar::Date => "chrono::NaiveDate",
            Scalar::DateTime => "chrono::DateTime<chrono::Utc>",
            Scalar::Uuid => "uuid::Uuid",
            Scalar::Duration => "std::time::Duration",
            Scalar::Binary => "Vec<u8>",
            Scalar::Any => "serde_json::Value",
            Scalar::Unit => "()",
        }
    }
}

/// Structural type description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Scalar(Scalar),
    /// Named model from the source schema (or its DTO once rewritten)
    Reference(String),
    ArrayOf(Box<TypeDescriptor>),
    /// Key type is always scalar in the source domain and is never rewritten
    MapOf(Box<TypeDescriptor>, Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn scalar(scalar: Scalar) -> Self {
        TypeDescriptor::Scalar(scalar)
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeDescriptor::Reference(name.into())
    }

    pub fn array_of(inner: TypeDescriptor) -> Self {
        TypeDescriptor::ArrayOf(Box::new(inner))
    }

    pub fn map_of(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::MapOf(Box::new(key), Box::new(value))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeDescriptor::Scalar(_))
    }

    /// Every model name inside this descriptor, depth-first. Duplicates are kept.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::Scalar(_) => {}
            TypeDescriptor::Reference(name) => out.push(name),
            TypeDescriptor::ArrayOf(inner) => inner.collect_references(out),
            TypeDescriptor::MapOf(key, value) => {
                key.collect_references(out);
                value.collect_references(out);
            }
        }
    }
}

/// Rewrite a domain descriptor into its DTO form.
///
/// Scalars pass through, arrays and map values are rewritten recursively, map keys are
/// left alone and every reference gains the `Dto` suffix unless it already has it.
/// Applying it twice gives the same result as applying it once.
pub fn rewrite_to_dto(ty: &TypeDescriptor) -> TypeDescriptor {
    match ty {
        TypeDescriptor::Scalar(s) => TypeDescriptor::Scalar(*s),
        TypeDescriptor::ArrayOf(inner) => TypeDescriptor::array_of(rewrite_to_dto(inner)),
        TypeDescriptor::MapOf(key, value) => {
            TypeDescriptor::MapOf(key.clone(), Box::new(rewrite_to_dto(value)))
        }
        TypeDescriptor::Reference(name) => TypeDescriptor::Reference(dto_name(name)),
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(s) => f.write_str(s.rust_name()),
            TypeDescriptor::Reference(name) => f.write_str(name),
            TypeDescriptor::ArrayOf(inner) => write!(f, "Vec<{inner}>"),
            TypeDescriptor::MapOf(key, value) => write!(f, "HashMap<{key}, {value}>"),
        }
    }
}

impl TypeDescriptor {
    /// Parse a declared type, resolving bare names for which `is_model` holds to
    /// references even when they spell a scalar alias (a model called `Duration`).
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidTypeExpression`] for malformed or unsupported input.
    pub fn parse_declared(
        s: &str,
        is_model: &dyn Fn(&str) -> bool,
    ) -> Result<TypeDescriptor, GenerationError> {
        let mut parser = TypeParser {
            input: s,
            pos: 0,
            is_model,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl FromStr for TypeDescriptor {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeDescriptor::parse_declared(s, &|_| false)
    }
}

const ARRAY_CONTAINERS: &[&str] = &[
    "Vec",
    "List",
    "IList",
    "IEnumerable",
    "ICollection",
    "IReadOnlyList",
    "HashSet",
    "BTreeSet",
    "array",
];
const MAP_CONTAINERS: &[&str] = &[
    "HashMap",
    "BTreeMap",
    "Dictionary",
    "IDictionary",
    "IReadOnlyDictionary",
    "map",
];

/// Recursive-descent parser for `Ident(::Ident)* (<T (, T)*>)?` and `()`.
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
    is_model: &'a dyn Fn(&str) -> bool,
}

impl<'a> TypeParser<'a> {
    fn error(&self, reason: &str) -> GenerationError {
        GenerationError::InvalidTypeExpression {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_path(&mut self) -> Result<&'a str, GenerationError> {
        self.skip_ws();
        let start = self.pos;
        let mut end = start;
        let bytes = self.input.as_bytes();
        while end < bytes.len() {
            let c = bytes[end];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c == b'?' {
                end += 1;
            } else if c == b':' && bytes.get(end + 1) == Some(&b':') {
                end += 2;
            } else {
                break;
            }
        }
        if end == start {
            return Err(self.error("expected a type name"));
        }
        self.pos = end;
        Ok(&self.input[start..end])
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, GenerationError> {
        if self.eat('(') {
            if self.eat(')') {
                return Ok(TypeDescriptor::Scalar(Scalar::Unit));
            }
            return Err(self.error("tuple types are not supported"));
        }

        let path = self.parse_path()?;
        let args_start = self.pos;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }

        let last = path.rsplit("::").next().unwrap_or(path);
        let arg_text: String = self.input[args_start..self.pos]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if last == "Vec" && arg_text == "<u8>" {
            return Ok(TypeDescriptor::Scalar(Scalar::Binary));
        }
        if ARRAY_CONTAINERS.contains(&last) {
            return match <[TypeDescriptor; 1]>::try_from(args) {
                Ok([inner]) => Ok(TypeDescriptor::array_of(inner)),
                Err(_) => Err(self.error("array container takes exactly one type argument")),
            };
        }
        if MAP_CONTAINERS.contains(&last) {
            return match <[TypeDescriptor; 2]>::try_from(args) {
                Ok([key, value]) => Ok(TypeDescriptor::map_of(key, value)),
                Err(_) => Err(self.error("map container takes exactly two type arguments")),
            };
        }
        if args.is_empty() && (self.is_model)(path) {
            return Ok(TypeDescriptor::Reference(path.to_string()));
        }
        if let Some(scalar) = Scalar::from_alias(path) {
            // `DateTime<Utc>` and friends carry a timezone/precision argument we ignore
            return Ok(TypeDescriptor::Scalar(scalar));
        }
        if !args.is_empty() {
            return Err(self.error("unsupported generic type"));
        }
        Ok(TypeDescriptor::Reference(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn all_shapes() -> Vec<TypeDescriptor> {
        vec![
            TypeDescriptor::scalar(Scalar::String),
            TypeDescriptor::reference("Pet"),
            TypeDescriptor::reference("PetDto"),
            TypeDescriptor::array_of(TypeDescriptor::reference("Tag")),
            TypeDescriptor::map_of(
                TypeDescriptor::scalar(Scalar::String),
                TypeDescriptor::array_of(TypeDescriptor::reference("Order")),
            ),
            TypeDescriptor::array_of(TypeDescriptor::array_of(TypeDescriptor::scalar(
                Scalar::Uuid,
            ))),
        ]
    }

    #[test]
    fn rewrite_suffixes_references_only() {
        let ty = TypeDescriptor::map_of(
            TypeDescriptor::scalar(Scalar::String),
            TypeDescriptor::array_of(TypeDescriptor::reference("Tag")),
        );
        assert_eq!(
            rewrite_to_dto(&ty),
            TypeDescriptor::map_of(
                TypeDescriptor::scalar(Scalar::String),
                TypeDescriptor::array_of(TypeDescriptor::reference("TagDto")),
            )
        );
        assert_eq!(
            rewrite_to_dto(&TypeDescriptor::scalar(Scalar::DateTime)),
            TypeDescriptor::scalar(Scalar::DateTime)
        );
    }

    #[test]
    fn rewrite_is_idempotent() {
        for ty in all_shapes() {
            let once = rewrite_to_dto(&ty);
            assert_eq!(rewrite_to_dto(&once), once, "not idempotent for {ty}");
        }
    }

    #[test]
    fn rewrite_never_turns_a_reference_into_a_scalar() {
        assert_eq!(
            rewrite_to_dto(&TypeDescriptor::reference("Duration")),
            TypeDescriptor::reference("DurationDto")
        );
        assert_eq!(
            rewrite_to_dto(&TypeDescriptor::array_of(TypeDescriptor::reference("Value"))),
            TypeDescriptor::array_of(TypeDescriptor::reference("ValueDto"))
        );
    }

    #[test]
    fn declared_model_names_win_over_scalar_aliases() {
        let is_model = |name: &str| name == "Duration";
        assert_eq!(
            TypeDescriptor::parse_declared("Vec<Duration>", &is_model).unwrap(),
            TypeDescriptor::array_of(TypeDescriptor::reference("Duration"))
        );
        assert_eq!(
            TypeDescriptor::parse_declared("Date", &is_model).unwrap(),
            TypeDescriptor::scalar(Scalar::Date)
        );
        assert_eq!(
            "Duration".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::scalar(Scalar::Duration)
        );
    }

    #[test]
    fn references_walks_nested_slots() {
        let ty = TypeDescriptor::map_of(
            TypeDescriptor::scalar(Scalar::String),
            TypeDescriptor::array_of(TypeDescriptor::reference("Tag")),
        );
        assert_eq!(ty.references(), vec!["Tag"]);
        assert!(TypeDescriptor::scalar(Scalar::Bool).references().is_empty());
    }

    #[test]
    fn parse_generic_text() {
        assert_eq!(
            "List<Pet>".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::array_of(TypeDescriptor::reference("Pet"))
        );
        assert_eq!(
            "Dictionary<string, int>".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::map_of(
                TypeDescriptor::scalar(Scalar::String),
                TypeDescriptor::scalar(Scalar::Integer)
            )
        );
        assert_eq!(
            "IEnumerable<Dictionary<string, Category>>"
                .parse::<TypeDescriptor>()
                .unwrap(),
            TypeDescriptor::array_of(TypeDescriptor::map_of(
                TypeDescriptor::scalar(Scalar::String),
                TypeDescriptor::reference("Category")
            ))
        );
        assert_eq!(
            "()".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::scalar(Scalar::Unit)
        );
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!("Vec<Pet".parse::<TypeDescriptor>().is_err());
        assert!("HashMap<String>".parse::<TypeDescriptor>().is_err());
        assert!("Wrapper<Pet>".parse::<TypeDescriptor>().is_err());
        assert!("".parse::<TypeDescriptor>().is_err());
        assert!("Pet Tag".parse::<TypeDescriptor>().is_err());
    }

    #[test]
    fn render_parses_back() {
        for ty in all_shapes() {
            let text = ty.to_string();
            assert_eq!(text.parse::<TypeDescriptor>().unwrap(), ty, "{text}");
        }
        assert_eq!(
            TypeDescriptor::scalar(Scalar::DateTime)
                .to_string()
                .parse::<TypeDescriptor>()
                .unwrap(),
            TypeDescriptor::scalar(Scalar::DateTime)
        );
    }

    #[test]
    fn model_name_containing_another_is_untouched() {
        // `PetCategory` must not be affected by rewriting `Pet`
        let ty: TypeDescriptor = "Vec<PetCategory>".parse().unwrap();
        assert_eq!(rewrite_to_dto(&ty).to_string(), "Vec<PetCategoryDto>");
    }
}
