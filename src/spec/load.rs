use anyhow::Context;
use oas3::OpenApiV3Spec;
use std::path::Path;

use super::build::build_document;
use super::types::SchemaDocument;

/// Drop path-item keys oas3 would reject (unknown verbs, stray vendor data without `x-`).
fn strip_unknown_verbs(val: &mut serde_json::Value) {
    const METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

    let Some(serde_json::Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        if let serde_json::Value::Object(obj) = item {
            obj.retain(|k, _| {
                let lk = k.to_ascii_lowercase();
                match lk.as_str() {
                    "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                    m if METHODS.contains(&m) => true,
                    _ => k.starts_with("x-"),
                }
            });
        }
    }
}

/// Parse document text. YAML is a superset of JSON, so `yaml = true` accepts both.
pub fn parse_document(content: &str, yaml: bool) -> anyhow::Result<SchemaDocument> {
    let mut value: serde_json::Value = if yaml {
        serde_yaml::from_str(content).context("document is not valid YAML")?
    } else {
        serde_json::from_str(content).context("document is not valid JSON")?
    };

    strip_unknown_verbs(&mut value);
    let spec: OpenApiV3Spec =
        serde_json::from_value(value).context("document is not a valid OpenAPI 3 document")?;
    Ok(build_document(&spec)?)
}

/// Load a YAML (`.yaml`/`.yml`) or JSON schema document from disk.
pub fn load_document(path: &Path) -> anyhow::Result<SchemaDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema document {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    parse_document(&content, yaml).with_context(|| format!("failed to load {}", path.display()))
}
