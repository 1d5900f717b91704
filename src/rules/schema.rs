//! JSON Schema validation adapter for the linter.
//!
//! A separate module so the core structural checks in [`super::linter`]
//! never depend on `jsonschema` directly — schema validation is opt-in,
//! supplied as a separate document (§6).

use jsonschema::JSONSchema;
use serde_json::Value as Json;

use super::linter::Diagnostic;

/// Validate `raw` (the rule document as loaded, before typed parsing)
/// against `schema`, wrapping every violation as a `SCHEMA_ERROR`
/// diagnostic. A schema that fails to compile is itself reported as a
/// single diagnostic rather than raised.
pub fn lint_against_schema(raw: &Json, schema: &Json) -> Vec<Diagnostic> {
    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(err) => {
            return vec![Diagnostic {
                tag: "SCHEMA_ERROR".to_string(),
                message: format!("invalid schema document: {err}"),
                node_id: None,
            }]
        }
    };

    match compiled.validate(raw) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|err| Diagnostic {
                tag: "SCHEMA_ERROR".to_string(),
                message: format!("{}: {}", err.instance_path, err),
                node_id: None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passes_valid_document() {
        let schema = json!({
            "type": "object",
            "required": ["nodes"],
            "properties": { "nodes": { "type": "array" } }
        });
        let doc = json!({ "nodes": [] });
        assert!(lint_against_schema(&doc, &schema).is_empty());
    }

    #[test]
    fn flags_invalid_document() {
        let schema = json!({
            "type": "object",
            "required": ["nodes"]
        });
        let doc = json!({ "meta": {} });
        let diags = lint_against_schema(&doc, &schema);
        assert!(diags.iter().all(|d| d.tag == "SCHEMA_ERROR"));
        assert!(!diags.is_empty());
    }
}
