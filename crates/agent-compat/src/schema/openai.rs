//! OpenAI strict mode policy
//!
//! Strict mode requires every object to set `additionalProperties: false` and
//! to list all of its properties under `required`. A number of validation
//! keywords are rejected outright.
//!
//! See: https://platform.openai.com/docs/guides/function-calling#strict-mode
//!
//! With strict forced on, schemas are rewritten to comply. In auto-detect
//! mode (`strict = None`) nothing is rewritten; the walk only reports whether
//! the schema was already compliant.

use super::{
    DEFS_KEY, JsonSchema, REF_KEY, SchemaTransformer, WalkContext, WalkOptions, def_key,
    definition,
};
use crate::error::Result;
use serde_json::{Value, json};

/// Keywords strict mode does not accept, in the order notes are written
pub const STRICT_INCOMPATIBLE_KEYS: &[&str] = &[
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "minimum",
    "maximum",
    "multipleOf",
    "patternProperties",
    "unevaluatedProperties",
    "propertyNames",
    "minProperties",
    "maxProperties",
    "unevaluatedItems",
    "contains",
    "minContains",
    "maxContains",
    "minItems",
    "maxItems",
    "uniqueItems",
];

/// Reference marking the document root
const ROOT_REF: &str = "#";

/// Enforces or detects OpenAI strict mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenAiTransformer;

impl SchemaTransformer for OpenAiTransformer {
    fn walk_options(&self) -> WalkOptions {
        WalkOptions::default()
    }

    fn transform(&self, mut schema: JsonSchema, ctx: &mut WalkContext) -> Result<JsonSchema> {
        for key in ["title", "$schema", "discriminator"] {
            schema.shift_remove(key);
        }

        if schema.contains_key("default") {
            match ctx.strict() {
                Some(true) => {
                    schema.shift_remove("default");
                }
                None => ctx.mark_strict_incompatible(),
                Some(false) => {}
            }
        }

        rewrite_reference(&mut schema, ctx.root_ref());

        let present: Vec<&str> = STRICT_INCOMPATIBLE_KEYS
            .iter()
            .copied()
            .filter(|key| schema.contains_key(*key))
            .collect();
        if !present.is_empty() {
            match ctx.strict() {
                Some(true) => move_keywords_to_description(&mut schema, &present),
                None => ctx.mark_strict_incompatible(),
                Some(false) => {}
            }
        }

        if schema.contains_key("oneOf") {
            if ctx.strict() == Some(true) {
                if let Some(one_of) = schema.shift_remove("oneOf") {
                    schema.insert("anyOf".to_string(), one_of);
                }
            } else {
                ctx.mark_strict_incompatible();
            }
        }

        if schema.get("type").and_then(Value::as_str) == Some("object") {
            match ctx.strict() {
                Some(true) => require_all_properties(&mut schema),
                None => {
                    if !is_strict_object(&schema) {
                        ctx.mark_strict_incompatible();
                    }
                }
                Some(false) => {}
            }
        }

        Ok(schema)
    }

    /// A document that is one big reference gets the referenced definition
    /// spliced over its root, so the top level has concrete keys.
    fn finish(&self, mut schema: JsonSchema, ctx: &WalkContext) -> Result<JsonSchema> {
        let Some(root_ref) = ctx.root_ref() else {
            return Ok(schema);
        };

        schema.shift_remove(REF_KEY);
        let root_def = match schema.get(DEFS_KEY) {
            Some(Value::Object(defs)) => definition(defs, def_key(root_ref))?.cloned(),
            _ => None,
        };
        if let Some(root_def) = root_def {
            for (key, value) in root_def {
                schema.insert(key, value);
            }
        }
        Ok(schema)
    }
}

/// References to the root become `#`; a reference with siblings is moved
/// into a single-member `anyOf`.
fn rewrite_reference(schema: &mut JsonSchema, root_ref: Option<&str>) {
    let Some(reference) = schema.get(REF_KEY).and_then(Value::as_str) else {
        return;
    };
    if root_ref == Some(reference) {
        schema.insert(REF_KEY.to_string(), json!(ROOT_REF));
    }

    if schema.len() > 1 {
        if let Some(reference) = schema.shift_remove(REF_KEY) {
            schema.insert("anyOf".to_string(), json!([{"$ref": reference}]));
        }
    }
}

fn move_keywords_to_description(schema: &mut JsonSchema, keys: &[&str]) {
    let notes = keys
        .iter()
        .filter_map(|key| {
            schema
                .shift_remove(*key)
                .map(|value| format!("{key}={}", note_value(&value)))
        })
        .collect::<Vec<_>>()
        .join(", ");

    let description = match schema
        .get("description")
        .and_then(Value::as_str)
        .filter(|description| !description.is_empty())
    {
        Some(description) => format!("{description} ({notes})"),
        None => notes,
    };
    schema.insert("description".to_string(), Value::String(description));
}

fn note_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn require_all_properties(schema: &mut JsonSchema) {
    schema.insert("additionalProperties".to_string(), Value::Bool(false));

    let properties = schema
        .entry("properties")
        .or_insert_with(|| Value::Object(JsonSchema::new()));
    let required: Vec<Value> = match properties {
        Value::Object(properties) => properties.keys().cloned().map(Value::String).collect(),
        _ => Vec::new(),
    };
    schema.insert("required".to_string(), Value::Array(required));
}

fn is_strict_object(schema: &JsonSchema) -> bool {
    if schema.get("additionalProperties") != Some(&Value::Bool(false)) {
        return false;
    }
    let (Some(properties), Some(required)) = (schema.get("properties"), schema.get("required"))
    else {
        return false;
    };

    let required: Vec<&str> = required
        .as_array()
        .map(|required| required.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    properties
        .as_object()
        .is_none_or(|properties| properties.keys().all(|key| required.contains(&key.as_str())))
}
