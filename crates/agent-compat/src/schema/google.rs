//! Gemini dialect policy
//!
//! Gemini accepts a subset of OpenAPI 3.0.3 for function declarations and
//! structured output. See: https://ai.google.dev/api/caching#Schema
//!
//! Notably it has no `$ref`/`$defs`, no `const`, only string enums, no tuple
//! arrays, and it mishandles `additionalProperties`.

use super::{JsonSchema, REF_KEY, SchemaTransformer, WalkContext, WalkOptions};
use crate::error::{CompatError, Result};
use serde_json::{Value, json};
use std::collections::HashSet;

/// Keywords Gemini rejects or ignores
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "title",
    "default",
    "$schema",
    "discriminator",
    "examples",
    "exclusiveMaximum",
    "exclusiveMinimum",
];

/// Rewrites schemas into the OpenAPI subset accepted by Gemini
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoogleTransformer;

impl SchemaTransformer for GoogleTransformer {
    fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            prefer_inlined_defs: true,
            simplify_nullable_unions: true,
        }
    }

    fn transform(&self, mut schema: JsonSchema, ctx: &mut WalkContext) -> Result<JsonSchema> {
        if let Some(additional) = schema.shift_remove("additionalProperties") {
            if is_truthy(&additional) {
                let mut source = schema.clone();
                source.insert("additionalProperties".to_string(), additional);
                ctx.warn(format!(
                    "`additionalProperties` is not supported by Gemini; it will be removed from the tool JSON schema. \
                     Source of additionalProperties within the full schema: {}. \
                     If this came from a map-typed field, that field will always be empty.",
                    Value::Object(source)
                ));
            }
        }

        for keyword in UNSUPPORTED_KEYWORDS {
            schema.shift_remove(*keyword);
        }

        // a single-valued enum is the closest Gemini has to const
        if let Some(constant) = schema.shift_remove("const") {
            if !constant.is_null() {
                schema.insert("enum".to_string(), json!([constant]));
            }
        }

        let coerced = match schema.get("enum") {
            Some(Value::Array(values)) if !values.is_empty() => {
                Some(values.iter().map(enum_string).collect::<Vec<_>>())
            }
            _ => None,
        };
        if let Some(values) = coerced {
            schema.insert("type".to_string(), json!("string"));
            schema.insert("enum".to_string(), Value::Array(values));
        }

        // discriminated unions: Gemini rejects oneOf but accepts the equivalent anyOf
        if schema.contains_key("oneOf") && !schema.contains_key("type") {
            if let Some(one_of) = schema.shift_remove("oneOf") {
                schema.insert("anyOf".to_string(), one_of);
            }
        }

        if schema.get("type").and_then(Value::as_str) == Some("string") {
            move_format_to_description(&mut schema);
        }

        if let Some(reference) = schema.get(REF_KEY) {
            return Err(CompatError::UnsupportedFeature(format!(
                "Recursive `$ref`s in JSON Schema are not supported by Gemini: {}",
                display(reference)
            )));
        }

        if let Some(prefix_items) = schema.shift_remove("prefixItems") {
            collapse_prefix_items(&mut schema, prefix_items)?;
        }

        Ok(schema)
    }
}

fn move_format_to_description(schema: &mut JsonSchema) {
    let Some(format) = schema.shift_remove("format") else {
        return;
    };
    if !is_truthy(&format) {
        return;
    }

    let format = display(&format);
    let description = match schema
        .get("description")
        .and_then(Value::as_str)
        .filter(|description| !description.is_empty())
    {
        Some(description) => format!("{description} (format: {format})"),
        None => format!("Format: {format}"),
    };
    schema.insert("description".to_string(), Value::String(description));
}

/// Tuple arrays become a homogeneous `items` with length bounds
fn collapse_prefix_items(schema: &mut JsonSchema, prefix_items: Value) -> Result<()> {
    let Value::Array(prefix_items) = prefix_items else {
        return Err(CompatError::InvalidSchema(
            "`prefixItems` must be an array".to_string(),
        ));
    };
    let items = schema.get("items").cloned();

    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for candidate in items.iter().chain(&prefix_items) {
        match dedupe_key(candidate) {
            Some(key) => {
                if seen.insert(key) {
                    unique.push(candidate.clone());
                }
            }
            None => unique.push(candidate.clone()),
        }
    }

    match unique.len() {
        0 => {}
        1 => {
            if let Some(only) = unique.pop() {
                schema.insert("items".to_string(), only);
            }
        }
        _ => {
            schema.insert("items".to_string(), json!({"anyOf": unique}));
        }
    }

    let length = prefix_items.len();
    schema.entry("minItems").or_insert_with(|| json!(length));
    if items.is_none() {
        schema.entry("maxItems").or_insert_with(|| json!(length));
    }
    Ok(())
}

/// Equality key for deduplicating positional item schemas.
///
/// Only flat schemas (scalar values) get a structural key; anything with
/// nested objects or arrays is treated as distinct.
fn dedupe_key(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => {
            if map.values().any(|value| value.is_object() || value.is_array()) {
                return None;
            }
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let canonical: Vec<Value> = pairs
                .into_iter()
                .map(|(key, value)| json!([key, value]))
                .collect();
            Some(Value::Array(canonical).to_string())
        }
        Value::Array(_) => None,
        scalar => Some(scalar.to_string()),
    }
}

fn enum_string(value: &Value) -> Value {
    Value::String(display(value))
}

/// Strings verbatim, everything else as JSON text
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
