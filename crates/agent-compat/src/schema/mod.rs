//! JSON Schema adaptation
//!
//! A canonical JSON Schema (typically generated from Rust types or handed over
//! by an MCP server) is rewritten into the dialect a given vendor accepts. The
//! [`Walker`] performs a single recursive pass over the schema and calls a
//! [`SchemaTransformer`] policy on every node:
//!
//! - [`InlineDefsTransformer`] only removes `$defs` by inlining them
//! - [`GoogleTransformer`] targets the OpenAPI subset accepted by Gemini
//! - [`OpenAiTransformer`] enforces (or detects) OpenAI strict mode
//!
//! # Example
//!
//! ```
//! use agent_compat::schema::{GoogleTransformer, walk};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "anyOf": [{"type": "string"}, {"type": "null"}]
//! });
//! let schema = schema.as_object().unwrap();
//!
//! let transformed = walk(schema, &GoogleTransformer, None)?;
//! assert_eq!(
//!     serde_json::Value::Object(transformed.schema),
//!     json!({"type": "string", "nullable": true})
//! );
//! # Ok::<(), agent_compat::CompatError>(())
//! ```

pub mod google;
pub mod inline;
pub mod openai;
pub mod walker;

pub use google::GoogleTransformer;
pub use inline::InlineDefsTransformer;
pub use openai::OpenAiTransformer;
pub use walker::{
    DEFAULT_MAX_DEPTH, SchemaTransformer, Transformed, WalkContext, WalkOptions, Walker, walk,
};

use crate::error::{CompatError, Result};
use serde_json::{Map, Value};

/// A single schema node: arbitrary keys, unknown ones are passed through
pub type JsonSchema = Map<String, Value>;

/// Prefix of references that point into the document's `$defs`
pub const DEFS_PREFIX: &str = "#/$defs/";

/// Key of the definitions side-table
pub const DEFS_KEY: &str = "$defs";

/// Key of a reference
pub const REF_KEY: &str = "$ref";

/// Definition name a reference points at
///
/// References without the `#/$defs/` prefix are used verbatim.
pub fn def_key(reference: &str) -> &str {
    reference.strip_prefix(DEFS_PREFIX).unwrap_or(reference)
}

/// Reference string pointing at a definition
pub fn def_ref(name: &str) -> String {
    format!("{DEFS_PREFIX}{name}")
}

/// A root schema with its `$defs` split out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    /// The root node, without `$defs`
    pub root: JsonSchema,
    /// Definition name to schema
    pub defs: JsonSchema,
}

impl SchemaDocument {
    /// Split a schema into its root and `$defs`
    ///
    /// The input is copied; the caller's schema is never modified.
    pub fn from_schema(schema: &JsonSchema) -> Result<Self> {
        let mut root = schema.clone();
        let defs = match root.shift_remove(DEFS_KEY) {
            None => JsonSchema::new(),
            Some(Value::Object(defs)) => defs,
            Some(other) => {
                return Err(CompatError::InvalidSchema(format!(
                    "`$defs` must be an object, found {other}"
                )));
            }
        };

        Ok(Self { root, defs })
    }

    /// Reattach `$defs` (if any) to the root
    pub fn into_schema(self) -> JsonSchema {
        let mut root = self.root;
        if !self.defs.is_empty() {
            root.insert(DEFS_KEY.to_string(), Value::Object(self.defs));
        }
        root
    }

    /// Root-level `$ref`, if the whole document is one reference
    pub fn root_ref(&self) -> Option<&str> {
        self.root.get(REF_KEY).and_then(Value::as_str)
    }

    /// Look up a definition by name
    pub fn definition(&self, name: &str) -> Result<Option<&JsonSchema>> {
        definition(&self.defs, name)
    }
}

/// Look up `name` in a `$defs` table
pub(crate) fn definition<'a>(defs: &'a JsonSchema, name: &str) -> Result<Option<&'a JsonSchema>> {
    match defs.get(name) {
        None => Ok(None),
        Some(Value::Object(def)) => Ok(Some(def)),
        Some(other) => Err(CompatError::InvalidSchema(format!(
            "definition `{name}` must be an object, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonSchema {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_def_key() {
        assert_eq!(def_key("#/$defs/User"), "User");
        assert_eq!(def_key("User"), "User");
        assert_eq!(def_ref("User"), "#/$defs/User");
    }

    #[test]
    fn test_document_split_and_join() {
        let schema = object(json!({
            "$ref": "#/$defs/User",
            "$defs": {"User": {"type": "object"}}
        }));

        let document = SchemaDocument::from_schema(&schema).unwrap();
        assert_eq!(document.root_ref(), Some("#/$defs/User"));
        assert!(document.root.get("$defs").is_none());
        assert_eq!(
            document.definition("User").unwrap(),
            Some(&object(json!({"type": "object"})))
        );
        assert_eq!(document.definition("Other").unwrap(), None);

        assert_eq!(document.into_schema(), schema);
    }

    #[test]
    fn test_document_rejects_non_object_defs() {
        let schema = object(json!({"$defs": [1, 2]}));
        let err = SchemaDocument::from_schema(&schema).unwrap_err();
        assert!(matches!(err, CompatError::InvalidSchema(_)));
    }

    #[test]
    fn test_definition_must_be_object() {
        let schema = object(json!({"$defs": {"Bad": 3}}));
        let document = SchemaDocument::from_schema(&schema).unwrap();
        assert!(document.definition("Bad").is_err());
    }

    #[test]
    fn test_empty_defs_not_reattached() {
        let schema = object(json!({"type": "string"}));
        let document = SchemaDocument::from_schema(&schema).unwrap();
        assert_eq!(document.into_schema(), schema);
    }
}
