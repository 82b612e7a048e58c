//! Tool definitions and their per-model preparation

use crate::error::{CompatError, Result};
use crate::profile::{ModelProfile, TransformerKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Tool definition for LLM provider
///
/// This describes a tool that the LLM can use, including its name,
/// description, and input schema in JSON Schema format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,

    /// Strict schema adherence; `None` lets it be detected from the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            strict: None,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Adapt this definition to what `profile` accepts
    ///
    /// The input schema is rewritten by the profile's schema policy. For the
    /// OpenAI policy an unset `strict` becomes whether the schema was already
    /// strict-compatible, and profiles whose API rejects strict tool
    /// definitions always get `strict: false`.
    ///
    /// # Example
    ///
    /// ```
    /// use agent_compat::profile::ModelProfile;
    /// use agent_compat::tools::ToolDefinition;
    /// use serde_json::json;
    ///
    /// let tool = ToolDefinition::new(
    ///     "search",
    ///     "Search the web",
    ///     json!({"type": "object", "properties": {"query": {"type": "string"}}}),
    /// );
    /// let prepared = tool.prepare_for(&ModelProfile::openai_compatible(), 128)?;
    /// assert_eq!(prepared.strict, Some(false));
    /// # Ok::<(), agent_compat::CompatError>(())
    /// ```
    pub fn prepare_for(&self, profile: &ModelProfile, max_depth: usize) -> Result<ToolDefinition> {
        let Value::Object(schema) = &self.input_schema else {
            return Err(CompatError::InvalidSchema(format!(
                "input schema of tool `{}` must be an object",
                self.name
            )));
        };

        let transformed = profile.transform_schema(schema, self.strict, max_depth)?;

        let mut strict = self.strict;
        if strict.is_none() && profile.json_schema_transformer == Some(TransformerKind::OpenAi) {
            strict = Some(transformed.is_strict_compatible);
        }
        if !profile.openai_settings().supports_strict_tool_definition {
            strict = Some(false);
        }

        debug!(
            tool = %self.name,
            ?strict,
            warnings = transformed.warnings.len(),
            "Prepared tool definition"
        );

        Ok(ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: transformed.into_value(),
            strict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::OpenAiProfile;
    use serde_json::json;

    fn search_tool() -> ToolDefinition {
        ToolDefinition::new(
            "search",
            "Search the web",
            json!({
                "type": "object",
                "title": "Search",
                "properties": {
                    "query": {"type": "string"},
                    "limit": {"type": "integer", "default": 10}
                },
                "required": ["query"]
            }),
        )
    }

    #[test]
    fn test_tool_definition_creation() {
        let tool = search_tool();
        assert_eq!(tool.name, "search");
        assert_eq!(tool.description, "Search the web");
        assert_eq!(tool.strict, None);
        assert_eq!(tool.clone().with_strict(true).strict, Some(true));
    }

    #[test]
    fn test_strict_detected_for_openai() {
        let prepared = search_tool()
            .prepare_for(&ModelProfile::openai_compatible(), 64)
            .unwrap();

        assert_eq!(prepared.strict, Some(false));
        assert!(prepared.input_schema.get("title").is_none());
        assert_eq!(prepared.input_schema["properties"]["limit"]["default"], 10);
    }

    #[test]
    fn test_compliant_schema_detected_as_strict() {
        let tool = ToolDefinition::new(
            "lookup",
            "Look up a user",
            json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}},
                "required": ["id"],
                "additionalProperties": false
            }),
        );

        let prepared = tool.prepare_for(&ModelProfile::openai_compatible(), 64).unwrap();
        assert_eq!(prepared.strict, Some(true));
    }

    #[test]
    fn test_forced_strict_rewrites_schema() {
        let prepared = search_tool()
            .with_strict(true)
            .prepare_for(&ModelProfile::openai_compatible(), 64)
            .unwrap();

        assert_eq!(prepared.strict, Some(true));
        assert_eq!(prepared.input_schema["required"], json!(["query", "limit"]));
        assert_eq!(prepared.input_schema["additionalProperties"], false);
        assert!(prepared.input_schema["properties"]["limit"].get("default").is_none());
    }

    #[test]
    fn test_strict_disabled_by_profile() {
        let profile = ModelProfile {
            openai: Some(OpenAiProfile {
                supports_strict_tool_definition: false,
                ..OpenAiProfile::default()
            }),
            ..ModelProfile::openai_compatible()
        };

        let prepared = search_tool().with_strict(true).prepare_for(&profile, 64).unwrap();
        assert_eq!(prepared.strict, Some(false));
    }

    #[test]
    fn test_non_openai_policy_keeps_strict_unset() {
        let profile = ModelProfile {
            json_schema_transformer: Some(TransformerKind::Google),
            ..ModelProfile::default()
        };

        let prepared = search_tool().prepare_for(&profile, 64).unwrap();
        assert_eq!(prepared.strict, None);
        assert!(prepared.input_schema["properties"]["limit"].get("default").is_none());
    }

    #[test]
    fn test_non_object_schema_rejected() {
        let tool = ToolDefinition::new("bad", "Bad schema", json!(true));
        let err = tool.prepare_for(&ModelProfile::default(), 64).unwrap_err();
        assert!(matches!(err, CompatError::InvalidSchema(_)));
    }

    #[test]
    fn test_serialization_omits_unset_strict() {
        let value = serde_json::to_value(search_tool()).unwrap();
        assert!(value.get("strict").is_none());

        let value = serde_json::to_value(search_tool().with_strict(false)).unwrap();
        assert_eq!(value["strict"], false);
    }
}
