//! Model capability profiles
//!
//! A [`ModelProfile`] tells request construction what a model supports:
//! tool calling, native structured output, and which JSON Schema dialect its
//! tool and output schemas have to be rewritten into.
//!
//! Profiles are layered with [`ModelProfile::update`]: a provider starts from a
//! base profile and overlays the model family's profile, and user
//! configuration can overlay on top of that.

use crate::error::{CompatError, Result};
use crate::schema::{
    GoogleTransformer, InlineDefsTransformer, JsonSchema, OpenAiTransformer, SchemaTransformer,
    Transformed, Walker,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Instructions used for prompted structured output; `{schema}` is replaced
/// with the output schema
pub const DEFAULT_PROMPTED_OUTPUT_TEMPLATE: &str = "
Always respond with a JSON object that's compatible with this schema:

{schema}

Don't include any text or Markdown fencing before or after.
";

/// How structured output is requested from a model by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredOutputMode {
    /// Output is returned through a tool call
    #[default]
    Tool,
    /// Native JSON schema constrained output
    JsonSchema,
    /// Native JSON object output without a schema
    JsonObject,
    /// Schema and instructions go into the prompt
    Prompted,
}

/// Schema policy a model needs, selected by value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformerKind {
    #[serde(rename = "inline_defs")]
    InlineDefs,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "openai")]
    OpenAi,
}

impl TransformerKind {
    /// The policy implementing this kind
    pub fn transformer(self) -> &'static dyn SchemaTransformer {
        match self {
            Self::InlineDefs => &InlineDefsTransformer,
            Self::Google => &GoogleTransformer,
            Self::OpenAi => &OpenAiTransformer,
        }
    }

    /// Walk `schema` with this policy
    pub fn walk(self, schema: &JsonSchema, strict: Option<bool>, max_depth: usize) -> Result<Transformed> {
        Walker::new(self.transformer())
            .strict(strict)
            .max_depth(max_depth)
            .walk(schema)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlineDefs => "inline_defs",
            Self::Google => "google",
            Self::OpenAi => "openai",
        }
    }
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformerKind {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inline" | "inline_defs" | "inline-defs" => Ok(Self::InlineDefs),
            "google" | "gemini" => Ok(Self::Google),
            "openai" => Ok(Self::OpenAi),
            other => Err(CompatError::ConfigurationError(format!(
                "Unknown schema transformer: {other}"
            ))),
        }
    }
}

/// OpenAI-compatible API quirks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenAiProfile {
    /// Off for OpenAI-compatible APIs that reject `strict` on tool definitions
    pub supports_strict_tool_definition: bool,
    /// Off for models that reject `temperature`, `top_p` and friends (o-series)
    pub supports_sampling_settings: bool,
}

impl Default for OpenAiProfile {
    fn default() -> Self {
        Self {
            supports_strict_tool_definition: true,
            supports_sampling_settings: true,
        }
    }
}

impl OpenAiProfile {
    fn update(mut self, other: &Self) -> Self {
        let defaults = Self::default();
        overlay(
            &mut self.supports_strict_tool_definition,
            &other.supports_strict_tool_definition,
            &defaults.supports_strict_tool_definition,
        );
        overlay(
            &mut self.supports_sampling_settings,
            &other.supports_sampling_settings,
            &defaults.supports_sampling_settings,
        );
        self
    }
}

/// Format of tool results sent back through the Bedrock Converse API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultFormat {
    #[default]
    Text,
    Json,
}

/// Bedrock Converse API quirks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BedrockProfile {
    pub supports_tool_choice: bool,
    pub tool_result_format: ToolResultFormat,
}

impl Default for BedrockProfile {
    fn default() -> Self {
        Self {
            supports_tool_choice: true,
            tool_result_format: ToolResultFormat::Text,
        }
    }
}

impl BedrockProfile {
    fn update(mut self, other: &Self) -> Self {
        let defaults = Self::default();
        overlay(
            &mut self.supports_tool_choice,
            &other.supports_tool_choice,
            &defaults.supports_tool_choice,
        );
        overlay(
            &mut self.tool_result_format,
            &other.tool_result_format,
            &defaults.tool_result_format,
        );
        self
    }
}

/// How requests to a model (or family of models) need to be constructed
///
/// Every field has a default, so a partial JSON object deserializes into an
/// overlay suitable for [`ModelProfile::update`].
///
/// # Example
///
/// ```
/// use agent_compat::profile::{ModelProfile, TransformerKind};
///
/// let base = ModelProfile::openai_compatible();
/// let family = ModelProfile {
///     json_schema_transformer: Some(TransformerKind::InlineDefs),
///     ..ModelProfile::default()
/// };
///
/// let merged = base.update(Some(&family));
/// assert_eq!(merged.json_schema_transformer, Some(TransformerKind::InlineDefs));
/// assert!(merged.openai.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelProfile {
    pub supports_tools: bool,
    pub supports_json_schema_output: bool,
    pub supports_json_object_output: bool,
    pub default_structured_output_mode: StructuredOutputMode,
    /// Instructions for prompted output, `{schema}` is the placeholder
    pub prompted_output_template: String,
    /// Schema policy; `None` sends schemas unchanged
    pub json_schema_transformer: Option<TransformerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAiProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock: Option<BedrockProfile>,
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self {
            supports_tools: true,
            supports_json_schema_output: false,
            supports_json_object_output: false,
            default_structured_output_mode: StructuredOutputMode::Tool,
            prompted_output_template: DEFAULT_PROMPTED_OUTPUT_TEMPLATE.to_string(),
            json_schema_transformer: None,
            openai: None,
            bedrock: None,
        }
    }
}

impl ModelProfile {
    /// Base profile of any OpenAI-compatible chat completions API
    pub fn openai_compatible() -> Self {
        Self {
            json_schema_transformer: Some(TransformerKind::OpenAi),
            openai: Some(OpenAiProfile::default()),
            ..Self::default()
        }
    }

    /// Overlay the non-default values of `other` onto this profile
    ///
    /// Fields `other` leaves at their default keep this profile's value, so an
    /// overlay can never reset a field to its default. Vendor sections are
    /// merged field by field the same way.
    pub fn update(&self, other: Option<&ModelProfile>) -> ModelProfile {
        let mut merged = self.clone();
        let Some(other) = other else {
            return merged;
        };

        let defaults = Self::default();
        overlay(&mut merged.supports_tools, &other.supports_tools, &defaults.supports_tools);
        overlay(
            &mut merged.supports_json_schema_output,
            &other.supports_json_schema_output,
            &defaults.supports_json_schema_output,
        );
        overlay(
            &mut merged.supports_json_object_output,
            &other.supports_json_object_output,
            &defaults.supports_json_object_output,
        );
        overlay(
            &mut merged.default_structured_output_mode,
            &other.default_structured_output_mode,
            &defaults.default_structured_output_mode,
        );
        overlay(
            &mut merged.prompted_output_template,
            &other.prompted_output_template,
            &defaults.prompted_output_template,
        );
        overlay(
            &mut merged.json_schema_transformer,
            &other.json_schema_transformer,
            &defaults.json_schema_transformer,
        );

        merged.openai = merge_section(self.openai, other.openai, OpenAiProfile::update);
        merged.bedrock = merge_section(self.bedrock, other.bedrock, BedrockProfile::update);
        merged
    }

    /// Effective OpenAI settings (defaults when the section is absent)
    pub fn openai_settings(&self) -> OpenAiProfile {
        self.openai.unwrap_or_default()
    }

    /// Effective Bedrock settings (defaults when the section is absent)
    pub fn bedrock_settings(&self) -> BedrockProfile {
        self.bedrock.unwrap_or_default()
    }

    /// Instructions asking the model to answer with JSON matching `schema`
    pub fn prompted_output_instructions(&self, schema: &JsonSchema) -> String {
        let schema = Value::Object(schema.clone()).to_string();
        self.prompted_output_template.replace("{schema}", &schema)
    }

    /// Rewrite `schema` for this model
    ///
    /// Without a transformer the schema is returned unchanged and is not
    /// assumed to be strict-compatible.
    pub fn transform_schema(
        &self,
        schema: &JsonSchema,
        strict: Option<bool>,
        max_depth: usize,
    ) -> Result<Transformed> {
        match self.json_schema_transformer {
            Some(kind) => kind.walk(schema, strict, max_depth),
            None => Ok(Transformed {
                schema: schema.clone(),
                is_strict_compatible: false,
                warnings: Vec::new(),
            }),
        }
    }
}

fn overlay<T: PartialEq + Clone>(target: &mut T, value: &T, default: &T) {
    if value != default {
        *target = value.clone();
    }
}

/// An overlay section is merged into the base section (or the section
/// defaults); the result is kept if the base had the section or the merge
/// changed anything.
fn merge_section<S: Copy + Default + PartialEq>(
    base: Option<S>,
    other: Option<S>,
    update: fn(S, &S) -> S,
) -> Option<S> {
    let Some(other) = other else {
        return base;
    };

    let merged = update(base.unwrap_or_default(), &other);
    if base.is_some() || merged != S::default() {
        Some(merged)
    } else {
        None
    }
}
