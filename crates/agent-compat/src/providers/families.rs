//! Profiles of model families, independent of the API serving them

use crate::profile::{ModelProfile, OpenAiProfile, TransformerKind};

/// OpenAI models; o-series reasoning models reject sampling settings
pub fn openai_model_profile(model: &str) -> Option<ModelProfile> {
    let is_reasoning_model = model.starts_with('o');
    Some(ModelProfile {
        json_schema_transformer: Some(TransformerKind::OpenAi),
        supports_json_schema_output: true,
        supports_json_object_output: true,
        openai: Some(OpenAiProfile {
            supports_sampling_settings: !is_reasoning_model,
            ..OpenAiProfile::default()
        }),
        ..ModelProfile::default()
    })
}

/// Gemini and Gemma models
pub fn google_model_profile(_model: &str) -> Option<ModelProfile> {
    Some(ModelProfile {
        json_schema_transformer: Some(TransformerKind::Google),
        supports_json_schema_output: true,
        supports_json_object_output: true,
        ..ModelProfile::default()
    })
}

/// Llama models
pub fn meta_model_profile(_model: &str) -> Option<ModelProfile> {
    Some(inline_defs_profile())
}

/// Qwen models
pub fn qwen_model_profile(_model: &str) -> Option<ModelProfile> {
    Some(inline_defs_profile())
}

/// Amazon Nova and Titan models
pub fn amazon_model_profile(_model: &str) -> Option<ModelProfile> {
    Some(inline_defs_profile())
}

pub fn anthropic_model_profile(_model: &str) -> Option<ModelProfile> {
    None
}

pub fn deepseek_model_profile(_model: &str) -> Option<ModelProfile> {
    None
}

pub fn mistral_model_profile(_model: &str) -> Option<ModelProfile> {
    None
}

pub fn cohere_model_profile(_model: &str) -> Option<ModelProfile> {
    None
}

pub fn grok_model_profile(_model: &str) -> Option<ModelProfile> {
    None
}

fn inline_defs_profile() -> ModelProfile {
    ModelProfile {
        json_schema_transformer: Some(TransformerKind::InlineDefs),
        ..ModelProfile::default()
    }
}
