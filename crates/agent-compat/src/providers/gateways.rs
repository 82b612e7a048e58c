//! Providers serving models from several families
//!
//! Groq, Together, Bedrock and Azure host other vendors' models, so the
//! family is recovered from the model name. Together, Azure and Grok speak
//! the OpenAI API and layer the family profile over an OpenAI-compatible base.

use super::families::{
    amazon_model_profile, anthropic_model_profile, cohere_model_profile, deepseek_model_profile,
    google_model_profile, grok_model_profile, meta_model_profile, mistral_model_profile,
    openai_model_profile, qwen_model_profile,
};
use super::{PrefixRule, ProfileBuilder, lookup_prefix};
use crate::profile::{BedrockProfile, ModelProfile, OpenAiProfile, ToolResultFormat};
use regex::Regex;
use std::sync::LazyLock;

const GROQ_RULES: &[PrefixRule] = &[
    PrefixRule::new("llama", meta_model_profile),
    PrefixRule::stripped("meta-llama/", meta_model_profile),
    PrefixRule::new("gemma", google_model_profile),
    PrefixRule::new("qwen", qwen_model_profile),
    PrefixRule::new("deepseek", deepseek_model_profile),
    PrefixRule::new("mistral", mistral_model_profile),
];

const AZURE_RULES: &[PrefixRule] = &[
    PrefixRule::new("llama", meta_model_profile),
    PrefixRule::stripped("meta-", meta_model_profile),
    PrefixRule::new("deepseek", deepseek_model_profile),
    PrefixRule::stripped("mistralai-", mistral_model_profile),
    PrefixRule::new("mistral", mistral_model_profile),
    PrefixRule::stripped("cohere-", cohere_model_profile),
    PrefixRule::new("grok", grok_model_profile),
];

/// `[region.]vendor.model-vN[:M]`
static BEDROCK_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(.+)-v\d+(?::\d+)?$").ok());

pub fn groq_model_profile(model: &str) -> Option<ModelProfile> {
    lookup_prefix(model, GROQ_RULES).and_then(|rule| rule.profile(model))
}

/// Together model names are `vendor/model`
pub fn together_model_profile(model: &str) -> Option<ModelProfile> {
    let model = model.to_ascii_lowercase();
    let base = ModelProfile::openai_compatible();

    let Some((vendor, name)) = model.split_once('/') else {
        return Some(base);
    };
    let builder: Option<ProfileBuilder> = match vendor {
        "google" => Some(google_model_profile),
        "qwen" => Some(qwen_model_profile),
        "meta-llama" => Some(meta_model_profile),
        _ => None,
    };
    let family = builder.and_then(|builder| builder(name));
    Some(base.update(family.as_ref()))
}

/// Bedrock model ids are `[region.]vendor.model[-vN[:M]]`
pub fn bedrock_model_profile(model: &str) -> Option<ModelProfile> {
    let mut parts: Vec<&str> = model.splitn(3, '.').collect();
    if parts.len() > 2 && parts[0].len() == 2 {
        parts.remove(0);
    }
    let [vendor, versioned, ..] = parts.as_slice() else {
        return None;
    };
    let name = strip_bedrock_version(versioned);

    match *vendor {
        "anthropic" => {
            let base = ModelProfile {
                bedrock: Some(BedrockProfile {
                    supports_tool_choice: false,
                    ..BedrockProfile::default()
                }),
                ..ModelProfile::default()
            };
            Some(base.update(anthropic_model_profile(name).as_ref()))
        }
        "mistral" => {
            let base = ModelProfile {
                bedrock: Some(BedrockProfile {
                    tool_result_format: ToolResultFormat::Json,
                    ..BedrockProfile::default()
                }),
                ..ModelProfile::default()
            };
            Some(base.update(mistral_model_profile(name).as_ref()))
        }
        "amazon" => amazon_model_profile(name),
        "meta" => meta_model_profile(name),
        "cohere" => cohere_model_profile(name),
        "deepseek" => deepseek_model_profile(name),
        _ => None,
    }
}

fn strip_bedrock_version(name: &str) -> &str {
    BEDROCK_VERSION
        .as_ref()
        .and_then(|re| re.captures(name))
        .and_then(|captures| captures.get(1))
        .map_or(name, |bare| bare.as_str())
}

pub fn azure_model_profile(model: &str) -> Option<ModelProfile> {
    match lookup_prefix(model, AZURE_RULES) {
        Some(rule) => {
            let family = rule.profile(model);
            Some(ModelProfile::openai_compatible().update(family.as_ref()))
        }
        None => openai_model_profile(model),
    }
}

/// xAI's API rejects `strict` on tool definitions
pub fn grok_provider_profile(model: &str) -> Option<ModelProfile> {
    let base = ModelProfile {
        openai: Some(OpenAiProfile {
            supports_strict_tool_definition: false,
            ..OpenAiProfile::default()
        }),
        ..ModelProfile::openai_compatible()
    };
    Some(base.update(grok_model_profile(model).as_ref()))
}
