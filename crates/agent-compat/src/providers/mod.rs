//! Model profile lookup per provider
//!
//! A provider serves models of one or more families. Looking up a model's
//! profile means recognising its family from the model name (usually by
//! prefix) and layering that family's profile over the provider's own base.

pub mod families;
pub mod gateways;

pub use families::{
    amazon_model_profile, anthropic_model_profile, cohere_model_profile, deepseek_model_profile,
    google_model_profile, grok_model_profile, meta_model_profile, mistral_model_profile,
    openai_model_profile, qwen_model_profile,
};

use crate::error::CompatError;
use crate::profile::ModelProfile;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Builds a family profile from a model name
pub type ProfileBuilder = fn(&str) -> Option<ModelProfile>;

/// Routes model names starting with `prefix` to a family builder
#[derive(Debug, Clone, Copy)]
pub struct PrefixRule {
    pub prefix: &'static str,
    pub builder: ProfileBuilder,
    /// Hand the builder the model name without the prefix
    pub strip_prefix: bool,
}

impl PrefixRule {
    pub const fn new(prefix: &'static str, builder: ProfileBuilder) -> Self {
        Self {
            prefix,
            builder,
            strip_prefix: false,
        }
    }

    pub const fn stripped(prefix: &'static str, builder: ProfileBuilder) -> Self {
        Self {
            prefix,
            builder,
            strip_prefix: true,
        }
    }

    /// Run the builder for a model this rule matched
    pub fn profile(&self, model: &str) -> Option<ModelProfile> {
        let name = if self.strip_prefix {
            model.get(self.prefix.len()..).unwrap_or(model)
        } else {
            model
        };
        (self.builder)(name)
    }
}

/// First rule whose prefix matches `model`, ignoring ASCII case
///
/// Rules are tried in order, so longer prefixes must come before shorter
/// ones they overlap with.
pub fn lookup_prefix<'r>(model: &str, rules: &'r [PrefixRule]) -> Option<&'r PrefixRule> {
    let lower = model.to_ascii_lowercase();
    rules.iter().find(|rule| lower.starts_with(rule.prefix))
}

/// An API serving models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Google,
    Groq,
    Together,
    Bedrock,
    Azure,
    Grok,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Self::OpenAi,
        Self::Google,
        Self::Groq,
        Self::Together,
        Self::Bedrock,
        Self::Azure,
        Self::Grok,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::Together => "together",
            Self::Bedrock => "bedrock",
            Self::Azure => "azure",
            Self::Grok => "grok",
        }
    }

    /// Profile of `model` as served by this provider
    ///
    /// `None` means nothing is known about the model and defaults apply.
    pub fn model_profile(self, model: &str) -> Option<ModelProfile> {
        let profile = match self {
            Self::OpenAi => openai_model_profile(model),
            Self::Google => google_model_profile(model),
            Self::Groq => gateways::groq_model_profile(model),
            Self::Together => gateways::together_model_profile(model),
            Self::Bedrock => gateways::bedrock_model_profile(model),
            Self::Azure => gateways::azure_model_profile(model),
            Self::Grok => gateways::grok_provider_profile(model),
        };

        debug!(
            provider = self.name(),
            model,
            transformer = ?profile.as_ref().and_then(|p| p.json_schema_transformer),
            "Resolved model profile"
        );
        profile
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "google" | "google-gla" | "google-vertex" => Ok(Self::Google),
            "groq" => Ok(Self::Groq),
            "together" => Ok(Self::Together),
            "bedrock" => Ok(Self::Bedrock),
            "azure" => Ok(Self::Azure),
            "grok" | "xai" => Ok(Self::Grok),
            other => Err(CompatError::ConfigurationError(format!(
                "Unknown provider: {other}"
            ))),
        }
    }
}
