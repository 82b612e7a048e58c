//! Compat configuration
//!
//! Supports project-level (`.agent-compat.json`) and user-level
//! (`~/.config/agent-rs/compat.json`) configuration files with merge support.

use crate::error::{CompatError, Result};
use crate::profile::ModelProfile;
use crate::providers::Provider;
use crate::schema::DEFAULT_MAX_DEPTH;
use agent_utils::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// File name of the project-level config
pub const PROJECT_CONFIG_FILE: &str = ".agent-compat.json";

/// File name of the user-level config under `~/.config/agent-rs/`
pub const USER_CONFIG_FILE: &str = "compat.json";

/// Schema adaptation settings
///
/// # Example
///
/// ```json
/// {
///   "maxDepth": 64,
///   "strict": true,
///   "modelOverrides": {
///     "gpt-4o": {"openai": {"supportsSamplingSettings": false}},
///     "my-finetune": {"jsonSchemaTransformer": "inline_defs"}
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatConfig {
    /// Bound on schema nesting depth for every walk
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Strict mode used when the caller does not choose one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Per-model overlays applied on top of the provider's profile
    #[serde(default)]
    pub model_overrides: HashMap<String, ModelProfile>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            strict: None,
            model_overrides: HashMap::new(),
        }
    }
}

impl CompatConfig {
    /// Load configuration from a file
    ///
    /// ```no_run
    /// # use agent_compat::config::CompatConfig;
    /// let config = CompatConfig::from_file(".agent-compat.json")?;
    /// # Ok::<(), agent_compat::CompatError>(())
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = agent_utils::load_json_file(path)?;
        Ok(config)
    }

    /// Load merged configuration (user + project)
    ///
    /// Missing files are skipped; project-level settings take precedence. A
    /// file that exists but does not parse is an error.
    pub fn load_merged() -> Result<Self> {
        let mut config = skip_missing(Self::load_user_config())?.unwrap_or_default();

        if let Some(project_config) = skip_missing(Self::load_project_config())? {
            config.merge(project_config);
        }

        Ok(config)
    }

    /// Load user-level config from `~/.config/agent-rs/compat.json`
    pub fn load_user_config() -> Result<Self> {
        let path = agent_utils::user_config_path(USER_CONFIG_FILE)?;
        Self::from_file(path)
    }

    /// Load project-level config from `.agent-compat.json`
    pub fn load_project_config() -> Result<Self> {
        Self::from_file(PROJECT_CONFIG_FILE)
    }

    /// Merge another config into this one
    ///
    /// The `other` config's values take precedence. A `maxDepth` left at its
    /// default does not override.
    pub fn merge(&mut self, other: CompatConfig) {
        if other.max_depth != DEFAULT_MAX_DEPTH {
            self.max_depth = other.max_depth;
        }
        if other.strict.is_some() {
            self.strict = other.strict;
        }
        self.model_overrides.extend(other.model_overrides);
    }

    /// The provider's profile for `model` with any configured override applied
    pub fn resolve_profile(&self, provider: Provider, model: &str) -> ModelProfile {
        let profile = provider.model_profile(model).unwrap_or_default();
        match self.model_overrides.get(model) {
            Some(overrides) => {
                debug!(provider = provider.name(), model, "Applying configured profile override");
                profile.update(Some(overrides))
            }
            None => profile,
        }
    }

    /// Strict mode for a walk: the caller's choice, else the configured default
    pub fn strict_or(&self, strict: Option<bool>) -> Option<bool> {
        strict.or(self.strict)
    }
}

/// An unreadable or absent config file is no config at all
fn skip_missing(loaded: Result<CompatConfig>) -> Result<Option<CompatConfig>> {
    match loaded {
        Ok(config) => Ok(Some(config)),
        Err(CompatError::Config(ConfigError::Read { path, source })) => {
            debug!(path = %path.display(), error = %source, "Skipping config file");
            Ok(None)
        }
        Err(CompatError::Config(ConfigError::NoHomeDirectory)) => Ok(None),
        Err(err) => Err(err),
    }
}
