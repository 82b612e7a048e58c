//! Error types for schema transformation and profile resolution

use thiserror::Error;

/// Result type for compat operations
pub type Result<T> = std::result::Result<T, CompatError>;

/// Errors that can occur while adapting schemas or resolving profiles
#[derive(Error, Debug)]
pub enum CompatError {
    /// A `$ref` could not be resolved against `$defs` during inlining
    #[error("Could not find $ref definition for {0}")]
    UnresolvableReference(String),

    /// The target dialect cannot express something left in the schema
    #[error("Unsupported schema feature: {0}")]
    UnsupportedFeature(String),

    /// Schema nesting went past the configured recursion bound
    #[error("Schema nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),

    /// The input is not a usable JSON schema
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Config file could not be loaded
    #[error(transparent)]
    Config(#[from] agent_utils::ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
