//! Provider compatibility layer for agent-rs
//!
//! This crate adapts provider-agnostic tool and output schemas to what each
//! LLM vendor accepts. It includes:
//!
//! - A JSON Schema walker with pluggable vendor policies (inline-only,
//!   Gemini's OpenAPI subset, OpenAI strict mode)
//! - Model capability profiles and their layering
//! - Per-provider profile lookup from model names
//! - Tool definition preparation for a given model
//! - File-based configuration with per-model overrides

pub mod config;
pub mod error;
pub mod profile;
pub mod providers;
pub mod schema;
pub mod tools;

// Re-export main types
pub use config::CompatConfig;
pub use error::{CompatError, Result};
pub use profile::{
    BedrockProfile, ModelProfile, OpenAiProfile, StructuredOutputMode, ToolResultFormat,
    TransformerKind,
};
pub use providers::Provider;
pub use schema::{JsonSchema, SchemaTransformer, Transformed, Walker, walk};
pub use tools::ToolDefinition;
