//! Shared utilities for agent-rs
//!
//! This crate provides the ambient pieces shared across the workspace:
//! tracing subscriber setup and JSON configuration-file loading.

pub mod config;
pub mod logging;

pub use config::{ConfigError, load_json_file, user_config_path};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
