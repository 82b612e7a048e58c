//! Command-line interface for agent-rs
//!
//! Rewrites JSON schemas into a provider's dialect and prints resolved model
//! profiles, using the merged compat configuration.

use agent_compat::{CompatConfig, JsonSchema, ModelProfile, Provider, TransformerKind};
use agent_utils::LogFormat;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "Adapt JSON schemas and inspect model profiles for agent-rs", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the merged user and project config
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite a JSON schema for a provider's model
    Transform(TransformArgs),
    /// Print the resolved profile of a provider's model
    Profile(ModelArgs),
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Provider serving the model (openai, google, groq, together, bedrock, azure, grok)
    #[arg(long, value_name = "PROVIDER")]
    provider: Provider,

    /// Model name as the provider knows it
    #[arg(long, value_name = "MODEL")]
    model: String,
}

#[derive(Args, Debug)]
struct TransformArgs {
    #[command(flatten)]
    target: ModelArgs,

    /// Use this schema transformer instead of the profile's (inline, google, openai)
    #[arg(long, value_name = "KIND")]
    transformer: Option<TransformerKind>,

    /// Force strict mode on or off; detected when omitted
    #[arg(long, value_name = "BOOL")]
    strict: Option<bool>,

    /// Schema file; stdin when omitted or `-`
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    let level = if cli.verbose { "debug" } else { "info" };
    agent_utils::init_tracing_with(level, format);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Transform(args) => transform(&config, &args),
        Command::Profile(args) => profile(&config, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<CompatConfig> {
    match path {
        Some(path) => CompatConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => CompatConfig::load_merged().context("Failed to load config"),
    }
}

fn resolve_profile(
    config: &CompatConfig,
    target: &ModelArgs,
    transformer: Option<TransformerKind>,
) -> ModelProfile {
    let mut profile = config.resolve_profile(target.provider, &target.model);
    if transformer.is_some() {
        profile.json_schema_transformer = transformer;
    }
    profile
}

fn transform(config: &CompatConfig, args: &TransformArgs) -> Result<()> {
    let schema = read_schema(args.input.as_deref())?;
    let profile = resolve_profile(config, &args.target, args.transformer);
    let strict = config.strict_or(args.strict);

    let transformed = profile
        .transform_schema(&schema, strict, config.max_depth)
        .context("Failed to transform schema")?;

    info!(
        provider = %args.target.provider,
        model = %args.target.model,
        transformer = ?profile.json_schema_transformer,
        ?strict,
        is_strict_compatible = transformed.is_strict_compatible,
        warnings = transformed.warnings.len(),
        "Schema transformed"
    );

    println!("{}", serde_json::to_string_pretty(&transformed.into_value())?);
    Ok(())
}

fn profile(config: &CompatConfig, args: &ModelArgs) -> Result<()> {
    let profile = resolve_profile(config, args, None);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn read_schema(path: Option<&Path>) -> Result<JsonSchema> {
    let content = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema from {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read schema from stdin")?;
            buf
        }
    };
    parse_schema(&content)
}

fn parse_schema(content: &str) -> Result<JsonSchema> {
    match serde_json::from_str::<Value>(content).context("Schema is not valid JSON")? {
        Value::Object(schema) => Ok(schema),
        _ => bail!("Schema must be a JSON object"),
    }
}
