use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use genmedia_contracts::events::EventWriter;
use genmedia_contracts::models::{CapabilityLimits, CapabilityRegistry, MediaFamily};
use genmedia_contracts::requests::{Operation, ResolverDefaults, ToolArguments};
use genmedia_engine::{EngineError, RequestContext, RequestEngine};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

const MODELS_FILE_ENV: &str = "GENMEDIA_MODELS_FILE";
const REJECTED_EXIT_CODE: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "genmedia",
    version,
    about = "Resolve and validate generative media requests"
)]
struct Cli {
    /// Capability catalog to load instead of the built-in one.
    #[arg(long, global = true)]
    models: Option<PathBuf>,
    /// Default bucket for outputs, e.g. `my-bucket` or `gs://my-bucket/path`.
    #[arg(long, global = true)]
    bucket: Option<String>,
    /// Append JSONL outcome events to this file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the supported-models description for a family.
    Describe(DescribeArgs),
    /// Resolve a model name or alias to its capability record.
    Resolve(ResolveArgs),
    /// Validate tool arguments for an operation.
    Validate(ValidateArgs),
}

#[derive(Debug, Parser)]
struct DescribeArgs {
    family: MediaFamily,
}

#[derive(Debug, Parser)]
struct ResolveArgs {
    family: MediaFamily,
    name: String,
}

#[derive(Debug, Parser)]
struct ValidateArgs {
    operation: Operation,
    /// Tool arguments as a JSON object.
    #[arg(long, conflicts_with = "args_file")]
    args: Option<String>,
    #[arg(long)]
    args_file: Option<PathBuf>,
    /// Hand the validated descriptor to a backend (`dryrun` when no name is given).
    #[arg(long, num_args = 0..=1, default_missing_value = "dryrun")]
    dispatch: Option<String>,
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("genmedia error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let engine = build_engine(cli.models.as_deref(), cli.bucket.clone())?;
    match cli.command {
        Command::Describe(args) => {
            println!("{}", engine.describe(args.family));
            Ok(0)
        }
        Command::Resolve(args) => run_resolve(&engine, args),
        Command::Validate(args) => run_validate(&engine, cli.events.as_deref(), args),
    }
}

fn build_engine(models: Option<&Path>, bucket: Option<String>) -> Result<RequestEngine> {
    let models_path = models
        .map(Path::to_path_buf)
        .or_else(|| non_empty_env(MODELS_FILE_ENV).map(PathBuf::from));
    let registry = match models_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading model catalog");
            CapabilityRegistry::load(&path)
                .with_context(|| format!("failed to load model catalog {}", path.display()))?
        }
        None => CapabilityRegistry::builtin().context("built-in model catalog is invalid")?,
    };
    let defaults = ResolverDefaults::from_env().with_bucket(bucket);
    let engine = RequestEngine::new(Arc::new(registry), defaults)?;
    Ok(engine)
}

fn run_resolve(engine: &RequestEngine, args: ResolveArgs) -> Result<i32> {
    let Some(model) = engine.registry().resolve(args.family, &args.name) else {
        eprintln!(
            "model '{}' is not a valid or supported {} model name",
            args.name, args.family
        );
        return Ok(REJECTED_EXIT_CODE);
    };
    let limits = match &model.limits {
        CapabilityLimits::Image { output_sizes, .. } => json!({
            "output_sizes": output_sizes,
        }),
        CapabilityLimits::Video {
            durations,
            default_duration,
            reference_roles,
            ..
        } => json!({
            "durations": durations,
            "default_duration": default_duration,
            "reference_roles": reference_roles,
        }),
        CapabilityLimits::Multimodal { description } => json!({
            "description": description,
        }),
    };
    let mut out = json!({
        "family": model.family(),
        "canonical_id": model.canonical_id,
        "aliases": model.aliases,
        "max_outputs": model.max_outputs(),
        "aspect_ratios": model.aspect_ratios(),
        "features": model.features,
    });
    if let (Some(out), Some(limits)) = (out.as_object_mut(), limits.as_object()) {
        out.extend(limits.clone());
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(0)
}

fn run_validate(engine: &RequestEngine, events: Option<&Path>, args: ValidateArgs) -> Result<i32> {
    let raw = match (&args.args, &args.args_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => "{}".to_string(),
    };
    let tool_args = parse_tool_arguments(&raw)?;
    let events = events.map(|path| EventWriter::new(path, uuid::Uuid::new_v4().to_string()));
    let ctx = RequestContext::new();

    let outcome = match args.dispatch.as_deref() {
        Some(backend) => engine
            .dispatch(&ctx, args.operation, &tool_args, backend)
            .map(|(descriptor, receipt)| (descriptor, Some(receipt))),
        None => engine
            .prepare(&ctx, args.operation, &tool_args)
            .map(|descriptor| (descriptor, None)),
    };

    match outcome {
        Ok((descriptor, receipt)) => {
            let out = match receipt {
                Some(receipt) => json!({
                    "descriptor": descriptor,
                    "receipt": {
                        "backend": receipt.backend,
                        "request": receipt.request,
                        "response": receipt.response,
                        "warnings": receipt.warnings,
                    },
                }),
                None => serde_json::to_value(&descriptor)?,
            };
            if let Some(events) = &events {
                events.emit_outcome(args.operation, &Ok(descriptor))?;
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(0)
        }
        Err(EngineError::Rejected(err)) => {
            let mut out = json!({ "error": err.to_string() });
            if let Some(field) = err.field() {
                out["field"] = Value::String(field.to_string());
            }
            if let Some(events) = &events {
                events.emit_outcome(args.operation, &Err(err))?;
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(REJECTED_EXIT_CODE)
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_tool_arguments(raw: &str) -> Result<ToolArguments> {
    let value: Value = serde_json::from_str(raw).context("tool arguments are not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ToolArguments::new()),
        other => bail!("tool arguments must be a JSON object, got {other}"),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
