//! Toolgate CLI - inspect operation catalogs offline
//!
//! Operation definitions are read from a JSON file holding an array of
//! definitions. The commands show what a gateway built from them would expose.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolgate_core::config::GatewayConfig;
use toolgate_core::gateway::ToolGateway;
use toolgate_core::invocation::InvocationHandler;
use toolgate_core::operation::{OperationDefinition, OperationRegistry};
use toolgate_core::policy::AllowList;
use toolgate_core::schema::InputValidator;

#[derive(Parser)]
#[command(name = "toolgate")]
#[command(about = "Inspect the MCP tools a toolgate deployment exposes", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to toolgate.toml and TOOLGATE_* variables)
    #[arg(short, long, global = true, env = "TOOLGATE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Ignore the provider allow-list
    #[arg(long, global = true)]
    include_all: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tools/list payload for a definitions file
    Schema {
        /// JSON file with an array of operation definitions
        #[arg(short, long)]
        definitions: PathBuf,
    },
    /// Search the exposed tools
    Discover {
        #[arg(short, long)]
        definitions: PathBuf,

        /// Substring filter over name, label and description
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Validate an argument set against a tool's input schema
    Validate {
        #[arg(short, long)]
        definitions: PathBuf,

        /// Tool name (wire name or operation id)
        #[arg(short, long)]
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
    /// Print the effective configuration
    Config,
    /// Version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::load()?,
    };
    if cli.include_all {
        config.access.include_all_tools = true;
    }

    toolgate_core::logging::init(&config.logging)?;

    match cli.command {
        Commands::Version => {
            println!("toolgate {}", env!("CARGO_PKG_VERSION"));
            println!("toolgate-core {}", toolgate_core::VERSION);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Schema { definitions } => {
            let handler = handler(&definitions, &config)?;
            let tools = serde_json::to_value(handler.list_tools())?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "tools": tools }))?);
        }
        Commands::Discover { definitions, query } => {
            let gateway = ToolGateway::new(handler(&definitions, &config)?);
            println!("{}", gateway.discover(query.as_deref()).text_content());
        }
        Commands::Validate {
            definitions,
            tool,
            args,
        } => {
            let handler = handler(&definitions, &config)?;
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            if !arguments.is_object() {
                bail!("--args must be a JSON object");
            }

            let entry = handler.resolve(&tool)?;
            let validator = InputValidator::new(config.validation.max_errors);
            let report = validator.validate(entry.definition(), &arguments);

            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Build a handler over definitions loaded from `path`.
///
/// The operations have no implementation here; calling one reports an
/// instantiation failure.
fn handler(path: &Path, config: &GatewayConfig) -> Result<InvocationHandler> {
    let registry = load_registry(path)?;
    tracing::debug!(
        path = %path.display(),
        operation_count = registry.len(),
        "Loaded operation definitions"
    );

    Ok(InvocationHandler::new(
        Arc::new(registry),
        AllowList::from_config(&config.access),
    ))
}

fn load_registry(path: &Path) -> Result<OperationRegistry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let definitions: Vec<OperationDefinition> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse operation definitions in {}", path.display()))?;

    let mut registry = OperationRegistry::new();
    for definition in definitions {
        registry.register(definition, || {
            bail!("operation has no implementation in the CLI")
        })?;
    }
    Ok(registry)
}
