//! MTA CLI - Main Entry Point
//!
//! Resolves the runtime properties of a module declared in an `mta.yaml`
//! descriptor and prints them as environment entries or JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mta_application::{ResolveModule, ResolveModuleInput, ResolveModuleOutput};
use mta_infrastructure::{FileDescriptorLoader, ProcessEnvironment, to_json_stable};

#[derive(Parser)]
#[command(name = "mta", version, about = "MTA descriptor tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the runtime properties of a module
    Resolve(ResolveArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Name of the module to resolve
    #[arg(short, long)]
    module: String,

    /// Path of the mta.yaml descriptor
    #[arg(short, long, default_value = "mta.yaml")]
    path: PathBuf,

    /// Extension descriptors to merge, comma separated
    #[arg(short, long, value_delimiter = ',')]
    extensions: Vec<PathBuf>,

    /// Project directory (defaults to the descriptor's directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Environment file, relative to the module directory or absolute
    #[arg(long)]
    env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Env)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `KEY=VALUE` line per property
    #[default]
    Env,
    /// A JSON object
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Resolve(args) => resolve(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn resolve(args: &ResolveArgs) -> Result<()> {
    let input = ResolveModuleInput {
        working_dir: args.workspace.clone(),
        module_name: args.module.clone(),
        descriptor_path: args.path.clone(),
        extension_paths: args.extensions.clone(),
        env_file: args.env.clone(),
    };
    debug!(?input, "resolving module");

    let use_case = ResolveModule::new(FileDescriptorLoader::new(), ProcessEnvironment::new());
    let output = use_case
        .execute(&input)
        .with_context(|| format!("failed to resolve module \"{}\"", args.module))?;

    for message in &output.messages {
        warn!("{message}");
    }

    print!("{}", render(&output, args.output)?);
    Ok(())
}

fn render(output: &ResolveModuleOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Env => Ok(output
            .properties
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect()),
        OutputFormat::Json => Ok(to_json_stable(&output.properties)?),
    }
}
