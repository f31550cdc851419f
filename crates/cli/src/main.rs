mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// idconverge - converge a node to a deployed identity service
#[derive(Parser)]
#[command(name = "idconverge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text", global = true)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

/// Where resources live and which templates render them.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
  /// Prefix for every managed path (default: $IDCONVERGE_ROOT or /)
  #[arg(long)]
  pub root: Option<PathBuf>,

  /// Directory whose files override the built-in templates by name
  #[arg(long)]
  pub templates: Option<PathBuf>,
}

/// How resources are converged.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
  #[command(flatten)]
  pub target: TargetArgs,

  /// Kill commands that run longer than this (e.g. "30s", "10m")
  #[arg(long, value_parser = humantime::parse_duration)]
  pub command_timeout: Option<Duration>,
}

#[derive(Subcommand)]
enum Commands {
  /// Converge this node
  Apply {
    /// Node file (.json, .yaml or .yml)
    node_file: PathBuf,

    #[command(flatten)]
    run: RunArgs,

    /// Record generated PKI material in the node file after a successful run
    #[arg(long)]
    publish: bool,
  },

  /// Show what apply would change without touching the system
  Plan {
    /// Node file (.json, .yaml or .yml)
    node_file: PathBuf,

    #[command(flatten)]
    run: RunArgs,
  },

  /// Print rendered templates to stdout
  Render {
    /// Node file (.json, .yaml or .yml)
    node_file: PathBuf,

    /// Render only this template (default: all)
    #[arg(short, long)]
    template: Option<String>,

    #[command(flatten)]
    target: TargetArgs,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Apply {
      node_file,
      run,
      publish,
    } => cmd::cmd_apply(&node_file, &run, publish, cli.verbose, cli.output),
    Commands::Plan { node_file, run } => cmd::cmd_plan(&node_file, &run, cli.verbose, cli.output),
    Commands::Render {
      node_file,
      template,
      target,
    } => cmd::cmd_render(&node_file, template.as_deref(), &target, cli.output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
