use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::Level;

use stacksmith_engine::executor::{NoopRunner, ShellRunner, SystemShellRunner};
use stacksmith_engine::ops::OperationRegistry;
use stacksmith_engine::validate;

/// Full-stack starter scaffolder: MCP server plus an offline test runner.
#[derive(Parser)]
#[command(name = "stacksmith", version, about = "Full-stack starter scaffolder")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the tool surface over stdio for MCP clients.
    Serve,
    /// Dispatch one operation directly, printing the report to stdout.
    Run {
        /// Operation name, for example create_project or add_linting.
        operation: String,
        /// JSON object with the operation parameters.
        #[arg(long, default_value = "{}")]
        params: String,
        /// Record external commands without executing them.
        #[arg(long)]
        dry_run: bool,
    },
    /// List registered operations with their parameter schemas.
    Operations,
    /// Remove a previously scaffolded target directory.
    Cleanup {
        /// Directory to delete recursively.
        target: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Serve => stacksmith_mcp::serve_stdio(Arc::new(SystemShellRunner)).await,
        CliCommand::Run {
            operation,
            params,
            dry_run,
        } => run_operation(&operation, &params, dry_run).await,
        CliCommand::Operations => list_operations(),
        CliCommand::Cleanup { target } => cleanup(&target),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    // Logs go to stderr; stdout carries the MCP channel under `serve`.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_operation(operation: &str, params: &str, dry_run: bool) -> Result<()> {
    let raw: serde_json::Value = serde_json::from_str(params).context("parsing --params as JSON")?;
    let runner: Arc<dyn ShellRunner> = if dry_run {
        Arc::new(NoopRunner)
    } else {
        Arc::new(SystemShellRunner)
    };
    let registry = OperationRegistry::standard();
    let outcome = registry.dispatch(operation, raw, runner).await;
    println!("{}", outcome.content);
    if outcome.is_error {
        bail!("operation '{operation}' failed");
    }
    Ok(())
}

fn list_operations() -> Result<()> {
    let registry = OperationRegistry::standard();
    for operation in registry.operations() {
        println!("{}\n  {}", operation.name, operation.description);
        let schema = serde_json::to_string(operation.schema())?;
        println!("  schema: {schema}");
    }
    Ok(())
}

fn cleanup(target: &Path) -> Result<()> {
    if !target.exists() {
        println!("nothing to clean at {}", target.display());
        return Ok(());
    }
    // Guard against deleting directories this tool never touched.
    if !validate::looks_scaffolded(target) {
        bail!(
            "refusing to delete {}: it does not look like a scaffolded project",
            target.display()
        );
    }
    std::fs::remove_dir_all(target).with_context(|| format!("removing {}", target.display()))?;
    println!("removed {}", target.display());
    Ok(())
}
