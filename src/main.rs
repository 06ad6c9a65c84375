//! CLI for flopscope: analyze, render.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flopscope::{
    load_config, parse_input_shape, render_report, BatchRunner, ModelRegistry, RenderContext,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "flopscope")]
#[command(about = "Parameter and FLOP analysis for named model architectures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze configured models and write a JSON report
    Analyze {
        /// Path to the YAML configuration file
        #[arg(long)]
        config: PathBuf,
        /// Path to the output JSON file
        #[arg(long, default_value = "model_analysis.json")]
        output: PathBuf,
        /// Input shape as comma-separated values (N,C,H,W)
        #[arg(long, default_value = flopscope::config::DEFAULT_INPUT_SHAPE)]
        input_shape: String,
    },

    /// Render charts from a previously written report
    Render,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            config,
            output,
            input_shape,
        } => run_analyze(&config, &output, &input_shape)?,
        Commands::Render => run_render()?,
    }
    Ok(())
}

fn run_analyze(config_path: &Path, output: &Path, input_shape: &str) -> Result<()> {
    let shape = parse_input_shape(input_shape)?;
    let config = load_config(config_path)?;
    info!(config = %config_path.display(), shape = ?shape, "loaded configuration");

    let registry = ModelRegistry::builtin();
    let runner = BatchRunner::new(&registry, config.estimator.build());
    runner.run_to_file(&config, &shape, output)?;
    Ok(())
}

fn run_render() -> Result<()> {
    let ctx = RenderContext::new();
    render_report(Path::new(flopscope::render::REPORT_PATH), &ctx)?;
    Ok(())
}
