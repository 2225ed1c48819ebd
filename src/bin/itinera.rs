//! Itinera CLI Binary
//!
//! Command-line interface for the itinera generation pipeline.

use anyhow::Context;
use clap::Parser;
use itinera::cli::{exit_code, map_error, Cli, CommandError, OutputFormat, RunContext};
use itinera::config::ConfigLoader;
use itinera::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Itinera CLI starting");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(run(&cli));

    match result {
        Ok(output) => {
            info!("Command completed successfully");
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            let rendered = map_error(&e, cli.format);
            match (&e, cli.format) {
                (CommandError::Generation(_), OutputFormat::Json) => {
                    println!("{}", rendered)
                }
                _ => eprintln!("{}", rendered),
            }
            process::exit(exit_code(&e));
        }
    }
}

async fn run(cli: &Cli) -> Result<String, CommandError> {
    let context = RunContext::new(
        cli.workspace.clone(),
        cli.config.clone(),
        cli.format,
        cli.retries,
    )?;
    info!("CLI context initialized");
    context.execute(&cli.command).await
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
