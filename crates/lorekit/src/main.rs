// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! lorekit - keyword-triggered prompt templates with session-scoped
//! activation.
//!
//! This is the binary entry point. The engine itself is a library; this
//! binary offers a config doctor and an interactive shell for exercising
//! template definitions before wiring them into a host pipeline.

mod check;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// lorekit - keyword-triggered prompt templates with session-scoped activation.
#[derive(Parser, Debug)]
#[command(name = "lorekit", version, about, long_about = None)]
struct Cli {
    /// Explicit config file path (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and report the compiled registry.
    Check,
    /// Launch an interactive session against the loaded templates.
    Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lorekit_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Check) | None => check::run_check(&config),
        Some(Commands::Shell) => shell::run_shell(config).await,
    };

    if let Err(e) = result {
        eprintln!("lorekit: {e}");
        std::process::exit(1);
    }
}

fn load(
    path: Option<&std::path::Path>,
) -> Result<lorekit_config::LorekitConfig, Vec<lorekit_config::ConfigError>> {
    match path {
        Some(path) => lorekit_config::load_and_validate_path(path),
        None => lorekit_config::load_and_validate(),
    }
}
