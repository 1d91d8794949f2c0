// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! shipway - Deployment Promotion Pipeline Orchestrator
//!
//! Build, inspect, and simulate approval-gated promotion pipelines.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shipway::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Validate { manifest } => shipway::cli::validate::run(manifest, cli.verbose).await,
        Commands::Plan { manifest } => shipway::cli::plan::run(manifest, cli.verbose).await,
        Commands::Graph { manifest, format } => {
            shipway::cli::graph::run(manifest, format, cli.verbose).await
        }
        Commands::Run {
            manifest,
            decision,
            fail,
        } => shipway::cli::run::run(manifest, decision, fail, cli.verbose).await,
    }
}
