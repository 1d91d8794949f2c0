// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for shipway.

pub mod graph;
pub mod plan;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deployment promotion pipeline orchestrator
///
/// Build, inspect, and simulate an approval-gated promotion pipeline from
/// a shipway.yaml manifest.
#[derive(Parser, Debug)]
#[clap(
    name = "shipway",
    version,
    about = "Approval-gated multi-environment deployment pipeline orchestrator",
    long_about = None,
    after_help = "Examples:\n\
        shipway validate                Validate the manifest and pipeline\n\
        shipway plan                    Show the promotion plan\n\
        shipway graph --format dot      Render the action dependency graph\n\
        shipway run --decision approve  Simulate a full promotion\n\n\
        See 'shipway <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the manifest and the pipeline built from it
    Validate {
        /// Manifest file to validate
        #[clap(default_value = "shipway.yaml")]
        manifest: PathBuf,
    },

    /// Show the promotion plan stage by stage
    Plan {
        /// Manifest file
        #[clap(default_value = "shipway.yaml")]
        manifest: PathBuf,
    },

    /// Render the action dependency graph
    Graph {
        /// Manifest file
        #[clap(default_value = "shipway.yaml")]
        manifest: PathBuf,

        /// Output format
        #[clap(short, long, value_enum, default_value = "text")]
        format: GraphFormat,
    },

    /// Simulate a full pipeline run
    Run {
        /// Manifest file
        #[clap(short, long, default_value = "shipway.yaml")]
        manifest: PathBuf,

        /// Operator decision applied at the promotion gate
        #[clap(short, long, value_enum, default_value = "approve")]
        decision: Decision,

        /// Inject a failure into the named action
        #[clap(long, value_name = "ACTION")]
        fail: Option<String>,
    },
}

/// Graph output format
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

/// Gate decision supplied on the command line
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}
