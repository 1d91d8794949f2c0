// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Run command - simulate a full pipeline run
//!
//! Executes the pipeline against the in-process simulated runner. The gate
//! decision comes from the command line and is applied from a separate
//! task once the run has started, so the park/resume path is the one a
//! live operator would take.

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::Decision;
use crate::exec::{PipelineRunner, RunOptions, SimulatedRunner};
use crate::manifest::Manifest;
use crate::pipeline::{PipelineBuilder, PipelineValidator};

/// Run the run command
pub async fn run(
    manifest_path: PathBuf,
    decision: Decision,
    fail: Option<String>,
    verbose: bool,
) -> Result<()> {
    if !manifest_path.exists() {
        return Err(miette::miette!(
            "Manifest file not found: {}\n\n\
             Create a shipway.yaml describing your service and environments.",
            manifest_path.display()
        ));
    }

    let manifest = Manifest::from_file(&manifest_path)?;
    let pipeline = PipelineBuilder::build(&manifest)?;

    let validation = PipelineValidator::validate(&pipeline);
    if !validation.is_valid() {
        eprintln!("{}", "Pipeline validation failed:".red().bold());
        for error in &validation.errors {
            eprintln!("  {} {}", "✗".red(), error);
        }
        return Err(miette::miette!("Pipeline configuration is invalid"));
    }

    let mut simulated = SimulatedRunner::new();
    if let Some(action) = &fail {
        simulated = simulated.fail_action(action);
    }

    let executor = PipelineRunner::new(Arc::new(simulated));

    // Operator stand-in: settle the gate shortly after the run parks.
    let gate = executor.gate();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = match decision {
            Decision::Approve => gate.approve().await,
            Decision::Reject => gate.reject().await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "gate decision not applied");
        }
    });

    println!();
    println!("{}: {}", "Pipeline".bold(), pipeline.name);
    println!("{}", "═".repeat(50));

    let report = match executor.execute(&pipeline, &RunOptions::default()).await {
        Ok(report) => report,
        Err(e) => {
            println!();
            println!("{}", "Pipeline run halted".red().bold());
            return Err(e.into());
        }
    };

    for stage in &report.executed_stages {
        println!("  {} {}", "✓".green(), stage);
    }

    if verbose {
        println!();
        println!("{}:", "Actions".bold());
        for (name, detail) in &report.action_details {
            println!("  - {}: {}", name.bold(), detail.dimmed());
        }
    }

    if !report.artifacts.is_empty() {
        println!();
        println!("{}:", "Artifacts".bold());
        for (name, location) in &report.artifacts {
            println!("  - {} @ {}", name, location.to_string().dimmed());
        }
    }

    println!();
    println!(
        "{}",
        format!(
            "Pipeline completed successfully in {:.2}s (run {})",
            report.duration.as_secs_f64(),
            report.run_id
        )
        .green()
    );

    Ok(())
}
