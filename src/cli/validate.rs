// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Validate command - check the manifest and assembled pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::manifest::Manifest;
use crate::pipeline::{PipelineBuilder, PipelineValidator};

/// Run the validate command
pub async fn run(manifest_path: PathBuf, verbose: bool) -> Result<()> {
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

    if validation.has_warnings() {
        eprintln!("{}", "Pipeline warnings:".yellow().bold());
        for warning in &validation.warnings {
            eprintln!("  {} {}", "⚠".yellow(), warning);
        }
        eprintln!();
    }

    println!(
        "  {} {} ({} stages, {} actions)",
        "✓".green(),
        pipeline.name.bold(),
        pipeline.stages.len(),
        pipeline.actions().count()
    );

    if verbose {
        for stage in &pipeline.stages {
            println!("    - {} ({} actions)", stage.name, stage.actions.len());
        }
    }

    Ok(())
}
