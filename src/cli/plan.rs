// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Plan command - print the promotion plan stage by stage

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::manifest::Manifest;
use crate::pipeline::{ActionConfig, ArtifactName, PipelineBuilder};

/// Run the plan command
pub async fn run(manifest_path: PathBuf, _verbose: bool) -> Result<()> {
    if !manifest_path.exists() {
        return Err(miette::miette!(
            "Manifest file not found: {}",
            manifest_path.display()
        ));
    }

    let manifest = Manifest::from_file(&manifest_path)?;
    let pipeline = PipelineBuilder::build(&manifest)?;

    println!();
    println!("{}: {}", "Pipeline".bold(), pipeline.name);
    println!("{}", "═".repeat(50));
    println!("Promotion plan ({} stages):", pipeline.stages.len());
    println!();

    for (i, stage) in pipeline.stages.iter().enumerate() {
        println!("  {}. {}", i + 1, stage.name.bold());

        for (run_order, actions) in stage.run_order_groups() {
            for action in actions {
                print!("     [{}] {} ({})", run_order, action.name, action.kind());

                if !action.inputs.is_empty() {
                    let inputs: Vec<_> = action.inputs.iter().map(ArtifactName::as_str).collect();
                    print!(" {}", format!("← {}", inputs.join(", ")).dimmed());
                }
                if !action.outputs.is_empty() {
                    let outputs: Vec<_> = action.outputs.iter().map(ArtifactName::as_str).collect();
                    print!(" {}", format!("→ {}", outputs.join(", ")).dimmed());
                }

                if let ActionConfig::Approval { prompt, .. } = &action.config {
                    print!(" {}", format!("\"{}\"", prompt).yellow());
                }

                println!();
            }
        }
    }

    println!();

    Ok(())
}
