// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Graph command - visualize the pipeline's action dependencies

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::manifest::Manifest;
use crate::pipeline::{ActionGraph, PipelineBuilder};

/// Run the graph command
pub async fn run(manifest_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    if !manifest_path.exists() {
        return Err(miette::miette!(
            "Manifest file not found: {}",
            manifest_path.display()
        ));
    }

    let manifest = Manifest::from_file(&manifest_path)?;
    let pipeline = PipelineBuilder::build(&manifest)?;
    let graph = ActionGraph::build(&pipeline)?;

    let output = match format {
        GraphFormat::Text => graph.to_text(&pipeline),
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Mermaid => graph.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
