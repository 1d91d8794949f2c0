// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Pipeline validation
//!
//! Validates an assembled pipeline before execution. The builder already
//! refuses to construct an invalid topology; this validator exists for
//! pipelines arriving from serialized form, and to report every finding at
//! once instead of stopping at the first.

use std::collections::HashSet;

use crate::errors::ShipwayError;
use crate::pipeline::{ActionGraph, ActionKind, Pipeline, Stage};

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline, collecting all errors and warnings
    pub fn validate(pipeline: &Pipeline) -> ValidationResult {
        let mut result = ValidationResult::new();

        if pipeline.stages.is_empty() {
            result.add_error("Pipeline has no stages defined");
        }

        let mut seen_stages = HashSet::new();
        for stage in &pipeline.stages {
            if !seen_stages.insert(&stage.name) {
                result.add_error(&format!("Duplicate stage name: '{}'", stage.name));
            }

            let mut seen_actions = HashSet::new();
            for action in &stage.actions {
                if !seen_actions.insert(&action.name) {
                    result.add_error(&format!(
                        "Stage '{}': duplicate action name '{}'",
                        stage.name, action.name
                    ));
                }
            }
        }

        // Artifact invariants (single producer, no forward references, no
        // cycles) come from the graph build.
        match ActionGraph::build(pipeline) {
            Ok(_) => {}
            Err(ShipwayError::ArtifactCollision {
                artifact,
                first,
                second,
            }) => {
                result.add_error(&format!(
                    "Artifact '{}' produced by both '{}' and '{}'",
                    artifact, first, second
                ));
            }
            Err(ShipwayError::UnknownArtifact { action, artifact }) => {
                result.add_error(&format!(
                    "Action '{}' consumes unknown artifact '{}'",
                    action, artifact
                ));
            }
            Err(ShipwayError::ForwardReference {
                action, artifact, ..
            }) => {
                result.add_error(&format!(
                    "Action '{}' consumes artifact '{}' before it is produced",
                    action, artifact
                ));
            }
            Err(ShipwayError::CircularDependency { actions }) => {
                result.add_error(&format!(
                    "Circular artifact dependency involving: {}",
                    actions.join(", ")
                ));
            }
            Err(e) => {
                result.add_error(&format!("Graph validation error: {}", e));
            }
        }

        let mut synth_seen = false;
        for stage in &pipeline.stages {
            Self::validate_stage(stage, synth_seen, &mut result);
            synth_seen = synth_seen
                || stage
                    .actions
                    .iter()
                    .any(|a| matches!(a.config, crate::pipeline::ActionConfig::Synth { .. }));
        }

        result
    }

    fn validate_stage(stage: &Stage, synth_seen: bool, result: &mut ValidationResult) {
        for action in &stage.actions {
            match action.kind() {
                ActionKind::Approval => {
                    if !action.inputs.is_empty() || !action.outputs.is_empty() {
                        result.add_error(&format!(
                            "Stage '{}': approval action '{}' must not carry artifacts",
                            stage.name, action.name
                        ));
                    }

                    // A gate sharing its run-order group would race the
                    // actions it is supposed to guard.
                    let sharing = stage
                        .actions
                        .iter()
                        .filter(|a| a.run_order == action.run_order)
                        .count();
                    if sharing > 1 {
                        result.add_warning(&format!(
                            "Stage '{}': approval action '{}' shares run-order {} with other actions",
                            stage.name, action.name, action.run_order
                        ));
                    }
                }
                ActionKind::Deploy => {
                    if !synth_seen {
                        result.add_error(&format!(
                            "Stage '{}': deploy action '{}' appears before any synthesis stage",
                            stage.name, action.name
                        ));
                    }
                }
                ActionKind::Source | ActionKind::Build => {}
            }
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
