// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Pipeline runner
//!
//! Executes a pipeline stage by stage. Stages never overlap; within a
//! stage, actions sharing a run-order run concurrently and the next
//! run-order group starts only once the whole current group has succeeded.
//! Artifacts become visible to consumers only after the producing stage
//! (or, within a stage, the producing run-order group) completes. A single
//! action failure halts the stage and the pipeline; cancellation is
//! drop-based and already-produced artifacts are not rolled back.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{ShipwayError, ShipwayResult};
use crate::exec::{ActionContext, ActionOutcome, ActionRunner};
use crate::gate::{GateState, PromotionGate};
use crate::pipeline::{Action, ActionGraph, ActionKind, ArtifactLocation, ArtifactName, Pipeline};

/// Options for a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Run identifier; generated from the wall clock when absent
    pub run_id: Option<String>,
}

/// Result of executing a pipeline
#[derive(Debug)]
pub struct RunReport {
    /// Identifier of this run
    pub run_id: String,

    /// Stages that ran to completion, in order
    pub executed_stages: Vec<String>,

    /// Per-action detail lines, in completion order
    pub action_details: Vec<(String, String)>,

    /// Storage locations of every produced artifact
    pub artifacts: BTreeMap<ArtifactName, ArtifactLocation>,

    /// Terminal gate state, if the run reached the gate
    pub gate: Option<GateState>,

    /// Total execution time
    pub duration: Duration,
}

/// Stage-sequential, run-order-concurrent pipeline executor
pub struct PipelineRunner {
    runner: Arc<dyn ActionRunner>,
    gate: Arc<PromotionGate>,
}

impl PipelineRunner {
    /// Create a runner with a fresh promotion gate
    pub fn new(runner: Arc<dyn ActionRunner>) -> Self {
        Self {
            runner,
            gate: Arc::new(PromotionGate::new()),
        }
    }

    /// Use an externally shared gate (so an operator task can decide it)
    pub fn with_gate(mut self, gate: Arc<PromotionGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Handle to this run's promotion gate
    pub fn gate(&self) -> Arc<PromotionGate> {
        Arc::clone(&self.gate)
    }

    /// Execute a pipeline to completion, the gate, or the first failure
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        options: &RunOptions,
    ) -> ShipwayResult<RunReport> {
        // Refuse to run a structurally invalid pipeline.
        ActionGraph::build(pipeline)?;

        let start = Instant::now();
        let run_id = options.run_id.clone().unwrap_or_else(generate_run_id);

        let mut artifacts: BTreeMap<ArtifactName, ArtifactLocation> = BTreeMap::new();
        let mut executed_stages = Vec::new();
        let mut action_details = Vec::new();
        let mut gate_outcome = None;

        info!(pipeline = %pipeline.name, run_id = %run_id, "starting pipeline run");

        for stage in &pipeline.stages {
            debug!(stage = %stage.name, "starting stage");

            // Outputs stay stage-local until the barrier: later run-order
            // groups of this stage see them, later stages see them only
            // once the whole stage has completed.
            let mut stage_outputs: BTreeMap<ArtifactName, ArtifactLocation> = BTreeMap::new();

            for (run_order, group) in stage.run_order_groups() {
                let (gates, work): (Vec<&Action>, Vec<&Action>) = group
                    .into_iter()
                    .partition(|a| a.kind() == ActionKind::Approval);

                if !work.is_empty() {
                    let outcomes = self
                        .run_group(&stage.name, &run_id, run_order, &work, &artifacts, &stage_outputs)
                        .await?;

                    for (action_name, outcome) in outcomes {
                        for (name, location) in outcome.outputs {
                            stage_outputs.insert(name, location);
                        }
                        action_details.push((action_name, outcome.detail));
                    }
                }

                for gate_action in gates {
                    gate_outcome = Some(self.hold_gate(&stage.name, gate_action).await?);
                }
            }

            artifacts.extend(stage_outputs);
            executed_stages.push(stage.name.clone());
            info!(stage = %stage.name, "stage complete");
        }

        let duration = start.elapsed();
        info!(
            pipeline = %pipeline.name,
            stages = executed_stages.len(),
            elapsed = ?duration,
            "pipeline run complete"
        );

        Ok(RunReport {
            run_id,
            executed_stages,
            action_details,
            artifacts,
            gate: gate_outcome,
            duration,
        })
    }

    /// Run one run-order group concurrently; all must succeed
    async fn run_group(
        &self,
        stage: &str,
        run_id: &str,
        run_order: u32,
        actions: &[&Action],
        artifacts: &BTreeMap<ArtifactName, ArtifactLocation>,
        stage_outputs: &BTreeMap<ArtifactName, ArtifactLocation>,
    ) -> ShipwayResult<Vec<(String, ActionOutcome)>> {
        debug!(stage, run_order, actions = actions.len(), "starting run-order group");

        let mut set: JoinSet<(String, ShipwayResult<ActionOutcome>)> = JoinSet::new();

        for &action in actions {
            let ctx = ActionContext {
                stage: stage.to_string(),
                run_id: run_id.to_string(),
                inputs: resolve_inputs(action, artifacts, stage_outputs)?,
            };
            let runner = Arc::clone(&self.runner);
            let action = action.clone();

            set.spawn(async move {
                let name = action.name.clone();
                (name, runner.run(&action, &ctx).await)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = set.join_next().await {
            let (name, result) = joined.map_err(|e| {
                ShipwayError::action_failed(stage, "<task>", format!("task panicked: {}", e))
            })?;

            match result {
                Ok(outcome) => {
                    info!(stage, action = %name, "action succeeded");
                    outcomes.push((name, outcome));
                }
                Err(e) => {
                    // Best-effort cancellation of the rest of the group.
                    warn!(stage, action = %name, error = %e, "action failed, halting stage");
                    set.abort_all();
                    return Err(match e {
                        failed @ ShipwayError::ActionFailed { .. } => failed,
                        other => ShipwayError::action_failed(stage, &name, other.to_string()),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    /// Park on the promotion gate until the operator settles it
    async fn hold_gate(&self, stage: &str, action: &Action) -> ShipwayResult<GateState> {
        info!(stage, action = %action.name, "pipeline parked at promotion gate");

        match self.gate.wait().await {
            GateState::Approved => {
                info!(stage, action = %action.name, "promotion approved");
                Ok(GateState::Approved)
            }
            GateState::Rejected => Err(ShipwayError::GateRejected {
                stage: stage.to_string(),
                action: action.name.clone(),
            }),
            GateState::Pending => unreachable!("wait() only returns settled states"),
        }
    }
}

fn resolve_inputs(
    action: &Action,
    artifacts: &BTreeMap<ArtifactName, ArtifactLocation>,
    stage_outputs: &BTreeMap<ArtifactName, ArtifactLocation>,
) -> ShipwayResult<HashMap<ArtifactName, ArtifactLocation>> {
    action
        .inputs
        .iter()
        .map(|name| {
            artifacts
                .get(name)
                .or_else(|| stage_outputs.get(name))
                .cloned()
                .map(|loc| (name.clone(), loc))
                .ok_or_else(|| ShipwayError::UnknownArtifact {
                    action: action.name.clone(),
                    artifact: name.to_string(),
                })
        })
        .collect()
}

fn generate_run_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("run-{}", millis)
}
