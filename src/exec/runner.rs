// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Action runners
//!
//! The orchestration core never checks out source, compiles, or talks to a
//! cloud control plane itself; it hands each non-approval action to an
//! [`ActionRunner`]. The [`SimulatedRunner`] stands in for the external
//! collaborators in tests and dry runs, producing deterministic artifact
//! locations and honoring the deploy binding contract.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::actions::location_placeholder;
use crate::errors::{ShipwayError, ShipwayResult};
use crate::pipeline::{Action, ActionConfig, ArtifactLocation, ArtifactName};

/// Everything a runner may need besides the action itself
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Stage the action belongs to
    pub stage: String,

    /// Identifier of this pipeline run
    pub run_id: String,

    /// Storage locations of the action's input artifacts
    pub inputs: HashMap<ArtifactName, ArtifactLocation>,
}

impl ActionContext {
    /// Location of one input artifact
    pub fn input(&self, name: &ArtifactName) -> ShipwayResult<&ArtifactLocation> {
        self.inputs.get(name).ok_or_else(|| {
            ShipwayError::invalid_pipeline(format!(
                "input artifact '{}' has no resolved location",
                name
            ))
        })
    }
}

/// Result of running one action
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// Locations of the artifacts the action produced
    pub outputs: Vec<(ArtifactName, ArtifactLocation)>,

    /// Human-readable summary for the run report
    pub detail: String,
}

impl ActionOutcome {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            outputs: vec![],
            detail: detail.into(),
        }
    }

    pub fn with_output(mut self, name: ArtifactName, location: ArtifactLocation) -> Self {
        self.outputs.push((name, location));
        self
    }
}

/// Seam to the external execution environment
///
/// Implementations may retry internally; the orchestrator treats any
/// returned error as final for the run.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Run one action to completion
    ///
    /// Approval actions never reach the runner; the executor parks on the
    /// promotion gate itself.
    async fn run(&self, action: &Action, ctx: &ActionContext) -> ShipwayResult<ActionOutcome>;
}

/// Deterministic in-process runner for tests and `shipway run`
///
/// Artifact locations take the form `artifact://<run-id>/<name>`. The
/// runner tracks which files each artifact claims to contain so a deploy
/// can verify its template file actually exists in the synthesized
/// artifact, the same check the real deploy collaborator would make.
#[derive(Default)]
pub struct SimulatedRunner {
    fail_actions: HashSet<String>,
    emitted_files: Mutex<HashMap<ArtifactName, Vec<String>>>,
}

impl SimulatedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named action fail when it runs
    pub fn fail_action(mut self, name: &str) -> Self {
        self.fail_actions.insert(name.to_string());
        self
    }

    fn location(&self, ctx: &ActionContext, name: &ArtifactName) -> ArtifactLocation {
        ArtifactLocation(format!("artifact://{}/{}", ctx.run_id, name))
    }

    fn record_files(&self, artifact: &ArtifactName, files: &[String]) {
        self.emitted_files
            .lock()
            .expect("emitted_files lock poisoned")
            .insert(artifact.clone(), files.to_vec());
    }

    fn files_of(&self, artifact: &ArtifactName) -> Option<Vec<String>> {
        self.emitted_files
            .lock()
            .expect("emitted_files lock poisoned")
            .get(artifact)
            .cloned()
    }
}

#[async_trait]
impl ActionRunner for SimulatedRunner {
    async fn run(&self, action: &Action, ctx: &ActionContext) -> ShipwayResult<ActionOutcome> {
        if self.fail_actions.contains(&action.name) {
            return Err(ShipwayError::action_failed(
                &ctx.stage,
                &action.name,
                "injected failure",
            ));
        }

        match &action.config {
            ActionConfig::Source { owner, repo, branch } => {
                let mut outcome =
                    ActionOutcome::new(format!("checked out {}/{}@{}", owner, repo, branch));
                for output in &action.outputs {
                    outcome = outcome.with_output(output.clone(), self.location(ctx, output));
                }
                Ok(outcome)
            }

            ActionConfig::Build { spec } | ActionConfig::Synth { spec, .. } => {
                let mut outcome = ActionOutcome::new(format!(
                    "built {} in '{}'",
                    spec.output_files.join(", "),
                    spec.base_directory
                ));
                for output in &action.outputs {
                    self.record_files(output, &spec.output_files);
                    outcome = outcome.with_output(output.clone(), self.location(ctx, output));
                }
                Ok(outcome)
            }

            ActionConfig::Deploy {
                stack_name,
                template_file,
                parameter_overrides,
                ..
            } => {
                // The template artifact is always the deploy's first input.
                let template_artifact = action.inputs.first().ok_or_else(|| {
                    ShipwayError::invalid_pipeline(format!(
                        "deploy action '{}' has no template input",
                        action.name
                    ))
                })?;

                if let Some(files) = self.files_of(template_artifact) {
                    if !files.contains(template_file) {
                        return Err(ShipwayError::action_failed(
                            &ctx.stage,
                            &action.name,
                            format!(
                                "template '{}' not present in artifact '{}' (contains: {:?})",
                                template_file, template_artifact, files
                            ),
                        ));
                    }
                }

                // Resolve location placeholders against input artifacts.
                let mut resolved = Vec::new();
                for (key, value) in parameter_overrides {
                    let concrete = action
                        .inputs
                        .iter()
                        .find(|input| location_placeholder(input) == *value)
                        .map(|input| ctx.input(input).map(|loc| loc.0.clone()))
                        .transpose()?
                        .unwrap_or_else(|| value.clone());
                    resolved.push(format!("{}={}", key, concrete));
                }

                Ok(ActionOutcome::new(format!(
                    "deployed stack '{}' from '{}' [{}]",
                    stack_name,
                    template_file,
                    resolved.join(", ")
                )))
            }

            ActionConfig::Approval { .. } => Err(ShipwayError::invalid_pipeline(format!(
                "approval action '{}' must be handled by the executor, not a runner",
                action.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{build_action, deploy_action, synth_action};
    use crate::manifest::{BuildTemplate, SynthesisTemplate};
    use crate::profile::{EnvironmentProfile, EnvironmentTag};

    fn ctx(inputs: Vec<(&str, &str)>) -> ActionContext {
        ActionContext {
            stage: "test-stage".into(),
            run_id: "run-1".into(),
            inputs: inputs
                .into_iter()
                .map(|(k, v)| (ArtifactName::from(k), ArtifactLocation(v.to_string())))
                .collect(),
        }
    }

    fn ppd() -> EnvironmentProfile {
        EnvironmentProfile {
            tag: EnvironmentTag::Preproduction,
            stack_name: "SvcPPD".into(),
            endpoint: Some("https://ppd.example.com".into()),
            variables: Default::default(),
        }
    }

    fn template() -> BuildTemplate {
        BuildTemplate {
            base_directory: ".".into(),
            output_file: "handler".into(),
            install: vec![],
            build: vec!["make".into()],
        }
    }

    #[tokio::test]
    async fn test_build_produces_deterministic_location() {
        let runner = SimulatedRunner::new();
        let action = build_action(&ppd(), &template(), "AppSource".into()).unwrap();

        let outcome = runner
            .run(&action, &ctx(vec![("AppSource", "artifact://run-1/AppSource")]))
            .await
            .unwrap();

        assert_eq!(outcome.outputs.len(), 1);
        assert_eq!(outcome.outputs[0].0, ArtifactName::from("BuildOutputPPD"));
        assert_eq!(outcome.outputs[0].1 .0, "artifact://run-1/BuildOutputPPD");
    }

    #[tokio::test]
    async fn test_deploy_resolves_package_location() {
        let runner = SimulatedRunner::new();

        let synth = synth_action("Svc", &SynthesisTemplate::default(), "InfraSource".into());
        runner
            .run(&synth, &ctx(vec![("InfraSource", "artifact://run-1/InfraSource")]))
            .await
            .unwrap();

        let deploy = deploy_action(&ppd(), "Svc", &synth, "BuildOutputPPD".into()).unwrap();
        let outcome = runner
            .run(
                &deploy,
                &ctx(vec![
                    ("InfraTemplates", "artifact://run-1/InfraTemplates"),
                    ("BuildOutputPPD", "artifact://run-1/BuildOutputPPD"),
                ]),
            )
            .await
            .unwrap();

        assert!(outcome
            .detail
            .contains("PackageLocation=artifact://run-1/BuildOutputPPD"));
        assert!(outcome.detail.contains("SvcPPD"));
    }

    #[tokio::test]
    async fn test_deploy_fails_when_template_missing_from_artifact() {
        let runner = SimulatedRunner::new();

        let synth = synth_action("Svc", &SynthesisTemplate::default(), "InfraSource".into());
        let deploy = deploy_action(&ppd(), "Svc", &synth, "BuildOutputPPD".into()).unwrap();

        // Synthesis claims to have run but emitted only the PRD template.
        runner.record_files(
            &ArtifactName::from("InfraTemplates"),
            &["SvcPRD.template.json".to_string()],
        );

        let result = runner
            .run(
                &deploy,
                &ctx(vec![
                    ("InfraTemplates", "artifact://run-1/InfraTemplates"),
                    ("BuildOutputPPD", "artifact://run-1/BuildOutputPPD"),
                ]),
            )
            .await;

        match result {
            Err(ShipwayError::ActionFailed { message, .. }) => {
                assert!(message.contains("SvcPPD.template.json"));
            }
            other => panic!("expected ActionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let runner = SimulatedRunner::new().fail_action("Build-PPD");
        let action = build_action(&ppd(), &template(), "AppSource".into()).unwrap();

        let result = runner.run(&action, &ctx(vec![])).await;
        assert!(matches!(result, Err(ShipwayError::ActionFailed { .. })));
    }
}
