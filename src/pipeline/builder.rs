// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Pipeline graph builder
//!
//! Assembles the fixed six-stage promotion topology from a manifest:
//!
//! ```text
//! Source → Build-Infra → Build-PPD → Deploy-PPD(+Approval) → Build-PRD → Deploy-PRD
//! ```
//!
//! The two environments are wired through one pure function invoked once
//! per profile. Structural parity between pre-production and production is
//! the core correctness property of the whole pipeline; any asymmetry is a
//! defect, so nothing environment-specific may be constructed outside
//! [`environment_actions`].

use tracing::debug;

use crate::actions::{approval_action, build_action, deploy_action, source_action, synth_action};
use crate::errors::{ShipwayError, ShipwayResult};
use crate::manifest::{BuildTemplate, Manifest, Sources, SynthesisTemplate};
use crate::pipeline::{Action, ActionGraph, ArtifactName, Pipeline, Stage};
use crate::profile::EnvironmentProfile;

/// Prompt shown to the operator at the promotion gate
pub const APPROVAL_PROMPT: &str = "Ready to deploy to production?";

/// Builder for the fixed promotion topology
pub struct PipelineBuilder;

impl PipelineBuilder {
    /// Build the full pipeline from a manifest
    pub fn build(manifest: &Manifest) -> ShipwayResult<Pipeline> {
        let (ppd, prd) = manifest.profiles();
        Self::build_from_parts(
            &manifest.service,
            &manifest.stack_prefix,
            &manifest.sources,
            &manifest.build,
            &manifest.synthesis,
            &ppd,
            &prd,
        )
    }

    /// Build the pipeline from its constituent parts
    ///
    /// The profile pair is positional: pre-production first, production
    /// second. Fails when a profile is missing its stack name or endpoint,
    /// when the profiles share a tag, or when the assembled graph violates
    /// an artifact invariant.
    pub fn build_from_parts(
        service: &str,
        stack_prefix: &str,
        sources: &Sources,
        build: &BuildTemplate,
        synthesis: &SynthesisTemplate,
        ppd: &EnvironmentProfile,
        prd: &EnvironmentProfile,
    ) -> ShipwayResult<Pipeline> {
        validate_profile(ppd)?;
        validate_profile(prd)?;

        if ppd.tag == prd.tag {
            return Err(ShipwayError::DuplicateEnvironmentTag {
                tag: ppd.tag.to_string(),
            });
        }

        let app_source = ArtifactName::from("AppSource");
        let infra_source = ArtifactName::from("InfraSource");

        let synth = synth_action(stack_prefix, synthesis, infra_source.clone());

        let (ppd_build, ppd_deploy) =
            environment_actions(ppd, stack_prefix, build, &app_source, &synth)?;
        let (prd_build, prd_deploy) =
            environment_actions(prd, stack_prefix, build, &app_source, &synth)?;

        // Gate sits behind the pre-production deploy (run-order 2), so the
        // operator reviews a live deployment before production unlocks.
        let approval = approval_action(APPROVAL_PROMPT, ppd.endpoint.clone(), 2);

        let pipeline = Pipeline {
            name: service.to_string(),
            stages: vec![
                Stage {
                    name: "Source".into(),
                    actions: vec![
                        source_action("Checkout-Application", &sources.application, app_source),
                        source_action(
                            "Checkout-Infrastructure",
                            &sources.infrastructure,
                            infra_source,
                        ),
                    ],
                },
                Stage {
                    name: "Build-Infra".into(),
                    actions: vec![synth],
                },
                Stage {
                    name: format!("Build-{}", ppd.tag.short()),
                    actions: vec![ppd_build],
                },
                Stage {
                    name: format!("Deploy-{}", ppd.tag.short()),
                    actions: vec![ppd_deploy, approval],
                },
                Stage {
                    name: format!("Build-{}", prd.tag.short()),
                    actions: vec![prd_build],
                },
                Stage {
                    name: format!("Deploy-{}", prd.tag.short()),
                    actions: vec![prd_deploy],
                },
            ],
        };

        // Self-check: single producers, no forward references, no cycles.
        ActionGraph::build(&pipeline)?;

        debug!(
            service,
            stages = pipeline.stages.len(),
            "assembled promotion pipeline"
        );

        Ok(pipeline)
    }
}

/// Construct one environment's (build, deploy) action pair
///
/// Pure aside from object construction. This is the only place
/// environment-specific actions come from.
fn environment_actions(
    profile: &EnvironmentProfile,
    stack_prefix: &str,
    build: &BuildTemplate,
    app_source: &ArtifactName,
    synth: &Action,
) -> ShipwayResult<(Action, Action)> {
    let build = build_action(profile, build, app_source.clone())?;
    let build_output = build
        .outputs
        .first()
        .cloned()
        .ok_or_else(|| {
            ShipwayError::invalid_pipeline(format!(
                "build action '{}' declares no output artifact",
                build.name
            ))
        })?;
    let deploy = deploy_action(profile, stack_prefix, synth, build_output)?;

    Ok((build, deploy))
}

fn validate_profile(profile: &EnvironmentProfile) -> ShipwayResult<()> {
    if profile.stack_name.is_empty() {
        return Err(ShipwayError::MissingProfileField {
            tag: profile.tag.to_string(),
            field: "stack_name".into(),
        });
    }

    match &profile.endpoint {
        Some(endpoint) if !endpoint.is_empty() => Ok(()),
        _ => Err(ShipwayError::MissingProfileField {
            tag: profile.tag.to_string(),
            field: "endpoint".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ActionConfig, ActionKind};
    use crate::profile::EnvironmentTag;

    fn build_example() -> Pipeline {
        PipelineBuilder::build(&Manifest::example()).unwrap()
    }

    #[test]
    fn test_fixed_six_stage_topology() {
        let pipeline = build_example();

        assert_eq!(
            pipeline.stage_names(),
            vec![
                "Source",
                "Build-Infra",
                "Build-PPD",
                "Deploy-PPD",
                "Build-PRD",
                "Deploy-PRD"
            ]
        );

        // Stage 4 holds exactly the deploy and the gate, gate at run-order 2.
        let deploy_ppd = pipeline.get_stage("Deploy-PPD").unwrap();
        assert_eq!(deploy_ppd.actions.len(), 2);
        assert_eq!(deploy_ppd.actions[0].kind(), ActionKind::Deploy);
        assert_eq!(deploy_ppd.actions[0].run_order, 1);
        assert_eq!(deploy_ppd.actions[1].kind(), ActionKind::Approval);
        assert_eq!(deploy_ppd.actions[1].run_order, 2);
    }

    #[test]
    fn test_source_stage_actions_run_concurrently() {
        let pipeline = build_example();
        let source = pipeline.get_stage("Source").unwrap();

        assert_eq!(source.actions.len(), 2);
        assert!(source.actions.iter().all(|a| a.run_order == 1));
        assert_eq!(source.run_order_groups().len(), 1);
    }

    #[test]
    fn test_environment_symmetry() {
        // The PPD and PRD halves must be structurally identical except for
        // profile-derived values.
        let pipeline = build_example();

        let ppd_build = &pipeline.get_stage("Build-PPD").unwrap().actions[0];
        let prd_build = &pipeline.get_stage("Build-PRD").unwrap().actions[0];

        assert_eq!(ppd_build.inputs, prd_build.inputs);
        assert_eq!(ppd_build.run_order, prd_build.run_order);
        let (ActionConfig::Build { spec: ppd_spec }, ActionConfig::Build { spec: prd_spec }) =
            (&ppd_build.config, &prd_build.config)
        else {
            panic!("expected Build configs");
        };
        assert_eq!(ppd_spec.build_commands, prd_spec.build_commands);
        assert_eq!(ppd_spec.output_files, prd_spec.output_files);
        assert_eq!(ppd_spec.env.get("APP_ENV").unwrap(), "PPD");
        assert_eq!(prd_spec.env.get("APP_ENV").unwrap(), "PRD");

        let ppd_deploy = &pipeline.get_stage("Deploy-PPD").unwrap().actions[0];
        let prd_deploy = &pipeline.get_stage("Deploy-PRD").unwrap().actions[0];

        // Same shape: template artifact plus own build output.
        assert_eq!(ppd_deploy.inputs.len(), prd_deploy.inputs.len());
        assert_eq!(ppd_deploy.inputs[0], prd_deploy.inputs[0]);
        assert_ne!(ppd_deploy.inputs[1], prd_deploy.inputs[1]);

        let (
            ActionConfig::Deploy {
                template_file: ppd_template,
                parameter_overrides: ppd_params,
                ..
            },
            ActionConfig::Deploy {
                template_file: prd_template,
                parameter_overrides: prd_params,
                ..
            },
        ) = (&ppd_deploy.config, &prd_deploy.config)
        else {
            panic!("expected Deploy configs");
        };
        assert_eq!(ppd_template, "PolinaServiceStackPPD.template.json");
        assert_eq!(prd_template, "PolinaServiceStackPRD.template.json");
        assert_eq!(ppd_params.keys().collect::<Vec<_>>(), prd_params.keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_approval_links_preproduction_endpoint() {
        let pipeline = build_example();
        let gate = &pipeline.get_stage("Deploy-PPD").unwrap().actions[1];

        let ActionConfig::Approval {
            prompt,
            external_link,
        } = &gate.config
        else {
            panic!("expected Approval config");
        };
        assert_eq!(prompt, APPROVAL_PROMPT);
        assert_eq!(external_link.as_deref(), Some("https://ppd.example.com"));
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let mut manifest = Manifest::example();
        manifest.environments.production.endpoint = None;

        let result = PipelineBuilder::build(&manifest);
        match result {
            Err(ShipwayError::MissingProfileField { tag, field }) => {
                assert_eq!(tag, "PRD");
                assert_eq!(field, "endpoint");
            }
            other => panic!("expected MissingProfileField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_stack_name_rejected() {
        let mut manifest = Manifest::example();
        manifest.environments.preproduction.stack_name = String::new();

        let result = PipelineBuilder::build(&manifest);
        assert!(matches!(
            result,
            Err(ShipwayError::MissingProfileField { .. })
        ));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let manifest = Manifest::example();
        let (ppd, _) = manifest.profiles();
        let mut second = ppd.clone();
        second.stack_name = "Other".into();

        let result = PipelineBuilder::build_from_parts(
            &manifest.service,
            &manifest.stack_prefix,
            &manifest.sources,
            &manifest.build,
            &manifest.synthesis,
            &ppd,
            &second,
        );
        assert!(matches!(
            result,
            Err(ShipwayError::DuplicateEnvironmentTag { .. })
        ));
    }

    #[test]
    fn test_custom_profiles_parameterize_both_environments() {
        // Profiles {ppd, SvcPPD} / {prd, SvcPRD} through the same factory.
        let manifest = Manifest::example();
        let ppd = EnvironmentProfile {
            tag: EnvironmentTag::Preproduction,
            stack_name: "SvcPPD".into(),
            endpoint: Some("https://ppd.svc.example.com".into()),
            variables: Default::default(),
        };
        let prd = EnvironmentProfile {
            tag: EnvironmentTag::Production,
            stack_name: "SvcPRD".into(),
            endpoint: Some("https://prd.svc.example.com".into()),
            variables: Default::default(),
        };

        let pipeline = PipelineBuilder::build_from_parts(
            "svc",
            "Svc",
            &manifest.sources,
            &manifest.build,
            &manifest.synthesis,
            &ppd,
            &prd,
        )
        .unwrap();

        assert_eq!(pipeline.stages.len(), 6);
        assert_eq!(pipeline.stages[3].actions.len(), 2);
        assert_eq!(pipeline.stages[3].actions[1].run_order, 2);

        let ActionConfig::Deploy { stack_name, .. } = &pipeline.stages[5].actions[0].config else {
            panic!("expected Deploy config");
        };
        assert_eq!(stack_name, "SvcPRD");
    }

    #[test]
    fn test_graph_validates_clean() {
        let pipeline = build_example();
        assert!(ActionGraph::build(&pipeline).is_ok());
    }
}
