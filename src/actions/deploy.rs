// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Deploy action factory
//!
//! A deploy action consumes the synthesized template artifact and its own
//! environment's build artifact, binding the build artifact's storage
//! location into the deploy parameters under [`PACKAGE_LOCATION_PARAM`].
//! The template file name it binds to must be among the names the
//! synthesis action declared; the check happens here, at construction time,
//! not when the deploy runs.

use std::collections::BTreeMap;

use crate::errors::{ShipwayError, ShipwayResult};
use crate::pipeline::{Action, ActionConfig, ArtifactName};
use crate::profile::{template_file_name, EnvironmentProfile};

/// Well-known parameter key the deploy collaborator reads the deployable
/// package's storage location from
pub const PACKAGE_LOCATION_PARAM: &str = "PackageLocation";

/// Placeholder bound at graph-build time and resolved by the runner once
/// the referenced artifact has a concrete location
pub fn location_placeholder(artifact: &ArtifactName) -> String {
    format!("{{{{location:{}}}}}", artifact)
}

/// Create the deploy action for one environment
///
/// `synth` is the synthesis action whose declared template list this
/// deploy binds against; `build_output` is the environment's own build
/// artifact.
pub fn deploy_action(
    profile: &EnvironmentProfile,
    stack_prefix: &str,
    synth: &Action,
    build_output: ArtifactName,
) -> ShipwayResult<Action> {
    let expected = template_file_name(stack_prefix, profile.tag);

    let ActionConfig::Synth {
        declared_templates, ..
    } = &synth.config
    else {
        return Err(ShipwayError::invalid_pipeline(format!(
            "action '{}' is not a synthesis action",
            synth.name
        )));
    };

    if !declared_templates.contains(&expected) {
        return Err(ShipwayError::TemplateNotDeclared {
            environment: profile.tag.to_string(),
            expected,
            available: declared_templates.clone(),
        });
    }

    let template_artifact = synth
        .outputs
        .first()
        .cloned()
        .ok_or_else(|| {
            ShipwayError::invalid_pipeline(format!(
                "synthesis action '{}' declares no output artifact",
                synth.name
            ))
        })?;

    let mut parameter_overrides = BTreeMap::new();
    parameter_overrides.insert(
        PACKAGE_LOCATION_PARAM.to_string(),
        location_placeholder(&build_output),
    );

    Ok(Action {
        name: format!("Deploy-{}", profile.tag.short()),
        run_order: 1,
        inputs: vec![template_artifact, build_output],
        outputs: vec![],
        config: ActionConfig::Deploy {
            stack_name: profile.stack_name.clone(),
            template_file: expected,
            parameter_overrides,
            environment: profile.tag,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::synth_action;
    use crate::manifest::SynthesisTemplate;
    use crate::profile::EnvironmentTag;

    fn profile(tag: EnvironmentTag, stack: &str) -> EnvironmentProfile {
        EnvironmentProfile {
            tag,
            stack_name: stack.into(),
            endpoint: Some("https://svc.example.com".into()),
            variables: BTreeMap::new(),
        }
    }

    #[test]
    fn test_deploy_binds_template_and_package_location() {
        let synth = synth_action("Svc", &SynthesisTemplate::default(), "InfraSource".into());
        let prd = profile(EnvironmentTag::Production, "SvcPRD");

        let action = deploy_action(&prd, "Svc", &synth, "BuildOutputPRD".into()).unwrap();

        assert_eq!(action.name, "Deploy-PRD");
        assert_eq!(
            action.inputs,
            vec![
                ArtifactName::from("InfraTemplates"),
                ArtifactName::from("BuildOutputPRD")
            ]
        );

        let ActionConfig::Deploy {
            stack_name,
            template_file,
            parameter_overrides,
            ..
        } = &action.config
        else {
            panic!("expected Deploy config");
        };
        assert_eq!(stack_name, "SvcPRD");
        assert_eq!(template_file, "SvcPRD.template.json");
        assert_eq!(
            parameter_overrides.get(PACKAGE_LOCATION_PARAM).unwrap(),
            "{{location:BuildOutputPRD}}"
        );
    }

    #[test]
    fn test_missing_template_is_binding_error() {
        // Synthesis declared only the PPD template.
        let mut synth = synth_action("Svc", &SynthesisTemplate::default(), "InfraSource".into());
        if let ActionConfig::Synth {
            declared_templates, ..
        } = &mut synth.config
        {
            declared_templates.retain(|t| t.contains("PPD"));
        }

        let prd = profile(EnvironmentTag::Production, "SvcPRD");
        let result = deploy_action(&prd, "Svc", &synth, "BuildOutputPRD".into());

        match result {
            Err(ShipwayError::TemplateNotDeclared {
                environment,
                expected,
                available,
            }) => {
                assert_eq!(environment, "PRD");
                assert_eq!(expected, "SvcPRD.template.json");
                assert_eq!(available, vec!["SvcPPD.template.json".to_string()]);
            }
            other => panic!("expected TemplateNotDeclared, got {:?}", other),
        }
    }

    #[test]
    fn test_non_synth_action_rejected() {
        let not_synth = crate::actions::approval_action("?", None, 1);
        let ppd = profile(EnvironmentTag::Preproduction, "SvcPPD");

        let result = deploy_action(&ppd, "Svc", &not_synth, "BuildOutputPPD".into());
        assert!(matches!(result, Err(ShipwayError::InvalidPipeline { .. })));
    }
}
