// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Infra-synthesis action factory
//!
//! Synthesis consumes the infrastructure-definition source and emits one
//! template file per environment. The declared file names come from
//! [`template_file_name`], the same formatter the deploy factory binds
//! against, so the contract is checked in one place.

use crate::manifest::SynthesisTemplate;
use crate::pipeline::{Action, ActionConfig, ArtifactName};
use crate::profile::{template_file_name, BuildSpecification, EnvironmentTag};

/// Create the synthesis action declaring template files for both environments
pub fn synth_action(
    stack_prefix: &str,
    template: &SynthesisTemplate,
    source: ArtifactName,
) -> Action {
    let declared_templates = vec![
        template_file_name(stack_prefix, EnvironmentTag::Preproduction),
        template_file_name(stack_prefix, EnvironmentTag::Production),
    ];

    let spec = BuildSpecification {
        base_directory: template.base_directory.clone(),
        install_commands: template.install.clone(),
        build_commands: template.build.clone(),
        output_files: declared_templates.clone(),
        env: Default::default(),
    };

    Action {
        name: "Synthesize-Templates".into(),
        run_order: 1,
        inputs: vec![source],
        outputs: vec![ArtifactName::from("InfraTemplates")],
        config: ActionConfig::Synth {
            spec,
            declared_templates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_declares_one_template_per_environment() {
        let action = synth_action(
            "SvcStack",
            &SynthesisTemplate::default(),
            "InfraSource".into(),
        );

        let ActionConfig::Synth {
            declared_templates, ..
        } = &action.config
        else {
            panic!("expected Synth config");
        };

        assert_eq!(
            declared_templates,
            &vec![
                "SvcStackPPD.template.json".to_string(),
                "SvcStackPRD.template.json".to_string(),
            ]
        );
        assert_eq!(action.outputs, vec![ArtifactName::from("InfraTemplates")]);
    }

    #[test]
    fn test_synth_spec_emits_declared_files() {
        let action = synth_action(
            "SvcStack",
            &SynthesisTemplate::default(),
            "InfraSource".into(),
        );

        let ActionConfig::Synth { spec, declared_templates } = &action.config else {
            panic!("expected Synth config");
        };
        assert_eq!(&spec.output_files, declared_templates);
        assert_eq!(spec.base_directory, "dist");
    }
}
