// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Build action factory
//!
//! Produces the per-environment Build action from the shared build
//! template plus one environment profile. Called once per environment by
//! the graph builder; any asymmetry between the two environments can only
//! come from profile values, never from construction logic.

use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{ShipwayError, ShipwayResult};
use crate::pipeline::{Action, ActionConfig, ArtifactName};
use crate::profile::{BuildSpecification, EnvironmentProfile};

/// Build variable carrying the environment tag into the compiled binary
pub const APP_ENV_VAR: &str = "APP_ENV";

/// Create the build action for one environment
///
/// The output artifact contains exactly the named output file. Fails when
/// the output file name is empty or the base directory is not relative.
pub fn build_action(
    profile: &EnvironmentProfile,
    template: &crate::manifest::BuildTemplate,
    source: ArtifactName,
) -> ShipwayResult<Action> {
    let name = format!("Build-{}", profile.tag.short());

    if template.output_file.is_empty() {
        return Err(ShipwayError::EmptyOutputFile { action: name });
    }

    if Path::new(&template.base_directory).is_absolute() {
        return Err(ShipwayError::NonRelativeBaseDirectory {
            action: name,
            path: template.base_directory.clone().into(),
        });
    }

    let mut env = BTreeMap::new();
    env.insert(APP_ENV_VAR.to_string(), profile.tag.short().to_string());
    env.extend(profile.variables.clone());

    let spec = BuildSpecification {
        base_directory: template.base_directory.clone(),
        install_commands: template.install.clone(),
        build_commands: template.build.clone(),
        output_files: vec![template.output_file.clone()],
        env,
    };

    Ok(Action {
        name,
        run_order: 1,
        inputs: vec![source],
        outputs: vec![ArtifactName::new(format!(
            "BuildOutput{}",
            profile.tag.short()
        ))],
        config: ActionConfig::Build { spec },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::BuildTemplate;
    use crate::profile::EnvironmentTag;

    fn ppd_profile() -> EnvironmentProfile {
        EnvironmentProfile {
            tag: EnvironmentTag::Preproduction,
            stack_name: "SvcPPD".into(),
            endpoint: Some("https://ppd.example.com".into()),
            variables: BTreeMap::new(),
        }
    }

    fn template() -> BuildTemplate {
        BuildTemplate {
            base_directory: ".".into(),
            output_file: "handler".into(),
            install: vec!["go get ./...".into()],
            build: vec!["go build -o handler".into()],
        }
    }

    #[test]
    fn test_build_action_declares_exactly_the_output_file() {
        let action = build_action(&ppd_profile(), &template(), "AppSource".into()).unwrap();

        assert_eq!(action.name, "Build-PPD");
        assert_eq!(action.outputs, vec![ArtifactName::from("BuildOutputPPD")]);

        let ActionConfig::Build { spec } = &action.config else {
            panic!("expected Build config");
        };
        assert_eq!(spec.output_files, vec!["handler".to_string()]);
        assert_eq!(spec.env.get(APP_ENV_VAR).unwrap(), "PPD");
    }

    #[test]
    fn test_profile_variables_override_defaults() {
        let mut profile = ppd_profile();
        profile
            .variables
            .insert("LOG_LEVEL".into(), "debug".into());

        let action = build_action(&profile, &template(), "AppSource".into()).unwrap();
        let ActionConfig::Build { spec } = &action.config else {
            panic!("expected Build config");
        };
        assert_eq!(spec.env.get("LOG_LEVEL").unwrap(), "debug");
    }

    #[test]
    fn test_empty_output_file_rejected() {
        let mut t = template();
        t.output_file = String::new();

        let result = build_action(&ppd_profile(), &t, "AppSource".into());
        assert!(matches!(result, Err(ShipwayError::EmptyOutputFile { .. })));
    }

    #[test]
    fn test_absolute_base_directory_rejected() {
        let mut t = template();
        t.base_directory = "/opt/build".into();

        let result = build_action(&ppd_profile(), &t, "AppSource".into());
        assert!(matches!(
            result,
            Err(ShipwayError::NonRelativeBaseDirectory { .. })
        ));
    }
}
