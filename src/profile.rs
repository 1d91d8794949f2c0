// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipway contributors

//! Environment profiles and build specifications
//!
//! A profile bundles everything that differs between pre-production and
//! production (tag, stack name, endpoint, build variables) so the same
//! action-construction logic can serve both environments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deployment environment tag
///
/// Exactly two environments exist; the promotion path is always
/// pre-production first, then production behind the approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentTag {
    #[serde(alias = "ppd", alias = "PPD")]
    Preproduction,
    #[serde(alias = "prd", alias = "PRD")]
    Production,
}

impl EnvironmentTag {
    /// Canonical short form used in stack names, template file names,
    /// and build variables
    pub fn short(&self) -> &'static str {
        match self {
            Self::Preproduction => "PPD",
            Self::Production => "PRD",
        }
    }
}

impl std::fmt::Display for EnvironmentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// Parameters that specialize the shared build/deploy logic per environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    /// Environment this profile targets
    pub tag: EnvironmentTag,

    /// Name of the stack the deploy action creates or updates
    pub stack_name: String,

    /// Endpoint serving this environment once deployed
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Extra plaintext build variables (merged over the defaults)
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Declarative description of an environment's build steps
///
/// Shape mirrors an external build executor's spec document: install and
/// build command phases plus a declared artifact file list. The orchestrator
/// never runs these commands itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpecification {
    /// Directory (relative to the source artifact root) commands run in
    /// and output files are collected from
    pub base_directory: String,

    /// Commands for the install phase
    #[serde(default)]
    pub install_commands: Vec<String>,

    /// Commands for the build phase
    pub build_commands: Vec<String>,

    /// Files the build emits, relative to `base_directory`
    pub output_files: Vec<String>,

    /// Plaintext environment variables injected into the build
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Format the per-environment template file name
///
/// This is the wire format between the infra-synthesis action and the
/// deploy action: synthesis declares these names, deploy looks its own up.
/// Both sides must call this function; hardcoding the string anywhere else
/// breaks the contract silently.
pub fn template_file_name(stack_prefix: &str, tag: EnvironmentTag) -> String {
    format!("{}{}.template.json", stack_prefix, tag.short())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_file_name_format() {
        assert_eq!(
            template_file_name("SvcStack", EnvironmentTag::Preproduction),
            "SvcStackPPD.template.json"
        );
        assert_eq!(
            template_file_name("SvcStack", EnvironmentTag::Production),
            "SvcStackPRD.template.json"
        );
    }

    #[test]
    fn test_tag_deserializes_short_and_long_forms() {
        let tag: EnvironmentTag = serde_yaml::from_str("ppd").unwrap();
        assert_eq!(tag, EnvironmentTag::Preproduction);

        let tag: EnvironmentTag = serde_yaml::from_str("preproduction").unwrap();
        assert_eq!(tag, EnvironmentTag::Preproduction);

        let tag: EnvironmentTag = serde_yaml::from_str("PRD").unwrap();
        assert_eq!(tag, EnvironmentTag::Production);
    }

    #[test]
    fn test_build_specification_serializes_to_json() {
        let spec = BuildSpecification {
            base_directory: ".".into(),
            install_commands: vec!["go get ./...".into()],
            build_commands: vec!["go build -o handler".into()],
            output_files: vec!["handler".into()],
            env: BTreeMap::from([("APP_ENV".to_string(), "PPD".to_string())]),
        };

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["base_directory"], ".");
        assert_eq!(json["output_files"][0], "handler");
        assert_eq!(json["env"]["APP_ENV"], "PPD");
    }
}
